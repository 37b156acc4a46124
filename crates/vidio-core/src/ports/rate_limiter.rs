//! Request admission port.

/// Per-client request admission policy.
///
/// `check` both tests and records: an allowed call counts against the
/// client's allowance, a rejected one does not.
pub trait RateLimiterPort: Send + Sync {
    fn check(&self, client_id: &str) -> bool;
}
