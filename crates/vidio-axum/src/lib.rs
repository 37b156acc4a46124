//! Axum HTTP adapter for vidio.
//!
//! - [`routes::create_router`] - `/resolve`, `/fetch` (plus their legacy
//!   `/api/*` aliases) behind the admission gate, and `/health`
//! - [`relay`] - streams a [`vidio_core::Delivery`] to the client
//! - [`rate_limit`] - fixed-window per-client limiter
//! - [`bootstrap`] - composition root and server startup
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Dev-dependencies only exercised by some test targets
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tower as _;
#[cfg(test)]
use urlencoding as _;

pub mod bootstrap;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod rate_limit;
pub mod relay;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, ServerConfig, bootstrap, rate_limiter_for, start_server};
pub use error::HttpError;
pub use rate_limit::FixedWindowRateLimiter;
pub use relay::{RELAY_CHUNK_SIZE, RelayStream, relay};
pub use routes::create_router;
pub use state::AppState;
