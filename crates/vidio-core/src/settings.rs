//! Service settings and validation.
//!
//! Pure values; reading them from the environment is the binary's job.

use std::fmt;
use std::time::Duration;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default per-client request allowance per window.
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;

/// Length of one rate-limit window.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Validated runtime settings of the HTTP service.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub port: u16,
    /// Shared API key. `None` disables authentication.
    pub api_key: Option<String>,
    pub rate_limit_enabled: bool,
    pub rate_limit_per_minute: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: None,
            rate_limit_enabled: true,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
        }
    }
}

impl ServiceSettings {
    /// Set the API key; an empty or blank key disables authentication.
    #[must_use]
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Whether requests must present the API key.
    #[must_use]
    pub const fn auth_required(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.rate_limit_per_minute == 0 {
            return Err(SettingsError::InvalidRateLimit(self.rate_limit_per_minute));
        }
        Ok(())
    }
}

// Never print the key itself.
impl fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("port", &self.port)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("rate_limit_enabled", &self.rate_limit_enabled)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Rate limit must allow at least 1 request per minute, got {0}")]
    InvalidRateLimit(u32),

    #[error("Expected a boolean toggle (1/0, true/false, on/off, yes/no), got {0:?}")]
    InvalidToggle(String),
}

/// Parse an on/off environment toggle.
///
/// `0`, `false`, `off` and `no` disable; `1`, `true`, `on` and `yes` enable.
/// Case and surrounding whitespace are ignored.
pub fn parse_toggle(value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(SettingsError::InvalidToggle(value.to_string())),
    }
}
