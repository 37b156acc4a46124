//! Root CLI structure.
//!
//! Every option can also be set through the environment variable named in
//! its `env` attribute, which is how container deployments configure the
//! service.

use clap::{ArgAction, Parser};
use vidio_core::{DEFAULT_PORT, DEFAULT_RATE_LIMIT_PER_MINUTE, ServiceSettings, parse_toggle};

/// Resolve media pages into downloadable encodings and stream them over HTTP.
#[derive(Parser)]
#[cfg_attr(test, derive(Debug))]
#[command(name = "vidio")]
#[command(about = "Media resolve and download service")]
#[command(version)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Shared API key required on media routes (unset disables auth)
    #[arg(long = "api-key", env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable per-client rate limiting (1/true/on/yes or 0/false/off/no)
    #[arg(
        long = "rate-limit-enabled",
        env = "RATE_LIMIT_ENABLED",
        default_value = "true",
        value_parser = parse_toggle,
        action = ArgAction::Set
    )]
    pub rate_limit_enabled: bool,

    /// Requests allowed per client per minute
    #[arg(
        long = "rate-limit-per-minute",
        env = "RATE_LIMIT_PER_MINUTE",
        default_value_t = DEFAULT_RATE_LIMIT_PER_MINUTE
    )]
    pub rate_limit_per_minute: u32,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Settings for the server; validation happens at bootstrap.
    pub fn settings(&self) -> ServiceSettings {
        ServiceSettings {
            port: self.port,
            rate_limit_enabled: self.rate_limit_enabled,
            rate_limit_per_minute: self.rate_limit_per_minute,
            ..ServiceSettings::default()
        }
        .with_api_key(self.api_key.clone())
    }

    /// Default tracing filter when `RUST_LOG` is unset.
    pub const fn default_log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
