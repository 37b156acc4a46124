//! Service-level error taxonomy.
//!
//! Every collaborator failure is mapped to exactly one of these at the
//! orchestrator boundary. Adapters translate them into their own transport
//! (HTTP status + JSON body in `vidio-axum`).

use thiserror::Error;

use crate::ports::{MaterializeError, ResolveError};

/// Errors surfaced to a client before any response bytes are committed.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or malformed request parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// API key required and missing or wrong.
    #[error("Missing or invalid API key")]
    Unauthorized,

    /// Client exceeded its request allowance for the current window.
    #[error("Too many requests, try again later")]
    RateLimited,

    /// The requested encoding id is not offered for this source.
    #[error("Format not found: {0}")]
    FormatNotFound(String),

    /// The metadata resolver could not process the source.
    #[error("Could not resolve media: {0}")]
    UpstreamResolve(String),

    /// Remote fetch or fallback download failed.
    #[error("Media download failed: {0}")]
    UpstreamFetch(String),

    /// Audio extraction failed.
    #[error("Audio conversion failed: {0}")]
    Transcode(String),

    /// Unexpected failure (e.g. a job reported success but produced nothing).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) | Self::UpstreamResolve(_) => 400,
            Self::Unauthorized => 401,
            Self::FormatNotFound(_) => 404,
            Self::RateLimited => 429,
            Self::Transcode(_) | Self::Internal(_) => 500,
            Self::UpstreamFetch(_) => 502,
        }
    }

    /// Stable discriminant for client-side handling.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::RateLimited => "RATE_LIMITED",
            Self::FormatNotFound(_) => "FORMAT_NOT_FOUND",
            Self::UpstreamResolve(_) => "UPSTREAM_RESOLVE",
            Self::UpstreamFetch(_) => "UPSTREAM_FETCH",
            Self::Transcode(_) => "TRANSCODE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Map a failed fallback download (the `LocalFallback` strategy).
    pub fn from_fallback(err: MaterializeError) -> Self {
        match err {
            MaterializeError::JobFailed(reason) => Self::UpstreamFetch(reason),
            other => Self::Internal(other.to_string()),
        }
    }

    /// Map a failed audio extraction (the `AudioExtract` strategy).
    pub fn from_transcode(err: MaterializeError) -> Self {
        match err {
            MaterializeError::JobFailed(reason) => Self::Transcode(reason),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ResolveError> for ServiceError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Unavailable(msg) => Self::Internal(msg),
            other => Self::UpstreamResolve(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(ServiceError::InvalidInput(String::new()).status_code(), 400);
        assert_eq!(ServiceError::Unauthorized.status_code(), 401);
        assert_eq!(ServiceError::FormatNotFound("x".into()).status_code(), 404);
        assert_eq!(ServiceError::RateLimited.status_code(), 429);
        assert_eq!(ServiceError::UpstreamResolve(String::new()).status_code(), 400);
        assert_eq!(ServiceError::UpstreamFetch(String::new()).status_code(), 502);
        assert_eq!(ServiceError::Transcode(String::new()).status_code(), 500);
        assert_eq!(ServiceError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn materialize_errors_map_by_strategy() {
        let fallback = ServiceError::from_fallback(MaterializeError::JobFailed("boom".into()));
        assert!(matches!(fallback, ServiceError::UpstreamFetch(_)));

        let transcode = ServiceError::from_transcode(MaterializeError::JobFailed("boom".into()));
        assert!(matches!(transcode, ServiceError::Transcode(_)));

        let missing = ServiceError::from_fallback(MaterializeError::NoOutput);
        assert!(matches!(missing, ServiceError::Internal(_)));
        let missing = ServiceError::from_transcode(MaterializeError::NoOutput);
        assert!(matches!(missing, ServiceError::Internal(_)));
    }

    #[test]
    fn resolve_errors_are_bad_requests_unless_resolver_is_missing() {
        let err: ServiceError = ResolveError::Unsupported("no extractor".into()).into();
        assert_eq!(err.status_code(), 400);

        let err: ServiceError = ResolveError::Timeout(Duration::from_secs(60)).into();
        assert_eq!(err.status_code(), 400);

        let err: ServiceError = ResolveError::Unavailable("yt-dlp not found".into()).into();
        assert_eq!(err.status_code(), 500);
    }
}
