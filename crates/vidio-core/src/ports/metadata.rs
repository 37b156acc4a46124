//! Metadata resolver port.
//!
//! Turns a source URL into a title and a list of encoding descriptors. How
//! that happens (extractor binary, scraping, API) is an adapter concern.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::MediaInfo;

/// Errors that can occur while resolving a source.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The resolver ran but could not handle this source.
    #[error("Unsupported or unavailable source: {0}")]
    Unsupported(String),

    /// The resolver produced output that could not be understood.
    #[error("Malformed resolver output: {0}")]
    Malformed(String),

    /// The source resolved, but offered no encodings at all.
    #[error("Source offers no downloadable formats")]
    NoFormats,

    /// The resolver did not answer within its time budget.
    #[error("Resolver timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The resolver itself could not be run (binary missing, spawn failure).
    #[error("Resolver unavailable: {0}")]
    Unavailable(String),
}

/// Port for resolving media metadata.
///
/// Implementations validate their raw output once at this boundary and
/// return fixed-shape [`MediaInfo`] values. The synthetic mp3 option is not
/// the resolver's business; the orchestrator appends it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataResolverPort: Send + Sync {
    async fn resolve(&self, source_url: &str) -> Result<MediaInfo, ResolveError>;
}
