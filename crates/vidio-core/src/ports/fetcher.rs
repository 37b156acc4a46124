//! Remote fetcher port.
//!
//! Issues a GET against a resolved direct media URL and hands back a live
//! response. The orchestrator decides whether the response is usable; the
//! fetcher only reports what the remote said.

use std::fmt;
use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;
use thiserror::Error;

use crate::domain::ForwardedHeaders;

/// Body of a live remote response.
///
/// Dropping the stream releases the underlying connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// A live response from a remote media server.
pub struct RemoteResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub content_range: Option<String>,
    pub accept_ranges: Option<String>,
    pub body: ByteStream,
}

impl RemoteResponse {
    /// Whether this response can be proxied as media.
    pub fn is_usable(&self) -> bool {
        is_usable_media(self.status, self.content_type.as_deref())
    }
}

impl fmt::Debug for RemoteResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("content_range", &self.content_range)
            .field("accept_ranges", &self.accept_ranges)
            .finish_non_exhaustive()
    }
}

/// Usability rule for direct responses.
///
/// Status must be 200 or 206 and the content type must be `video/*`,
/// `audio/*` or `application/octet-stream`. Anything else (an HTML error
/// page, a JSON challenge) is not media, whatever the status says.
pub fn is_usable_media(status: u16, content_type: Option<&str>) -> bool {
    if status != 200 && status != 206 {
        return false;
    }

    let Some(content_type) = content_type else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence.starts_with("video/")
        || essence.starts_with("audio/")
        || essence == "application/octet-stream"
}

/// Network-level fetch failures. All of them are recoverable: the
/// orchestrator falls back to local materialization.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to remote media server failed: {0}")]
    Request(String),

    #[error("Remote media server did not respond within {}s", .0.as_secs())]
    Timeout(std::time::Duration),
}

/// Port for fetching direct media URLs.
///
/// Implementations must request identity encoding so `Content-Length`
/// matches the transferred byte count, follow redirects, and forward only
/// the headers in [`ForwardedHeaders`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteFetcherPort: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        headers: &ForwardedHeaders,
    ) -> Result<RemoteResponse, FetchError>;
}
