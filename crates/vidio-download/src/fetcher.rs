//! `reqwest` backed remote fetcher for direct media URLs.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::Client;
use reqwest::header::{
    ACCEPT_ENCODING, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, HeaderMap,
    RANGE, USER_AGENT,
};
use tracing::debug;
use vidio_core::{FetchError, ForwardedHeaders, RemoteFetcherPort, RemoteResponse};

/// Budget for connecting and receiving response headers. The body itself is
/// not time-limited.
pub const FETCH_HEADERS_TIMEOUT: Duration = Duration::from_secs(15);

/// User-Agent sent when the client did not provide one.
pub const DEFAULT_USER_AGENT: &str = concat!("vidio/", env!("CARGO_PKG_VERSION"));

/// [`RemoteFetcherPort`] implementation over a shared `reqwest` client.
///
/// The client follows redirects and never decompresses: it asks for
/// `identity` so the relayed `Content-Length` is the byte count on the wire.
#[derive(Debug, Clone)]
pub struct HttpRemoteFetcher {
    client: Client,
    headers_timeout: Duration,
}

impl HttpRemoteFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(FETCH_HEADERS_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            headers_timeout: FETCH_HEADERS_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_headers_timeout(mut self, timeout: Duration) -> Self {
        self.headers_timeout = timeout;
        self
    }
}

fn header_string(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl RemoteFetcherPort for HttpRemoteFetcher {
    async fn fetch(
        &self,
        url: &str,
        headers: &ForwardedHeaders,
    ) -> Result<RemoteResponse, FetchError> {
        let user_agent = headers
            .user_agent
            .as_deref()
            .filter(|ua| !ua.is_empty())
            .unwrap_or(DEFAULT_USER_AGENT);

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT_ENCODING, "identity")
            .header(USER_AGENT, user_agent);
        if let Some(range) = headers.range.as_deref() {
            request = request.header(RANGE, range);
        }

        let response = tokio::time::timeout(self.headers_timeout, request.send())
            .await
            .map_err(|_| FetchError::Timeout(self.headers_timeout))?
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let response_headers = response.headers();
        let content_type = header_string(response_headers, CONTENT_TYPE);
        let content_length =
            header_string(response_headers, CONTENT_LENGTH).and_then(|v| v.parse().ok());
        let content_range = header_string(response_headers, CONTENT_RANGE);
        let accept_ranges = header_string(response_headers, ACCEPT_RANGES);

        debug!(
            status,
            content_type = ?content_type,
            content_length = ?content_length,
            "Remote media server responded"
        );

        Ok(RemoteResponse {
            status,
            content_type,
            content_length,
            content_range,
            accept_ranges,
            body: Box::pin(response.bytes_stream().map_err(std::io::Error::other)),
        })
    }
}
