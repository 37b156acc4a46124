//! Admission gate: API key check, then per-client rate limiting.
//!
//! Runs as a route layer in front of the media handlers, so a refused
//! request never reaches parameter parsing or the orchestrator.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Query, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use serde::Deserialize;
use tracing::warn;
use vidio_core::ServiceError;

use crate::error::HttpError;
use crate::state::AppState;

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Default, Deserialize)]
struct KeyQuery {
    api_key: Option<String>,
}

/// Key presented by the client, header first, then the `api_key` query
/// parameter.
fn presented_key(request: &Request) -> Option<String> {
    request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| {
            Query::<KeyQuery>::try_from_uri(request.uri())
                .ok()
                .and_then(|Query(q)| q.api_key)
                .filter(|k| !k.is_empty())
        })
}

/// Rate-limit identity: the presented key, else the peer address.
pub fn client_id(key: Option<&str>, peer: Option<SocketAddr>) -> String {
    match (key, peer) {
        (Some(key), _) => format!("key:{key}"),
        (None, Some(addr)) => format!("ip:{}", addr.ip()),
        (None, None) => "ip:unknown".to_string(),
    }
}

/// Loggable form of a client id; keys are never logged.
fn loggable(client: &str) -> &str {
    if client.starts_with("key:") {
        "key:<redacted>"
    } else {
        client
    }
}

pub(crate) async fn admit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let key = presented_key(&request);

    if let Some(expected) = state.api_key.as_deref()
        && key.as_deref() != Some(expected)
    {
        warn!(
            path = %request.uri().path(),
            key_present = key.is_some(),
            "Rejected request with missing or invalid API key"
        );
        return Err(ServiceError::Unauthorized.into());
    }

    if let Some(limiter) = state.rate_limiter.as_ref() {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let client = client_id(key.as_deref(), peer);
        if !limiter.check(&client) {
            warn!(client = loggable(&client), "Rate limit exceeded");
            return Err(ServiceError::RateLimited.into());
        }
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_client_id() {
        let peer: SocketAddr = "203.0.113.9:51234".parse().unwrap();
        assert_eq!(client_id(Some("k1"), Some(peer)), "key:k1");
        assert_eq!(client_id(None, Some(peer)), "ip:203.0.113.9");
        assert_eq!(client_id(None, None), "ip:unknown");
    }

    #[test]
    fn test_presented_key_header_wins() {
        let request = axum::http::Request::builder()
            .uri("/fetch?url=x&api_key=from-query")
            .header("X-API-Key", "from-header")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            presented_key(&request).as_deref(),
            Some("from-header")
        );

        let request = axum::http::Request::builder()
            .uri("/fetch?url=x&api_key=from-query")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            presented_key(&request).as_deref(),
            Some("from-query")
        );

        let request = axum::http::Request::builder()
            .uri("/fetch?url=x")
            .body(Body::empty())
            .unwrap();
        assert_eq!(presented_key(&request), None);
    }

    #[test]
    fn test_keys_are_not_logged() {
        assert_eq!(loggable("key:s3cret"), "key:<redacted>");
        assert_eq!(loggable("ip:10.0.0.1"), "ip:10.0.0.1");
    }
}
