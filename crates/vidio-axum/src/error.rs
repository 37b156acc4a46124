//! Axum-specific error types and mappings.
//!
//! Maps [`ServiceError`] to HTTP status codes and JSON response bodies. Only
//! used before a response is committed: once the relay has sent headers, a
//! failure can only end the body early.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use vidio_core::ServiceError;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A mapped orchestrator or admission failure.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Failure in the HTTP layer itself (e.g. opening a materialized file).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    /// Stable error type discriminant for client-side handling
    #[serde(rename = "type")]
    error_type: &'static str,
    /// Upstream detail (resolver or download job output)
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, error_type, reason) = match self {
            Self::Service(err) => {
                let reason = match err {
                    ServiceError::UpstreamResolve(r)
                    | ServiceError::UpstreamFetch(r)
                    | ServiceError::Transcode(r) => Some(r.clone()),
                    _ => None,
                };
                (summary(err), err.kind(), reason)
            }
            Self::Internal(msg) => (msg.clone(), "INTERNAL", None),
        };

        ErrorBody {
            error,
            status: self.status().as_u16(),
            error_type,
            reason,
        }
    }
}

/// Client-facing message; upstream detail goes to `reason` instead.
fn summary(err: &ServiceError) -> String {
    match err {
        ServiceError::UpstreamResolve(_) => {
            "Could not extract the media or unsupported source".to_string()
        }
        ServiceError::UpstreamFetch(_) => "Download failed".to_string(),
        ServiceError::Transcode(_) => "MP3 conversion failed".to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, axum::Json(self.body())).into_response()
    }
}
