//! Media handlers - resolve a source, fetch one encoding.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use serde::Deserialize;
use vidio_core::{MediaInfo, MediaRequest, ServiceError};

use crate::error::HttpError;
use crate::relay::relay;
use crate::state::AppState;

/// Query parameters for resolve.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub url: Option<String>,
}

/// Query parameters for fetch.
#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    pub url: Option<String>,
    pub format_id: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String, ServiceError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ServiceError::InvalidInput(format!("Missing required parameter: {name}")))
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// List the encodings of a source, plus the mp3 option when it has audio.
pub async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<MediaInfo>, HttpError> {
    let url = required(query.url, "url")?;
    Ok(Json(state.orchestrator.resolve(&url).await?))
}

/// Stream one encoding as an attachment.
pub async fn fetch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FetchQuery>,
) -> Result<Response, HttpError> {
    let url = required(query.url, "url")?;
    let format_id = required(query.format_id, "format_id")?;

    let request = MediaRequest::new(url, format_id)
        .with_range(header_string(&headers, header::RANGE))
        .with_user_agent(header_string(&headers, header::USER_AGENT));

    let delivery = state.orchestrator.deliver(&request).await?;
    relay(delivery).await
}
