//! Per-request download parameters.

use url::Url;

use crate::error::ServiceError;

/// Request headers relayed to a remote media server.
///
/// Only these two are ever forwarded; everything else from the client
/// request stays on this side of the proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedHeaders {
    pub user_agent: Option<String>,
    pub range: Option<String>,
}

/// One incoming download request, read-only for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    pub source_url: String,
    pub encoding_id: String,
    pub client_range: Option<String>,
    pub client_user_agent: Option<String>,
}

impl MediaRequest {
    pub fn new(source_url: impl Into<String>, encoding_id: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            encoding_id: encoding_id.into(),
            client_range: None,
            client_user_agent: None,
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: Option<String>) -> Self {
        self.client_range = range;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.client_user_agent = user_agent;
        self
    }

    /// Headers to relay on the direct path.
    pub fn forwarded_headers(&self) -> ForwardedHeaders {
        ForwardedHeaders {
            user_agent: self.client_user_agent.clone(),
            range: self.client_range.clone(),
        }
    }

    /// Check the request parameters before any collaborator is invoked.
    ///
    /// Returns the request with its source URL in parsed, normalized form;
    /// only that form may be handed to collaborators.
    pub fn validate(&self) -> Result<Self, ServiceError> {
        let url = validate_source_url(&self.source_url)?;
        if self.encoding_id.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "format_id must not be empty".to_string(),
            ));
        }
        Ok(Self {
            source_url: url.into(),
            ..self.clone()
        })
    }
}

/// Parse a client-supplied source URL.
///
/// Only absolute `http`/`https` URLs are accepted. Anything else would be
/// handed to an external extractor as an argument, so it is rejected here.
pub fn validate_source_url(raw: &str) -> Result<Url, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput("url is required".to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| ServiceError::InvalidInput(format!("invalid url '{trimmed}': {e}")))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        scheme => Err(ServiceError::InvalidInput(format!(
            "unsupported url scheme '{scheme}'"
        ))),
    }
}
