//! Delivery strategy selection.
//!
//! [`plan_delivery`] is the pure decision half of the download orchestrator:
//! given a request and the resolved metadata it picks a strategy without
//! touching the network or the filesystem. Executing the plan (and falling
//! back from a failed direct attempt) is done by
//! [`DownloadOrchestrator`](crate::services::DownloadOrchestrator).

use crate::domain::{AUDIO_EXTRACT_ID, ForwardedHeaders, MediaInfo, MediaRequest};
use crate::error::ServiceError;

/// Which encoding a local job should fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSelector {
    /// A concrete encoding id from the resolver.
    Encoding(String),
    /// Best available audio stream (falls back to best overall).
    BestAudio,
}

/// How bytes will reach the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryPlan {
    /// Proxy the pre-resolved remote URL, falling back to a local download
    /// of `encoding_id` if the remote response is not usable.
    DirectProxy {
        remote_url: String,
        headers: ForwardedHeaders,
        source_url: String,
        encoding_id: String,
    },
    /// Download the encoding locally, then serve the file.
    LocalFallback {
        source_url: String,
        selector: FormatSelector,
    },
    /// Extract best audio and transcode it to mp3, then serve the file.
    AudioExtract { source_url: String },
}

impl DeliveryPlan {
    /// Short strategy name for logs.
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::DirectProxy { .. } => "direct",
            Self::LocalFallback { .. } => "fallback",
            Self::AudioExtract { .. } => "audio-extract",
        }
    }

    /// The plan to run when this one turns out unusable.
    ///
    /// Only the direct path has a fallback; there is nothing after the
    /// fallback.
    pub fn fallback(&self) -> Option<Self> {
        match self {
            Self::DirectProxy {
                source_url,
                encoding_id,
                ..
            } => Some(Self::LocalFallback {
                source_url: source_url.clone(),
                selector: FormatSelector::Encoding(encoding_id.clone()),
            }),
            Self::LocalFallback { .. } | Self::AudioExtract { .. } => None,
        }
    }
}

/// Choose the delivery strategy for `request`.
///
/// - `mp3` → audio extraction, but only when the source has audio at all
/// - unknown encoding id → [`ServiceError::FormatNotFound`]
/// - descriptor with a direct URL → direct proxy (with fallback)
/// - otherwise → local fallback right away
pub fn plan_delivery(request: &MediaRequest, info: &MediaInfo) -> Result<DeliveryPlan, ServiceError> {
    if request.encoding_id == AUDIO_EXTRACT_ID {
        if !info.has_audio() {
            return Err(ServiceError::FormatNotFound(format!(
                "{AUDIO_EXTRACT_ID} (source has no audio)"
            )));
        }
        return Ok(DeliveryPlan::AudioExtract {
            source_url: request.source_url.clone(),
        });
    }

    let descriptor = info
        .find(&request.encoding_id)
        .ok_or_else(|| ServiceError::FormatNotFound(request.encoding_id.clone()))?;

    let plan = match descriptor.direct_url.as_deref() {
        Some(remote_url) if !remote_url.is_empty() => DeliveryPlan::DirectProxy {
            remote_url: remote_url.to_string(),
            headers: request.forwarded_headers(),
            source_url: request.source_url.clone(),
            encoding_id: descriptor.id.clone(),
        },
        _ => DeliveryPlan::LocalFallback {
            source_url: request.source_url.clone(),
            selector: FormatSelector::Encoding(descriptor.id.clone()),
        },
    };
    Ok(plan)
}
