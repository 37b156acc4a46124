//! Download orchestrator - picks and sequences delivery strategies.
//!
//! The orchestrator never streams bytes itself. It resolves metadata, asks
//! [`plan_delivery`] for a strategy, runs the producer side of that strategy
//! (remote fetch or local materialization) and returns a [`Delivery`] that
//! the transport adapter wires into its stream relay.
//!
//! ```text
//! resolve ──► plan ──► DirectProxy ──usable──► Delivery::Live
//!                          │ not usable / fetch error
//!                          ▼
//!                     LocalFallback ──ok──► Delivery::File
//!                          │ failed → UpstreamFetch (502)
//!                     AudioExtract  ──ok──► Delivery::File (audio/mpeg)
//!                          │ failed → Transcode (500)
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::delivery::{DeliveryPlan, FormatSelector, plan_delivery};
use crate::domain::{MediaInfo, MediaRequest, attachment_filename, validate_source_url};
use crate::error::ServiceError;
use crate::ports::{
    AudioTranscode, MaterializeJob, MaterializedFile, MaterializerPort, MetadataResolverPort,
    RemoteFetcherPort, RemoteResponse,
};

const VIDEO_FALLBACK_NAME: &str = "video";
const AUDIO_FALLBACK_NAME: &str = "audio";
const DEFAULT_CONTAINER: &str = "mp4";
const MP3_CONTENT_TYPE: &str = "audio/mpeg";

/// A producer ready to be handed to the stream relay.
#[derive(Debug)]
pub enum Delivery {
    /// Proxy a live remote response.
    Live {
        response: RemoteResponse,
        filename: String,
    },
    /// Serve a materialized file; the relay owns its workspace from here on.
    File {
        file: MaterializedFile,
        filename: String,
        content_type: String,
    },
}

impl Delivery {
    pub fn filename(&self) -> &str {
        match self {
            Self::Live { filename, .. } | Self::File { filename, .. } => filename,
        }
    }
}

/// Service resolving sources and selecting how downloads are delivered.
pub struct DownloadOrchestrator {
    resolver: Arc<dyn MetadataResolverPort>,
    fetcher: Arc<dyn RemoteFetcherPort>,
    materializer: Arc<dyn MaterializerPort>,
}

impl DownloadOrchestrator {
    pub fn new(
        resolver: Arc<dyn MetadataResolverPort>,
        fetcher: Arc<dyn RemoteFetcherPort>,
        materializer: Arc<dyn MaterializerPort>,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            materializer,
        }
    }

    /// Resolve a source into its encoding list, including the synthetic mp3
    /// option when the source has audio.
    pub async fn resolve(&self, source_url: &str) -> Result<MediaInfo, ServiceError> {
        let url = validate_source_url(source_url)?;
        let info = self.resolver.resolve(url.as_str()).await.map_err(|e| {
            warn!(source = %url, error = %e, "Metadata resolution failed");
            ServiceError::from(e)
        })?;

        debug!(source = %url, formats = info.formats.len(), "Resolved media");
        Ok(info.with_audio_extract_option())
    }

    /// Decide how `request` is delivered and prepare the producer.
    pub async fn deliver(&self, request: &MediaRequest) -> Result<Delivery, ServiceError> {
        let request = &request.validate()?;

        let info = self
            .resolver
            .resolve(&request.source_url)
            .await
            .map_err(|e| {
                warn!(source = %request.source_url, error = %e, "Metadata resolution failed");
                ServiceError::from(e)
            })?;

        let plan = plan_delivery(request, &info)?;
        info!(
            source = %request.source_url,
            format_id = %request.encoding_id,
            strategy = plan.strategy(),
            "Selected delivery strategy"
        );

        self.execute(plan, &info, request).await
    }

    async fn execute(
        &self,
        plan: DeliveryPlan,
        info: &MediaInfo,
        request: &MediaRequest,
    ) -> Result<Delivery, ServiceError> {
        match plan {
            DeliveryPlan::DirectProxy {
                ref remote_url,
                ref headers,
                ..
            } => {
                match self.fetcher.fetch(remote_url, headers).await {
                    Ok(response) if response.is_usable() => {
                        let container = info
                            .find(&request.encoding_id)
                            .map_or(DEFAULT_CONTAINER, |d| d.container.as_str());
                        return Ok(Delivery::Live {
                            filename: attachment_filename(
                                info.title.as_deref(),
                                VIDEO_FALLBACK_NAME,
                                container,
                            ),
                            response,
                        });
                    }
                    Ok(response) => {
                        warn!(
                            format_id = %request.encoding_id,
                            status = response.status,
                            content_type = ?response.content_type,
                            "Direct media URL not usable, falling back to local download"
                        );
                        // Dropping the response closes the remote connection.
                        drop(response);
                    }
                    Err(e) => {
                        warn!(
                            format_id = %request.encoding_id,
                            error = %e,
                            "Direct fetch failed, falling back to local download"
                        );
                    }
                }

                match plan.fallback() {
                    Some(DeliveryPlan::LocalFallback {
                        source_url,
                        selector,
                    }) => self.local_fallback(source_url, selector, info).await,
                    _ => Err(ServiceError::Internal(
                        "direct plan without a fallback".to_string(),
                    )),
                }
            }
            DeliveryPlan::LocalFallback {
                source_url,
                selector,
            } => self.local_fallback(source_url, selector, info).await,
            DeliveryPlan::AudioExtract { source_url } => {
                self.audio_extract(source_url, info).await
            }
        }
    }

    async fn local_fallback(
        &self,
        source_url: String,
        selector: FormatSelector,
        info: &MediaInfo,
    ) -> Result<Delivery, ServiceError> {
        let container = match &selector {
            FormatSelector::Encoding(id) => info.find(id).map(|d| d.container.clone()),
            FormatSelector::BestAudio => None,
        };

        let file = self
            .materializer
            .materialize(MaterializeJob::download(source_url, selector))
            .await
            .map_err(|e| {
                warn!(error = %e, "Fallback download failed");
                ServiceError::from_fallback(e)
            })?;

        let ext = file
            .extension()
            .map(str::to_string)
            .or(container)
            .unwrap_or_else(|| DEFAULT_CONTAINER.to_string());
        let filename = attachment_filename(info.title.as_deref(), VIDEO_FALLBACK_NAME, &ext);
        let content_type = file.content_type.clone();

        Ok(Delivery::File {
            file,
            filename,
            content_type,
        })
    }

    async fn audio_extract(
        &self,
        source_url: String,
        info: &MediaInfo,
    ) -> Result<Delivery, ServiceError> {
        let file = self
            .materializer
            .materialize(MaterializeJob::extract_audio(source_url, AudioTranscode::MP3))
            .await
            .map_err(|e| {
                warn!(error = %e, "Audio extraction failed");
                ServiceError::from_transcode(e)
            })?;

        Ok(Delivery::File {
            file,
            filename: attachment_filename(
                info.title.as_deref(),
                AUDIO_FALLBACK_NAME,
                AudioTranscode::MP3.codec,
            ),
            content_type: MP3_CONTENT_TYPE.to_string(),
        })
    }
}
