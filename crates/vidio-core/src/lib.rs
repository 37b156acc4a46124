//! Core domain types and port definitions for vidio.
//!
//! This crate knows what a media source resolves to, how a download should be
//! delivered, and which collaborators it needs to do so. It contains no HTTP
//! server, subprocess or network code: those live behind the traits in
//! [`ports`] and are implemented by `vidio-download` and `vidio-axum`.
#![deny(unused_crate_dependencies)]

pub mod delivery;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use delivery::{DeliveryPlan, FormatSelector, plan_delivery};
pub use domain::{
    AUDIO_EXTRACT_ID, EncodingDescriptor, ForwardedHeaders, MediaInfo, MediaRequest,
    ScratchWorkspace, attachment_filename, content_disposition, sanitize_filename,
    validate_source_url,
};
pub use error::ServiceError;
pub use ports::{
    AudioTranscode, ByteStream, FetchError, MaterializeError, MaterializeJob, MaterializedFile,
    MaterializerPort, MetadataResolverPort, RateLimiterPort, RemoteFetcherPort, RemoteResponse,
    ResolveError, is_usable_media,
};
pub use services::{Delivery, DownloadOrchestrator};
pub use settings::{
    DEFAULT_PORT, DEFAULT_RATE_LIMIT_PER_MINUTE, RATE_LIMIT_WINDOW, ServiceSettings,
    SettingsError, parse_toggle,
};

// Dev-dependencies only exercised by some test modules
#[cfg(test)]
use futures_util as _;
#[cfg(test)]
use serde_json as _;
