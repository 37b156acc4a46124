//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No subprocess, `reqwest` or `axum` types in any signature
//! - Each port reports its own error enum; mapping to [`ServiceError`]
//!   happens in the orchestrator
//! - Resources with cleanup obligations (live connections, scratch
//!   workspaces) are returned by value so ownership is explicit
//!
//! [`ServiceError`]: crate::error::ServiceError

pub mod fetcher;
pub mod materializer;
pub mod metadata;
pub mod rate_limiter;

pub use fetcher::{ByteStream, FetchError, RemoteFetcherPort, RemoteResponse, is_usable_media};
pub use materializer::{
    AudioTranscode, MaterializeError, MaterializeJob, MaterializedFile, MaterializerPort,
};
pub use metadata::{MetadataResolverPort, ResolveError};
pub use rate_limiter::RateLimiterPort;
