//! HTTP request handlers for the Axum web server.
//!
//! Handlers are thin wrappers that parse parameters and delegate to the
//! `DownloadOrchestrator`.

pub mod media;
