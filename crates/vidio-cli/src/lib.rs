//! Command-line front end for the vidio download service.
//!
//! Parses flags and environment into [`ServiceSettings`](vidio_core::ServiceSettings)
//! and hands them to the HTTP server in `vidio-axum`.

#![deny(unused_crate_dependencies)]

pub mod parser;

pub use parser::Cli;

// Used by the binary target only
use anyhow as _;
use dotenvy as _;
use tokio as _;
use tracing as _;
use tracing_subscriber as _;
use vidio_axum as _;
