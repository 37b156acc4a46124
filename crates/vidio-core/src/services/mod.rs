//! Core services.
//!
//! Services compose ports into use cases. Adapters hold them behind `Arc`
//! and never reach past them into the ports directly.

mod orchestrator;

pub use orchestrator::{Delivery, DownloadOrchestrator};
