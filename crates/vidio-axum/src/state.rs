//! Shared application state type.
//!
//! Defines the `AppState` type used across all handlers and the admission
//! gate.

use crate::bootstrap::AxumContext;
use std::sync::Arc;

/// Application state shared across all handlers.
///
/// This is an Arc-wrapped `AxumContext` holding the download orchestrator
/// and the admission settings.
pub type AppState = Arc<AxumContext>;
