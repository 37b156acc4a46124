//! Route definitions and router construction.
//!
//! Media routes sit behind the admission gate; `/health` does not.

use axum::Router;
use axum::middleware;
use axum::routing::get;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::AxumContext;
use crate::gate;
use crate::handlers;
use crate::state::AppState;

/// Permissive CORS: any origin may call the media routes.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Gated media routes, without state applied.
pub(crate) fn media_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/resolve", get(handlers::media::resolve))
        .route("/fetch", get(handlers::media::fetch))
        // Legacy paths kept for older web clients
        .route("/api/extract", get(handlers::media::resolve))
        .route("/api/download", get(handlers::media::fetch))
        .route_layer(middleware::from_fn_with_state(state, gate::admit))
        .layer(build_cors_layer())
}

/// Create the main Axum router.
pub fn create_router(ctx: AxumContext) -> Router {
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route("/health", get(health_check))
        .merge(media_routes(Arc::clone(&state)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
