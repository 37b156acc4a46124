//! Composition root for the HTTP service.
//!
//! Wires the yt-dlp and reqwest adapters into a [`DownloadOrchestrator`],
//! builds the admission gate from [`ServiceSettings`], and serves the router.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use vidio_core::{DownloadOrchestrator, RATE_LIMIT_WINDOW, RateLimiterPort, ServiceSettings};
use vidio_download::{HttpRemoteFetcher, YtDlp, YtDlpMaterializer, YtDlpResolver};

use crate::rate_limit::FixedWindowRateLimiter;

/// Server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub settings: ServiceSettings,
}

impl ServerConfig {
    pub fn new(settings: ServiceSettings) -> Self {
        Self { settings }
    }

    pub const fn port(&self) -> u16 {
        self.settings.port
    }
}

/// Everything the handlers and the admission gate need.
pub struct AxumContext {
    pub orchestrator: Arc<DownloadOrchestrator>,
    /// Required API key; `None` disables authentication.
    pub api_key: Option<String>,
    /// `None` when rate limiting is disabled.
    pub rate_limiter: Option<Arc<dyn RateLimiterPort>>,
}

impl AxumContext {
    pub fn new(
        orchestrator: DownloadOrchestrator,
        api_key: Option<String>,
        rate_limiter: Option<Arc<dyn RateLimiterPort>>,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            api_key,
            rate_limiter,
        }
    }
}

/// Rate limiter for `settings`, or `None` when disabled.
pub fn rate_limiter_for(settings: &ServiceSettings) -> Option<Arc<FixedWindowRateLimiter>> {
    settings.rate_limit_enabled.then(|| {
        Arc::new(FixedWindowRateLimiter::new(
            settings.rate_limit_per_minute,
            RATE_LIMIT_WINDOW,
        ))
    })
}

/// Build the production context.
///
/// Spawns the rate-limit sweeper, so this must run inside a Tokio runtime.
pub async fn bootstrap(config: ServerConfig) -> Result<AxumContext> {
    let settings = config.settings;
    settings.validate()?;

    let ytdlp = YtDlp::locate();
    if ytdlp.is_installed() {
        info!(program = %ytdlp.program().display(), "Using yt-dlp");
    } else {
        warn!("yt-dlp not found on PATH; resolve and fallback downloads will fail");
    }

    let fetcher = HttpRemoteFetcher::new().context("failed to build HTTP client")?;
    let orchestrator = DownloadOrchestrator::new(
        Arc::new(YtDlpResolver::new(ytdlp.clone())),
        Arc::new(fetcher),
        Arc::new(YtDlpMaterializer::new(ytdlp)),
    );

    let limiter = rate_limiter_for(&settings);
    if let Some(ref limiter) = limiter {
        Arc::clone(limiter).spawn_sweeper();
    }

    info!(
        auth_required = settings.auth_required(),
        rate_limit_enabled = settings.rate_limit_enabled,
        rate_limit_per_minute = settings.rate_limit_per_minute,
        "vidio bootstrap complete"
    );

    Ok(AxumContext::new(
        orchestrator,
        settings.api_key,
        limiter.map(|l| l as Arc<dyn RateLimiterPort>),
    ))
}

/// Bootstrap and serve until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let port = config.port();
    let ctx = bootstrap(config).await?;
    let app = crate::routes::create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("vidio listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
