//! Live Cache server
//!
//! Mirrors one remote document into memory and serves it over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use serde_json::Value;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use live_cache::api::{create_router, AppState};
use live_cache::sync::{JsonLinesFeed, LiveCache, SyncHandle};
use live_cache::Config;

/// Main entry point for the Live Cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the change feed and wait for the first snapshot
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Shut down on SIGINT/SIGTERM or when the live sync stops
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "live_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Live Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: document={}, port={}, feed={}, mismatch_policy={}",
        config.feed,
        config.server_port,
        config
            .feed_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdin".to_string()),
        config.mismatch_policy
    );

    let live: LiveCache<Value> =
        LiveCache::new(config.feed.clone()).with_policy(config.mismatch_policy);

    // Blocks until the first snapshot has been applied
    let sync = match &config.feed_path {
        Some(path) => {
            let feed = JsonLinesFeed::open(path, config.feed.path())
                .await
                .with_context(|| format!("failed to open feed {}", path.display()))?
                .follow(config.feed_poll_interval);
            live.listen(feed).await
        }
        None => live.listen(JsonLinesFeed::stdin(config.feed.path())).await,
    }
    .context("live sync did not become ready")?;

    let app = create_router(AppState::new(live.cache().clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sync))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C, SIGTERM, or a failed live sync.
///
/// A feed that simply ends (stdin closed) leaves the last applied state
/// being served. A failed sync ends the server, so it never serves a cache
/// that has silently stopped following its document.
async fn shutdown_signal(mut sync: SyncHandle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let sync_failed = async {
        match sync.wait().await {
            Ok(()) => {
                warn!("Change feed ended, serving last applied state");
                std::future::pending::<()>().await;
            }
            Err(err) => error!(error = %err, "Live sync failed, initiating shutdown..."),
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
        _ = sync_failed => {}
    }

    if !sync.is_finished() {
        sync.abort();
        warn!("Live sync task aborted");
    }
}
