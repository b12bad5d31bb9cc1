//! Dash Shield - protection sidecar for the admin dashboard
//!
//! Serves admission decisions, activity tracking and cache invalidation over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dash_shield::api::create_router;
use dash_shield::{spawn_cleanup_task, spawn_session_sweep_task, AppState, Config};

/// Main entry point for the protection sidecar.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the shared cache and protection state
/// 4. Start background cache and session sweep tasks
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dash_shield=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Dash Shield");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, api_limit={}/{}ms, page_limit={}/{}ms, default_ttl={}ms",
        config.server_port,
        config.api_limit.max_requests,
        config.api_limit.window_ms,
        config.page_limit.max_requests,
        config.page_limit.window_ms,
        config.ttl_tiers.default_ms
    );

    let state = AppState::from_config(&config);
    info!("Cache and protection state initialized");

    let sweep_handles = vec![
        spawn_cleanup_task(state.cache.clone(), config.cleanup_interval),
        spawn_session_sweep_task(state.orchestrator.clone(), config.cleanup_interval),
    ];
    info!("Background sweeps started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handles))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the sweep tasks.
async fn shutdown_signal(sweep_handles: Vec<tokio::task::JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for handle in &sweep_handles {
        handle.abort();
    }
    warn!("Sweep tasks aborted");
}
