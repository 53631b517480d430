//! Flight Cache - a read-through record cache in front of a slow source
//!
//! Serves user records over HTTP with caching, request coalescing and
//! rate limiting.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flight_cache::api::create_router;
use flight_cache::{spawn_sweep_task, AppState, Config};

/// Main entry point for the Flight Cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the orchestrator (cache, limiter, coalescer, demo database)
/// 4. Start the background sweep task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM, drain the server, then stop and join the sweeper
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flight_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Flight Cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, ttl={}ms, sweep={}ms, port={}, limits={}/{}ms burst {}/{}ms",
        config.cache_capacity,
        config.cache_ttl_ms,
        config.sweep_interval_ms,
        config.server_port,
        config.long_limit,
        config.long_window_ms,
        config.burst_limit,
        config.burst_window_ms
    );

    let state = AppState::from_config(&config);
    info!("Cache, limiter and coalescer initialized");

    let sweeper = spawn_sweep_task(
        state.orchestrator.cache().clone(),
        state.orchestrator.limiter().clone(),
        config.sweep_interval(),
        config.sweep_batch,
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    sweeper.shutdown().await;
    info!("Sweep task joined");
    served.context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
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
                tracing::error!("Failed to install SIGTERM handler: {}", err);
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
}
