//! Process entry: build the scheduler, start the ticker, serve HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{error, info};

use super::{create_router, TokioSpawner};
use crate::builders::build_scheduler;
use crate::config::AppConfig;
use crate::core::AppResult;

/// Run the service until Ctrl-C.
///
/// # Errors
///
/// Invalid configuration, a port that cannot be bound, or a server failure.
pub async fn serve(cfg: AppConfig) -> AppResult<()> {
    cfg.warn_capability_gaps();

    let scheduler = build_scheduler(&cfg, TokioSpawner::current())?;
    scheduler.start();

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        %addr,
        concurrency_limit = cfg.concurrency_limit,
        strategy = %cfg.count_strategy,
        "voice slot scheduler listening"
    );

    let result = axum::serve(listener, create_router(scheduler.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    scheduler.stop();
    result.context("http server failed")?;
    info!("voice slot scheduler stopped");
    Ok(())
}

/// Resolve on Ctrl-C. If the handler cannot be installed the future never
/// resolves.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
