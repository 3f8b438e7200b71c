//! logsift -- heuristic insights over in-memory log batches.
//!
//! This crate provides the insight engine (anomalies, recurring patterns,
//! recommendations), batch metrics, pre-analysis search filtering, a seeded
//! sample-log generator, and a small HTTP surface over a loaded batch.

pub mod analysis;
pub mod api;
pub mod config;
pub mod detect;
pub mod logs;
pub mod search;
pub mod telemetry;

use anyhow::{Context, Result};
use config::LogsiftConfig;
use detect::LogInsightEngine;
use logs::LogRecord;

/// Serve the API over `records` until Ctrl-C.
pub async fn serve(bind: &str, config: &LogsiftConfig, records: Vec<LogRecord>) -> Result<()> {
    let engine = LogInsightEngine::new(config.thresholds.clone());
    let state = api::state::AppState::new(engine, records);
    tracing::info!(records = state.records.len(), "Loaded batch for serving");

    let addr: std::net::SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address: {}", bind))?;
    let app = api::router(state);

    tracing::info!(%addr, "logsift listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
