//! API route definitions.

use super::state::AppState;
use crate::analysis::LogMetrics;
use crate::logs::{source::parse_batch, LogLevel, LogRecord};
use crate::search::{SearchFilter, SUGGESTIONS};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/logs", get(list_logs))
        .route("/metrics", get(metrics))
        .route("/analyze", post(analyze))
        .route("/suggestions", get(suggestions))
}

/// `?q=timeout&level=error,warn&service=payment-api`
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub q: Option<String>,
    pub level: Option<String>,
    pub service: Option<String>,
}

impl LogQuery {
    fn to_filter(&self) -> Result<SearchFilter, ApiError> {
        let levels = split_csv(self.level.as_deref())
            .map(|l| l.parse::<LogLevel>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let services = split_csv(self.service.as_deref()).map(str::to_string).collect();
        Ok(SearchFilter {
            query: self.q.clone(),
            levels,
            services,
        })
    }
}

fn split_csv(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        warn!(%status, error = %self, "request rejected");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "records": state.records.len()
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = query.to_filter()?;
    let hits = filter.apply(&state.records);
    Ok(Json(json!({
        "data": hits,
        "meta": {
            "total": state.records.len(),
            "returned": hits.len(),
            "active_filters": filter.active_filters()
        }
    })))
}

async fn metrics(State(state): State<AppState>) -> Json<Value> {
    let metrics = LogMetrics::compute(&state.records);
    Json(json!({ "data": metrics, "meta": { "total": state.records.len() } }))
}

/// Analyze the posted batch (JSON array or JSON lines), or the loaded batch
/// when the body is empty. Query filters apply before analysis.
async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let filter = query.to_filter()?;

    let posted: Vec<LogRecord>;
    let batch: &[LogRecord] = if body.trim().is_empty() {
        state.records.as_slice()
    } else {
        posted = parse_batch(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        posted.as_slice()
    };

    let selected = filter.apply(batch);
    info!(received = batch.len(), selected = selected.len(), "analysis requested");
    let report = state.engine.analyze(&selected);
    Ok(Json(json!({ "data": report, "meta": { "filtered_out": batch.len() - selected.len() } })))
}

async fn suggestions() -> Json<Value> {
    Json(json!({ "data": SUGGESTIONS, "meta": { "total": SUGGESTIONS.len() } }))
}
