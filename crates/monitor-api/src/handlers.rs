//! Route handler functions for all API endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use monitor_core::types::{ActivityRecord, Intent, RenderedResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "team-activity-monitor";

// =============================================================================
// Request / response types
// =============================================================================

/// Body for POST /api/query.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Trailing window in days; the configured default when absent.
    pub days: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub request_id: Uuid,
    pub query: String,
    pub intent: Intent,
    pub activity: ActivityRecord,
    pub response: RenderedResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatuses {
    pub issue_tracker: String,
    pub source_control: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `healthy` when both providers are reachable, else `degraded`.
    pub status: String,
    pub services: ServiceStatuses,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/health - liveness check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /api/status - provider connectivity.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let report = state.service.check_connections().await;
    let status = if report.is_healthy() {
        "healthy"
    } else {
        "degraded"
    };

    Json(StatusResponse {
        status: status.to_string(),
        services: ServiceStatuses {
            issue_tracker: report.issue_tracker.describe(),
            source_control: report.source_control.describe(),
        },
    })
}

/// POST /api/query - answer a natural-language question.
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let days = match req.days {
        None => state.service.default_days(),
        Some(d) => u32::try_from(d).map_err(|_| {
            ApiError::bad_request(format!(
                "days must be between 1 and {}, got {}",
                state.service.max_days(),
                d
            ))
        })?,
    };

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, days, "Processing query");

    let answer = state.service.answer(&req.query, days).await.map_err(|e| {
        tracing::info!(%request_id, error = %e, "Query rejected");
        ApiError::from(e)
    })?;

    Ok(Json(QueryResponse {
        request_id,
        query: req.query,
        intent: answer.intent,
        activity: answer.record,
        response: answer.response,
    }))
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("The requested endpoint does not exist".to_string())
}
