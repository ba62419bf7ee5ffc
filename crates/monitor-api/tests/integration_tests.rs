//! Integration tests for the monitor API.
//!
//! Each test builds its own router over static providers and drives it
//! with `oneshot`, so no network access is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use monitor_api::create_router;
use monitor_api::error::ErrorBody;
use monitor_api::handlers::{HealthResponse, QueryResponse, StatusResponse};
use monitor_api::state::AppState;
use monitor_chat::ActivityService;
use monitor_core::config::MonitorConfig;
use monitor_core::types::{DataSource, Issue, QueryCategory};
use monitor_providers::testing::{StaticIssueTracker, StaticSourceControl};
use monitor_providers::ProviderError;

// =============================================================================
// Helpers
// =============================================================================

fn login_bug() -> Issue {
    Issue {
        id: "PROJ-1".to_string(),
        title: "Fix login bug".to_string(),
        status: "In Progress".to_string(),
        updated_at: "2024-05-01T10:00:00.000+0000".to_string(),
        url: "https://jira.example.com/browse/PROJ-1".to_string(),
    }
}

fn make_state_with(
    config: MonitorConfig,
    tracker: StaticIssueTracker,
    scm: StaticSourceControl,
) -> AppState {
    let service = ActivityService::from_config(&config.query, Arc::new(tracker), Arc::new(scm));
    AppState::new(config, service)
}

fn make_app_with(tracker: StaticIssueTracker, scm: StaticSourceControl) -> axum::Router {
    create_router(make_state_with(MonitorConfig::default(), tracker, scm))
}

fn make_app() -> axum::Router {
    make_app_with(
        StaticIssueTracker::with_issues(vec![login_bug()]),
        StaticSourceControl::empty(),
    )
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

/// Read full response body bytes.
async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn error_body(resp: axum::response::Response) -> ErrorBody {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

// =============================================================================
// Health and status
// =============================================================================

#[tokio::test]
async fn test_health() {
    let resp = make_app()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "team-activity-monitor");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_status_healthy() {
    let resp = make_app()
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let status: StatusResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(status.status, "healthy");
    assert_eq!(status.services.issue_tracker, "connected");
    assert_eq!(status.services.source_control, "connected");
}

#[tokio::test]
async fn test_status_degraded() {
    let app = make_app_with(
        StaticIssueTracker::failing(ProviderError::Auth("HTTP 401: nope".into())),
        StaticSourceControl::empty(),
    );
    let resp = app
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status: StatusResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(status.status, "degraded");
    assert_eq!(status.services.issue_tracker, "error: authentication failed");
    assert_eq!(status.services.source_control, "connected");
}

// =============================================================================
// Query
// =============================================================================

#[tokio::test]
async fn test_query_happy_path() {
    let resp = make_app()
        .oneshot(post_json(
            "/api/query",
            r#"{"query": "What is John working on?", "days": 7}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: QueryResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.query, "What is John working on?");
    assert_eq!(body.intent.target_person.as_deref(), Some("John"));
    assert_eq!(body.intent.category, QueryCategory::All);
    assert!(body.activity.has_activity);
    assert!(body.activity.errors.is_empty());
    assert_eq!(body.activity.issues[0].title, "Fix login bug");
    assert!(body.response.narrative.contains("Fix login bug"));
    assert!(body.response.narrative.contains("In Progress"));
}

#[tokio::test]
async fn test_query_json_shape() {
    let resp = make_app()
        .oneshot(post_json("/api/query", r#"{"query": "Show me John's tickets"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let v: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(v["request_id"].is_string());
    assert_eq!(v["intent"]["category"], "ISSUES");
    assert_eq!(v["activity"]["username"], "John");
    assert!(v["activity"]["errors"].is_array());
    assert!(v["response"]["summary"].is_string());
    assert!(v["response"]["narrative"].is_string());
}

#[tokio::test]
async fn test_query_partial_failure_surfaces_errors() {
    let app = make_app_with(
        StaticIssueTracker::with_issues(vec![login_bug()]),
        StaticSourceControl::failing(ProviderError::Timeout("deadline".into())),
    );
    let resp = app
        .oneshot(post_json("/api/query", r#"{"query": "What is John working on?"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: QueryResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.activity.errors.len(), 1);
    assert_eq!(body.activity.errors[0].source, DataSource::SourceControl);
    assert_eq!(body.activity.errors[0].message, "request timed out");
    assert!(body.response.narrative.contains("may be incomplete"));
}

#[tokio::test]
async fn test_query_no_person_suggests_phrasing() {
    let resp = make_app()
        .oneshot(post_json("/api/query", r#"{"query": "What is happening?"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let err = error_body(resp).await;
    assert_eq!(err.error, "bad_request");
    let details = err.details.unwrap();
    assert_eq!(details["suggestion"], "Try asking 'What is [Name] working on?'");
}

#[tokio::test]
async fn test_query_empty_rejected() {
    let resp = make_app()
        .oneshot(post_json("/api/query", r#"{"query": "   "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_body(resp).await.message, "query cannot be empty");
}

#[tokio::test]
async fn test_query_missing_field_rejected() {
    let resp = make_app()
        .oneshot(post_json("/api/query", r#"{"days": 7}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_body(resp).await.error, "bad_request");
}

#[tokio::test]
async fn test_query_malformed_json_rejected() {
    let resp = make_app()
        .oneshot(post_json("/api/query", "{not json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_query_days_out_of_range() {
    for days in ["0", "366", "-3"] {
        let resp = make_app()
            .oneshot(post_json(
                "/api/query",
                &format!(r#"{{"query": "What is John working on?", "days": {}}}"#, days),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "days = {}", days);
    }
}

#[tokio::test]
async fn test_query_roster_miss_is_not_found() {
    let mut config = MonitorConfig::default();
    config.query.roster = vec!["John".to_string()];
    let app = create_router(make_state_with(
        config,
        StaticIssueTracker::empty(),
        StaticSourceControl::empty(),
    ));

    let resp = app
        .oneshot(post_json("/api/query", r#"{"query": "What is Zed working on?"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_body(resp).await.error, "not_found");
}

#[tokio::test]
async fn test_query_get_not_allowed() {
    let resp = make_app()
        .oneshot(Request::get("/api/query").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Fallback
// =============================================================================

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let resp = make_app()
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let err = error_body(resp).await;
    assert_eq!(err.error, "not_found");
    assert_eq!(err.message, "The requested endpoint does not exist");
}
