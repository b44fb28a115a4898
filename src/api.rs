//! REST API for the finance tracker
//!
//! Exposes the pipeline plus the two fixed dashboard views over HTTP.
//! The presentation layer polls these endpoints on its own cadence.

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::executor::{SqlExecutor, DEFAULT_RECENT_LIMIT};
use crate::formatter;
use crate::models::{QueryRequest, QueryResponse};
use crate::pipeline::{Pipeline, PipelineOutcome};

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<Pipeline>,
    pub executor: SqlExecutor,
}

/// =============================
/// View Response Wrapper
/// =============================

#[derive(Debug, serde::Serialize)]
pub struct ViewResponse<T> {
    pub status: &'static str,
    pub data: Vec<T>,
}

impl<T> ViewResponse<T> {
    fn success(data: Vec<T>) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "Finance Tracker API",
    }))
}

/// =============================
/// Main Query Endpoint
/// =============================

async fn process_query(
    State(state): State<ApiState>,
    Json(req): Json<QueryRequest>,
) -> (StatusCode, Json<QueryResponse>) {
    let outcome = state.pipeline.run(&req.question).await;

    // Generation-unavailable is a service signal, distinct from a decline.
    let status = match outcome {
        PipelineOutcome::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (status, Json(formatter::format_response(&outcome)))
}

/// =============================
/// Fixed Read Views
/// =============================

async fn get_analytics(
    State(state): State<ApiState>,
) -> Result<Json<ViewResponse<crate::models::CategoryTotal>>, StatusCode> {
    match state.executor.category_totals().await {
        Ok(rows) => Ok(Json(ViewResponse::success(rows))),
        Err(e) => {
            error!("Analytics view failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn get_recent(
    State(state): State<ApiState>,
) -> Result<Json<ViewResponse<crate::models::RecentTransaction>>, StatusCode> {
    match state.executor.recent(DEFAULT_RECENT_LIMIT).await {
        Ok(rows) => Ok(Json(ViewResponse::success(rows))),
        Err(e) => {
            error!("Recent view failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(pipeline: Arc<Pipeline>, executor: SqlExecutor) -> Router {
    let state = ApiState { pipeline, executor };

    Router::new()
        .route("/health", get(health))
        .route("/query", post(process_query))
        .route("/analytics", get(get_analytics))
        .route("/recent", get(get_recent))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    pipeline: Arc<Pipeline>,
    executor: SqlExecutor,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(pipeline, executor);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
