//! GET /health: completion-service probe plus web search availability.

use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;
use tracing::instrument;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub completion: HealthStatus,
    pub web_search_available: bool,
}

/// Handler: GET /health
///
/// `200` when the completion service answered, `503` otherwise.
#[instrument(name = "health_route", skip_all)]
pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let completion = state.health.check(&state.completion_cfg).await;
    let status = if completion.ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    ApiResponse::success(HealthResponse {
        completion,
        web_search_available: state.assistant.web_available(),
    })
    .into_response_with_status(status)
}
