//! GET /settings: what the model selector and sliders may offer.

use std::sync::Arc;

use ai_llm_service::{
    FALLBACK_MODEL, ModelId,
    config::model_catalog::{
        DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, MAX_TOKENS_RANGE, TEMPERATURE_RANGE,
    },
};
use axum::{extract::State, response::Response};
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
    pub default: T,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub models: Vec<ModelId>,
    pub default_model: ModelId,
    pub fallback_model: ModelId,
    pub temperature: Range<f32>,
    pub max_tokens: Range<u32>,
    pub web_search_available: bool,
    /// Applied to `/ask` when `use_web` is omitted.
    pub use_web_default: bool,
    /// Largest accepted decoded upload, in bytes.
    pub max_upload_bytes: usize,
}

/// Handler: GET /settings
pub async fn settings_route(State(state): State<Arc<AppState>>) -> Response {
    ApiResponse::ok(SettingsResponse {
        models: ModelId::ALL.to_vec(),
        default_model: ModelId::default(),
        fallback_model: FALLBACK_MODEL,
        temperature: Range {
            min: TEMPERATURE_RANGE.0,
            max: TEMPERATURE_RANGE.1,
            default: DEFAULT_TEMPERATURE,
        },
        max_tokens: Range {
            min: MAX_TOKENS_RANGE.0,
            max: MAX_TOKENS_RANGE.1,
            default: DEFAULT_MAX_TOKENS,
        },
        web_search_available: state.assistant.web_available(),
        use_web_default: state.assistant.web_available(),
        max_upload_bytes: state.config.max_upload_bytes,
    })
}
