use ai_llm_service::AiLlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use research_core::RoundError;
use thiserror::Error;
use web_augmenter::WebSearchError;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    WebSearch(#[from] WebSearchError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("{message}")]
    BadRequest {
        message: String,
        details: Vec<ApiErrorDetail>,
    },

    #[error("upload is {size} bytes, limit is {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Round(#[from] RoundError),
}

impl AppError {
    /// Bad request pointing at one request field.
    pub fn bad_field(path: &str, message: impl Into<String>, hint: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            details: vec![ApiErrorDetail {
                path: Some(path.to_string()),
                hint: Some(hint.into()),
            }],
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Round(RoundError::EmptyQuestion) => StatusCode::BAD_REQUEST,

            // upstream
            AppError::Round(RoundError::Completion(_)) => StatusCode::BAD_GATEWAY,

            // 5xx (startup-only in practice)
            AppError::Llm(_)
            | AppError::WebSearch(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Llm(_) => "LLM_CONFIG_ERROR",
            AppError::WebSearch(_) => "WEB_SEARCH_CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest { .. } => "BAD_REQUEST",
            AppError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            AppError::Round(RoundError::EmptyQuestion) => "EMPTY_QUESTION",
            AppError::Round(RoundError::Completion(_)) => "COMPLETION_FAILED",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();
        let details = match self {
            AppError::BadRequest { details, .. } => details,
            _ => Vec::new(),
        };
        ApiResponse::<()>::error(code, message, details).into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
