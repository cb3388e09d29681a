//! Completion client for the research assistant.
//!
//! - [`config`]: connection settings from env and the fixed model catalog.
//! - [`services::open_ai_service::OpenAiService`]: OpenAI-compatible chat client.
//! - [`completion`]: the [`ChatCompletion`] seam and the single-fallback flow.
//! - [`health_service`]: `/models` probe for readiness reporting.
//! - [`telemetry`]: tracing subscriber layer used by the binary.

pub mod chat_message;
pub mod completion;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod services;
pub mod telemetry;

pub use chat_message::{ChatMessage, ChatRole};
pub use completion::{
    ChatCompletion, CompletionFailure, CompletionReply, EMPTY_REPLY_PLACEHOLDER, FALLBACK_MODEL,
    complete_with_fallback,
};
pub use config::model_catalog::{CompletionParams, ModelId};
pub use error_handler::AiLlmError;
