//! Completion seam and the single-fallback completion flow.
//!
//! [`ChatCompletion`] is the provider interface; [`OpenAiService`] is the
//! production implementation and tests plug in fakes. [`complete_with_fallback`]
//! performs the primary call and, if it fails, exactly one more call against
//! [`FALLBACK_MODEL`] with the same messages and sampling knobs.
//!
//! [`OpenAiService`]: crate::services::open_ai_service::OpenAiService

use std::{future::Future, pin::Pin};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    chat_message::ChatMessage,
    config::model_catalog::{CompletionParams, ModelId},
    error_handler::AiLlmError,
};

/// Model used for the one fallback attempt.
pub const FALLBACK_MODEL: ModelId = ModelId::Gpt4o;

/// Stored instead of an empty or missing reply.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "No response generated.";

/// Provider interface for chat completion.
///
/// `Ok(None)` means the service answered but the primary choice carried no
/// content; transport/status/decoding problems are `Err`.
pub trait ChatCompletion: Send + Sync {
    fn complete<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        params: &'a CompletionParams,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, AiLlmError>> + Send + 'a>>;
}

/// Reply obtained from either the primary or the fallback model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReply {
    /// Reply text, never empty.
    pub text: String,
    /// Model that produced `text`.
    pub model: ModelId,
    /// `true` when the primary call failed and the fallback answered.
    pub fell_back: bool,
    /// Error message of the failed primary call, if any.
    pub primary_error: Option<String>,
}

/// Both the primary and the fallback call failed.
#[derive(Debug, Error)]
#[error("{primary_model} failed ({primary}); fallback {fallback_model} failed ({fallback})")]
pub struct CompletionFailure {
    pub primary_model: ModelId,
    pub primary: AiLlmError,
    pub fallback_model: ModelId,
    pub fallback: AiLlmError,
}

/// Runs the primary completion and, on error, one fallback completion.
///
/// Empty or missing content is replaced by [`EMPTY_REPLY_PLACEHOLDER`].
///
/// # Errors
/// [`CompletionFailure`] when the fallback call fails as well.
pub async fn complete_with_fallback(
    client: &dyn ChatCompletion,
    messages: &[ChatMessage],
    params: &CompletionParams,
) -> Result<CompletionReply, CompletionFailure> {
    let primary = match client.complete(messages, params).await {
        Ok(text) => {
            return Ok(CompletionReply {
                text: reply_or_placeholder(text),
                model: params.model,
                fell_back: false,
                primary_error: None,
            });
        }
        Err(e) => e,
    };

    warn!(
        model = %params.model,
        fallback = %FALLBACK_MODEL,
        error = %primary,
        "primary completion failed; retrying with fallback model"
    );

    let fallback_params = params.with_model(FALLBACK_MODEL);
    match client.complete(messages, &fallback_params).await {
        Ok(text) => {
            info!(model = %FALLBACK_MODEL, "fallback completion succeeded");
            Ok(CompletionReply {
                text: reply_or_placeholder(text),
                model: FALLBACK_MODEL,
                fell_back: true,
                primary_error: Some(primary.to_string()),
            })
        }
        Err(fallback) => Err(CompletionFailure {
            primary_model: params.model,
            primary,
            fallback_model: FALLBACK_MODEL,
            fallback,
        }),
    }
}

fn reply_or_placeholder(text: Option<String>) -> String {
    match text {
        Some(t) if !t.is_empty() => t,
        _ => EMPTY_REPLY_PLACEHOLDER.to_string(),
    }
}
