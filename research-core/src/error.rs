//! Typed error for one submit round.

use ai_llm_service::CompletionFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoundError {
    /// No question text was submitted; nothing was mutated.
    #[error("please enter a prompt")]
    EmptyQuestion,

    /// Primary and fallback completion both failed. The user turn is kept.
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionFailure),
}
