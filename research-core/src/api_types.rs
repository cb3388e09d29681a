//! Public round types re-used by the HTTP layer.

use ai_llm_service::{CompletionParams, ModelId};
use context_extractor::Upload;
use serde::Serialize;

/// Everything the user submitted for one round.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    /// Question text, stored verbatim as the user turn.
    pub question: String,
    pub params: CompletionParams,
    /// Whether live web search was requested.
    pub use_web: bool,
    /// Uploaded document; wins over `pasted`.
    pub upload: Option<Upload>,
    pub pasted: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Warning,
}

/// A line shown next to the answer (degraded paths, fallback notices).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            text: text.into(),
        }
    }
}

/// Result of a successful round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundOutcome {
    /// Assistant reply as stored in the conversation.
    pub reply: String,
    /// Model that produced the reply.
    pub model: ModelId,
    pub fell_back: bool,
    /// Characters of document context extracted (before the 4000-char cut).
    pub context_chars: usize,
    /// Web hits rendered into the prompt.
    pub web_results: usize,
    pub statuses: Vec<StatusMessage>,
}
