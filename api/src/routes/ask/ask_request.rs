use research_core::{Conversation, RoundOutcome, StatusMessage};
use serde::{Deserialize, Serialize};

/// Request payload for POST /ask.
///
/// Omitted generation settings fall back to the catalog defaults.
#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    /// Question text; blank input is rejected with `EMPTY_QUESTION`.
    #[serde(default)]
    pub question: String,
    /// One of the catalog ids; parsed by the handler so unknown ids are a 400.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Live web search for this question; omitted means "on when configured".
    #[serde(default)]
    pub use_web: Option<bool>,
    /// Raw context; ignored when `upload` is present.
    #[serde(default)]
    pub pasted_text: Option<String>,
    #[serde(default)]
    pub upload: Option<UploadPayload>,
}

/// Document sent inline as base64.
#[derive(Debug, Deserialize)]
pub struct UploadPayload {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    pub data_base64: String,
}

/// Response payload for POST /ask.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    #[serde(flatten)]
    pub outcome: RoundOutcome,
    /// Whole conversation after the round, oldest turn first.
    pub conversation: Conversation,
}

impl AskResponse {
    pub fn new(mut outcome: RoundOutcome, mut leading: Vec<StatusMessage>, conversation: Conversation) -> Self {
        leading.append(&mut outcome.statuses);
        outcome.statuses = leading;
        Self {
            outcome,
            conversation,
        }
    }
}
