//! Fixed model catalog and per-request sampling parameters.
//!
//! Only the four identifiers in [`ModelId::ALL`] are accepted; everything
//! else is rejected with [`ConfigError::UnsupportedModel`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error_handler::{AiLlmError, ConfigError, validate_range_f32, validate_range_u32};

/// Inclusive temperature bounds accepted by the settings panel.
pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 1.5);
/// Inclusive max-token bounds accepted by the settings panel.
pub const MAX_TOKENS_RANGE: (u32, u32) = (64, 4096);

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Selectable chat models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "mistralai/mistral-small-3.1-24b-instruct:free")]
    MistralSmall,
    #[serde(rename = "meta-llama/llama-4-maverick:free")]
    LlamaMaverick,
    #[serde(rename = "deepseek/deepseek-chat-v3-0324:free")]
    DeepseekChat,
}

impl ModelId {
    /// Catalog order, as shown in the model selector.
    pub const ALL: [ModelId; 4] = [
        ModelId::Gpt4o,
        ModelId::MistralSmall,
        ModelId::LlamaMaverick,
        ModelId::DeepseekChat,
    ];

    /// Wire identifier sent to the completion service.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::Gpt4o => "gpt-4o",
            ModelId::MistralSmall => "mistralai/mistral-small-3.1-24b-instruct:free",
            ModelId::LlamaMaverick => "meta-llama/llama-4-maverick:free",
            ModelId::DeepseekChat => "deepseek/deepseek-chat-v3-0324:free",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = AiLlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ModelId::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedModel(s.to_string()).into())
    }
}

/// Parameters chosen once per request from the settings panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletionParams {
    pub model: ModelId,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionParams {
    /// Builds validated parameters.
    ///
    /// # Errors
    /// [`ConfigError::OutOfRange`] when `temperature` or `max_tokens` fall
    /// outside [`TEMPERATURE_RANGE`] / [`MAX_TOKENS_RANGE`].
    pub fn new(model: ModelId, temperature: f32, max_tokens: u32) -> Result<Self, AiLlmError> {
        validate_range_f32(
            "temperature",
            temperature,
            TEMPERATURE_RANGE.0,
            TEMPERATURE_RANGE.1,
        )?;
        validate_range_u32(
            "max_tokens",
            max_tokens,
            MAX_TOKENS_RANGE.0,
            MAX_TOKENS_RANGE.1,
        )?;
        Ok(Self {
            model,
            temperature,
            max_tokens,
        })
    }

    /// Same sampling knobs, different model.
    pub fn with_model(self, model: ModelId) -> Self {
        Self { model, ..self }
    }
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            model: ModelId::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}
