//! Default completion-service config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `OPENAI_API_KEY`   = API key (mandatory; its absence is fatal at startup)
//! - `OPENAI_API_BASE`  = OpenAI-compatible base URL (default: OpenRouter)
//! - `LLM_TIMEOUT_SECS` = optional request timeout (u32, default 60)

use crate::{
    config::completion_config::CompletionServiceConfig,
    error_handler::{AiLlmError, env_opt, env_opt_u32, must_env, validate_http_endpoint},
};

/// Base URL used when `OPENAI_API_BASE` is not set.
pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Request timeout used when `LLM_TIMEOUT_SECS` is not set.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Constructs the completion-service config from the environment.
///
/// # Errors
///
/// - [`ConfigError::MissingVar`](crate::error_handler::ConfigError::MissingVar) if `OPENAI_API_KEY` is absent
/// - [`ConfigError::InvalidFormat`](crate::error_handler::ConfigError::InvalidFormat) if `OPENAI_API_BASE` is not http(s)
/// - [`ConfigError::InvalidNumber`](crate::error_handler::ConfigError::InvalidNumber) if `LLM_TIMEOUT_SECS` is not a u32
pub fn config_completion_from_env() -> Result<CompletionServiceConfig, AiLlmError> {
    let api_key = must_env("OPENAI_API_KEY")?;
    let endpoint = env_opt("OPENAI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    validate_http_endpoint("OPENAI_API_BASE", &endpoint)?;
    let timeout_secs = env_opt_u32("LLM_TIMEOUT_SECS")?
        .map(u64::from)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(CompletionServiceConfig {
        endpoint,
        api_key,
        timeout_secs: Some(timeout_secs),
    })
}
