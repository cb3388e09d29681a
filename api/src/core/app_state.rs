//! Shared state for all HTTP handlers.
//!
//! # Environment variables
//!
//! - `API_ADDRESS`      = listen address (default `127.0.0.1:8080`)
//! - `MAX_UPLOAD_BYTES` = largest accepted decoded upload (default 25 MiB)
//!
//! Completion and web-search variables are read by their own crates.

use std::sync::Arc;

use ai_llm_service::{
    config::{completion_config::CompletionServiceConfig, default_config::config_completion_from_env},
    error_handler::{env_opt, env_opt_u32},
    health_service::HealthService,
    services::open_ai_service::OpenAiService,
};
use research_core::{Conversation, ResearchAssistant};
use tokio::sync::Mutex;
use tracing::info;
use web_augmenter::WebAugmenter;

use crate::error_handler::AppError;

pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Server settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub address: String,
    /// Upper bound for a decoded upload, in bytes.
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// # Errors
    /// [`AppError::Llm`] if `MAX_UPLOAD_BYTES` is not a u32.
    pub fn from_env() -> Result<Self, AppError> {
        let address = env_opt("API_ADDRESS").unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());
        let max_upload_bytes = env_opt_u32("MAX_UPLOAD_BYTES")?
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        Ok(Self {
            address,
            max_upload_bytes,
        })
    }

    /// Request body limit: base64 inflates uploads by 4/3, plus room for the JSON fields.
    pub fn body_limit(&self) -> usize {
        self.max_upload_bytes / 3 * 4 + 64 * 1024
    }
}

/// One running session: the assistant, its conversation and the health probe.
///
/// The conversation lock is held for a whole round, so rounds never interleave.
pub struct AppState {
    pub config: AppConfig,
    pub assistant: ResearchAssistant,
    pub conversation: Mutex<Conversation>,
    pub health: HealthService,
    pub completion_cfg: CompletionServiceConfig,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        assistant: ResearchAssistant,
        health: HealthService,
        completion_cfg: CompletionServiceConfig,
    ) -> Self {
        Self {
            config,
            assistant,
            conversation: Mutex::new(Conversation::new()),
            health,
            completion_cfg,
        }
    }

    /// Builds every client from the environment.
    ///
    /// A missing `OPENAI_API_KEY` is fatal; a missing `TAVILY_API_KEY` only
    /// disables web search.
    ///
    /// # Errors
    /// Any [`AppError`] raised while reading or validating configuration.
    pub fn from_env() -> Result<Self, AppError> {
        let config = AppConfig::from_env()?;
        let completion_cfg = config_completion_from_env()?;
        let completion = OpenAiService::new(completion_cfg.clone())?;
        let web = WebAugmenter::from_env()?;
        let health = HealthService::new(Some(10))?;

        info!(
            address = %config.address,
            max_upload_bytes = config.max_upload_bytes,
            web_search = web.is_available(),
            ?completion_cfg,
            "application state ready"
        );

        Ok(Self::new(
            config,
            ResearchAssistant::new(Arc::new(completion), web),
            health,
            completion_cfg,
        ))
    }
}
