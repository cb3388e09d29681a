//! OpenAI-compatible chat completion service.
//!
//! Minimal, non-streaming client around the chat completions REST API.
//! The endpoint is derived from [`CompletionServiceConfig::endpoint`], which
//! already carries the version segment (OpenRouter style):
//! - POST {endpoint}/chat/completions — chat completion (non-streaming)
//!
//! Constructor validation:
//! - `cfg.api_key` must be non-empty
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Errors are normalized via unified error types in `error_handler`.

use std::{
    future::Future,
    pin::Pin,
    time::{Duration, Instant},
};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    chat_message::ChatMessage,
    completion::ChatCompletion,
    config::{completion_config::CompletionServiceConfig, model_catalog::CompletionParams},
    error_handler::{AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet},
};

/// Thin client for an OpenAI-compatible API.
///
/// Constructed once at startup from a [`CompletionServiceConfig`] and shared
/// behind an `Arc`. Internally keeps a preconfigured `reqwest::Client`
/// (timeout and default headers).
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    url_chat: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `MissingApiKey` if `cfg.api_key` is empty
    /// - [`AiLlmError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: CompletionServiceConfig) -> Result<Self, AiLlmError> {
        // 1) API key must be present.
        if cfg.api_key.trim().is_empty() {
            return Err(
                ProviderError::new(Provider::OpenAI, ProviderErrorKind::MissingApiKey).into(),
            );
        }

        // 2) Endpoint must use http/https.
        let endpoint = cfg.base_url();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        // 3) HTTP client: timeout + default headers.
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_key.trim())).map_err(
                |e| {
                    ProviderError::new(
                        Provider::OpenAI,
                        ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                    )
                },
            )?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_chat = format!("{}/chat/completions", endpoint);

        info!(
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "OpenAiService initialized"
        );

        Ok(Self { client, url_chat })
    }

    /// Performs a **non-streaming** chat completion request.
    ///
    /// Sends `model`, `messages`, `temperature` and `max_tokens`; returns the
    /// content of the first choice (`None` if the service returned `null`).
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`AiLlmError::Provider`] with `Decode` if the JSON cannot be parsed
    /// - [`AiLlmError::Provider`] with `EmptyChoices` if no choices are returned
    pub async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<Option<String>, AiLlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::new(messages, params);

        debug!(
            model = %params.model,
            messages = messages.len(),
            temperature = params.temperature,
            max_tokens = params.max_tokens,
            "POST {}", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %params.model,
                latency_ms = started.elapsed().as_millis(),
                "chat completions returned non-success status"
            );

            return Err(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url,
                    snippet,
                }),
            )
            .into());
        }

        let out: ChatCompletionResponse = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    model = %params.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode chat completions response"
                );
                return Err(ProviderError::new(
                    Provider::OpenAI,
                    ProviderErrorKind::Decode(format!(
                        "serde error: {e}; expected `choices[0].message.content`"
                    )),
                )
                .into());
            }
        };

        let content = first_choice_content(out)?;

        info!(
            model = %params.model,
            latency_ms = started.elapsed().as_millis(),
            empty = content.as_deref().is_none_or(str::is_empty),
            "chat completion completed"
        );

        Ok(content)
    }
}

impl ChatCompletion for OpenAiService {
    fn complete<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        params: &'a CompletionParams,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, AiLlmError>> + Send + 'a>> {
        Box::pin(self.generate(messages, params))
    }
}

/// Picks the primary choice; a response without choices is an error.
fn first_choice_content(out: ChatCompletionResponse) -> Result<Option<String>, AiLlmError> {
    out.choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices).into())
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'static str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(messages: &'a [ChatMessage], params: &CompletionParams) -> Self {
        Self {
            model: params.model.as_str(),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }
}

/// Minimal response for `/chat/completions`.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model_catalog::ModelId;

    fn cfg(endpoint: &str, key: &str) -> CompletionServiceConfig {
        CompletionServiceConfig {
            endpoint: endpoint.into(),
            api_key: key.into(),
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn rejects_missing_key_and_bad_endpoint() {
        assert!(OpenAiService::new(cfg("https://openrouter.ai/api/v1", " ")).is_err());
        assert!(OpenAiService::new(cfg("openrouter.ai/api/v1", "sk-test")).is_err());
    }

    #[test]
    fn chat_url_is_built_from_base() {
        let svc = OpenAiService::new(cfg("https://openrouter.ai/api/v1/", "sk-test")).unwrap();
        assert_eq!(svc.url_chat, "https://openrouter.ai/api/v1/chat/completions");
    }

    #[test]
    fn request_body_carries_all_parameters() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("q")];
        let params = CompletionParams::new(ModelId::DeepseekChat, 0.5, 256).unwrap();
        let json = serde_json::to_value(ChatCompletionRequest::new(&messages, &params)).unwrap();
        assert_eq!(json["model"], "deepseek/deepseek-chat-v3-0324:free");
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["max_tokens"], 256);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "q");
    }

    #[test]
    fn primary_choice_content_is_extracted() {
        let out: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"one"}},
                           {"message":{"role":"assistant","content":"two"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_content(out).unwrap().as_deref(), Some("one"));

        let null: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(first_choice_content(null).unwrap(), None);

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(first_choice_content(empty).is_err());
    }
}
