//! Health probe for the completion service.
//!
//! Probe: `GET {endpoint}/models` with Bearer auth, then a best-effort check
//! that the fallback model is listed.
//!
//! The returned [`HealthStatus`] is JSON-serializable and suitable for a `/health` endpoint.
//! [`HealthService::check`] is resilient and never fails (errors mapped to `ok=false`);
//! the strict probe [`HealthService::try_probe`] returns a `Result`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::completion::FALLBACK_MODEL;
use crate::config::completion_config::CompletionServiceConfig;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// A serializable health snapshot for the completion service.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model whose availability was checked.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    #[inline]
    fn new(endpoint: &str, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: FALLBACK_MODEL.to_string(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(
            default_timeout_secs = timeout.as_secs(),
            "HealthService initialized"
        );

        Ok(Self { client })
    }

    /// Checks the completion service.
    ///
    /// This method never returns an error. Any failure is converted
    /// to `HealthStatus { ok: false, message: ... }`.
    pub async fn check(&self, cfg: &CompletionServiceConfig) -> HealthStatus {
        let endpoint = match probe_base(cfg) {
            Ok(endpoint) => endpoint,
            Err(err) => {
                warn!(endpoint = %cfg.endpoint, "invalid endpoint (empty or missing http/https)");
                return HealthStatus::new(cfg.base_url(), false, 0, err.to_string());
            }
        };

        let start = Instant::now();
        match self.try_probe(cfg).await {
            Ok(status) => {
                info!(
                    endpoint = %status.endpoint,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status =
                    HealthStatus::new(endpoint, false, start.elapsed().as_millis(), err.to_string());
                warn!(
                    endpoint = %status.endpoint,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Strict probe. Returns an error on hard failures.
    ///
    /// - `GET {endpoint}/models` with `Authorization: Bearer <api_key>`
    /// - Ensure 2xx
    /// - Best-effort: verify the fallback model exists in the returned list
    pub async fn try_probe(&self, cfg: &CompletionServiceConfig) -> Result<HealthStatus, AiLlmError> {
        let endpoint = probe_base(cfg)?;
        let url = format!("{endpoint}/models");

        let auth_header = header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_key.trim()))
            .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")))?;

        let start = Instant::now();
        debug!(endpoint = %cfg.endpoint, "GET {}", url);

        let resp = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, auth_header)
            .send()
            .await?;

        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %url,
                %status,
                %snippet,
                latency_ms = latency,
                "health GET /models returned non-success status"
            );

            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })
            .into());
        }

        // Expected minimal JSON: { "data": [ { "id": "<model>" }, ... ] }
        #[derive(serde::Deserialize)]
        struct ModelItem {
            id: String,
        }
        #[derive(serde::Deserialize)]
        struct Models {
            data: Vec<ModelItem>,
        }

        match resp.json::<Models>().await {
            Ok(models) => {
                let wanted = FALLBACK_MODEL.as_str();
                // OpenRouter lists OpenAI models with an `openai/` prefix.
                let exists = models
                    .data
                    .iter()
                    .any(|m| m.id == wanted || m.id.rsplit('/').next() == Some(wanted));
                if exists {
                    Ok(HealthStatus::new(
                        endpoint,
                        true,
                        latency,
                        "completion service is healthy; fallback model is available",
                    ))
                } else {
                    Ok(HealthStatus::new(
                        endpoint,
                        false,
                        latency,
                        "completion service is up, but fallback model not found in /models",
                    ))
                }
            }
            Err(e) => {
                warn!(
                    endpoint = %cfg.endpoint,
                    error = %e,
                    latency_ms = latency,
                    "failed to decode /models; treating server as reachable"
                );
                Ok(HealthStatus::new(
                    endpoint,
                    true,
                    latency,
                    format!("completion service is reachable; failed to decode /models: {e}"),
                ))
            }
        }
    }
}

/// Base URL to probe; must be non-empty http(s).
fn probe_base(cfg: &CompletionServiceConfig) -> Result<&str, HealthError> {
    let endpoint = cfg.base_url();
    if endpoint.is_empty()
        || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        return Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()));
    }
    Ok(endpoint)
}
