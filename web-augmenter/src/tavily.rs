//! Tavily search client.
//!
//! - POST {endpoint}/search — `{"query": "..."}` with Bearer auth
//!
//! Only `results[].{title, content, url}` is read from the response.

use std::{future::Future, pin::Pin, time::Duration, time::Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{SearchService, errors::WebSearchError};

pub const DEFAULT_TAVILY_BASE: &str = "https://api.tavily.com";

/// Tavily connection settings.
#[derive(Clone)]
pub struct TavilyConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl TavilyConfig {
    /// Reads `TAVILY_API_KEY` / `TAVILY_API_BASE`.
    ///
    /// Returns `None` when no key is configured: web search is then disabled.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("TAVILY_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())?;
        let endpoint = std::env::var("TAVILY_API_BASE")
            .ok()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TAVILY_BASE.to_string());
        Some(Self {
            endpoint,
            api_key,
            timeout_secs: 20,
        })
    }
}

impl std::fmt::Debug for TavilyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Response of the search service. A missing `results` field means "no results".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Option<Vec<SearchResult>>,
}

/// One search hit; absent fields default to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

/// Thin client for the Tavily search API.
#[derive(Debug)]
pub struct TavilyClient {
    client: reqwest::Client,
    url_search: String,
}

impl TavilyClient {
    /// # Errors
    /// - [`WebSearchError::Config`] for a non-http(s) endpoint or an unusable key
    /// - [`WebSearchError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: TavilyConfig) -> Result<Self, WebSearchError> {
        let base = cfg.endpoint.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(WebSearchError::Config(format!(
                "TAVILY_API_BASE must start with http:// or https://, got `{}`",
                cfg.endpoint
            )));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_key))
                .map_err(|e| WebSearchError::Config(format!("invalid API key header: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()?;

        let url_search = format!("{base}/search");
        info!(endpoint = %base, timeout_secs = cfg.timeout_secs, "TavilyClient initialized");

        Ok(Self { client, url_search })
    }

    /// Runs one search.
    ///
    /// # Errors
    /// Transport, non-2xx status, or an undecodable body.
    pub async fn search(&self, query: &str) -> Result<SearchResponse, WebSearchError> {
        let started = Instant::now();
        debug!(query_len = query.len(), "POST {}", self.url_search);

        let resp = self
            .client
            .post(&self.url_search)
            .json(&SearchRequest { query })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(200).collect();
            error!(
                %status,
                url = %self.url_search,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "search returned non-success status"
            );
            return Err(WebSearchError::HttpStatus {
                status,
                url: self.url_search.clone(),
                snippet,
            });
        }

        let bytes = resp.bytes().await?;
        let out = parse_response(&bytes)?;

        info!(
            results = out.results.as_ref().map_or(0, Vec::len),
            latency_ms = started.elapsed().as_millis(),
            "search completed"
        );
        Ok(out)
    }
}

impl SearchService for TavilyClient {
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SearchResponse, WebSearchError>> + Send + 'a>> {
        Box::pin(TavilyClient::search(self, query))
    }
}

/// Decodes a search body; non-object JSON or a mistyped `results` is malformed.
pub fn parse_response(body: &[u8]) -> Result<SearchResponse, WebSearchError> {
    serde_json::from_slice(body).map_err(|e| WebSearchError::Decode(e.to_string()))
}
