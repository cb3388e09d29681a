/// Connection settings for an OpenAI-compatible chat completion service.
///
/// Per-request knobs (model, temperature, max tokens) live in
/// [`CompletionParams`](crate::config::model_catalog::CompletionParams);
/// this struct only describes *where* and *how* to connect.
///
/// # Fields
///
/// - `endpoint`: Base URL including the API version, e.g. `https://openrouter.ai/api/v1`.
/// - `api_key`: Bearer token sent with every request.
/// - `timeout_secs`: Optional request timeout in seconds.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::completion_config::CompletionServiceConfig;
///
/// let cfg = CompletionServiceConfig {
///     endpoint: "https://openrouter.ai/api/v1".to_string(),
///     api_key: "sk-...".to_string(),
///     timeout_secs: Some(60),
/// };
/// assert!(cfg.endpoint.starts_with("https://"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CompletionServiceConfig {
    /// Base endpoint (OpenAI-compatible, version segment included).
    pub endpoint: String,

    /// API key for bearer authentication.
    pub api_key: String,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl CompletionServiceConfig {
    /// Endpoint without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for CompletionServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionServiceConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
