//! Live web augmentation.
//!
//! Public API: [`WebAugmenter::augment`]. It runs one search for the user's
//! question and renders the first hits into a cited bullet list. Failures
//! never propagate: they turn into a single diagnostic line.

pub mod errors;
pub mod snippet;
pub mod tavily;

use std::{future::Future, pin::Pin, sync::Arc};

use tracing::{debug, warn};

pub use errors::WebSearchError;
pub use tavily::{SearchResponse, SearchResult, TavilyClient, TavilyConfig};

/// Provider interface for web search.
///
/// Implement this trait to plug in another search backend or a test fake.
pub trait SearchService: Send + Sync {
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SearchResponse, WebSearchError>> + Send + 'a>>;
}

/// Snippet block for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebBlock {
    /// Rendered block; empty when search was skipped or found nothing.
    pub text: String,
    /// Number of hits rendered.
    pub results: usize,
    /// Error message when the search failed.
    pub failure: Option<String>,
}

/// Optional search client plus the rendering rules.
#[derive(Clone, Default)]
pub struct WebAugmenter {
    search: Option<Arc<dyn SearchService>>,
}

impl WebAugmenter {
    pub fn new(search: Arc<dyn SearchService>) -> Self {
        Self {
            search: Some(search),
        }
    }

    /// No search client configured: every request gets an empty block.
    pub fn disabled() -> Self {
        Self { search: None }
    }

    /// Builds the augmenter from env; a missing key disables search.
    ///
    /// # Errors
    /// [`WebSearchError`] when a key is present but the client cannot be built.
    pub fn from_env() -> Result<Self, WebSearchError> {
        match TavilyConfig::from_env() {
            Some(cfg) => Ok(Self::new(Arc::new(TavilyClient::new(cfg)?))),
            None => {
                warn!("TAVILY_API_KEY not set; live web search disabled");
                Ok(Self::disabled())
            }
        }
    }

    /// Whether a search client is configured.
    pub fn is_available(&self) -> bool {
        self.search.is_some()
    }

    /// Searches `query` and renders the snippet block.
    ///
    /// Returns an empty block when `enabled` is false or no client is
    /// configured. A failed search yields `(Web search failed: {error})`.
    pub async fn augment(&self, query: &str, enabled: bool) -> WebBlock {
        let Some(search) = self.search.as_ref().filter(|_| enabled) else {
            debug!(enabled, available = self.is_available(), "web search skipped");
            return WebBlock::default();
        };

        match search.search(query).await {
            Ok(resp) => {
                let hits = resp.results.unwrap_or_default();
                let text = snippet::format_block(&hits);
                WebBlock {
                    results: hits.len().min(snippet::MAX_RESULTS),
                    text,
                    failure: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "web search failed; continuing without live data");
                WebBlock {
                    text: format!("(Web search failed: {e})"),
                    results: 0,
                    failure: Some(e.to_string()),
                }
            }
        }
    }
}
