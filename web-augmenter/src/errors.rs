//! Error type for the web search leg.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebSearchError {
    /// Configuration problems (bad base URL, unusable key).
    #[error("config error: {0}")]
    Config(String),

    /// Transport/HTTP client error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-successful HTTP status from the search service.
    #[error("HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Body was not the JSON shape we expect.
    #[error("malformed search response: {0}")]
    Decode(String),
}
