//! GET /history and GET /history/export.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use research_core::{Conversation, render_markdown, safe_filename};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub turns: usize,
    pub conversation: Conversation,
}

/// Handler: GET /history
pub async fn history_route(State(state): State<Arc<AppState>>) -> Response {
    let conversation = state.conversation.lock().await.clone();
    debug!(turns = conversation.len(), "history requested");
    ApiResponse::ok(HistoryResponse {
        turns: conversation.len(),
        conversation,
    })
}

/// Handler: GET /history/export
///
/// Markdown attachment named `session_<unix-secs>.md`.
pub async fn export_history_route(State(state): State<Arc<AppState>>) -> Response {
    let conversation = state.conversation.lock().await;
    let markdown = render_markdown(&conversation);
    drop(conversation);
    let file_name = format!("{}.md", safe_filename("session"));
    info!(%file_name, bytes = markdown.len(), "conversation exported");

    let mut res = (StatusCode::OK, markdown).into_response();
    let headers = res.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/markdown; charset=utf-8"),
    );
    // safe_filename only yields [A-Za-z0-9_-], always a valid header value.
    if let Ok(v) = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, v);
    }
    res
}
