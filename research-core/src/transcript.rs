//! Markdown export of the conversation and a filesystem-safe export name.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use crate::conversation::{Conversation, TurnRole};

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("Invalid filename regex"));

/// Renders the whole conversation, oldest turn first, blank line between turns.
pub fn render_markdown(conversation: &Conversation) -> String {
    conversation
        .turns()
        .iter()
        .map(|t| {
            let who = match t.role() {
                TurnRole::User => "**🧑 You:**",
                TurnRole::Assistant => "**🤖 Assistant:**",
            };
            format!("{who} {}", t.content())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `{prefix}_{unix_seconds}` for the current time, with every character
/// outside `[A-Za-z0-9_-]` replaced by `_`. No extension is added.
pub fn safe_filename(prefix: &str) -> String {
    safe_filename_at(prefix, Utc::now().timestamp())
}

/// Same as [`safe_filename`] with an explicit timestamp.
pub fn safe_filename_at(prefix: &str, unix_secs: i64) -> String {
    UNSAFE_CHARS
        .replace_all(&format!("{prefix}_{unix_secs}"), "_")
        .into_owned()
}
