//! Prompt builder: fixed system message, optional document and web blocks,
//! then the most recent conversation turns.

use ai_llm_service::ChatMessage;

use crate::conversation::Conversation;

/// System instructions for the research assistant.
pub const SYSTEM_INSTRUCTION: &str = "You are a research assistant. Combine live web data with uploaded documents. \
Provide clear, verified, and structured answers. Cite sources when possible.";

/// Hard prefix cut applied to the document context, in characters.
pub const CONTEXT_MAX_CHARS: usize = 4000;

/// Number of trailing turns replayed to the model.
pub const HISTORY_WINDOW: usize = 4;

pub const CONTEXT_PREFIX: &str = "Context from uploaded text:\n";
pub const WEB_PREFIX: &str = "Relevant live web data:\n";

/// Builds the ordered message list for one completion call.
///
/// Order is fixed:
/// 1. system instruction
/// 2. document context (only if `context` is non-empty), cut to [`CONTEXT_MAX_CHARS`]
/// 3. web snippets (only if `web_block` is non-empty)
/// 4. the last [`HISTORY_WINDOW`] turns, oldest first, verbatim
///
/// # Example
/// ```
/// use research_core::{Conversation, prompt::assemble};
/// let mut conv = Conversation::new();
/// conv.append_user("What is quantum entanglement?");
/// let msgs = assemble("", "", &conv);
/// assert_eq!(msgs.len(), 2);
/// ```
pub fn assemble(context: &str, web_block: &str, conversation: &Conversation) -> Vec<ChatMessage> {
    let window = conversation.recent(HISTORY_WINDOW);
    let mut messages = Vec::with_capacity(3 + window.len());

    messages.push(ChatMessage::system(SYSTEM_INSTRUCTION));

    if !context.is_empty() {
        let mut content = String::from(CONTEXT_PREFIX);
        content.push_str(truncate_chars(context, CONTEXT_MAX_CHARS));
        messages.push(ChatMessage::user(content));
    }

    if !web_block.is_empty() {
        messages.push(ChatMessage::user(format!("{WEB_PREFIX}{web_block}")));
    }

    messages.extend(window.iter().map(|t| t.to_message()));
    messages
}

/// First `max` characters of `s` (Unicode scalar values, not bytes).
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
