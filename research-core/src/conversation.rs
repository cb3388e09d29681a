//! Append-only conversation log owned by one running session.

use ai_llm_service::{ChatMessage, ChatRole};
use serde::Serialize;

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl From<TurnRole> for ChatRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => ChatRole::User,
            TurnRole::Assistant => ChatRole::Assistant,
        }
    }
}

/// One immutable `{role, content}` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    role: TurnRole,
    content: String,
}

impl Turn {
    pub fn role(&self) -> TurnRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::new(self.role.into(), self.content.clone())
    }
}

/// Chronological, append-only sequence of turns.
///
/// Only two mutations exist: [`append_user`](Self::append_user) and
/// [`append_assistant`](Self::append_assistant). Nothing is ever removed
/// or reordered.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, content: impl Into<String>) {
        self.push(TurnRole::User, content.into());
    }

    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.push(TurnRole::Assistant, content.into());
    }

    fn push(&mut self, role: TurnRole, content: String) {
        self.turns.push(Turn { role, content });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The last `n` turns (fewer if the log is shorter), oldest first.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_keep_chronological_order() {
        let mut c = Conversation::new();
        c.append_user("q1");
        c.append_assistant("a1");
        c.append_user("q2");
        let roles: Vec<_> = c.turns().iter().map(Turn::role).collect();
        assert_eq!(roles, [TurnRole::User, TurnRole::Assistant, TurnRole::User]);
        assert_eq!(c.last().unwrap().content(), "q2");
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut c = Conversation::new();
        for i in 0..7 {
            c.append_user(format!("t{i}"));
        }
        let tail: Vec<_> = c.recent(4).iter().map(Turn::content).collect();
        assert_eq!(tail, ["t3", "t4", "t5", "t6"]);
        assert_eq!(c.recent(10).len(), 7);
        assert!(Conversation::new().recent(4).is_empty());
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut c = Conversation::new();
        c.append_user("hi");
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"[{"role":"user","content":"hi"}]"#);
    }
}
