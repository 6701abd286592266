//! Chat message types.

use super::{nodes_plain_text, ContentNode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side of the conversation
    User,
    /// The model side of the conversation
    Assistant,
}

impl Role {
    /// The other role.
    pub fn flipped(self) -> Self {
        match self {
            Role::User => Role::Assistant,
            Role::Assistant => Role::User,
        }
    }

    /// Parse a role name as used by chat platforms (`user`, `human`,
    /// `assistant`, `ai`, `model`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" | "human" | "me" | "prompt" => Some(Role::User),
            "assistant" | "ai" | "model" | "bot" | "system" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One scraped chat turn.
///
/// Built once per message element and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message
    pub role: Role,

    /// Reasoning/"thinking" text shown alongside some assistant answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,

    /// Structured message body
    pub content: Vec<ContentNode>,
}

impl Message {
    /// Create a message.
    pub fn new(role: Role, content: Vec<ContentNode>) -> Self {
        Self {
            role,
            thinking: None,
            content,
        }
    }

    /// Create a user message.
    pub fn user(content: Vec<ContentNode>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: Vec<ContentNode>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Attach thinking text, ignoring blank input.
    pub fn with_thinking(mut self, thinking: impl Into<String>) -> Self {
        let thinking = thinking.into();
        self.thinking = if thinking.trim().is_empty() {
            None
        } else {
            Some(thinking)
        };
        self
    }

    /// Plain text of the message body.
    pub fn plain_text(&self) -> String {
        nodes_plain_text(&self.content)
    }

    /// Whether the message has no visible body.
    pub fn is_empty(&self) -> bool {
        self.content.iter().all(ContentNode::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Human"), Some(Role::User));
        assert_eq!(Role::parse(" assistant "), Some(Role::Assistant));
        assert_eq!(Role::parse("narrator"), None);
        assert_eq!(Role::User.flipped(), Role::Assistant);
    }

    #[test]
    fn test_blank_thinking_dropped() {
        let msg = Message::assistant(vec![ContentNode::text("hi")]).with_thinking("  ");
        assert!(msg.thinking.is_none());
    }

    #[test]
    fn test_empty_message() {
        assert!(Message::user(vec![]).is_empty());
        assert!(Message::user(vec![ContentNode::text(" ")]).is_empty());
        assert!(!Message::user(vec![ContentNode::text("x")]).is_empty());
    }
}
