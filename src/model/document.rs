//! Conversation-level types.

use super::Message;
use serde::{Deserialize, Serialize};

/// A scraped conversation: ordered messages plus page metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Page metadata (title, platform, url)
    pub metadata: Metadata,

    /// Messages in reading order
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            messages: Vec::new(),
        }
    }

    /// Get the number of messages.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Append a message.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Check if the conversation has any messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get plain text content of the entire conversation.
    pub fn plain_text(&self) -> String {
        self.messages
            .iter()
            .map(Message::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Conversation metadata. Rendered as a header, never as content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Conversation title
    pub title: String,

    /// Platform display name (e.g. "ChatGPT")
    pub platform: String,

    /// Source page URL
    #[serde(default)]
    pub url: String,
}

impl Metadata {
    /// Create metadata with a title and platform name.
    pub fn new(title: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            platform: platform.into(),
            url: String::new(),
        }
    }

    /// Set the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Convert metadata to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self, export_date: &str, message_count: usize) -> String {
        let mut lines = vec!["---".to_string()];

        lines.push(format!("title: \"{}\"", escape_yaml(&self.title)));
        if !self.platform.is_empty() {
            lines.push(format!("platform: \"{}\"", escape_yaml(&self.platform)));
        }
        if !self.url.is_empty() {
            lines.push(format!("url: \"{}\"", escape_yaml(&self.url)));
        }
        lines.push(format!("exported: {}", export_date));
        lines.push(format!("messages: {}", message_count));

        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentNode;

    #[test]
    fn test_conversation_new() {
        let conv = Conversation::new(Metadata::new("Chat", "Claude"));
        assert!(conv.is_empty());
        assert_eq!(conv.message_count(), 0);
    }

    #[test]
    fn test_metadata_frontmatter() {
        let metadata =
            Metadata::new("Say \"hi\"", "ChatGPT").with_url("https://chatgpt.com/c/1");

        let yaml = metadata.to_yaml_frontmatter("2025-01-02", 4);
        assert!(yaml.starts_with("---\n"));
        assert!(yaml.contains("title: \"Say \\\"hi\\\"\""));
        assert!(yaml.contains("platform: \"ChatGPT\""));
        assert!(yaml.contains("exported: 2025-01-02"));
        assert!(yaml.contains("messages: 4"));
    }

    #[test]
    fn test_plain_text() {
        let mut conv = Conversation::new(Metadata::default());
        conv.add_message(Message::user(vec![ContentNode::text("Q")]));
        conv.add_message(Message::assistant(vec![ContentNode::text("A")]));
        assert_eq!(conv.plain_text(), "Q\n\nA");
    }
}
