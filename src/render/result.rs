//! Rendering result with metadata and statistics.

use crate::model::{Metadata, Role};
use serde::{Deserialize, Serialize};

/// Result of rendering a conversation, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered content
    pub content: String,

    /// Conversation metadata (copied from the source)
    pub metadata: Metadata,

    /// Extraction statistics
    pub stats: ExtractionStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, metadata: Metadata, stats: ExtractionStats) -> Self {
        Self {
            content,
            metadata,
            stats,
        }
    }
}

/// Statistics collected while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of messages rendered
    pub message_count: u32,

    /// Messages written by the user
    pub user_message_count: u32,

    /// Messages written by the assistant
    pub assistant_message_count: u32,

    /// Messages carrying a reasoning section
    pub thinking_count: u32,

    /// Number of paragraphs
    pub paragraph_count: u32,

    /// Number of headings
    pub heading_count: u32,

    /// Number of fenced code blocks
    pub code_block_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of list items, nested items included
    pub list_item_count: u32,

    /// Number of images
    pub image_count: u32,

    /// Number of links
    pub link_count: u32,

    /// Number of math spans and blocks
    pub math_count: u32,

    /// Number of horizontal rules inside message bodies
    pub horizontal_rule_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, role: Role) {
        self.message_count += 1;
        match role {
            Role::User => self.user_message_count += 1,
            Role::Assistant => self.assistant_message_count += 1,
        }
    }

    pub fn add_thinking(&mut self) {
        self.thinking_count += 1;
    }

    pub fn add_paragraph(&mut self) {
        self.paragraph_count += 1;
    }

    pub fn add_heading(&mut self) {
        self.heading_count += 1;
    }

    pub fn add_code_block(&mut self) {
        self.code_block_count += 1;
    }

    pub fn add_table(&mut self) {
        self.table_count += 1;
    }

    pub fn add_list_item(&mut self) {
        self.list_item_count += 1;
    }

    pub fn add_image(&mut self) {
        self.image_count += 1;
    }

    pub fn add_link(&mut self) {
        self.link_count += 1;
    }

    pub fn add_math(&mut self) {
        self.math_count += 1;
    }

    pub fn add_horizontal_rule(&mut self) {
        self.horizontal_rule_count += 1;
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_stats_count_text() {
        let mut stats = ExtractionStats::new();
        stats.count_text("Hello, world! This is a test.");

        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.char_count, 24);
    }

    #[test]
    fn test_message_counts_by_role() {
        let mut stats = ExtractionStats::new();
        stats.add_message(Role::User);
        stats.add_message(Role::Assistant);
        stats.add_message(Role::Assistant);
        stats.add_thinking();

        assert_eq!(stats.message_count, 3);
        assert_eq!(stats.user_message_count, 1);
        assert_eq!(stats.assistant_message_count, 2);
        assert_eq!(stats.thinking_count, 1);
    }
}
