//! Block-level content nodes.

use super::{runs_plain_text, InlineRun, Table};
use serde::{Deserialize, Serialize};

/// One structural unit of a parsed message body.
///
/// Nodes are kept in document reading order; nothing downstream reorders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentNode {
    /// A paragraph of inline runs
    Paragraph {
        /// Inline content
        runs: Vec<InlineRun>,
    },

    /// A heading (level 1-6)
    Heading {
        /// Heading level, clamped to 1..=6
        level: u8,
        /// Inline content
        runs: Vec<InlineRun>,
    },

    /// A fenced code block; `text` is stored verbatim
    CodeBlock {
        /// Language tag, empty when unknown
        #[serde(default)]
        language: String,
        /// Code text, internal whitespace preserved exactly
        text: String,
    },

    /// An ordered or unordered list
    List(List),

    /// A table
    Table(Table),

    /// A block quote containing nested nodes
    Blockquote {
        /// Quoted content
        children: Vec<ContentNode>,
    },

    /// Inline math that appeared outside running text
    MathInline {
        /// Raw math source
        text: String,
    },

    /// Display math
    MathBlock {
        /// Raw math source
        text: String,
    },

    /// Thematic break
    HorizontalRule,
}

impl ContentNode {
    /// Create a paragraph from runs.
    pub fn paragraph(runs: Vec<InlineRun>) -> Self {
        ContentNode::Paragraph { runs }
    }

    /// Create a paragraph holding a single plain text run.
    pub fn text(text: impl Into<String>) -> Self {
        ContentNode::Paragraph {
            runs: vec![InlineRun::text(text)],
        }
    }

    /// Create a heading, clamping the level into 1..=6.
    pub fn heading(level: u8, runs: Vec<InlineRun>) -> Self {
        ContentNode::Heading {
            level: level.clamp(1, 6),
            runs,
        }
    }

    /// Create a code block.
    pub fn code_block(language: impl Into<String>, text: impl Into<String>) -> Self {
        ContentNode::CodeBlock {
            language: language.into(),
            text: text.into(),
        }
    }

    /// Plain text projection of the node and all its descendants.
    pub fn plain_text(&self) -> String {
        match self {
            ContentNode::Paragraph { runs } | ContentNode::Heading { runs, .. } => {
                runs_plain_text(runs)
            }
            ContentNode::CodeBlock { text, .. }
            | ContentNode::MathInline { text }
            | ContentNode::MathBlock { text } => text.clone(),
            ContentNode::List(list) => list.plain_text(),
            ContentNode::Table(table) => table.plain_text(),
            ContentNode::Blockquote { children } => nodes_plain_text(children),
            ContentNode::HorizontalRule => String::new(),
        }
    }

    /// Whether the node carries no visible content.
    pub fn is_empty(&self) -> bool {
        match self {
            ContentNode::Paragraph { runs } | ContentNode::Heading { runs, .. } => {
                runs.iter().all(InlineRun::is_blank)
            }
            ContentNode::CodeBlock { text, .. } => text.is_empty(),
            ContentNode::MathInline { text } | ContentNode::MathBlock { text } => {
                text.trim().is_empty()
            }
            ContentNode::List(list) => list.items.is_empty(),
            ContentNode::Table(table) => table.is_empty(),
            ContentNode::Blockquote { children } => children.iter().all(ContentNode::is_empty),
            ContentNode::HorizontalRule => false,
        }
    }
}

/// Plain text of a node sequence, blocks separated by blank lines.
pub fn nodes_plain_text(nodes: &[ContentNode]) -> String {
    nodes
        .iter()
        .map(ContentNode::plain_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// An ordered or unordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    /// Whether items are numbered
    pub ordered: bool,

    /// First number for ordered lists
    #[serde(default = "default_start")]
    pub start: u32,

    /// List items
    pub items: Vec<ListItem>,
}

fn default_start() -> u32 {
    1
}

impl List {
    /// Create an empty bulleted list.
    pub fn unordered() -> Self {
        Self {
            ordered: false,
            start: 1,
            items: Vec::new(),
        }
    }

    /// Create an empty numbered list starting at `start`.
    pub fn ordered(start: u32) -> Self {
        Self {
            ordered: true,
            start,
            items: Vec::new(),
        }
    }

    /// Add an item.
    pub fn push(&mut self, item: ListItem) {
        self.items.push(item);
    }

    /// Nesting depth (1 for a flat list).
    pub fn depth(&self) -> usize {
        1 + self
            .items
            .iter()
            .flat_map(|item| &item.nested)
            .map(List::depth)
            .max()
            .unwrap_or(0)
    }

    /// Get plain text content, one item per line.
    pub fn plain_text(&self) -> String {
        self.items
            .iter()
            .map(ListItem::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A single list item with optional nested lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Item text
    pub runs: Vec<InlineRun>,

    /// Lists nested directly under this item
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<List>,
}

impl ListItem {
    /// Create an item holding plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![InlineRun::text(text)],
            nested: Vec::new(),
        }
    }

    /// Create an item from runs.
    pub fn with_runs(runs: Vec<InlineRun>) -> Self {
        Self {
            runs,
            nested: Vec::new(),
        }
    }

    /// Get plain text including nested lists.
    pub fn plain_text(&self) -> String {
        let mut text = runs_plain_text(&self.runs);
        for list in &self.nested {
            text.push('\n');
            text.push_str(&list.plain_text());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_clamped() {
        let node = ContentNode::heading(9, vec![InlineRun::text("Deep")]);
        assert!(matches!(node, ContentNode::Heading { level: 6, .. }));
    }

    #[test]
    fn test_list_depth() {
        let mut inner = List::unordered();
        inner.push(ListItem::text("child"));

        let mut item = ListItem::text("parent");
        item.nested.push(inner);

        let mut outer = List::ordered(1);
        outer.push(item);

        assert_eq!(outer.depth(), 2);
        assert_eq!(outer.plain_text(), "parent\nchild");
    }

    #[test]
    fn test_is_empty() {
        assert!(ContentNode::text("  ").is_empty());
        assert!(!ContentNode::HorizontalRule.is_empty());
        assert!(!ContentNode::code_block("", " ").is_empty());
    }

    #[test]
    fn test_json_shape() {
        let node = ContentNode::code_block("rust", "fn main() {}");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "code_block");
        assert_eq!(json["language"], "rust");
    }
}
