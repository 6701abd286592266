//! Inline-level types: styled text runs, code spans, links and images.

use serde::{Deserialize, Serialize};

/// Leaf-level inline content inside a paragraph, heading, list item or cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineRun {
    /// A text run with styling
    Text(TextRun),

    /// Inline code span
    Code {
        /// Code text, never escaped
        text: String,
    },

    /// A hyperlink
    Link {
        /// Link text
        text: String,
        /// Link target (empty when the source had none)
        href: String,
        /// Link title (tooltip)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },

    /// An inline image
    Image {
        /// Alternative text
        alt: String,
        /// Image source (empty when the source had none)
        src: String,
        /// Image title
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },

    /// Inline math kept as raw TeX
    Math {
        /// Raw math source
        text: String,
    },

    /// A hard line break
    LineBreak,
}

impl InlineRun {
    /// Plain text run with default style.
    pub fn text(text: impl Into<String>) -> Self {
        InlineRun::Text(TextRun::new(text))
    }

    /// Bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        InlineRun::Text(TextRun::bold(text))
    }

    /// Italic text run.
    pub fn italic(text: impl Into<String>) -> Self {
        InlineRun::Text(TextRun::italic(text))
    }

    /// Inline code span.
    pub fn code(text: impl Into<String>) -> Self {
        InlineRun::Code { text: text.into() }
    }

    /// Hyperlink without a title.
    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        InlineRun::Link {
            text: text.into(),
            href: href.into(),
            title: None,
        }
    }

    /// Image without a title.
    pub fn image(alt: impl Into<String>, src: impl Into<String>) -> Self {
        InlineRun::Image {
            alt: alt.into(),
            src: src.into(),
            title: None,
        }
    }

    /// Plain text projection of this run.
    pub fn plain_text(&self) -> &str {
        match self {
            InlineRun::Text(run) => &run.text,
            InlineRun::Code { text } | InlineRun::Math { text } => text,
            InlineRun::Link { text, .. } => text,
            InlineRun::Image { alt, .. } => alt,
            InlineRun::LineBreak => "\n",
        }
    }

    /// Whether this run carries only whitespace (or nothing).
    pub fn is_blank(&self) -> bool {
        match self {
            InlineRun::Text(run) => run.text.trim().is_empty(),
            InlineRun::Image { .. } | InlineRun::LineBreak => false,
            other => other.plain_text().trim().is_empty(),
        }
    }
}

/// Concatenate the plain text of a run sequence.
pub fn runs_plain_text(runs: &[InlineRun]) -> String {
    runs.iter().map(InlineRun::plain_text).collect()
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Text styling
    #[serde(default, skip_serializing_if = "TextStyle::is_plain")]
    pub style: TextStyle,
}

impl TextRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a text run with an explicit style.
    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::styled(
            text,
            TextStyle {
                bold: true,
                ..Default::default()
            },
        )
    }

    /// Create an italic text run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::styled(
            text,
            TextStyle {
                italic: true,
                ..Default::default()
            },
        )
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Text styling properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    #[serde(default)]
    pub bold: bool,

    /// Italic text
    #[serde(default)]
    pub italic: bool,

    /// Strikethrough text
    #[serde(default)]
    pub strikethrough: bool,
}

impl TextStyle {
    /// Check if any styling is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.strikethrough
    }

    /// Inverse of [`has_styling`](Self::has_styling), used by serde.
    pub fn is_plain(&self) -> bool {
        !self.has_styling()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_plain_text() {
        let runs = vec![
            InlineRun::text("Hello "),
            InlineRun::bold("world"),
            InlineRun::code("!"),
        ];
        assert_eq!(runs_plain_text(&runs), "Hello world!");
    }

    #[test]
    fn test_text_style() {
        let style = TextStyle::default();
        assert!(!style.has_styling());
        assert!(style.is_plain());

        let bold_style = TextStyle {
            bold: true,
            ..Default::default()
        };
        assert!(bold_style.has_styling());
    }

    #[test]
    fn test_blank_runs() {
        assert!(InlineRun::text("   ").is_blank());
        assert!(!InlineRun::image("", "").is_blank());
        assert!(InlineRun::link(" ", "https://example.com").is_blank());
    }

    #[test]
    fn test_plain_style_omitted_from_json() {
        let json = serde_json::to_string(&InlineRun::text("hi")).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"hi"}"#);

        let back: InlineRun = serde_json::from_str(&json).unwrap();
        assert_eq!(back, InlineRun::text("hi"));
    }
}
