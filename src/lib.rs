//! # unchat
//!
//! AI chat transcript extraction for Rust.
//!
//! This library turns rendered chat pages (ChatGPT, Claude, DeepSeek and
//! similar UIs) into a platform-neutral document model and exports it as
//! Markdown, JSON, plain text or CSV, alongside any project files found on
//! the page.
//!
//! ## Quick Start
//!
//! ```
//! use unchat::html_to_markdown;
//!
//! let markdown = html_to_markdown("<p>Hello <strong>World</strong></p>");
//! assert_eq!(markdown, "Hello **World**\n");
//! ```
//!
//! Whole pages go through the extraction orchestrator:
//!
//! ```no_run
//! use unchat::{PlatformConfig, SnapshotPage, Unchat};
//!
//! # async fn run() -> unchat::Result<()> {
//! let page = SnapshotPage::from_file("chat.html")?;
//! let markdown = Unchat::new()
//!     .platform(PlatformConfig::claude())
//!     .with_frontmatter()
//!     .extract(&page)
//!     .await?
//!     .to_markdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Data-driven platforms**: selectors, noise and role detection live in
//!   JSON-loadable [`PlatformConfig`]s
//! - **Structure preservation**: headings, code blocks, lists, tables, math
//! - **Surface handling**: modal and clipboard reads with bounded waits
//! - **Parallel building**: batches of fragments build on Rayon
//! - **Cleanup pipeline**: Unicode and UI-residue normalization

pub mod builder;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use builder::{build_html, BuildConfig, Classifier, NoiseFilter, Rule, RuleKind};
pub use error::{Error, Result};
pub use extract::{
    CancelFlag, DirectorySink, ElementHandle, ExportSession, ExportSink, Extractor, PageDriver,
    PlatformConfig, RoleDetector, SnapshotPage, Timing,
};
pub use model::{
    Bundle, ContentNode, Conversation, ExportDocument, ExtractedFile, FileContent, FileFilter,
    GptCatalog, GptRecord, InlineRun, List, ListItem, Message, Metadata, Role, Table, TableCell,
    TableRow, TextRun, TextStyle,
};
pub use render::{
    CleanupOptions, CleanupPreset, ExtractionStats, JsonFormat, OutputFormat, RenderOptions,
};

use chrono::{DateTime, Utc};

/// Convert an HTML fragment to Markdown with the standard rules.
///
/// # Example
///
/// ```
/// let md = unchat::html_to_markdown("<ol start=\"3\"><li>A</li><li>B</li></ol>");
/// assert_eq!(md, "3. A\n4. B\n");
/// ```
pub fn html_to_markdown(html: &str) -> String {
    html_to_markdown_with(html, &BuildConfig::default(), &RenderOptions::default())
}

/// Convert an HTML fragment to Markdown with explicit configuration.
pub fn html_to_markdown_with(html: &str, config: &BuildConfig, options: &RenderOptions) -> String {
    let nodes = build_html(html, config);
    render::nodes_to_markdown(&nodes, options)
}

/// Extract the conversation from a saved page.
pub async fn extract_snapshot(html: &str, config: PlatformConfig) -> Result<Conversation> {
    let page = SnapshotPage::new(html);
    Extractor::new(config)?.extract_conversation(&page).await
}

/// Builder-style entry point combining extraction and rendering.
///
/// # Example
///
/// ```no_run
/// use unchat::{CleanupPreset, PlatformConfig, SnapshotPage, Unchat};
///
/// # async fn run() -> unchat::Result<()> {
/// let page = SnapshotPage::from_file("chat.html")?;
/// let text = Unchat::new()
///     .platform(PlatformConfig::deepseek())
///     .with_cleanup(CleanupPreset::Aggressive)
///     .extract(&page)
///     .await?
///     .to_text()?;
/// # Ok(())
/// # }
/// ```
pub struct Unchat {
    config: PlatformConfig,
    render_options: RenderOptions,
    cancel: Option<CancelFlag>,
}

impl Unchat {
    /// Create a builder with the generic platform configuration.
    pub fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            render_options: RenderOptions::default(),
            cancel: None,
        }
    }

    /// Use a platform configuration. Also sets the assistant display name.
    pub fn platform(mut self, config: PlatformConfig) -> Self {
        self.render_options = self
            .render_options
            .with_assistant_name(config.assistant_name.clone());
        self.config = config;
        self
    }

    /// Enable YAML frontmatter in Markdown output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options = self.render_options.with_frontmatter(true);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.render_options = self.render_options.with_cleanup_preset(preset);
        self
    }

    /// Pin the export timestamp.
    pub fn with_export_date(mut self, date: DateTime<Utc>) -> Self {
        self.render_options = self.render_options.with_export_date(date);
        self
    }

    /// Replace the render options wholesale.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Observe an external cancel flag.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Extract the conversation on `page`.
    pub async fn extract(self, page: &dyn PageDriver) -> Result<UnchatResult> {
        let mut extractor = Extractor::new(self.config)?;
        if let Some(cancel) = self.cancel {
            extractor = extractor.with_cancel_flag(cancel);
        }
        let conversation = extractor.extract_conversation(page).await?;
        Ok(UnchatResult {
            conversation,
            render_options: self.render_options,
        })
    }

    /// Extract from saved HTML.
    pub async fn extract_html(self, html: &str) -> Result<UnchatResult> {
        let page = SnapshotPage::new(html);
        self.extract(&page).await
    }
}

impl Default for Unchat {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of extracting a conversation.
pub struct UnchatResult {
    /// The extracted conversation
    pub conversation: Conversation,
    /// Render options to use
    render_options: RenderOptions,
}

impl UnchatResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.conversation, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.conversation, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let options = self.render_options.clone().with_json_format(format);
        render::to_json(&self.conversation, &options)
    }

    /// Markdown plus content statistics.
    pub fn to_markdown_with_stats(&self) -> Result<render::RenderResult> {
        render::render_with_stats(&self.conversation, &self.render_options)
    }

    /// Get plain text without cleanup.
    pub fn plain_text(&self) -> String {
        self.conversation.plain_text()
    }

    /// Get the conversation.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PAGE: &str = r#"<html><head><title>Rust help</title></head><body>
        <div class="message" data-role="user"><p>How do I read a file?</p></div>
        <div class="message" data-role="assistant">
            <p>Use <code>std::fs</code>:</p>
            <pre><code class="language-rust">let s = std::fs::read_to_string("a")?;</code></pre>
        </div>
    </body></html>"#;

    #[test]
    fn test_html_to_markdown() {
        assert_eq!(
            html_to_markdown("<div><p>Hello <strong>World</strong></p></div>"),
            "Hello **World**\n"
        );
    }

    #[test]
    fn test_unchat_builder_default() {
        let builder = Unchat::default();
        assert_eq!(builder.config.name, "Unknown Platform");
        assert!(!builder.render_options.include_frontmatter);
    }

    #[test]
    fn test_unchat_builder_platform_sets_assistant_name() {
        let builder = Unchat::new().platform(PlatformConfig::claude()).with_frontmatter();
        assert_eq!(builder.render_options.assistant_name, "Claude");
        assert!(builder.render_options.include_frontmatter);
    }

    #[tokio::test]
    async fn test_extract_html() {
        let date = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let result = Unchat::new()
            .with_export_date(date)
            .extract_html(PAGE)
            .await
            .unwrap();

        assert_eq!(result.conversation().message_count(), 2);
        assert_eq!(result.conversation().metadata.title, "Rust help");

        let markdown = result.to_markdown().unwrap();
        assert!(markdown.starts_with("# Rust help\n"));
        assert!(markdown.contains("**User:**\n\nHow do I read a file?"));
        assert!(markdown.contains("```rust\nlet s = std::fs::read_to_string(\"a\")?;\n```"));

        let json = result.to_json(JsonFormat::Compact).unwrap();
        assert!(json.contains("\"messageCount\":2"));
    }

    #[tokio::test]
    async fn test_extract_snapshot_empty_page() {
        let conversation = extract_snapshot("<html><body></body></html>", PlatformConfig::default())
            .await
            .unwrap();
        assert!(conversation.is_empty());
        assert_eq!(conversation.metadata.title, "Unknown Platform Conversation");
    }
}
