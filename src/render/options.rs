//! Rendering options and configuration.

use super::{CleanupOptions, JsonFormat};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Output format for a conversation export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Markdown transcript
    #[default]
    Markdown,
    /// Structured JSON record
    Json,
    /// Plain text (input for PDF/image sinks)
    Text,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Options for rendering conversations.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Display name used in assistant role headers
    pub assistant_name: String,

    /// Emit the title/platform/date/count header block
    pub include_header: bool,

    /// Prepend YAML frontmatter with the same metadata
    pub include_frontmatter: bool,

    /// Fixed export timestamp; `None` uses the current time
    pub export_date: Option<DateTime<Utc>>,

    /// Maximum heading level (1-6)
    pub max_heading_level: u8,

    /// Render hard line breaks as `"  \n"` instead of a space
    pub preserve_line_breaks: bool,

    /// Character to use for unordered list markers
    pub list_marker: char,

    /// Escape special Markdown characters in text runs
    pub escape_special_chars: bool,

    /// JSON output style
    pub json_format: JsonFormat,

    /// Text cleanup options
    pub cleanup: Option<CleanupOptions>,

    /// Collect extraction statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the assistant display name.
    pub fn with_assistant_name(mut self, name: impl Into<String>) -> Self {
        self.assistant_name = name.into();
        self
    }

    /// Enable or disable the document header block.
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Pin the export timestamp.
    pub fn with_export_date(mut self, date: DateTime<Utc>) -> Self {
        self.export_date = Some(date);
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Enable or disable line break preservation.
    pub fn with_line_breaks(mut self, preserve: bool) -> Self {
        self.preserve_line_breaks = preserve;
        self
    }

    /// Set the list marker character.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Enable or disable Markdown escaping of text runs.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set the JSON output style.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: super::CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    /// The export timestamp to stamp on output.
    pub fn export_timestamp(&self) -> DateTime<Utc> {
        self.export_date.unwrap_or_else(Utc::now)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            assistant_name: "Assistant".to_string(),
            include_header: true,
            include_frontmatter: false,
            export_date: None,
            max_heading_level: 6,
            preserve_line_breaks: true,
            list_marker: '-',
            escape_special_chars: false,
            json_format: JsonFormat::Pretty,
            cleanup: None,
            collect_stats: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_assistant_name("Claude")
            .with_max_heading(9)
            .with_json_format(JsonFormat::Compact);

        assert_eq!(options.assistant_name, "Claude");
        assert_eq!(options.max_heading_level, 6);
        assert_eq!(options.json_format, JsonFormat::Compact);
        assert!(!options.escape_special_chars);
    }

    #[test]
    fn test_pinned_export_date() {
        let date = Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap();
        let options = RenderOptions::new().with_export_date(date);
        assert_eq!(options.export_timestamp(), date);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("pdf".parse::<OutputFormat>().is_err());
    }
}
