//! Text cleanup pipeline for clipboard and rendered chat text.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// Minimal cleanup: Unicode NFC normalization only
    Minimal,
    /// Standard cleanup: NFC + invisible characters + UI residue
    #[default]
    Standard,
    /// Aggressive cleanup: standard plus space and blank-line squeezing
    Aggressive,
}

/// Options for text cleanup.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Replace no-break spaces with plain spaces
    pub replace_nbsp: bool,

    /// Remove zero-width spaces and byte order marks
    pub remove_zero_width: bool,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Remove standalone copy-button labels ("Copy", "Copy code")
    pub remove_ui_labels: bool,

    /// Strip trailing spaces, keeping two-space hard breaks
    pub trim_trailing_whitespace: bool,

    /// Squeeze runs of 3+ spaces outside code fences
    pub squeeze_spaces: bool,

    /// Maximum consecutive newlines (0 = unlimited)
    pub max_consecutive_newlines: u8,

    /// Preserve YAML frontmatter during cleanup
    pub preserve_frontmatter: bool,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Aggressive => Self::aggressive(),
        }
    }

    /// Minimal cleanup options.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            replace_nbsp: false,
            remove_zero_width: false,
            remove_replacement_char: false,
            remove_ui_labels: false,
            trim_trailing_whitespace: false,
            squeeze_spaces: false,
            max_consecutive_newlines: 0,
            preserve_frontmatter: true,
        }
    }

    /// Standard cleanup options.
    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            replace_nbsp: true,
            remove_zero_width: true,
            remove_replacement_char: true,
            remove_ui_labels: true,
            trim_trailing_whitespace: true,
            squeeze_spaces: false,
            max_consecutive_newlines: 2,
            preserve_frontmatter: true,
        }
    }

    /// Aggressive cleanup options.
    pub fn aggressive() -> Self {
        Self {
            squeeze_spaces: true,
            ..Self::standard()
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Text cleanup pipeline.
pub struct CleanupPipeline {
    options: CleanupOptions,
    ui_label_regex: Regex,
    spaces_regex: Regex,
}

impl CleanupPipeline {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        Self {
            options,
            ui_label_regex: Regex::new(r"(?i)^\s*(copy|copy code|copied!?)\s*$").unwrap(),
            spaces_regex: Regex::new(r"[ ]{3,}").unwrap(),
        }
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Process text through the cleanup pipeline.
    pub fn process(&self, text: &str) -> String {
        let frontmatter = if self.options.preserve_frontmatter {
            extract_frontmatter(text)
        } else {
            None
        };

        match frontmatter {
            Some((fm, content)) => format!("{}\n{}", fm, self.process_content(content)),
            None => self.process_content(text),
        }
    }

    fn process_content(&self, text: &str) -> String {
        let max_blank_lines = (self.options.max_consecutive_newlines as usize).saturating_sub(1);
        let mut fence: Option<usize> = None;
        let mut blank_run = 0;
        let mut lines = Vec::new();

        for line in text.lines() {
            // Fenced code passes through every stage untouched
            if let Some(marker_len) = fence {
                if closes_fence(line, marker_len) {
                    fence = None;
                }
                lines.push(line.to_string());
                blank_run = 0;
                continue;
            }
            if let Some(marker_len) = opening_fence(line) {
                fence = Some(marker_len);
                lines.push(line.to_string());
                blank_run = 0;
                continue;
            }

            let line = self.process_line(line);
            if line.trim().is_empty() {
                blank_run += 1;
                if self.options.max_consecutive_newlines > 0 && blank_run > max_blank_lines {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            lines.push(line);
        }

        lines.join("\n").trim().to_string()
    }

    fn process_line(&self, line: &str) -> String {
        let mut line = if self.options.normalize_unicode {
            line.nfc().collect()
        } else {
            line.to_string()
        };
        if self.options.replace_nbsp {
            line = line.replace(['\u{00A0}', '\u{202F}'], " ");
        }
        if self.options.remove_zero_width {
            line = line.replace(['\u{200B}', '\u{2060}', '\u{FEFF}'], "");
        }
        if self.options.remove_replacement_char {
            line = line.replace('\u{FFFD}', "");
        }

        if self.options.remove_ui_labels && self.ui_label_regex.is_match(&line) {
            return String::new();
        }
        if self.options.squeeze_spaces {
            line = self.squeeze(&line);
        }
        if self.options.trim_trailing_whitespace {
            line = trim_trailing(&line);
        }
        line
    }

    fn squeeze(&self, line: &str) -> String {
        // Leading indentation is structure (nested lists)
        let indent_len = line.len() - line.trim_start_matches(' ').len();
        let (indent, rest) = line.split_at(indent_len);
        format!("{}{}", indent, self.spaces_regex.replace_all(rest, " "))
    }
}

/// Line text after indentation and blockquote markers.
fn unquoted(line: &str) -> &str {
    let mut rest = line.trim_start();
    while let Some(inner) = rest.strip_prefix('>') {
        rest = inner.trim_start();
    }
    rest
}

/// Backtick count of a fence-opening line.
fn opening_fence(line: &str) -> Option<usize> {
    let marker_len = unquoted(line).chars().take_while(|&c| c == '`').count();
    (marker_len >= 3).then_some(marker_len)
}

/// A fence closes on a bare backtick run at least as long as its opener.
fn closes_fence(line: &str, marker_len: usize) -> bool {
    let trimmed = unquoted(line).trim_end();
    trimmed.len() >= marker_len && trimmed.chars().all(|c| c == '`')
}

/// Trailing whitespace is dropped unless it is exactly a Markdown hard break.
fn trim_trailing(line: &str) -> String {
    let trimmed = line.trim_end();
    let trailing = &line[trimmed.len()..];
    if trailing == "  " && !trimmed.is_empty() {
        line.to_string()
    } else {
        trimmed.to_string()
    }
}

fn extract_frontmatter(text: &str) -> Option<(&str, &str)> {
    let stripped = text.strip_prefix("---\n")?;
    let end_pos = stripped.find("\n---\n")?;
    let fm_end = 4 + end_pos + 5;
    Some((&text[..fm_end], &text[fm_end..]))
}
