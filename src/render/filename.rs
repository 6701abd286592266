//! Export filename convention.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const MAX_TITLE_CHARS: usize = 50;

/// Reduce a conversation title to a filesystem-safe stem.
///
/// Keeps word characters, whitespace and `-`; whitespace runs become `-`;
/// the result is cut to 50 characters and falls back to `export`.
pub fn sanitize_title(title: &str) -> String {
    let kept = UNSAFE_CHARS.replace_all(title, "");
    let dashed = WHITESPACE.replace_all(kept.trim(), "-");
    let stem: String = dashed.chars().take(MAX_TITLE_CHARS).collect();

    if stem.is_empty() {
        "export".to_string()
    } else {
        stem
    }
}

/// `{sanitized-title}-{YYYY-MM-DD}.{ext}`
pub fn export_filename(title: &str, date: NaiveDate, extension: &str) -> String {
    format!(
        "{}-{}.{}",
        sanitize_title(title),
        date.format("%Y-%m-%d"),
        extension.trim_start_matches('.')
    )
}
