//! Heuristics for file-like page elements: which elements are files, what
//! they are called, and what type their content is.

use super::surface::PLATFORM_HOSTS;
use regex::Regex;
use std::sync::LazyLock;

static NAME_WITH_EXT_AND_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(.+\.(?:pdf|txt|md|json|xml|csv|doc|docx|xlsx?|py|js|html|css|java|cpp|c|h))\s*\d*\s*lines?",
    )
    .unwrap()
});
static NAME_LINES_THEN_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\s*\d*\s*lines?\s*(?:pdf|txt|text|md|json|xml|csv|py|js|html|css|java|cpp|c|h)")
        .unwrap()
});
static NAME_BEFORE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([^0-9]+?)(?:\s*\d*\s*lines?|$)").unwrap());
static NOISE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d+|lines?|pdf|txt|text|md|json|xml|csv|py|js|html|css|java|cpp|c|h)$")
        .unwrap()
});
static FILE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:pdf|txt|md|json|xml|csv|doc|docx|xlsx|eml|py|js|html|css|java|cpp|c|h)")
        .unwrap()
});
static EXTENSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([a-z0-9]+)").unwrap());
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s\-_.]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

/// Fallback name when nothing usable is found.
pub const UNKNOWN_FILE: &str = "Unknown_File";

/// Extension to output type, in detection priority order.
const KNOWN_TYPES: &[(&str, &str)] = &[
    ("pdf", "pdf.txt"),
    ("json", "json"),
    ("xml", "xml"),
    ("md", "md"),
    ("csv", "csv"),
    ("xlsx", "xlsx.txt"),
    ("xls", "xlsx.txt"),
    ("docx", "doc.txt"),
    ("doc", "doc.txt"),
    ("eml", "eml.txt"),
    ("py", "py"),
    ("js", "js"),
    ("html", "html"),
    ("css", "css"),
    ("java", "java"),
    ("cpp", "cpp"),
    ("c", "cpp"),
    ("h", "cpp"),
];

/// Whether an element's text looks like a file entry.
pub fn is_file_candidate(text: &str) -> bool {
    let text = text.trim();
    if text.contains("lines") || FILE_EXTENSION.is_match(text) {
        return true;
    }
    let len = text.chars().count();
    len > 10 && len < 200 && !PLATFORM_HOSTS.iter().any(|host| text.contains(host))
}

/// Recover the displayed file name from an element's text
/// (e.g. `"notes.md 42 lines"` gives `"notes.md"`).
pub fn infer_file_name(text: &str) -> String {
    let text = text.trim();

    for pattern in [
        &*NAME_WITH_EXT_AND_LINES,
        &*NAME_LINES_THEN_TYPE,
        &*NAME_BEFORE_DIGITS,
    ] {
        if let Some(name) = pattern.captures(text).and_then(|c| c.get(1)) {
            let name = name.as_str().trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }

    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !NOISE_WORD.is_match(w))
        .take(3)
        .collect();
    if words.is_empty() {
        UNKNOWN_FILE.to_string()
    } else {
        words.join(" ")
    }
}

/// Output type for a file: from the name's extension, else sniffed from
/// the content, else `txt`. Binary office formats map to `*.txt` since
/// only their text is captured.
pub fn detect_file_type(name: &str, content: &str) -> String {
    let lower = name.to_lowercase();
    let extensions: Vec<&str> = EXTENSION_TOKEN
        .captures_iter(&lower)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    if let Some((_, file_type)) = KNOWN_TYPES
        .iter()
        .find(|(ext, _)| extensions.contains(ext))
    {
        return file_type.to_string();
    }

    let file_type = if content.contains('{') && content.contains('}') && content.contains('"') {
        "json"
    } else if content.contains('<') && content.contains('>') {
        "html"
    } else if content.contains("##") || content.contains("**") {
        "md"
    } else if content.contains(',') && content.lines().count() > 1 {
        "csv"
    } else if content.contains("def ") || content.contains("import ") {
        "py"
    } else if content.contains("function ") || content.contains("const ") || content.contains("var ") {
        "js"
    } else {
        "txt"
    };
    file_type.to_string()
}

/// Filesystem-safe `{name}.{type}`.
///
/// Characters outside `[A-Za-z0-9 -_.]` become `_`, whitespace and
/// underscore runs collapse to one `_`. A trailing extension that the type
/// already encodes is dropped, so `report.pdf` becomes `report.pdf.txt`.
pub fn clean_filename(name: &str, file_type: &str) -> String {
    let replaced = UNSAFE_FILENAME_CHARS.replace_all(name.trim(), "_");
    let underscored = WHITESPACE.replace_all(&replaced, "_");
    let collapsed = UNDERSCORES.replace_all(&underscored, "_");
    let mut stem = collapsed.to_string();

    let lower = stem.to_lowercase();
    if let Some((ext, _)) = KNOWN_TYPES
        .iter()
        .filter(|(_, t)| *t == file_type)
        .find(|(ext, _)| lower.ends_with(&format!(".{}", ext)))
    {
        stem.truncate(stem.len() - ext.len() - 1);
    }

    let mut stem = stem.trim_matches('_').to_string();
    if stem.is_empty() {
        stem = UNKNOWN_FILE.to_string();
    }
    format!("{}.{}", stem, file_type)
}
