//! Attachment and knowledge-file types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of an extracted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "data", rename_all = "lowercase")]
pub enum FileContent {
    /// UTF-8 text read from the page
    Text(String),
    /// Raw bytes, base64-encoded in JSON
    Binary(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl FileContent {
    /// Size as reported in exports: characters for text, bytes for binary.
    pub fn size(&self) -> usize {
        match self {
            FileContent::Text(text) => text.chars().count(),
            FileContent::Binary(bytes) => bytes.len(),
        }
    }

    /// Raw bytes to write to disk.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Text(text) => text.as_bytes(),
            FileContent::Binary(bytes) => bytes,
        }
    }

    /// Text content, if this is a text file.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(text) => Some(text),
            FileContent::Binary(_) => None,
        }
    }
}

/// A file discovered on the page (project knowledge, attachment, artifact).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFile {
    /// Cleaned filename including extension
    pub filename: String,

    /// File body
    pub content: FileContent,

    /// Name as displayed on the page
    pub original_name: String,

    /// Detected type / extension (e.g. "json", "pdf.txt")
    #[serde(rename = "type")]
    pub file_type: String,

    /// Size, see [`FileContent::size`]
    pub size: usize,

    /// When the file was read
    pub extracted_at: DateTime<Utc>,
}

impl ExtractedFile {
    /// Create a text file stamped with the current time.
    pub fn text(
        filename: impl Into<String>,
        original_name: impl Into<String>,
        file_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = FileContent::Text(content.into());
        Self {
            filename: filename.into(),
            size: content.size(),
            content,
            original_name: original_name.into(),
            file_type: file_type.into(),
            extracted_at: Utc::now(),
        }
    }

    /// Override the extraction timestamp.
    pub fn at(mut self, extracted_at: DateTime<Utc>) -> Self {
        self.extracted_at = extracted_at;
        self
    }

    /// Summary entry used in bundle metadata and CSV listings.
    pub fn summary(&self) -> FileSummary {
        FileSummary {
            filename: self.filename.clone(),
            original_name: self.original_name.clone(),
            size: self.size,
        }
    }
}

/// Per-file entry in bundle metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    /// Cleaned filename
    pub filename: String,
    /// Name as displayed on the page
    pub original_name: String,
    /// File size
    pub size: usize,
}

/// Filters applied to extracted files before they are accumulated.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    /// Allowed file types (empty = all)
    pub types: Vec<String>,

    /// Minimum size, inclusive
    pub min_size: usize,

    /// Maximum size, inclusive
    pub max_size: Option<usize>,

    /// Earliest extraction time
    pub since: Option<DateTime<Utc>>,

    /// Latest extraction time
    pub until: Option<DateTime<Utc>>,
}

impl FileFilter {
    /// Create a filter that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given file types.
    pub fn with_types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the size range.
    pub fn with_size(mut self, min: usize, max: Option<usize>) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    /// Restrict the extraction time window.
    pub fn with_window(mut self, since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self.until = until;
        self
    }

    /// Check whether a file passes every configured filter.
    pub fn passes(&self, file: &ExtractedFile) -> bool {
        if !self.types.is_empty() && !self.types.iter().any(|t| t == &file.file_type) {
            return false;
        }
        if file.size < self.min_size {
            return false;
        }
        if self.max_size.is_some_and(|max| file.size > max) {
            return false;
        }
        if self.since.is_some_and(|since| file.extracted_at < since) {
            return false;
        }
        if self.until.is_some_and(|until| file.extracted_at > until) {
            return false;
        }
        true
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text_size_counts_chars() {
        let file = ExtractedFile::text("notes.md", "notes.md", "md", "héllo");
        assert_eq!(file.size, 5);
        assert_eq!(file.summary().size, 5);
    }

    #[test]
    fn test_binary_roundtrip_json() {
        let content = FileContent::Binary(vec![0, 159, 146, 150]);
        let json = serde_json::to_string(&content).unwrap();
        assert_eq!(json, r#"{"encoding":"binary","data":"AJ+Slg=="}"#);

        let back: FileContent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, content);
    }

    #[test]
    fn test_filter() {
        let stamp = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let file = ExtractedFile::text("a.json", "a.json", "json", "x".repeat(80)).at(stamp);

        assert!(FileFilter::new().passes(&file));
        assert!(FileFilter::new().with_types(["json"]).passes(&file));
        assert!(!FileFilter::new().with_types(["md"]).passes(&file));
        assert!(!FileFilter::new().with_size(100, None).passes(&file));
        assert!(!FileFilter::new().with_size(0, Some(50)).passes(&file));

        let later = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        assert!(!FileFilter::new().with_window(Some(later), None).passes(&file));
    }
}
