//! Serialized export envelopes.

use super::{Conversation, ExtractedFile, FileSummary, Message, Metadata};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A finished export, ready to hand to a sink.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDocument {
    /// Markdown transcript
    Markdown(String),
    /// JSON document
    Json(String),
    /// CSV table
    Csv(String),
    /// Plain text, consumed by PDF/image sinks
    Text(String),
    /// A set of files plus metadata
    Bundle(Bundle),
}

impl ExportDocument {
    /// Text body for single-file exports; `None` for bundles.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExportDocument::Markdown(s)
            | ExportDocument::Json(s)
            | ExportDocument::Csv(s)
            | ExportDocument::Text(s) => Some(s),
            ExportDocument::Bundle(_) => None,
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportDocument::Markdown(_) => "md",
            ExportDocument::Json(_) => "json",
            ExportDocument::Csv(_) => "csv",
            ExportDocument::Text(_) => "txt",
            ExportDocument::Bundle(_) => "zip",
        }
    }

    /// MIME type for download-style sinks.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportDocument::Markdown(_) => "text/markdown",
            ExportDocument::Json(_) => "application/json",
            ExportDocument::Csv(_) => "text/csv;charset=utf-8",
            ExportDocument::Text(_) => "text/plain",
            ExportDocument::Bundle(_) => "application/zip",
        }
    }
}

/// Files exported together with a metadata record.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    /// Files in extraction order
    pub files: Vec<ExtractedFile>,
    /// Contents of `_export_metadata.json`
    pub metadata: BundleMetadata,
}

impl Bundle {
    /// Name of the metadata entry written next to the files.
    pub const METADATA_FILE: &'static str = "_export_metadata.json";
}

/// Metadata describing a file bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    /// RFC 3339 export timestamp
    pub export_date: String,
    /// Title of the page the files came from
    pub platform_title: String,
    /// Page URL
    pub url: String,
    /// Number of files in the bundle
    pub file_count: usize,
    /// One entry per file
    pub files: Vec<FileSummary>,
}

impl BundleMetadata {
    /// Pretty JSON as written to `_export_metadata.json`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// JSON shape of an exported conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub export_date: String,
    pub platform_title: String,
    #[serde(default)]
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub file_count: usize,
    #[serde(default)]
    pub files: Vec<FileSummary>,
    pub message_count: usize,
    pub messages: Vec<Message>,
}

impl ConversationRecord {
    /// Wrap a conversation with an export timestamp.
    pub fn from_conversation(conversation: &Conversation, export_date: impl Into<String>) -> Self {
        Self {
            export_date: export_date.into(),
            platform_title: conversation.metadata.platform.clone(),
            url: conversation.metadata.url.clone(),
            title: conversation.metadata.title.clone(),
            file_count: 0,
            files: Vec::new(),
            message_count: conversation.message_count(),
            messages: conversation.messages.clone(),
        }
    }

    /// List files captured alongside the conversation.
    pub fn with_files(mut self, files: &[ExtractedFile]) -> Self {
        self.files = files.iter().map(ExtractedFile::summary).collect();
        self.file_count = self.files.len();
        self
    }

    /// Recover the conversation.
    pub fn into_conversation(self) -> Conversation {
        let metadata = Metadata::new(self.title, self.platform_title).with_url(self.url);
        Conversation {
            metadata,
            messages: self.messages,
        }
    }
}
