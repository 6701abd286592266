//! Export session: accumulated extraction results for one page.

use super::config::PlatformConfig;
use super::orchestrator::{CancelFlag, Extractor};
use super::page::PageDriver;
use super::sink::ExportSink;
use crate::error::{Error, Result};
use crate::model::{
    Conversation, ExportDocument, ExtractedFile, FileFilter, GptCatalog, GptRecord, Message,
    Metadata,
};
use crate::render::{
    bundle_with_date, export_filename, files_to_csv, gpts_to_csv, render, to_json_string,
    to_json_with_files, OutputFormat, RenderOptions,
};
use std::path::PathBuf;

/// Counts from one [`ExportSession::capture`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    pub messages: usize,
    pub files: usize,
    /// Files rejected by the session's [`FileFilter`]
    pub filtered: usize,
}

/// Owns the configuration, everything extracted so far, and the cancel
/// flag. Created once per page; nothing is shared between sessions.
pub struct ExportSession {
    extractor: Extractor,
    metadata: Metadata,
    messages: Vec<Message>,
    files: Vec<ExtractedFile>,
    gpts: GptCatalog,
    filter: FileFilter,
    options: RenderOptions,
}

impl ExportSession {
    pub fn new(config: PlatformConfig) -> Result<Self> {
        let options = RenderOptions::new().with_assistant_name(config.assistant_name.clone());
        let metadata = Metadata::new("", config.name.clone());
        Ok(Self {
            extractor: Extractor::new(config)?,
            metadata,
            messages: Vec::new(),
            files: Vec::new(),
            gpts: GptCatalog::new(),
            filter: FileFilter::new(),
            options,
        })
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_file_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn config(&self) -> &PlatformConfig {
        self.extractor.config()
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.extractor.cancel_flag()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn files(&self) -> &[ExtractedFile] {
        &self.files
    }

    pub fn gpts(&self) -> &[GptRecord] {
        self.gpts.records()
    }

    /// Extract title, messages and files from `page`.
    ///
    /// Replaces previously captured messages; files are appended.
    pub async fn capture(&mut self, page: &dyn PageDriver) -> Result<CaptureSummary> {
        let conversation = self.extractor.extract_conversation(page).await?;
        self.metadata = conversation.metadata;
        self.messages = conversation.messages;

        let files = self.extractor.extract_files(page).await?;
        let found = files.len();
        let accepted = self.ingest_files(files);

        let summary = CaptureSummary {
            messages: self.messages.len(),
            files: accepted,
            filtered: found - accepted,
        };
        log::info!(
            "captured {} messages and {} files ({} filtered)",
            summary.messages,
            summary.files,
            summary.filtered
        );
        Ok(summary)
    }

    /// Extract only the conversation.
    pub async fn capture_messages(&mut self, page: &dyn PageDriver) -> Result<usize> {
        let conversation = self.extractor.extract_conversation(page).await?;
        self.metadata = conversation.metadata;
        self.messages = conversation.messages;
        Ok(self.messages.len())
    }

    /// Extract only files. Returns the number accepted by the filter.
    pub async fn capture_files(&mut self, page: &dyn PageDriver) -> Result<usize> {
        if self.metadata.title.is_empty() {
            self.metadata.title = self.extractor.conversation_title(page).await?;
            self.metadata.url = page.page_url().await.unwrap_or_default();
        }
        let files = self.extractor.extract_files(page).await?;
        Ok(self.ingest_files(files))
    }

    /// Append messages supplied directly (e.g. from captured API traffic).
    pub fn ingest_messages(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages
            .extend(messages.into_iter().filter(|m| !m.is_empty()));
    }

    /// Append files that pass the filter; returns how many were kept.
    pub fn ingest_files(&mut self, files: impl IntoIterator<Item = ExtractedFile>) -> usize {
        let before = self.files.len();
        for file in files {
            if self.filter.passes(&file) {
                self.files.push(file);
            } else {
                log::debug!("filtered out {}", file.filename);
            }
        }
        self.files.len() - before
    }

    /// Merge GPT records by id.
    pub fn ingest_gpts(&mut self, records: impl IntoIterator<Item = GptRecord>) {
        self.gpts.merge(records);
    }

    /// Merge GPT records from a captured discovery response.
    pub fn ingest_gpt_json(&mut self, json: &str) -> Result<usize> {
        let records = GptRecord::from_discovery_json(json)?;
        let count = records.len();
        self.ingest_gpts(records);
        Ok(count)
    }

    /// Snapshot of the conversation built so far.
    pub fn conversation(&self) -> Conversation {
        Conversation {
            metadata: self.metadata.clone(),
            messages: self.messages.clone(),
        }
    }

    pub fn export_markdown(&self) -> Result<ExportDocument> {
        self.export_conversation(OutputFormat::Markdown)
    }

    /// Messages plus a listing of the captured files.
    pub fn export_json(&self) -> Result<ExportDocument> {
        if self.messages.is_empty() && self.files.is_empty() {
            return Err(Error::NoContentFound);
        }
        Ok(ExportDocument::Json(to_json_with_files(
            &self.conversation(),
            &self.files,
            &self.options,
        )?))
    }

    pub fn export_text(&self) -> Result<ExportDocument> {
        self.export_conversation(OutputFormat::Text)
    }

    fn export_conversation(&self, format: OutputFormat) -> Result<ExportDocument> {
        if self.messages.is_empty() {
            return Err(Error::NoContentFound);
        }
        render(&self.conversation(), format, &self.options)
    }

    /// All accepted files as a bundle.
    pub fn export_files(&self) -> Result<ExportDocument> {
        if self.files.is_empty() {
            return Err(Error::NoContentFound);
        }
        Ok(bundle_with_date(
            self.files.clone(),
            &self.metadata.title,
            &self.metadata.url,
            self.options.export_timestamp(),
        ))
    }

    /// File listing as CSV.
    pub fn export_files_csv(&self) -> Result<ExportDocument> {
        if self.files.is_empty() {
            return Err(Error::NoContentFound);
        }
        Ok(ExportDocument::Csv(files_to_csv(&self.files)))
    }

    /// GPT records as JSON.
    pub fn export_gpts(&self) -> Result<ExportDocument> {
        if self.gpts.is_empty() {
            return Err(Error::NoContentFound);
        }
        Ok(ExportDocument::Json(to_json_string(
            self.gpts.records(),
            self.options.json_format,
        )?))
    }

    /// GPT records as CSV.
    pub fn export_gpts_csv(&self) -> Result<ExportDocument> {
        if self.gpts.is_empty() {
            return Err(Error::NoContentFound);
        }
        Ok(ExportDocument::Csv(gpts_to_csv(self.gpts.records())))
    }

    /// `{title}-{date}.{ext}` for a document from this session.
    pub fn file_name(&self, document: &ExportDocument) -> String {
        let date = self.options.export_timestamp().date_naive();
        let stem = export_filename(&self.metadata.title, date, document.extension());
        match document {
            // Bundles are directories; drop the archive extension
            ExportDocument::Bundle(_) => stem
                .strip_suffix(".zip")
                .map(str::to_string)
                .unwrap_or(stem),
            _ => stem,
        }
    }

    /// Hand a document to `sink` under the conventional file name.
    ///
    /// Sink failures surface as [`Error::Serialization`]; nothing partial
    /// is kept.
    pub fn deliver(&self, document: &ExportDocument, sink: &mut dyn ExportSink) -> Result<PathBuf> {
        let name = self.file_name(document);
        sink.write(&name, document)
            .map_err(|e| Error::Serialization(format!("writing {}: {}", name, e)))
    }

    /// Drop everything captured so far.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.files.clear();
        self.gpts = GptCatalog::new();
    }
}
