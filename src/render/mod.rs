//! Rendering module for converting conversations to export formats.
//!
//! Rendering is a read-only projection of the model: the same input and
//! options always produce byte-identical output.

mod bundle;
mod cleanup;
mod csv;
mod filename;
mod json;
mod markdown;
mod options;
mod result;
mod text;

pub use bundle::{bundle, bundle_with_date};
pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use csv::{escape_csv, files_to_csv, gpts_to_csv};
pub use filename::{export_filename, sanitize_title};
pub use json::{
    parse_conversation_json, to_json, to_json_string, to_json_with_files, JsonFormat,
};
pub use markdown::{nodes_to_markdown, to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub use options::{OutputFormat, RenderOptions};
pub use result::{ExtractionStats, RenderResult};
pub use text::to_text;

use crate::error::Result;
use crate::model::{Conversation, ExportDocument};

/// Render a conversation in the requested format.
pub fn render(
    conversation: &Conversation,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<ExportDocument> {
    log::debug!(
        "rendering {} messages as {}",
        conversation.message_count(),
        format
    );
    Ok(match format {
        OutputFormat::Markdown => ExportDocument::Markdown(to_markdown(conversation, options)?),
        OutputFormat::Json => ExportDocument::Json(to_json(conversation, options)?),
        OutputFormat::Text => ExportDocument::Text(to_text(conversation, options)?),
    })
}

/// Render to Markdown and return content statistics alongside.
pub fn render_with_stats(
    conversation: &Conversation,
    options: &RenderOptions,
) -> Result<RenderResult> {
    to_markdown_with_stats(conversation, options)
}
