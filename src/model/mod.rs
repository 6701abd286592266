//! Document model types for scraped chat content.
//!
//! This module defines the intermediate representation that bridges DOM
//! scraping and export rendering. The model is platform-agnostic: every
//! supported chat UI is reduced to the same tree of [`ContentNode`]s.

mod document;
mod export;
mod file;
mod gpt;
mod inline;
mod message;
mod node;
mod table;

pub use document::{Conversation, Metadata};
pub use export::{Bundle, BundleMetadata, ConversationRecord, ExportDocument};
pub use file::{ExtractedFile, FileContent, FileFilter, FileSummary};
pub use gpt::{GptCatalog, GptRecord};
pub use inline::{runs_plain_text, InlineRun, TextRun, TextStyle};
pub use message::{Message, Role};
pub use node::{nodes_plain_text, ContentNode, List, ListItem};
pub use table::{Table, TableCell, TableRow};
