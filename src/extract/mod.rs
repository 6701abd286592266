//! Extraction from chat pages.
//!
//! The orchestrator talks to a page only through [`PageDriver`], visits
//! message and file elements one at a time, and opens at most one transient
//! surface (modal or clipboard) at a time. [`SnapshotPage`] drives it over
//! saved HTML; browser integrations implement the trait themselves.
//!
//! ```no_run
//! use unchat::extract::{ExportSession, PlatformConfig, SnapshotPage};
//!
//! # async fn run() -> unchat::Result<()> {
//! let page = SnapshotPage::from_file("chat.html")?;
//! let mut session = ExportSession::new(PlatformConfig::chatgpt())?;
//! session.capture_messages(&page).await?;
//! let markdown = session.export_markdown()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod files;
mod orchestrator;
mod page;
mod session;
mod sink;
mod snapshot;
mod surface;

pub use config::{PlatformConfig, RoleDetector, Timing};
pub use files::{clean_filename, detect_file_type, infer_file_name, is_file_candidate, UNKNOWN_FILE};
pub use orchestrator::{CancelFlag, Extractor};
pub use page::{ElementHandle, PageDriver};
pub use session::{CaptureSummary, ExportSession};
pub use sink::{write_document, DirectorySink, ExportSink};
pub use snapshot::SnapshotPage;
pub use surface::{filter_ui_lines, SurfaceKind, SurfaceSession, SurfaceState, PLATFORM_HOSTS};
