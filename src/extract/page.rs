//! Page abstraction between the orchestrator and a live or saved page.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Opaque reference to an element owned by a [`PageDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u64);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operations the orchestrator needs from a page.
///
/// Every method may fail with [`crate::Error::Page`]; the orchestrator
/// contains such failures to the element being processed.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Elements matching `selector` in document order, searched below
    /// `scope` or in the whole page.
    async fn query_all(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>>;

    /// Whether the element itself matches `selector`.
    async fn matches(&self, element: ElementHandle, selector: &str) -> Result<bool>;

    /// Serialized clone of the element, handed to the builder.
    async fn outer_html(&self, element: ElementHandle) -> Result<String>;

    /// Rendered text of the element.
    async fn text_content(&self, element: ElementHandle) -> Result<String>;

    async fn attribute(&self, element: ElementHandle, name: &str) -> Result<Option<String>>;

    /// Layout height in pixels; zero means not rendered.
    async fn rendered_height(&self, element: ElementHandle) -> Result<f64>;

    async fn scroll_into_view(&self, element: ElementHandle) -> Result<()>;

    async fn click(&self, element: ElementHandle) -> Result<()>;

    /// Dispatch a key press to the document (e.g. `"Escape"`).
    async fn press_key(&self, key: &str) -> Result<()>;

    /// Current clipboard text.
    async fn read_clipboard(&self) -> Result<String>;

    /// Empty the clipboard ahead of a copy. Drivers without write access
    /// keep the default, and a repeat of the previous copy then times out.
    async fn clear_clipboard(&self) -> Result<()> {
        Ok(())
    }

    async fn page_url(&self) -> Result<String>;

    async fn page_title(&self) -> Result<String>;

    /// First match of `selector`, if any.
    async fn query(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> Result<Option<ElementHandle>> {
        Ok(self.query_all(scope, selector).await?.into_iter().next())
    }
}
