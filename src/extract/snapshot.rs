//! [`PageDriver`] over a saved HTML snapshot.

use super::page::{ElementHandle, PageDriver};
use crate::builder::parse_selector;
use crate::error::{Error, Result};
use async_trait::async_trait;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{LazyLock, Mutex, PoisonError};

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("valid selector"));

const LINE_HEIGHT: f64 = 20.0;

/// A static page: queries work, interactions are recorded and ignored,
/// the clipboard is unavailable.
///
/// The page is parsed once; handles are element ordinals in document order.
#[derive(Debug)]
pub struct SnapshotPage {
    document: Mutex<Document>,
    url: String,
    clicks: Mutex<Vec<ElementHandle>>,
    keys: Mutex<Vec<String>>,
}

/// Parsed snapshot with an element index in both directions.
#[derive(Debug)]
struct Document {
    html: Html,
    order: Vec<NodeId>,
    handles: HashMap<NodeId, ElementHandle>,
}

impl Document {
    fn parse(source: &str) -> Self {
        let html = Html::parse_document(source);
        let order: Vec<NodeId> = html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(|el| el.id())
            .collect();
        let handles = order
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, ElementHandle(i as u64)))
            .collect();
        Self {
            html,
            order,
            handles,
        }
    }

    fn element(&self, handle: ElementHandle) -> Result<ElementRef<'_>> {
        self.order
            .get(handle.0 as usize)
            .and_then(|id| self.html.tree.get(*id))
            .and_then(ElementRef::wrap)
            .ok_or_else(|| Error::Page(format!("stale element handle {}", handle)))
    }

    fn handle(&self, element: &ElementRef<'_>) -> Option<ElementHandle> {
        self.handles.get(&element.id()).copied()
    }
}

impl SnapshotPage {
    /// Wrap HTML source.
    pub fn new(html: impl AsRef<str>) -> Self {
        Self {
            document: Mutex::new(Document::parse(html.as_ref())),
            url: String::new(),
            clicks: Mutex::default(),
            keys: Mutex::default(),
        }
    }

    /// Read a saved page from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    /// Set the URL reported by [`PageDriver::page_url`].
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Elements clicked so far, in order.
    pub fn clicks(&self) -> Vec<ElementHandle> {
        self.clicks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Keys pressed so far, in order.
    pub fn keys_pressed(&self) -> Vec<String> {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn with_document<R>(&self, f: impl FnOnce(&Document) -> Result<R>) -> Result<R> {
        let document = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        f(&*document)
    }

    fn select(&self, scope: Option<ElementHandle>, selector: &str) -> Result<Vec<ElementHandle>> {
        let selector = parse_selector(selector)?;
        self.with_document(|doc| {
            let found: Vec<ElementRef<'_>> = match scope {
                Some(handle) => doc.element(handle)?.select(&selector).collect(),
                None => doc.html.select(&selector).collect(),
            };
            Ok(found.iter().filter_map(|el| doc.handle(el)).collect())
        })
    }
}

/// Hidden by attribute or inline style, on the element or an ancestor.
fn is_hidden(element: &ElementRef<'_>) -> bool {
    std::iter::once(*element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .any(|el| {
            let value = el.value();
            if value.attr("hidden").is_some() {
                return true;
            }
            if value
                .attr("aria-hidden")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
            {
                return true;
            }
            value.attr("style").is_some_and(|style| {
                let compact: String = style
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_ascii_lowercase();
                compact.contains("display:none")
            })
        })
}

#[async_trait]
impl PageDriver for SnapshotPage {
    async fn query_all(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>> {
        self.select(scope, selector)
    }

    async fn matches(&self, element: ElementHandle, selector: &str) -> Result<bool> {
        let selector = parse_selector(selector)?;
        self.with_document(|doc| Ok(selector.matches(&doc.element(element)?)))
    }

    async fn outer_html(&self, element: ElementHandle) -> Result<String> {
        self.with_document(|doc| Ok(doc.element(element)?.html()))
    }

    async fn text_content(&self, element: ElementHandle) -> Result<String> {
        self.with_document(|doc| Ok(doc.element(element)?.text().collect()))
    }

    async fn attribute(&self, element: ElementHandle, name: &str) -> Result<Option<String>> {
        self.with_document(|doc| {
            Ok(doc
                .element(element)?
                .value()
                .attr(name)
                .map(str::to_string))
        })
    }

    async fn rendered_height(&self, element: ElementHandle) -> Result<f64> {
        self.with_document(|doc| {
            let el = doc.element(element)?;
            if is_hidden(&el) {
                return Ok(0.0);
            }
            let text: String = el.text().collect();
            Ok(text.lines().count().max(1) as f64 * LINE_HEIGHT)
        })
    }

    async fn scroll_into_view(&self, element: ElementHandle) -> Result<()> {
        self.with_document(|doc| doc.element(element).map(|_| ()))
    }

    async fn click(&self, element: ElementHandle) -> Result<()> {
        self.with_document(|doc| doc.element(element).map(|_| ()))?;
        log::debug!("snapshot click on {}", element);
        self.clicks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(element);
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.to_string());
        Ok(())
    }

    async fn read_clipboard(&self) -> Result<String> {
        Err(Error::Clipboard("no clipboard in a page snapshot".into()))
    }

    async fn page_url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    async fn page_title(&self) -> Result<String> {
        self.with_document(|doc| {
            Ok(doc
                .html
                .select(&TITLE)
                .next()
                .map(|t| t.text().collect::<String>().trim().to_string())
                .unwrap_or_default())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title> Saved chat </title></head><body>
        <div class="msg" data-role="user"><p>Hi</p></div>
        <div class="msg" data-role="assistant"><p>Hello</p><button>Copy</button></div>
        <div role="dialog" style="display: none"><pre>hidden</pre></div>
        <div hidden><span class="inner">gone</span></div>
    </body></html>"#;

    #[tokio::test]
    async fn test_query_and_read() {
        let page = SnapshotPage::new(PAGE).with_url("https://example.com/chat/1");
        let messages = page.query_all(None, ".msg").await.unwrap();
        assert_eq!(messages.len(), 2);

        let role = page.attribute(messages[1], "data-role").await.unwrap();
        assert_eq!(role.as_deref(), Some("assistant"));
        assert_eq!(page.text_content(messages[0]).await.unwrap(), "Hi");
        assert!(page.outer_html(messages[1]).await.unwrap().contains("<button>Copy</button>"));

        let buttons = page.query_all(Some(messages[1]), "button").await.unwrap();
        assert_eq!(buttons.len(), 1);
        assert!(page.query_all(Some(messages[0]), "button").await.unwrap().is_empty());

        assert_eq!(page.page_title().await.unwrap(), "Saved chat");
        assert_eq!(page.page_url().await.unwrap(), "https://example.com/chat/1");
    }

    #[tokio::test]
    async fn test_visibility() {
        let page = SnapshotPage::new(PAGE);
        let dialog = page.query(None, r#"[role="dialog"]"#).await.unwrap().unwrap();
        let inner = page.query(None, ".inner").await.unwrap().unwrap();
        let msg = page.query(None, ".msg").await.unwrap().unwrap();

        assert_eq!(page.rendered_height(dialog).await.unwrap(), 0.0);
        assert_eq!(page.rendered_height(inner).await.unwrap(), 0.0);
        assert!(page.rendered_height(msg).await.unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_interactions_recorded() {
        let page = SnapshotPage::new(PAGE);
        let msg = page.query(None, ".msg").await.unwrap().unwrap();
        page.click(msg).await.unwrap();
        page.press_key("Escape").await.unwrap();

        assert_eq!(page.clicks(), vec![msg]);
        assert_eq!(page.keys_pressed(), vec!["Escape".to_string()]);
        assert!(matches!(page.read_clipboard().await, Err(Error::Clipboard(_))));
        assert!(matches!(
            page.click(ElementHandle(9999)).await,
            Err(Error::Page(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_selector() {
        let page = SnapshotPage::new(PAGE);
        assert!(matches!(
            page.query_all(None, "div[").await,
            Err(Error::InvalidSelector(_))
        ));
    }
}
