//! Noise stripping: UI chrome removed from a cloned fragment before the walk.

use super::classify::parse_selector;
use crate::error::Result;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Elements that never carry message content.
static ALWAYS_SKIP: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script, style, noscript, template, svg").expect("valid selector")
});

/// Compiled set of selectors whose matches are detached before building.
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    selectors: Vec<Selector>,
}

impl NoiseFilter {
    /// Compile a list of CSS selectors.
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> Result<Self> {
        let selectors = selectors
            .iter()
            .map(|css| parse_selector(css.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { selectors })
    }

    /// Number of configured selectors, not counting the built-in ones.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Detach every matching element from `html`. Returns how many
    /// subtrees were removed.
    pub fn strip(&self, html: &mut Html) -> usize {
        let mut ids = Vec::new();
        for selector in std::iter::once(&*ALWAYS_SKIP).chain(&self.selectors) {
            ids.extend(html.select(selector).map(|el| el.id()));
        }

        let root = html.tree.root().id();
        let mut removed = 0;
        for id in ids {
            // Skip nodes already detached together with an ancestor
            let attached = html
                .tree
                .get(id)
                .is_some_and(|node| node.ancestors().any(|a| a.id() == root));
            if !attached {
                continue;
            }
            if let Some(mut node) = html.tree.get_mut(id) {
                node.detach();
                removed += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_configured_and_builtin() {
        let filter = NoiseFilter::new(&["button", ".sr-only"]).unwrap();
        let mut html = Html::parse_fragment(
            r#"<div><button>Copy</button><span class="sr-only">You said:</span><script>x()</script><p>Kept</p></div>"#,
        );

        let removed = filter.strip(&mut html);
        assert_eq!(removed, 3);

        let text: String = html.root_element().text().collect();
        assert_eq!(text, "Kept");
    }

    #[test]
    fn test_nested_matches_counted_once() {
        let filter = NoiseFilter::new(&[".chrome"]).unwrap();
        let mut html =
            Html::parse_fragment(r#"<div class="chrome"><div class="chrome">x</div></div>y"#);
        assert_eq!(filter.strip(&mut html), 1);
    }
}
