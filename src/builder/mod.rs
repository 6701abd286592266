//! Document model builder: DOM fragment to [`ContentNode`] tree.
//!
//! The builder consumes an owned, parsed clone of a message container.
//! Noise selectors are detached from that clone, then a single recursive
//! walk classifies each element with a [`Classifier`] and emits nodes in
//! reading order. Building never fails: anything that cannot be classified
//! is flattened into its parent.
//!
//! ```
//! use unchat::builder::{build_html, BuildConfig};
//! use unchat::ContentNode;
//!
//! let nodes = build_html("<h2>Plan</h2><p>Step one</p>", &BuildConfig::default());
//! assert_eq!(nodes.len(), 2);
//! assert!(matches!(nodes[0], ContentNode::Heading { level: 2, .. }));
//! ```

mod block;
mod classify;
mod inline;
mod noise;
mod text;

pub use classify::{parse_selector, Action, Classifier, Matcher, Rule, RuleKind};
pub use inline::{collapse_whitespace, normalize_runs};
pub use noise::NoiseFilter;
pub use text::build_text;

use crate::error::Result;
use crate::model::ContentNode;
use block::BlockWalker;
use rayon::prelude::*;
use scraper::Html;

/// Compiled builder configuration.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Selectors stripped before the walk
    pub noise: NoiseFilter,

    /// Classification rules
    pub classifier: Classifier,

    /// Build batches on the rayon pool
    pub parallel: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            noise: NoiseFilter::default(),
            classifier: Classifier::default(),
            parallel: true,
        }
    }
}

impl BuildConfig {
    /// Compile platform noise selectors and rules. Platform rules take
    /// precedence over the standard HTML rules.
    pub fn new<S: AsRef<str>>(noise: &[S], rules: &[Rule]) -> Result<Self> {
        Ok(Self {
            noise: NoiseFilter::new(noise)?,
            classifier: Classifier::with_platform_rules(rules)?,
            parallel: true,
        })
    }

    /// Enable or disable parallel batch building.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Build nodes from an owned fragment.
///
/// The fragment is mutated (noise detached) and dropped; callers hand over
/// a clone, never the live tree.
pub fn build(mut fragment: Html, filter: &NoiseFilter, rules: &Classifier) -> Vec<ContentNode> {
    let removed = filter.strip(&mut fragment);
    let nodes = BlockWalker::new(rules).build_children(fragment.root_element());
    log::debug!(
        "built {} nodes ({} noise subtrees removed)",
        nodes.len(),
        removed
    );
    nodes
}

/// Parse serialized HTML and build nodes from it.
pub fn build_html(html: &str, config: &BuildConfig) -> Vec<ContentNode> {
    build(Html::parse_fragment(html), &config.noise, &config.classifier)
}

/// Build many fragments. Output order always matches input order.
pub fn build_batch(fragments: &[String], config: &BuildConfig) -> Vec<Vec<ContentNode>> {
    if config.parallel && fragments.len() > 1 {
        // Html is not Send; each task parses its own fragment
        fragments
            .par_iter()
            .map(|html| build_html(html, config))
            .collect()
    } else {
        fragments
            .iter()
            .map(|html| build_html(html, config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InlineRun, TextRun, TextStyle};

    #[test]
    fn test_loose_inline_becomes_paragraph() {
        let nodes = build_html(
            "<div>Hello <strong>World</strong><pre><code>x</code></pre>tail</div>",
            &BuildConfig::default(),
        );
        assert_eq!(nodes.len(), 3);
        assert_eq!(
            nodes[0],
            ContentNode::Paragraph {
                runs: vec![
                    InlineRun::text("Hello "),
                    InlineRun::Text(TextRun::styled(
                        "World",
                        TextStyle {
                            bold: true,
                            ..Default::default()
                        }
                    )),
                ]
            }
        );
        assert_eq!(nodes[1], ContentNode::code_block("", "x"));
        assert_eq!(nodes[2], ContentNode::text("tail"));
    }

    #[test]
    fn test_platform_noise() {
        let config = BuildConfig::new(&[".copy-label"], &[]).unwrap();
        let nodes = build_html(
            r#"<p><span class="copy-label">Copy</span>Answer</p>"#,
            &config,
        );
        assert_eq!(nodes, vec![ContentNode::text("Answer")]);
    }

    #[test]
    fn test_batch_preserves_order() {
        let fragments: Vec<String> = (0..16).map(|i| format!("<p>m{}</p>", i)).collect();
        let built = build_batch(&fragments, &BuildConfig::default());
        for (i, nodes) in built.iter().enumerate() {
            assert_eq!(nodes[0], ContentNode::text(format!("m{}", i)));
        }
    }
}
