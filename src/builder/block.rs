//! Recursive DOM walk producing block-level nodes.

use super::classify::{Action, Classifier};
use super::inline::{normalize_runs, push_text};
use crate::model::{ContentNode, InlineRun, List, ListItem, Table, TableCell, TableRow, TextStyle};
use scraper::node::Node;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

static TABLE_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));

static TEX_ANNOTATION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"annotation[encoding="application/x-tex"]"#).expect("valid selector")
});

/// Tags that continue the surrounding paragraph instead of starting a block.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "del", "dfn", "em", "font",
    "i", "img", "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strike",
    "strong", "sub", "sup", "time", "u", "var", "wbr",
];

/// Output of a walk over one container: finished blocks plus the open
/// implicit paragraph.
#[derive(Default)]
struct Walk {
    nodes: Vec<ContentNode>,
    pending: Vec<InlineRun>,
}

impl Walk {
    /// Close the implicit paragraph.
    fn flush(&mut self) {
        let runs = normalize_runs(std::mem::take(&mut self.pending));
        if runs.is_empty() {
            return;
        }
        // Math standing alone outside running text
        if let [InlineRun::Math { text }] = runs.as_slice() {
            self.nodes.push(ContentNode::MathInline { text: text.clone() });
            return;
        }
        self.nodes.push(ContentNode::Paragraph { runs });
    }

    fn push_block(&mut self, node: ContentNode) {
        self.flush();
        if !node.is_empty() {
            self.nodes.push(node);
        }
    }

    fn finish(mut self) -> Vec<ContentNode> {
        self.flush();
        self.nodes
    }

    /// Collapse everything gathered into a single inline sequence.
    fn into_runs(self) -> Vec<InlineRun> {
        let mut runs = Vec::new();
        for node in self.nodes {
            if !runs.is_empty() {
                runs.push(InlineRun::text(" "));
            }
            match node {
                ContentNode::Paragraph { runs: inner } | ContentNode::Heading { runs: inner, .. } => {
                    runs.extend(inner)
                }
                ContentNode::MathInline { text } => runs.push(InlineRun::Math { text }),
                other => runs.push(InlineRun::text(other.plain_text())),
            }
        }
        if !runs.is_empty() && !self.pending.is_empty() {
            runs.push(InlineRun::text(" "));
        }
        runs.extend(self.pending);
        normalize_runs(runs)
    }
}

/// Walks an element tree with a fixed classifier.
pub struct BlockWalker<'c> {
    classifier: &'c Classifier,
}

impl<'c> BlockWalker<'c> {
    pub fn new(classifier: &'c Classifier) -> Self {
        Self { classifier }
    }

    /// Build the block nodes for the children of `el`.
    pub fn build_children(&self, el: ElementRef<'_>) -> Vec<ContentNode> {
        let mut walk = Walk::default();
        self.walk_children(el, TextStyle::default(), &mut walk);
        walk.finish()
    }

    /// Build a single inline sequence from the children of `el`.
    fn inline_runs(&self, el: ElementRef<'_>) -> Vec<InlineRun> {
        let mut walk = Walk::default();
        self.walk_children(el, TextStyle::default(), &mut walk);
        walk.into_runs()
    }

    fn walk_children(&self, el: ElementRef<'_>, style: TextStyle, walk: &mut Walk) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) => push_text(&mut walk.pending, text, style),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.walk_element(child, style, walk);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_element(&self, el: ElementRef<'_>, style: TextStyle, walk: &mut Walk) {
        if let Some(action) = self.classifier.classify(&el) {
            log::trace!("<{}> -> {:?}", el.value().name(), action);
            self.apply(action, el, style, walk);
            return;
        }

        let name = el.value().name();
        match name {
            "strong" | "b" => self.walk_children(
                el,
                TextStyle {
                    bold: true,
                    ..style
                },
                walk,
            ),
            "em" | "i" => self.walk_children(
                el,
                TextStyle {
                    italic: true,
                    ..style
                },
                walk,
            ),
            "s" | "del" | "strike" => self.walk_children(
                el,
                TextStyle {
                    strikethrough: true,
                    ..style
                },
                walk,
            ),
            "code" => walk.pending.push(InlineRun::code(el.text().collect::<String>())),
            "a" => walk.pending.push(link(el)),
            "img" => walk.pending.push(image(el)),
            "br" => walk.pending.push(InlineRun::LineBreak),
            _ if INLINE_TAGS.contains(&name) => self.walk_children(el, style, walk),
            // Unknown block container: splice children, closing paragraphs at its edges
            _ => {
                walk.flush();
                self.walk_children(el, style, walk);
                walk.flush();
            }
        }
    }

    fn apply(&self, action: &Action, el: ElementRef<'_>, style: TextStyle, walk: &mut Walk) {
        match action {
            Action::Skip => {}
            Action::Flatten => self.walk_children(el, style, walk),
            Action::Paragraph => {
                walk.flush();
                self.walk_children(el, style, walk);
                walk.flush();
            }
            Action::Heading => {
                let runs = self.inline_runs(el);
                walk.push_block(ContentNode::heading(heading_level(el), runs));
            }
            Action::CodeBlock { language, code } => {
                walk.push_block(code_block(el, language.as_ref(), code.as_ref()));
            }
            Action::MathInline => walk.pending.push(InlineRun::Math {
                text: math_text(el),
            }),
            Action::MathBlock => walk.push_block(ContentNode::MathBlock {
                text: math_text(el),
            }),
            Action::List => walk.push_block(ContentNode::List(self.list(el))),
            Action::Table => match self.table(el) {
                Some(table) => walk.push_block(ContentNode::Table(table)),
                None => {
                    walk.flush();
                    self.walk_children(el, style, walk);
                    walk.flush();
                }
            },
            Action::Blockquote => {
                let children = self.build_children(el);
                walk.push_block(ContentNode::Blockquote { children });
            }
            Action::HorizontalRule => walk.push_block(ContentNode::HorizontalRule),
        }
    }

    fn list(&self, el: ElementRef<'_>) -> List {
        let mut list = if el.value().name() == "ol" {
            let start = el
                .value()
                .attr("start")
                .and_then(|s| s.trim().parse::<u32>().ok())
                .unwrap_or(1);
            List::ordered(start)
        } else {
            List::unordered()
        };

        for item in el
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| c.value().name() == "li")
        {
            list.push(self.list_item(item));
        }
        list
    }

    fn list_item(&self, li: ElementRef<'_>) -> ListItem {
        let mut walk = Walk::default();
        let mut nested = Vec::new();

        for child in li.children() {
            match child.value() {
                Node::Text(text) => push_text(&mut walk.pending, text, TextStyle::default()),
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let is_list = matches!(child.value().name(), "ul" | "ol");
                    let skipped = matches!(self.classifier.classify(&child), Some(Action::Skip));
                    if is_list && !skipped {
                        nested.push(self.list(child));
                    } else {
                        self.walk_element(child, TextStyle::default(), &mut walk);
                    }
                }
                _ => {}
            }
        }

        ListItem {
            runs: walk.into_runs(),
            nested,
        }
    }

    fn table(&self, el: ElementRef<'_>) -> Option<Table> {
        // Rows of nested tables belong to those tables
        let rows: Vec<ElementRef<'_>> = el
            .select(&TABLE_ROW)
            .filter(|tr| {
                tr.ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|a| a.value().name() == "table")
                    .is_some_and(|t| t.id() == el.id())
            })
            .collect();

        if rows.is_empty() {
            return None;
        }

        let header_index = rows
            .iter()
            .position(|tr| {
                tr.parent()
                    .and_then(ElementRef::wrap)
                    .is_some_and(|p| p.value().name() == "thead")
            })
            .unwrap_or(0);

        let header = self
            .row_cells(rows[header_index])
            .iter()
            .map(TableCell::plain_text)
            .collect::<Vec<_>>();
        let mut table = Table::with_header(header);

        for (i, tr) in rows.iter().enumerate() {
            if i != header_index {
                table.add_row(TableRow::new(self.row_cells(*tr)));
            }
        }
        Some(table)
    }

    fn row_cells(&self, tr: ElementRef<'_>) -> Vec<TableCell> {
        tr.children()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "td" | "th"))
            .map(|cell| TableCell::with_runs(self.inline_runs(cell)))
            .collect()
    }
}

fn heading_level(el: ElementRef<'_>) -> u8 {
    let name = el.value().name();
    name.strip_prefix('h')
        .and_then(|n| n.parse::<u8>().ok())
        .or_else(|| el.value().attr("aria-level").and_then(|l| l.parse().ok()))
        .unwrap_or(2)
}

fn code_block(el: ElementRef<'_>, language: Option<&Selector>, code: Option<&Selector>) -> ContentNode {
    let code_el = code.and_then(|sel| el.select(sel).next());
    let text: String = code_el.unwrap_or(el).text().collect();
    let text = text.trim_end_matches(['\n', '\r']).to_string();

    let language = language
        .and_then(|sel| el.select(sel).next())
        .map(|label| label.text().collect::<String>().trim().to_string())
        .filter(|l| !l.is_empty())
        .or_else(|| code_el.and_then(class_language))
        .or_else(|| class_language(el))
        .or_else(|| data_language(code_el))
        .or_else(|| data_language(Some(el)))
        .unwrap_or_default();

    ContentNode::code_block(language, text)
}

fn class_language(el: ElementRef<'_>) -> Option<String> {
    el.value().classes().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    })
}

fn data_language(el: Option<ElementRef<'_>>) -> Option<String> {
    el?.value()
        .attr("data-language")
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

fn math_text(el: ElementRef<'_>) -> String {
    let source = el.select(&TEX_ANNOTATION).next().unwrap_or(el);
    source.text().collect::<String>().trim().to_string()
}

fn link(el: ElementRef<'_>) -> InlineRun {
    let mut text: String = el.text().collect();
    if text.trim().is_empty() {
        if let Some(alt) = el
            .descendants()
            .filter_map(ElementRef::wrap)
            .find_map(|d| d.value().attr("alt"))
        {
            text = alt.to_string();
        }
    }
    InlineRun::Link {
        text,
        href: el.value().attr("href").unwrap_or_default().to_string(),
        title: el.value().attr("title").map(str::to_string),
    }
}

fn image(el: ElementRef<'_>) -> InlineRun {
    InlineRun::Image {
        alt: el.value().attr("alt").unwrap_or_default().to_string(),
        src: el.value().attr("src").unwrap_or_default().to_string(),
        title: el.value().attr("title").map(str::to_string),
    }
}
