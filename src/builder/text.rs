//! Builds nodes from plain or clipboard text.

use super::inline::{normalize_runs, push_text};
use crate::model::{ContentNode, InlineRun, TextStyle};

/// An open ``` fence.
struct Fence<'a> {
    marker_len: usize,
    language: String,
    lines: Vec<&'a str>,
}

impl Fence<'_> {
    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.len() >= self.marker_len && trimmed.chars().all(|c| c == '`')
    }

    fn into_node(self) -> ContentNode {
        ContentNode::code_block(self.language, self.lines.join("\n"))
    }
}

/// Build nodes from text copied out of a chat UI.
///
/// Blank lines separate paragraphs; single newlines inside a paragraph
/// become hard line breaks. Fenced blocks become code blocks with their
/// content kept verbatim. An unterminated fence runs to the end of input.
pub fn build_text(text: &str) -> Vec<ContentNode> {
    let mut nodes = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut fence: Option<Fence<'_>> = None;

    for line in text.lines() {
        if let Some(open) = fence.as_mut() {
            if open.closes(line) {
                if let Some(done) = fence.take() {
                    nodes.push(done.into_node());
                }
            } else {
                open.lines.push(line);
            }
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            flush_paragraph(&mut paragraph, &mut nodes);
            let marker_len = trimmed.chars().take_while(|&c| c == '`').count();
            fence = Some(Fence {
                marker_len,
                language: trimmed[marker_len..].trim().to_string(),
                lines: Vec::new(),
            });
        } else if line.trim().is_empty() {
            flush_paragraph(&mut paragraph, &mut nodes);
        } else {
            paragraph.push(line);
        }
    }

    if let Some(open) = fence {
        nodes.push(open.into_node());
    }
    flush_paragraph(&mut paragraph, &mut nodes);
    nodes
}

fn flush_paragraph(lines: &mut Vec<&str>, nodes: &mut Vec<ContentNode>) {
    if lines.is_empty() {
        return;
    }
    let mut runs = Vec::new();
    for (i, line) in lines.drain(..).enumerate() {
        if i > 0 {
            runs.push(InlineRun::LineBreak);
        }
        push_text(&mut runs, line, TextStyle::default());
    }
    let runs = normalize_runs(runs);
    if !runs.is_empty() {
        nodes.push(ContentNode::Paragraph { runs });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs() {
        let nodes = build_text("First line\nsecond\n\n\nThird");
        assert_eq!(nodes.len(), 2);
        assert_eq!(
            nodes[0],
            ContentNode::Paragraph {
                runs: vec![
                    InlineRun::text("First line"),
                    InlineRun::LineBreak,
                    InlineRun::text("second"),
                ]
            }
        );
        assert_eq!(nodes[1], ContentNode::text("Third"));
    }

    #[test]
    fn test_fenced_code_kept_verbatim() {
        let nodes = build_text("Look:\n```rust\nfn main() {\n    let x  =  1;\n}\n```\nDone");
        assert_eq!(nodes.len(), 3);
        assert_eq!(
            nodes[1],
            ContentNode::code_block("rust", "fn main() {\n    let x  =  1;\n}")
        );
    }

    #[test]
    fn test_unterminated_fence() {
        let nodes = build_text("```\nabc");
        assert_eq!(nodes, vec![ContentNode::code_block("", "abc")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_text("  \n\n ").is_empty());
    }
}
