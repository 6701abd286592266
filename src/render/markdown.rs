//! Markdown rendering for conversations.

use crate::error::Result;
use crate::model::{Conversation, ContentNode, InlineRun, List, Message, Role, Table, TextRun, TextStyle};

use super::{CleanupPipeline, ExtractionStats, RenderOptions, RenderResult};

/// Convert a conversation to Markdown.
pub fn to_markdown(conversation: &Conversation, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(conversation)
}

/// Convert a conversation to Markdown with statistics.
pub fn to_markdown_with_stats(
    conversation: &Conversation,
    options: &RenderOptions,
) -> Result<RenderResult> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render_with_stats(conversation)
}

/// Render a bare node sequence, without message framing.
pub fn nodes_to_markdown(nodes: &[ContentNode], options: &RenderOptions) -> String {
    let mut renderer = MarkdownRenderer::new(options.clone());
    finish(renderer.render_nodes(nodes))
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
    stats: ExtractionStats,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
        }
    }

    /// Render a conversation to Markdown.
    pub fn render(mut self, conversation: &Conversation) -> Result<String> {
        self.render_internal(conversation)
    }

    /// Render a conversation to Markdown with extraction statistics.
    pub fn render_with_stats(mut self, conversation: &Conversation) -> Result<RenderResult> {
        self.options.collect_stats = true;
        let content = self.render_internal(conversation)?;
        self.stats.count_text(&content);

        Ok(RenderResult::new(
            content,
            conversation.metadata.clone(),
            self.stats,
        ))
    }

    fn render_internal(&mut self, conversation: &Conversation) -> Result<String> {
        let mut output = String::new();
        let export_date = self.options.export_timestamp().format("%Y-%m-%d").to_string();

        if self.options.include_frontmatter {
            output.push_str(
                &conversation
                    .metadata
                    .to_yaml_frontmatter(&export_date, conversation.message_count()),
            );
            output.push('\n');
        }

        if self.options.include_header {
            self.render_header(&mut output, conversation, &export_date);
        }

        let messages: Vec<String> = conversation
            .messages
            .iter()
            .map(|m| self.render_message(m))
            .collect();
        output.push_str(&messages.join("\n\n---\n\n"));

        if let Some(ref cleanup_options) = self.options.cleanup {
            let pipeline = CleanupPipeline::new(cleanup_options.clone());
            output = pipeline.process(&output);
        }

        Ok(finish(output))
    }

    fn render_header(&self, output: &mut String, conversation: &Conversation, export_date: &str) {
        let meta = &conversation.metadata;
        let title = if meta.title.trim().is_empty() {
            "Untitled Conversation"
        } else {
            meta.title.trim()
        };

        output.push_str(&format!("# {}\n\n", title));
        output.push_str(&format!("**Platform:** {}\n", meta.platform));
        output.push_str(&format!("**Exported:** {}\n", export_date));
        output.push_str(&format!("**Messages:** {}\n\n", conversation.message_count()));
        output.push_str("---\n\n");
    }

    fn render_message(&mut self, message: &Message) -> String {
        if self.options.collect_stats {
            self.stats.add_message(message.role);
        }

        let role = match message.role {
            Role::User => "User",
            Role::Assistant => self.options.assistant_name.as_str(),
        };
        let mut output = format!("**{}:**\n\n", role);

        if let Some(ref thinking) = message.thinking {
            if self.options.collect_stats {
                self.stats.add_thinking();
            }
            let quoted = quote_lines(&format!("**Thinking:**\n\n{}", thinking.trim()));
            output.push_str(&quoted);
            output.push_str("\n\n");
        }

        output.push_str(&self.render_nodes(&message.content));
        output.trim_end().to_string()
    }

    /// Render nodes, each followed by one blank line.
    fn render_nodes(&mut self, nodes: &[ContentNode]) -> String {
        let mut output = String::new();
        for node in nodes {
            let block = self.render_block(node);
            if block.is_empty() {
                continue;
            }
            output.push_str(&block);
            output.push_str("\n\n");
        }
        output
    }

    fn render_block(&mut self, node: &ContentNode) -> String {
        match node {
            ContentNode::Paragraph { runs } => {
                if self.options.collect_stats {
                    self.stats.add_paragraph();
                }
                self.render_inline_content(runs)
            }
            ContentNode::Heading { level, runs } => {
                if self.options.collect_stats {
                    self.stats.add_heading();
                }
                let level = (*level).min(self.options.max_heading_level).max(1);
                format!(
                    "{} {}",
                    "#".repeat(level as usize),
                    self.render_inline_content(runs)
                )
            }
            ContentNode::CodeBlock { language, text } => {
                if self.options.collect_stats {
                    self.stats.add_code_block();
                }
                render_code_block(language, text)
            }
            ContentNode::List(list) => {
                let mut lines = Vec::new();
                self.render_list(&mut lines, list, 0);
                lines.join("\n")
            }
            ContentNode::Table(table) => {
                if self.options.collect_stats {
                    self.stats.add_table();
                }
                self.render_table(table)
            }
            ContentNode::Blockquote { children } => {
                let inner = self.render_nodes(children);
                quote_lines(inner.trim_end())
            }
            ContentNode::MathInline { text } => {
                if self.options.collect_stats {
                    self.stats.add_math();
                }
                format!("${}$", text)
            }
            ContentNode::MathBlock { text } => {
                if self.options.collect_stats {
                    self.stats.add_math();
                }
                format!("$$\n{}\n$$", text)
            }
            ContentNode::HorizontalRule => {
                if self.options.collect_stats {
                    self.stats.add_horizontal_rule();
                }
                "---".to_string()
            }
        }
    }

    fn render_list(&mut self, lines: &mut Vec<String>, list: &List, depth: usize) {
        let indent = "  ".repeat(depth);

        for (i, item) in list.items.iter().enumerate() {
            if self.options.collect_stats {
                self.stats.add_list_item();
            }

            let marker = if list.ordered {
                format!("{}.", list.start as usize + i)
            } else {
                self.options.list_marker.to_string()
            };

            // Continuation lines line up under the item text
            let continuation = format!("\n{}{}", indent, " ".repeat(marker.len() + 1));
            let text = self
                .render_inline_content(&item.runs)
                .replace('\n', &continuation);

            lines.push(format!("{}{} {}", indent, marker, text).trim_end().to_string());

            for nested in &item.nested {
                self.render_list(lines, nested, depth + 1);
            }
        }
    }

    fn render_inline_content(&mut self, runs: &[InlineRun]) -> String {
        let mut output = String::new();
        for run in runs {
            match run {
                InlineRun::Text(text_run) => self.render_text_run(&mut output, text_run),
                InlineRun::Code { text } => output.push_str(&render_code_span(text)),
                InlineRun::Link { text, href, title } => {
                    if self.options.collect_stats {
                        self.stats.add_link();
                    }
                    let label = if text.is_empty() { href.as_str() } else { text.as_str() };
                    let label = self.escape(label);
                    if href.is_empty() {
                        output.push_str(&label);
                    } else if let Some(t) = title {
                        output.push_str(&format!("[{}]({} \"{}\")", label, href, t));
                    } else {
                        output.push_str(&format!("[{}]({})", label, href));
                    }
                }
                InlineRun::Image { alt, src, title } => {
                    if self.options.collect_stats {
                        self.stats.add_image();
                    }
                    if let Some(t) = title {
                        output.push_str(&format!("![{}]({} \"{}\")", alt, src, t));
                    } else {
                        output.push_str(&format!("![{}]({})", alt, src));
                    }
                }
                InlineRun::Math { text } => {
                    if self.options.collect_stats {
                        self.stats.add_math();
                    }
                    output.push_str(&format!("${}$", text));
                }
                InlineRun::LineBreak => {
                    if self.options.preserve_line_breaks {
                        output.push_str("  \n");
                    } else {
                        output.push(' ');
                    }
                }
            }
        }
        output
    }

    fn render_text_run(&self, output: &mut String, run: &TextRun) {
        let text = self.escape(&run.text);
        output.push_str(&apply_text_style(&text, &run.style));
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }

    fn render_table(&mut self, table: &Table) -> String {
        let col_count = table.column_count();
        if col_count == 0 {
            return String::new();
        }

        let mut lines = Vec::with_capacity(table.row_count() + 2);
        let header: Vec<String> = table.header_cells.iter().map(|c| table_cell(c)).collect();
        lines.push(format!("| {} |", header.join(" | ")));
        lines.push(format!("|{}", " --- |".repeat(col_count)));

        for row in &table.rows {
            let cells: Vec<String> = row
                .cells
                .iter()
                .map(|cell| {
                    let rendered = self.render_inline_content(&cell.runs);
                    table_cell(&rendered)
                })
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));
        }

        lines.join("\n")
    }
}

/// Wrap styled text in markers, keeping surrounding whitespace outside.
fn apply_text_style(text: &str, style: &TextStyle) -> String {
    let core = text.trim();
    if !style.has_styling() || core.is_empty() {
        return text.to_string();
    }

    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];

    // Innermost first
    let mut result = core.to_string();
    if style.strikethrough {
        result = format!("~~{}~~", result);
    }
    if style.italic {
        result = format!("*{}*", result);
    }
    if style.bold {
        result = format!("**{}**", result);
    }

    format!("{}{}{}", leading, result, trailing)
}

/// Fenced code block; the fence outgrows any backtick run in the code.
fn render_code_block(language: &str, text: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(text).max(2) + 1);
    if text.is_empty() {
        format!("{}{}\n{}", fence, language, fence)
    } else {
        format!("{}{}\n{}\n{}", fence, language, text, fence)
    }
}

fn render_code_span(text: &str) -> String {
    let text = text.replace('\n', " ");
    let ticks = longest_backtick_run(&text);
    if ticks == 0 {
        format!("`{}`", text)
    } else {
        let fence = "`".repeat(ticks + 1);
        format!("{} {} {}", fence, text, fence)
    }
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn table_cell(text: &str) -> String {
    text.replace("  \n", " ")
        .replace('\n', " ")
        .replace('|', "\\|")
        .trim()
        .to_string()
}

/// Prefix every line with `> `; blank lines get a bare `>`.
fn quote_lines(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trim trailing whitespace, ending with exactly one newline.
fn finish(output: String) -> String {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}

/// Escape special Markdown characters.
/// Only characters that could be misinterpreted as Markdown syntax are
/// escaped, to keep the transcript readable.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListItem, Metadata, TableRow};
    use chrono::{TimeZone, Utc};

    fn options() -> RenderOptions {
        RenderOptions::new().with_export_date(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
    }

    #[test]
    fn test_style_keeps_spaces_outside_markers() {
        let bold = TextStyle {
            bold: true,
            ..Default::default()
        };
        assert_eq!(apply_text_style(" World ", &bold), " **World** ");
        assert_eq!(apply_text_style("  ", &bold), "  ");
    }

    #[test]
    fn test_code_fence_grows() {
        assert_eq!(render_code_block("rust", "x"), "```rust\nx\n```");
        assert_eq!(
            render_code_block("md", "```\ninner\n```"),
            "````md\n```\ninner\n```\n````"
        );
        assert_eq!(render_code_span("a`b"), "`` a`b ``");
    }

    #[test]
    fn test_header_and_messages() {
        let mut conv = Conversation::new(Metadata::new("Trip plan", "Claude"));
        conv.add_message(Message::user(vec![ContentNode::text("Where to?")]));
        conv.add_message(
            Message::assistant(vec![ContentNode::text("Lisbon.")]).with_thinking("Weather\nCost"),
        );

        let md = to_markdown(&conv, &options().with_assistant_name("Claude")).unwrap();
        let expected = "# Trip plan\n\n\
            **Platform:** Claude\n\
            **Exported:** 2025-01-02\n\
            **Messages:** 2\n\n\
            ---\n\n\
            **User:**\n\n\
            Where to?\n\n\
            ---\n\n\
            **Claude:**\n\n\
            > **Thinking:**\n\
            >\n\
            > Weather\n\
            > Cost\n\n\
            Lisbon.\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_empty_conversation_is_header_only() {
        let conv = Conversation::new(Metadata::new("Empty", "ChatGPT"));
        let md = to_markdown(&conv, &options()).unwrap();
        assert!(md.starts_with("# Empty\n"));
        assert!(md.contains("**Messages:** 0"));
        assert!(md.ends_with("---\n"));
    }

    #[test]
    fn test_nested_list() {
        let mut nested = List::ordered(1);
        nested.push(ListItem::text("inner"));
        let mut item = ListItem::text("outer");
        item.nested.push(nested);
        let mut list = List::unordered();
        list.push(item);

        let md = nodes_to_markdown(&[ContentNode::List(list)], &options());
        assert_eq!(md, "- outer\n  1. inner\n");
    }

    #[test]
    fn test_table_escapes_pipes() {
        let mut table = Table::with_header(["a|b", "c"]);
        table.add_row(TableRow::from_strings(["1", "2"]));

        let md = nodes_to_markdown(&[ContentNode::Table(table)], &options());
        assert_eq!(md, "| a\\|b | c |\n| --- | --- |\n| 1 | 2 |\n");
    }

    #[test]
    fn test_blockquote() {
        let quote = ContentNode::Blockquote {
            children: vec![ContentNode::text("one"), ContentNode::text("two")],
        };
        let md = nodes_to_markdown(&[quote], &options());
        assert_eq!(md, "> one\n>\n> two\n");
    }

    #[test]
    fn test_stats() {
        let mut conv = Conversation::new(Metadata::new("T", "P"));
        conv.add_message(Message::assistant(vec![
            ContentNode::heading(2, vec![InlineRun::text("H")]),
            ContentNode::code_block("", "x"),
            ContentNode::paragraph(vec![InlineRun::link("site", "https://a.b")]),
        ]));

        let result = to_markdown_with_stats(&conv, &options()).unwrap();
        assert_eq!(result.stats.message_count, 1);
        assert_eq!(result.stats.heading_count, 1);
        assert_eq!(result.stats.code_block_count, 1);
        assert_eq!(result.stats.link_count, 1);
    }
}
