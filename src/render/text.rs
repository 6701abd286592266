//! Plain text rendering for conversations.

use crate::error::Result;
use crate::model::{ContentNode, Conversation, Role};

use super::{CleanupPipeline, RenderOptions};

/// Convert a conversation to plain text.
///
/// This is the projection handed to PDF and image sinks: no Markdown
/// markers, one labelled block per message.
pub fn to_text(conversation: &Conversation, options: &RenderOptions) -> Result<String> {
    let pipeline = options.cleanup.clone().map(CleanupPipeline::new);
    let clean = |text: &str| match &pipeline {
        Some(pipeline) => pipeline.process(text),
        None => text.to_string(),
    };
    let mut sections = Vec::new();

    if options.include_header {
        let meta = &conversation.metadata;
        sections.push(clean(&format!(
            "{}\nPlatform: {}\nExported: {}\nMessages: {}",
            meta.title,
            meta.platform,
            options.export_timestamp().format("%Y-%m-%d"),
            conversation.message_count()
        )));
    }

    for message in &conversation.messages {
        let role = match message.role {
            Role::User => "User",
            Role::Assistant => options.assistant_name.as_str(),
        };
        let mut section = format!("{}:\n", role);
        if let Some(ref thinking) = message.thinking {
            section.push_str(&format!("[Thinking]\n{}\n\n", clean(thinking.trim())));
        }
        section.push_str(&nodes_text(&message.content, &clean));
        sections.push(section);
    }

    Ok(sections.join("\n\n").trim().to_string())
}

/// Plain text of `nodes`; code and math pass by `clean` untouched.
fn nodes_text(nodes: &[ContentNode], clean: &dyn Fn(&str) -> String) -> String {
    nodes
        .iter()
        .map(|node| match node {
            ContentNode::CodeBlock { text, .. } | ContentNode::MathBlock { text } => text.clone(),
            ContentNode::Blockquote { children } => nodes_text(children, clean),
            other => clean(&other.plain_text()),
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentNode, InlineRun, Message, Metadata};

    #[test]
    fn test_to_text() {
        let mut conv = Conversation::new(Metadata::new("Notes", "Claude"));
        conv.add_message(Message::user(vec![ContentNode::text("Hello, world!")]));
        conv.add_message(Message::assistant(vec![ContentNode::paragraph(vec![
            InlineRun::bold("Second"),
            InlineRun::text(" paragraph."),
        ])]));

        let options = RenderOptions::new().with_header(false);
        let result = to_text(&conv, &options).unwrap();

        assert_eq!(result, "User:\nHello, world!\n\nAssistant:\nSecond paragraph.");
    }

    #[test]
    fn test_cleanup_leaves_code_alone() {
        let mut conv = Conversation::new(Metadata::new("Notes", "Claude"));
        conv.add_message(Message::assistant(vec![
            ContentNode::text("Run\u{00A0}this:"),
            ContentNode::code_block("py", "import os\n\n\nCopy\nx = 1"),
        ]));

        let options = RenderOptions::new()
            .with_header(false)
            .with_cleanup_preset(crate::render::CleanupPreset::Standard);
        let result = to_text(&conv, &options).unwrap();

        assert_eq!(result, "Assistant:\nRun this:\n\nimport os\n\n\nCopy\nx = 1");
    }
}
