//! Integration tests for rendering conversations to export documents.

use chrono::{NaiveDate, TimeZone, Utc};
use unchat::builder::{build_html, BuildConfig};
use unchat::html_to_markdown;
use unchat::render::{
    export_filename, files_to_csv, gpts_to_csv, parse_conversation_json, render, render_with_stats,
    CleanupPipeline,
};
use unchat::{
    CleanupPreset, ContentNode, Conversation, ExportDocument, ExtractedFile, JsonFormat, Message,
    Metadata, OutputFormat, RenderOptions,
};

fn options() -> RenderOptions {
    RenderOptions::new()
        .with_assistant_name("Claude")
        .with_export_date(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
}

fn conversation() -> Conversation {
    let config = BuildConfig::default();
    let mut conv = Conversation::new(
        Metadata::new("Grocery \"plan\"", "Claude").with_url("https://claude.ai/chat/42"),
    );
    conv.add_message(Message::user(build_html(
        "<p>What should I buy?</p>",
        &config,
    )));
    conv.add_message(
        Message::assistant(build_html(
            "<h2>List</h2>\
             <table><tr><th>Item</th><th>Qty</th></tr><tr><td>Apples</td><td>3</td></tr></table>\
             <ol><li>Shop</li><li>Cook</li></ol>\
             <pre><code class=\"language-sh\">echo done</code></pre>",
            &config,
        ))
        .with_thinking("Keep it short."),
    );
    conv
}

#[test]
fn test_markdown_with_frontmatter() {
    let md = render(&conversation(), OutputFormat::Markdown, &options().with_frontmatter(true))
        .unwrap();
    let md = md.as_str().unwrap();

    assert!(md.starts_with(
        "---\n\
         title: \"Grocery \\\"plan\\\"\"\n\
         platform: \"Claude\"\n\
         url: \"https://claude.ai/chat/42\"\n\
         exported: 2025-01-02\n\
         messages: 2\n\
         ---\n\n\
         # Grocery \"plan\"\n"
    ));
    assert!(md.contains(
        "**Claude:**\n\n\
         > **Thinking:**\n\
         >\n\
         > Keep it short.\n\n\
         ## List\n\n\
         | Item | Qty |\n\
         | --- | --- |\n\
         | Apples | 3 |\n\n\
         1. Shop\n\
         2. Cook\n\n\
         ```sh\n\
         echo done\n\
         ```\n"
    ));
}

#[test]
fn test_cleanup_keeps_frontmatter() {
    let options = options()
        .with_frontmatter(true)
        .with_cleanup_preset(CleanupPreset::Aggressive);
    let md = render(&conversation(), OutputFormat::Markdown, &options).unwrap();
    assert!(md.as_str().unwrap().starts_with("---\ntitle:"));
}

#[test]
fn test_rendering_is_deterministic() {
    let conv = conversation();
    let options = options().with_cleanup_preset(CleanupPreset::Standard);
    for format in [OutputFormat::Markdown, OutputFormat::Json, OutputFormat::Text] {
        let first = render(&conv, format, &options).unwrap();
        let second = render(&conv, format, &options).unwrap();
        assert_eq!(first, second, "{} output differs", format);
    }
}

#[test]
fn test_cleanup_is_idempotent() {
    let md = render(&conversation(), OutputFormat::Markdown, &options())
        .unwrap()
        .as_str()
        .unwrap()
        .to_string();
    let pipeline = CleanupPipeline::from_preset(CleanupPreset::Aggressive);
    let once = pipeline.process(&md);
    assert_eq!(pipeline.process(&once), once);
}

#[test]
fn test_cleanup_leaves_code_verbatim() {
    let code = "```\nCopy\n```\nx = 1\n\n\ny = 2";
    let mut conv = Conversation::new(Metadata::new("T", "Claude"));
    conv.add_message(Message::assistant(vec![
        ContentNode::text("Example:"),
        ContentNode::code_block("md", code),
    ]));
    let options = options()
        .with_header(false)
        .with_cleanup_preset(CleanupPreset::Aggressive);

    let md = render(&conv, OutputFormat::Markdown, &options).unwrap();
    assert_eq!(
        md.as_str().unwrap(),
        format!("**Claude:**\n\nExample:\n\n````md\n{}\n````\n", code)
    );

    let text = render(&conv, OutputFormat::Text, &options).unwrap();
    assert_eq!(text.as_str().unwrap(), format!("Claude:\nExample:\n\n{}", code));
}

#[test]
fn test_short_table_row_padded() {
    let html = "<table><tr><th>a</th><th>b</th><th>c</th></tr><tr><td>1</td></tr></table>";
    assert_eq!(
        html_to_markdown(html),
        "| a | b | c |\n| --- | --- | --- |\n| 1 |  |  |\n"
    );
}

#[test]
fn test_json_record_parses_back() {
    let conv = conversation();
    let json = render(&conv, OutputFormat::Json, &options().with_json_format(JsonFormat::Compact))
        .unwrap();
    let json = json.as_str().unwrap();

    assert!(json.contains("\"exportDate\":\"2025-01-02T03:04:05+00:00\""));
    assert!(json.contains("\"platformTitle\":\"Claude\""));
    assert!(json.contains("\"messageCount\":2"));
    assert_eq!(parse_conversation_json(json).unwrap(), conv);
}

#[test]
fn test_text_export() {
    let mut conv = Conversation::new(Metadata::new("Short", "Claude"));
    conv.add_message(Message::user(build_html(
        "<p>Hi <strong>there</strong></p>",
        &BuildConfig::default(),
    )));
    conv.add_message(
        Message::assistant(build_html("<p>Hello</p><ul><li>a</li></ul>", &BuildConfig::default()))
            .with_thinking("greet"),
    );

    let text = render(&conv, OutputFormat::Text, &options()).unwrap();
    assert_eq!(
        text.as_str().unwrap(),
        "Short\nPlatform: Claude\nExported: 2025-01-02\nMessages: 2\n\n\
         User:\nHi there\n\n\
         Claude:\n[Thinking]\ngreet\n\nHello\n\na"
    );
}

#[test]
fn test_escaping_and_heading_clamp() {
    let mut conv = Conversation::new(Metadata::new("T", "Claude"));
    conv.add_message(Message::assistant(build_html(
        "<h5>Deep</h5><p>Use *args and [x]</p>",
        &BuildConfig::default(),
    )));

    let options = options()
        .with_header(false)
        .with_escaping(true)
        .with_max_heading(3);
    let md = render(&conv, OutputFormat::Markdown, &options).unwrap();
    assert_eq!(
        md.as_str().unwrap(),
        "**Claude:**\n\n### Deep\n\nUse \\*args and \\[x\\]\n"
    );
}

#[test]
fn test_stats() {
    let result = render_with_stats(&conversation(), &options()).unwrap();
    assert_eq!(result.stats.message_count, 2);
    assert_eq!(result.stats.user_message_count, 1);
    assert_eq!(result.stats.thinking_count, 1);
    assert_eq!(result.stats.table_count, 1);
    assert_eq!(result.stats.list_item_count, 2);
    assert_eq!(result.stats.code_block_count, 1);
    assert!(result.stats.word_count > 0);
}

#[test]
fn test_document_kinds() {
    let doc = render(&conversation(), OutputFormat::Json, &options()).unwrap();
    assert!(matches!(doc, ExportDocument::Json(_)));
    assert_eq!(doc.extension(), "json");
    assert_eq!(doc.mime_type(), "application/json");
}

#[test]
fn test_export_filename() {
    let date = NaiveDate::from_ymd_opt(2025, 7, 9).unwrap();
    assert_eq!(
        export_filename("Plan: Q3/Q4 review?", date, "md"),
        "Plan-Q3Q4-review-2025-07-09.md"
    );
    assert_eq!(export_filename("???", date, "json"), "export-2025-07-09.json");
}

#[test]
fn test_csv_listings() {
    let files = vec![
        ExtractedFile::text("a_b.csv", "a, b.csv", "csv", "x,y\n1,2"),
        ExtractedFile::text("say.txt", "say \"hi\".txt", "txt", "hello"),
    ];
    assert_eq!(
        files_to_csv(&files),
        "filename,originalName,size\n\
         a_b.csv,\"a, b.csv\",7\n\
         say.txt,\"say \"\"hi\"\".txt\",5"
    );
    assert_eq!(gpts_to_csv(&[]), "");
}
