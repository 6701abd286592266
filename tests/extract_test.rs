//! End-to-end extraction over saved pages with the built-in platform presets.

use chrono::{TimeZone, Utc};
use unchat::extract::{ExportSession, SnapshotPage};
use unchat::{Error, ExportDocument, FileFilter, PlatformConfig, RenderOptions, Role, Unchat};

const CHATGPT_PAGE: &str = r#"<html><head><title>ChatGPT</title></head><body>
<h1>Sorting in Python</h1>
<div data-message-author-role="user">
  <div class="whitespace-pre-wrap">How do I sort a list?</div>
</div>
<div data-message-author-role="assistant">
  <div class="markdown">
    <p>Use <code>sorted</code>:</p>
    <pre><div><div>python</div></div><code class="language-python">sorted([3, 1, 2])</code></pre>
  </div>
</div>
</body></html>"#;

const CLAUDE_PAGE: &str = r#"<html><head><title>Lisbon trip</title></head><body>
<div data-testid="user-message"><p>Plan a trip to Lisbon</p></div>
<div class="font-claude-message">
  <div class="thinking-block">Consider the budget first.</div>
  <p>Here is a three day plan for Lisbon with museums, food and a day trip to Sintra.</p>
  <ul><li>Day one: Alfama</li><li>Day two: Belem</li></ul>
</div>
</body></html>"#;

const FILE_PAGE: &str = r#"<html><head><title>Research</title></head><body>
<div role="button" class="clickable">notes.md 3 lines<pre>
## Findings
Lisbon has seven hills and a great tram network for visitors.</pre></div>
<div role="button">Settings</div>
</body></html>"#;

fn export_date() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn test_chatgpt_snapshot() {
    let page = SnapshotPage::new(CHATGPT_PAGE).with_url("https://chatgpt.com/c/abc123");
    let mut session = ExportSession::new(PlatformConfig::chatgpt())
        .unwrap()
        .with_render_options(
            RenderOptions::new()
                .with_assistant_name("ChatGPT")
                .with_export_date(export_date()),
        );

    let count = session.capture_messages(&page).await.unwrap();
    assert_eq!(count, 2);
    assert_eq!(session.metadata().title, "Sorting in Python");
    assert_eq!(session.metadata().url, "https://chatgpt.com/c/abc123");
    assert_eq!(session.messages()[0].role, Role::User);
    assert_eq!(session.messages()[1].role, Role::Assistant);

    let doc = session.export_markdown().unwrap();
    let markdown = doc.as_str().unwrap();
    assert!(markdown.starts_with("# Sorting in Python\n"));
    assert!(markdown.contains("**Platform:** ChatGPT"));
    assert!(markdown.contains("**User:**\n\nHow do I sort a list?"));
    assert!(markdown.contains("**ChatGPT:**\n\nUse `sorted`:"));
    assert!(markdown.contains("```python\nsorted([3, 1, 2])\n```"));
    assert_eq!(session.file_name(&doc), "Sorting-in-Python-2025-06-01.md");
}

#[tokio::test]
async fn test_claude_thinking_and_lists() {
    let result = Unchat::new()
        .platform(PlatformConfig::claude())
        .with_export_date(export_date())
        .extract_html(CLAUDE_PAGE)
        .await
        .unwrap();

    let conversation = result.conversation();
    assert_eq!(conversation.metadata.title, "Lisbon trip");
    assert_eq!(conversation.message_count(), 2);

    let answer = &conversation.messages[1];
    assert_eq!(answer.thinking.as_deref(), Some("Consider the budget first."));
    assert!(!answer.plain_text().contains("budget"));

    let markdown = result.to_markdown().unwrap();
    assert!(markdown.contains("**Claude:**\n\n> **Thinking:**\n>\n> Consider the budget first."));
    assert!(markdown.contains("- Day one: Alfama\n- Day two: Belem"));
}

#[tokio::test]
async fn test_output_is_deterministic() {
    let extract = || async {
        Unchat::new()
            .platform(PlatformConfig::claude())
            .with_export_date(export_date())
            .extract_html(CLAUDE_PAGE)
            .await
            .unwrap()
    };

    let first = extract().await;
    let second = extract().await;
    assert_eq!(first.to_markdown().unwrap(), second.to_markdown().unwrap());
    assert_eq!(first.to_text().unwrap(), second.to_text().unwrap());
}

#[tokio::test]
async fn test_files_rendered_inline() {
    let page = SnapshotPage::new(FILE_PAGE);
    let mut session = ExportSession::new(PlatformConfig::default())
        .unwrap()
        .with_render_options(RenderOptions::new().with_export_date(export_date()));

    let summary = session.capture(&page).await.unwrap();

    assert_eq!(summary.messages, 0);
    assert_eq!(summary.files, 1);
    assert_eq!(session.metadata().title, "Research");

    let file = &session.files()[0];
    assert_eq!(file.filename, "notes.md");
    assert!(file.content.as_text().unwrap().starts_with("## Findings"));
    assert!(page.clicks().is_empty());

    let csv = session.export_files_csv().unwrap();
    assert_eq!(
        csv.as_str().unwrap(),
        format!("filename,originalName,size\nnotes.md,notes.md,{}", file.size)
    );

    let json = session.export_json().unwrap();
    let json = json.as_str().unwrap();
    assert!(json.contains("\"fileCount\": 1"));
    assert!(json.contains("\"filename\": \"notes.md\""));
    assert!(json.contains("\"messageCount\": 0"));

    let bundle = session.export_files().unwrap();
    assert!(matches!(bundle, ExportDocument::Bundle(_)));
    assert_eq!(session.file_name(&bundle), "Research-2025-06-01");
}

#[tokio::test]
async fn test_filter_rejects_files() {
    let page = SnapshotPage::new(FILE_PAGE);
    let mut session = ExportSession::new(PlatformConfig::default())
        .unwrap()
        .with_file_filter(FileFilter::new().with_types(["json"]));

    let summary = session.capture(&page).await.unwrap();

    assert_eq!(summary.files, 0);
    assert_eq!(summary.filtered, 1);
    assert!(matches!(session.export_files(), Err(Error::NoContentFound)));
}

#[tokio::test]
async fn test_invalid_message_selector_aborts() {
    let config = PlatformConfig {
        message_selector: "div[".to_string(),
        ..PlatformConfig::default()
    };
    let page = SnapshotPage::new(CHATGPT_PAGE);
    let mut session = ExportSession::new(config).unwrap();

    let result = session.capture_messages(&page).await;

    assert!(matches!(result, Err(Error::InvalidSelector(_))));
}

#[test]
fn test_config_from_json_drives_extraction() {
    let config = PlatformConfig::from_json(
        r#"{
            "name": "Forum Bot",
            "assistant_name": "Bot",
            "message_selector": ".post",
            "role_detector": {"type": "alternating", "first": "user"},
            "copy_button_selector": null
        }"#,
    )
    .unwrap();

    let html = r#"<html><body>
        <div class="post"><p>Question here</p></div>
        <div class="post"><p>Answer here</p></div>
    </body></html>"#;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let conversation = runtime
        .block_on(unchat::extract_snapshot(html, config))
        .unwrap();

    assert_eq!(conversation.metadata.platform, "Forum Bot");
    assert_eq!(conversation.messages[0].role, Role::User);
    assert_eq!(conversation.messages[1].role, Role::Assistant);
    assert_eq!(conversation.messages[1].plain_text(), "Answer here");
}
