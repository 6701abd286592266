//! Per-platform extraction configuration.
//!
//! A [`PlatformConfig`] is pure data: selectors, timing and role detection
//! for one chat site. It loads from JSON so new sites need no code.

use crate::builder::{BuildConfig, Rule, RuleKind};
use crate::error::{Error, Result};
use crate::model::Role;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::page::{ElementHandle, PageDriver};

/// How the role of a message element is decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoleDetector {
    /// Read an attribute; values in `user_values` mean the user
    Attribute {
        name: String,
        user_values: Vec<String>,
    },
    /// Elements matching (or containing a match for) `user` are the user
    Selector { user: String },
    /// Strict alternation starting with `first`
    Alternating { first: Role },
}

impl Default for RoleDetector {
    fn default() -> Self {
        RoleDetector::Alternating { first: Role::User }
    }
}

impl RoleDetector {
    /// Decide the role of the `index`-th message element.
    pub async fn detect(
        &self,
        page: &dyn PageDriver,
        element: ElementHandle,
        index: usize,
    ) -> Result<Role> {
        match self {
            RoleDetector::Attribute { name, user_values } => {
                let value = page.attribute(element, name).await?;
                Ok(match value {
                    Some(v) if user_values.iter().any(|u| u.eq_ignore_ascii_case(v.trim())) => {
                        Role::User
                    }
                    Some(v) => Role::parse(&v).unwrap_or(Role::Assistant),
                    None => Role::Assistant,
                })
            }
            RoleDetector::Selector { user } => {
                let is_user = page.matches(element, user).await?
                    || !page.query_all(Some(element), user).await?.is_empty();
                Ok(if is_user { Role::User } else { Role::Assistant })
            }
            RoleDetector::Alternating { first } => Ok(if index % 2 == 0 {
                *first
            } else {
                first.flipped()
            }),
        }
    }
}

/// Delays and poll bounds, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Bound on waiting for a surface to appear
    pub open_timeout_ms: u64,
    /// Bound on waiting for a surface to disappear
    pub close_timeout_ms: u64,
    /// Poll period for both waits
    pub poll_interval_ms: u64,
    /// Pause after scrolling before clicking
    pub scroll_settle_ms: u64,
    /// Pause after a copy click before reading the clipboard
    pub copy_settle_ms: u64,
    /// Pause after a modal appears before reading it
    pub surface_settle_ms: u64,
    /// Pause after each close-button click
    pub close_step_ms: u64,
    /// Pause between Escape presses
    pub escape_step_ms: u64,
    /// Pause between surface interactions
    pub between_elements_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            open_timeout_ms: 5000,
            close_timeout_ms: 3000,
            poll_interval_ms: 100,
            scroll_settle_ms: 500,
            copy_settle_ms: 300,
            surface_settle_ms: 1000,
            close_step_ms: 300,
            escape_step_ms: 200,
            between_elements_ms: 1000,
        }
    }
}

impl Timing {
    /// All delays zero except the poll bounds; for snapshots and tests.
    pub fn instant() -> Self {
        Self {
            scroll_settle_ms: 0,
            copy_settle_ms: 0,
            surface_settle_ms: 0,
            close_step_ms: 0,
            escape_step_ms: 0,
            between_elements_ms: 0,
            ..Self::default()
        }
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero interval would spin without yielding virtual time
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Selectors and policies for one chat platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Platform display name
    pub name: String,
    /// Name used in assistant role headers
    pub assistant_name: String,

    /// Matches every message element, in reading order
    pub message_selector: String,
    /// Content container inside a user message (element itself when unset)
    pub user_content_selector: Option<String>,
    /// Content container inside an assistant message
    pub assistant_content_selector: Option<String>,
    /// Reasoning section inside an assistant message
    pub thinking_selector: Option<String>,
    /// Copy button inside a message, enabling the clipboard path
    pub copy_button_selector: Option<String>,
    /// Candidates for the conversation title, in priority order
    pub title_selectors: Vec<String>,

    /// Modal / dialog surfaces
    pub modal_selectors: Vec<String>,
    /// Buttons that dismiss a modal
    pub close_selectors: Vec<String>,
    /// Content containers inside a modal or file element, in priority order
    pub content_selectors: Vec<String>,
    /// Clickable file-like elements
    pub file_element_selectors: Vec<String>,
    /// Panel to search for files; whole page when unset
    pub file_panel_selector: Option<String>,

    /// UI chrome stripped before building
    pub noise: Vec<String>,
    /// Classifier rules placed ahead of the standard HTML rules
    pub rules: Vec<Rule>,
    /// Role detection strategy
    pub role_detector: RoleDetector,

    /// Minimum trimmed length for surface-read content
    pub min_content_length: usize,
    /// Delays and timeouts
    pub timing: Timing,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: "Unknown Platform".to_string(),
            assistant_name: "Assistant".to_string(),
            message_selector: r#"[role="article"], .message, .chat-item"#.to_string(),
            user_content_selector: None,
            assistant_content_selector: None,
            thinking_selector: None,
            copy_button_selector: Some(
                r#"[aria-label*="copy" i], .copy, button[title*="copy" i]"#.to_string(),
            ),
            title_selectors: strings(&["title", "h1", ".title"]),
            modal_selectors: strings(&[r#"[role="dialog"]"#]),
            close_selectors: strings(&[
                r#"button[aria-label*="close"]"#,
                r#"button[aria-label*="Close"]"#,
                r#"[data-testid*="close"]"#,
                r#"button[title*="close"]"#,
                r#"button[title*="Close"]"#,
                ".modal button:last-child",
                r#"[role="dialog"] button:first-child"#,
                r#"[role="dialog"] button[type="button"]"#,
            ]),
            content_selectors: strings(&[
                "pre code",
                "pre",
                ".whitespace-pre-wrap",
                ".font-mono",
                ".overflow-auto pre",
                ".text-sm.whitespace-pre-wrap",
                r#"[class*="content"]"#,
                ".modal-body",
                ".dialog-content",
            ]),
            file_element_selectors: strings(&[
                r#"button[class*="cursor-pointer"]"#,
                r#"div[class*="cursor-pointer"]"#,
                r#"[role="button"]"#,
                ".clickable",
                r#"button[type="button"]"#,
            ]),
            file_panel_selector: None,
            noise: strings(&["button", ".sr-only", r#"[aria-label*="copy" i]"#]),
            rules: Vec::new(),
            role_detector: RoleDetector::Selector {
                user: r#".user, [data-role="user"], .human"#.to_string(),
            },
            min_content_length: 50,
            timing: Timing::default(),
        }
    }
}

impl PlatformConfig {
    /// Load a configuration from a JSON file. Missing fields take the
    /// generic defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive an extraction.
    pub fn validate(&self) -> Result<()> {
        if self.message_selector.trim().is_empty() {
            return Err(Error::Config("message_selector is empty".into()));
        }
        if self.timing.open_timeout_ms == 0 {
            return Err(Error::Config("open_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// Compile the builder configuration (noise + classifier).
    pub fn build_config(&self) -> Result<BuildConfig> {
        BuildConfig::new(&self.noise, &self.rules)
    }

    /// Look up a built-in preset by name (case-insensitive).
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "chatgpt" => Some(Self::chatgpt()),
            "claude" => Some(Self::claude()),
            "deepseek" => Some(Self::deepseek()),
            "generic" => Some(Self::default()),
            _ => None,
        }
    }

    /// ChatGPT (chatgpt.com).
    pub fn chatgpt() -> Self {
        Self {
            name: "ChatGPT".to_string(),
            assistant_name: "ChatGPT".to_string(),
            message_selector: "div[data-message-author-role]".to_string(),
            user_content_selector: Some("div.whitespace-pre-wrap".to_string()),
            assistant_content_selector: Some("div.markdown".to_string()),
            copy_button_selector: Some(r#"button[aria-label*="Copy"]"#.to_string()),
            title_selectors: strings(&[r#"[data-testid="conversation-title"]"#, "h1", "title"]),
            role_detector: RoleDetector::Attribute {
                name: "data-message-author-role".to_string(),
                user_values: strings(&["user"]),
            },
            rules: vec![Rule::selector(
                "pre",
                RuleKind::CodeBlock {
                    language_selector: Some("pre > div > div:first-child".to_string()),
                    code_selector: Some("code".to_string()),
                },
            )],
            ..Self::default()
        }
    }

    /// Claude (claude.ai), including project knowledge files.
    pub fn claude() -> Self {
        Self {
            name: "Claude".to_string(),
            assistant_name: "Claude".to_string(),
            message_selector: r#"div[data-testid="user-message"], div.font-claude-message"#
                .to_string(),
            thinking_selector: Some(r#"[data-testid="thinking"], .thinking-block"#.to_string()),
            copy_button_selector: Some(r#"button[aria-label*="Copy"], button.copy-button"#.to_string()),
            title_selectors: strings(&[
                r#"[data-testid="chat-title"]"#,
                ".conversation-title",
                "h1",
                "title",
            ]),
            file_panel_selector: Some(r#"[class*="project"], [class*="knowledge"]"#.to_string()),
            role_detector: RoleDetector::Selector {
                user: r#"[data-testid="user-message"], .font-user-message"#.to_string(),
            },
            noise: strings(&["button", ".sr-only", r#"[data-testid="action-bar"]"#]),
            ..Self::default()
        }
    }

    /// DeepSeek (chat.deepseek.com).
    pub fn deepseek() -> Self {
        Self {
            name: "DeepSeek".to_string(),
            assistant_name: "DeepSeek".to_string(),
            message_selector: "div[data-role], div.message-item".to_string(),
            user_content_selector: None,
            assistant_content_selector: Some(".ds-markdown, .assistant-message".to_string()),
            thinking_selector: Some(".ds-think-content, ._48edb25".to_string()),
            copy_button_selector: Some(r#"button[aria-label*="copy"], .ds-icon-button"#.to_string()),
            title_selectors: strings(&[".chat-title", "h1", "title"]),
            role_detector: RoleDetector::Attribute {
                name: "data-role".to_string(),
                user_values: strings(&["user"]),
            },
            rules: vec![Rule::class("md-code-block", RuleKind::CodeBlock {
                language_selector: Some(".md-code-block-infostring".to_string()),
                code_selector: Some("pre".to_string()),
            })],
            ..Self::default()
        }
    }

    /// Pick the content container selector for a role.
    pub fn content_selector(&self, role: Role) -> Option<&str> {
        match role {
            Role::User => self.user_content_selector.as_deref(),
            Role::Assistant => self.assistant_content_selector.as_deref(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
