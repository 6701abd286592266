//! Transient surfaces: modals opened by clicking a file, and the clipboard
//! filled by clicking a copy button.
//!
//! A [`SurfaceSession`] drives one trigger element through
//! scroll, click, wait, read and close. All waits are bounded polls on the
//! tokio clock.

use super::config::PlatformConfig;
use super::page::{ElementHandle, PageDriver};
use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::time::{sleep, Instant};

static UI_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(close|download|export|pdf|text|select|cancel|ok|\d+\s*lines?|view|edit|upload|attach)$",
    )
    .unwrap()
});

/// Host names whose appearance marks a line as page chrome.
pub const PLATFORM_HOSTS: &[&str] = &[
    "claude.ai",
    "openai.com",
    "chatgpt.com",
    "gemini.google.com",
    "grok.x.ai",
    "deepseek.com",
];

const MAX_UI_LINE_CHARS: usize = 200;
const ESCAPE_PRESSES: usize = 3;
const CLOSE_CONFIRM: Duration = Duration::from_millis(1000);

/// What the trigger element opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// A dialog that must be read and dismissed
    Modal,
    /// Text copied to the clipboard
    Clipboard,
}

/// Lifecycle of one surface interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Idle,
    Scrolled,
    Clicked,
    WaitingForSurface,
    SurfaceReady,
    ContentRead,
    Closed,
    Failed,
}

impl fmt::Display for SurfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One open/read/close cycle against a page.
pub struct SurfaceSession<'a> {
    page: &'a dyn PageDriver,
    config: &'a PlatformConfig,
    kind: SurfaceKind,
    state: SurfaceState,
}

impl<'a> SurfaceSession<'a> {
    pub fn new(page: &'a dyn PageDriver, config: &'a PlatformConfig, kind: SurfaceKind) -> Self {
        Self {
            page,
            config,
            kind,
            state: SurfaceState::Idle,
        }
    }

    /// Session that reads a modal opened by the trigger.
    pub fn modal(page: &'a dyn PageDriver, config: &'a PlatformConfig) -> Self {
        Self::new(page, config, SurfaceKind::Modal)
    }

    /// Session that reads the clipboard after clicking a copy button.
    pub fn clipboard(page: &'a dyn PageDriver, config: &'a PlatformConfig) -> Self {
        Self::new(page, config, SurfaceKind::Clipboard)
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn transition(&mut self, next: SurfaceState) {
        log::debug!("{:?} surface: {} -> {}", self.kind, self.state, next);
        self.state = next;
    }

    /// Run the full cycle for `trigger` and return the surface text.
    ///
    /// Any failure leaves the session in [`SurfaceState::Failed`].
    pub async fn run(&mut self, trigger: ElementHandle) -> Result<String> {
        let result = match self.kind {
            SurfaceKind::Modal => self.run_modal(trigger).await,
            SurfaceKind::Clipboard => self.run_clipboard(trigger).await,
        };
        if result.is_err() {
            self.transition(SurfaceState::Failed);
        }
        result
    }

    async fn scroll_and_click(&mut self, trigger: ElementHandle) -> Result<()> {
        self.page.scroll_into_view(trigger).await?;
        self.transition(SurfaceState::Scrolled);
        pause(self.config.timing.scroll_settle_ms).await;

        self.page.click(trigger).await?;
        self.transition(SurfaceState::Clicked);
        Ok(())
    }

    async fn run_modal(&mut self, trigger: ElementHandle) -> Result<String> {
        self.scroll_and_click(trigger).await?;

        self.transition(SurfaceState::WaitingForSurface);
        let modal = self.wait_for_modal().await?;
        self.transition(SurfaceState::SurfaceReady);
        pause(self.config.timing.surface_settle_ms).await;

        let content = self.read_modal(modal).await;
        if content.is_ok() {
            self.transition(SurfaceState::ContentRead);
        }

        // Dismiss even when reading failed
        if let Err(e) = self.close().await {
            log::warn!("closing modal failed: {}", e);
        }
        let content = content?;
        self.transition(SurfaceState::Closed);
        Ok(content)
    }

    async fn run_clipboard(&mut self, trigger: ElementHandle) -> Result<String> {
        if let Err(e) = self.page.clear_clipboard().await {
            log::debug!("clipboard not cleared: {}", e);
        }
        let previous = self.page.read_clipboard().await?;
        self.scroll_and_click(trigger).await?;
        pause(self.config.timing.copy_settle_ms).await;

        self.transition(SurfaceState::WaitingForSurface);
        let timing = &self.config.timing;
        let deadline = Instant::now() + timing.open_timeout();
        let text = loop {
            let text = self.page.read_clipboard().await?;
            if !text.trim().is_empty() && text != previous {
                break text;
            }
            if Instant::now() >= deadline {
                if !text.trim().is_empty() {
                    log::warn!("clipboard unchanged after copy via {}", trigger);
                }
                return Err(Error::SurfaceTimeout {
                    timeout_ms: timing.open_timeout_ms,
                });
            }
            sleep(timing.poll_interval()).await;
        };

        self.transition(SurfaceState::SurfaceReady);
        self.transition(SurfaceState::ContentRead);
        self.transition(SurfaceState::Closed);
        Ok(text)
    }

    async fn wait_for_modal(&self) -> Result<ElementHandle> {
        let timing = &self.config.timing;
        let deadline = Instant::now() + timing.open_timeout();
        loop {
            if let Some(modal) = self.visible_modal().await? {
                return Ok(modal);
            }
            if Instant::now() >= deadline {
                return Err(Error::SurfaceTimeout {
                    timeout_ms: timing.open_timeout_ms,
                });
            }
            sleep(timing.poll_interval()).await;
        }
    }

    async fn visible_modal(&self) -> Result<Option<ElementHandle>> {
        for selector in &self.config.modal_selectors {
            for modal in self.page.query_all(None, selector).await? {
                if self.page.rendered_height(modal).await? > 0.0 {
                    return Ok(Some(modal));
                }
            }
        }
        Ok(None)
    }

    /// Poll until no modal is visible. `false` when `timeout` elapsed.
    async fn wait_for_close(&self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.visible_modal().await?.is_none() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.config.timing.poll_interval()).await;
        }
    }

    async fn read_modal(&self, modal: ElementHandle) -> Result<String> {
        let min = self.config.min_content_length;
        for selector in &self.config.content_selectors {
            for element in self.page.query_all(Some(modal), selector).await? {
                let text = self.page.text_content(element).await?;
                let trimmed = text.trim();
                if trimmed.chars().count() >= min {
                    log::debug!("modal content from '{}'", selector);
                    return Ok(trimmed.to_string());
                }
            }
        }

        let text = self.page.text_content(modal).await?;
        Ok(filter_ui_lines(&text))
    }

    /// Close buttons first, then Escape, then a final bounded wait.
    ///
    /// An unconfirmed close is logged, not returned.
    async fn close(&self) -> Result<()> {
        let timing = &self.config.timing;

        for selector in &self.config.close_selectors {
            for button in self.page.query_all(None, selector).await? {
                if self.page.rendered_height(button).await? <= 0.0 {
                    continue;
                }
                if let Err(e) = self.page.click(button).await {
                    log::debug!("close button {} not clickable: {}", button, e);
                    continue;
                }
                pause(timing.close_step_ms).await;
                if self.wait_for_close(CLOSE_CONFIRM).await? {
                    return Ok(());
                }
            }
        }

        for _ in 0..ESCAPE_PRESSES {
            self.page.press_key("Escape").await?;
            pause(timing.escape_step_ms).await;
        }

        if !self.wait_for_close(timing.close_timeout()).await? {
            log::warn!(
                "{}",
                Error::CloseTimeout {
                    timeout_ms: timing.close_timeout_ms
                }
            );
        }
        Ok(())
    }
}

/// Keep the lines of a modal's text that look like file content.
///
/// Lines are trimmed; short lines, button labels, lines naming a chat host
/// and lines of 200+ characters are dropped.
pub fn filter_ui_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > 3)
        .filter(|line| !UI_LINE.is_match(line))
        .filter(|line| !PLATFORM_HOSTS.iter().any(|host| line.contains(host)))
        .filter(|line| line.chars().count() < MAX_UI_LINE_CHARS)
        .collect::<Vec<_>>()
        .join("\n")
}

async fn pause(ms: u64) {
    if ms > 0 {
        sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_ui_lines() {
        let text = "  Close \nDownload\n12 lines\nabc\nreal content line\nsee claude.ai/x\n  second line  ";
        assert_eq!(filter_ui_lines(text), "real content line\nsecond line");
    }

    #[test]
    fn test_filter_drops_long_lines() {
        let long = "x".repeat(250);
        assert_eq!(filter_ui_lines(&format!("keep this\n{}", long)), "keep this");
    }
}
