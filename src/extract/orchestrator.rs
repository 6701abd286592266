//! Sequential extraction over a [`PageDriver`].

use super::config::PlatformConfig;
use super::files::{clean_filename, detect_file_type, infer_file_name, is_file_candidate};
use super::page::{ElementHandle, PageDriver};
use super::surface::SurfaceSession;
use crate::builder::{build_html, build_text, BuildConfig};
use crate::error::Result;
use crate::model::{nodes_plain_text, Conversation, ExtractedFile, Message, Metadata, Role};
use crate::render::{CleanupPipeline, CleanupPreset};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared stop signal, checked between elements.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives message and file extraction for one platform configuration.
///
/// Elements are visited one at a time. Failures confined to an element
/// are logged and skipped; what was gathered before a cancel is returned.
pub struct Extractor {
    config: PlatformConfig,
    build: BuildConfig,
    cleanup: CleanupPipeline,
    cancel: CancelFlag,
}

impl Extractor {
    /// Compile a configuration. Fails on unparsable selectors.
    pub fn new(config: PlatformConfig) -> Result<Self> {
        config.validate()?;

        // Thinking is captured separately and kept out of the body
        let mut noise = config.noise.clone();
        noise.extend(config.thinking_selector.iter().cloned());
        let build = BuildConfig::new(&noise, &config.rules)?;

        Ok(Self {
            config,
            build,
            cleanup: CleanupPipeline::from_preset(CleanupPreset::Standard),
            cancel: CancelFlag::new(),
        })
    }

    /// Share an existing cancel flag.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Title, URL and messages of the conversation on the page.
    pub async fn extract_conversation(&self, page: &dyn PageDriver) -> Result<Conversation> {
        let title = self.conversation_title(page).await?;
        let url = page.page_url().await.unwrap_or_default();
        let mut conversation =
            Conversation::new(Metadata::new(title, self.config.name.clone()).with_url(url));
        conversation.messages = self.extract_all(page).await?;
        Ok(conversation)
    }

    /// Every message on the page, in reading order.
    ///
    /// Only failures to enumerate messages are returned; per-message
    /// failures are logged and the message is skipped.
    pub async fn extract_all(&self, page: &dyn PageDriver) -> Result<Vec<Message>> {
        let elements = page.query_all(None, &self.config.message_selector).await?;
        log::info!(
            "{}: found {} message elements",
            self.config.name,
            elements.len()
        );

        let mut messages = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                log::info!("cancelled after {} messages", messages.len());
                break;
            }
            match self.extract_message(page, element, index).await {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => log::debug!("message {} is empty, skipped", element),
                Err(e) if e.is_element_level() => log::warn!("message {}: {}", element, e),
                Err(e) => return Err(e),
            }
        }

        log::info!("extracted {} messages", messages.len());
        Ok(messages)
    }

    async fn extract_message(
        &self,
        page: &dyn PageDriver,
        element: ElementHandle,
        index: usize,
    ) -> Result<Option<Message>> {
        let role = self.config.role_detector.detect(page, element, index).await?;

        let container = match self.config.content_selector(role) {
            Some(selector) => page.query(Some(element), selector).await?.unwrap_or(element),
            None => element,
        };
        let html = page.outer_html(container).await?;
        let mut content = build_html(&html, &self.build);

        if role == Role::Assistant {
            let scraped_len = text_len(&nodes_plain_text(&content));
            if scraped_len < self.config.min_content_length {
                if let Some(copied) = self.copy_text(page, element).await? {
                    let cleaned = self.cleanup.process(&copied);
                    if text_len(&cleaned) > scraped_len {
                        log::debug!("message {} taken from clipboard", element);
                        content = build_text(&cleaned);
                    }
                }
            }
        }

        let mut message = Message::new(role, content);
        if let Some(selector) = &self.config.thinking_selector {
            if let Some(thinking) = page.query(Some(element), selector).await? {
                let text = page.text_content(thinking).await?;
                message = message.with_thinking(text.trim());
            }
        }

        Ok((!message.is_empty()).then_some(message))
    }

    /// Clipboard text via the message's copy button, if it has one.
    async fn copy_text(
        &self,
        page: &dyn PageDriver,
        element: ElementHandle,
    ) -> Result<Option<String>> {
        let Some(selector) = &self.config.copy_button_selector else {
            return Ok(None);
        };
        let Some(button) = page.query(Some(element), selector).await? else {
            return Ok(None);
        };

        match SurfaceSession::clipboard(page, &self.config).run(button).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.is_element_level() => {
                log::warn!("copy via {} failed: {}", button, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Every readable file on the page.
    pub async fn extract_files(&self, page: &dyn PageDriver) -> Result<Vec<ExtractedFile>> {
        let candidates = self.find_file_elements(page).await?;
        log::info!("found {} file candidates", candidates.len());

        let mut files = Vec::new();
        for (element, label) in candidates {
            if self.cancel.is_cancelled() {
                log::info!("cancelled after {} files", files.len());
                break;
            }
            match self.extract_file(page, element, &label).await {
                Ok(Some(file)) => {
                    log::info!("extracted {} ({} chars)", file.filename, file.size);
                    files.push(file);
                }
                Ok(None) => log::debug!("no content for '{}'", label),
                Err(e) if e.is_element_level() => log::warn!("file '{}': {}", label, e),
                Err(e) => return Err(e),
            }
        }
        Ok(files)
    }

    async fn find_file_elements(
        &self,
        page: &dyn PageDriver,
    ) -> Result<Vec<(ElementHandle, String)>> {
        let scope = match &self.config.file_panel_selector {
            Some(selector) => page.query(None, selector).await?,
            None => None,
        };

        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for selector in &self.config.file_element_selectors {
            for element in page.query_all(scope, selector).await? {
                if !seen.insert(element) {
                    continue;
                }
                let text = match page.text_content(element).await {
                    Ok(text) => text,
                    Err(e) if e.is_element_level() => {
                        log::warn!("file element {}: {}", element, e);
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                if is_file_candidate(&text) {
                    found.push((element, text.trim().to_string()));
                }
            }
        }
        Ok(found)
    }

    async fn extract_file(
        &self,
        page: &dyn PageDriver,
        element: ElementHandle,
        label: &str,
    ) -> Result<Option<ExtractedFile>> {
        let original_name = infer_file_name(label);
        let min = self.config.min_content_length;

        let content = match self.direct_content(page, element).await? {
            Some(content) => content,
            None => {
                let content = SurfaceSession::modal(page, &self.config).run(element).await;
                let delay = self.config.timing.between_elements_ms;
                if delay > 0 {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                content?.trim().to_string()
            }
        };

        if text_len(&content) < min {
            return Ok(None);
        }

        let file_type = detect_file_type(&original_name, &content);
        let filename = clean_filename(&original_name, &file_type);
        Ok(Some(ExtractedFile::text(
            filename,
            original_name,
            file_type,
            content,
        )))
    }

    /// Content already rendered inside the file element.
    async fn direct_content(
        &self,
        page: &dyn PageDriver,
        element: ElementHandle,
    ) -> Result<Option<String>> {
        for selector in &self.config.content_selectors {
            for found in page.query_all(Some(element), selector).await? {
                let text = page.text_content(found).await?;
                let trimmed = text.trim();
                if text_len(trimmed) >= self.config.min_content_length {
                    return Ok(Some(trimmed.to_string()));
                }
            }
        }
        Ok(None)
    }

    /// Conversation title: a title element, else the last URL path
    /// segment, else `"{platform} Conversation"`.
    pub async fn conversation_title(&self, page: &dyn PageDriver) -> Result<String> {
        for selector in &self.config.title_selectors {
            for element in page.query_all(None, selector).await? {
                let text = match page.text_content(element).await {
                    Ok(text) => text,
                    Err(e) if e.is_element_level() => continue,
                    Err(e) => return Err(e),
                };
                let title = text.trim();
                if !title.is_empty() && !title.eq_ignore_ascii_case(&self.config.name) {
                    return Ok(title.to_string());
                }
            }
        }

        let url = page.page_url().await.unwrap_or_default();
        if let Some(segment) = last_path_segment(&url) {
            return Ok(segment);
        }

        Ok(format!("{} Conversation", self.config.name))
    }
}

/// Last path segment of a URL with `-`/`_` as spaces.
fn last_path_segment(url: &str) -> Option<String> {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let (_, path) = path.split_once('/')?;
    let segment = path.rsplit('/').find(|s| !s.is_empty())?;
    let title = segment.replace(['-', '_'], " ").trim().to_string();
    (!title.is_empty()).then_some(title)
}

fn text_len(text: &str) -> usize {
    text.trim().chars().count()
}
