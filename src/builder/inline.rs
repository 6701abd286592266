//! Inline run accumulation and normalization.

use crate::model::{InlineRun, TextRun, TextStyle};

/// Collapse every whitespace run to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out
}

/// Append text to a run list with the given style.
pub fn push_text(runs: &mut Vec<InlineRun>, text: &str, style: TextStyle) {
    let text = collapse_whitespace(text);
    if !text.is_empty() {
        runs.push(InlineRun::Text(TextRun::styled(text, style)));
    }
}

/// Normalize an inline sequence for one leaf block.
///
/// Whitespace is collapsed across run boundaries, adjacent text runs with
/// equal style are merged, and the sequence is trimmed at both ends.
pub fn normalize_runs(runs: Vec<InlineRun>) -> Vec<InlineRun> {
    let mut out: Vec<InlineRun> = Vec::with_capacity(runs.len());
    // Start of block counts as whitespace so leading spaces are dropped
    let mut after_space = true;

    for run in runs {
        match run {
            InlineRun::Text(mut text_run) => {
                text_run.text = collapse_whitespace(&text_run.text);
                if after_space {
                    text_run.text = text_run.text.trim_start().to_string();
                }
                if text_run.text.is_empty() {
                    continue;
                }
                after_space = text_run.text.ends_with(' ');

                if let Some(InlineRun::Text(prev)) = out.last_mut() {
                    if prev.style == text_run.style {
                        prev.text.push_str(&text_run.text);
                        continue;
                    }
                }
                out.push(InlineRun::Text(text_run));
            }
            InlineRun::LineBreak => {
                trim_trailing_space(&mut out);
                if !out.is_empty() && !matches!(out.last(), Some(InlineRun::LineBreak)) {
                    out.push(InlineRun::LineBreak);
                }
                after_space = true;
            }
            InlineRun::Link { text, href, title } => {
                let text = collapse_whitespace(&text).trim().to_string();
                if text.is_empty() && href.is_empty() {
                    continue;
                }
                out.push(InlineRun::Link { text, href, title });
                after_space = false;
            }
            InlineRun::Code { text } => {
                if text.is_empty() {
                    continue;
                }
                out.push(InlineRun::Code { text });
                after_space = false;
            }
            InlineRun::Math { text } => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                out.push(InlineRun::Math { text });
                after_space = false;
            }
            image @ InlineRun::Image { .. } => {
                out.push(image);
                after_space = false;
            }
        }
    }

    trim_trailing_space(&mut out);
    while matches!(out.last(), Some(InlineRun::LineBreak)) {
        out.pop();
        trim_trailing_space(&mut out);
    }
    out
}

/// Trim trailing whitespace of the last text run, dropping it if it empties.
fn trim_trailing_space(runs: &mut Vec<InlineRun>) {
    if let Some(InlineRun::Text(last)) = runs.last_mut() {
        let trimmed_len = last.text.trim_end().len();
        last.text.truncate(trimmed_len);
        if last.text.is_empty() {
            runs.pop();
            trim_trailing_space(runs);
        }
    }
}
