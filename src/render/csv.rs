//! CSV rendering for file listings and GPT configurations.

use crate::model::{ExtractedFile, GptRecord};
use std::borrow::Cow;

const FILES_HEADER: &str = "filename,originalName,size";

const GPTS_HEADER: &str = "ID,Name,Description,Instructions,Created At,Updated At,Version,Tools,Prompt Starters,Share Recipient,Interactions";

/// Quote a field if it contains a comma, quote or line break; internal
/// quotes are doubled. Other fields pass through untouched.
pub fn escape_csv(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn csv_row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(escape_csv)
        .collect::<Vec<_>>()
        .join(",")
}

/// One row per file: `filename,originalName,size`.
pub fn files_to_csv(files: &[ExtractedFile]) -> String {
    let mut lines = vec![FILES_HEADER.to_string()];
    for file in files {
        let size = file.size.to_string();
        lines.push(csv_row([
            file.filename.as_str(),
            file.original_name.as_str(),
            size.as_str(),
        ]));
    }
    lines.join("\n")
}

/// One row per GPT. List fields are joined with `"; "`; a missing
/// interaction count is written as `0`. No records yields an empty string.
pub fn gpts_to_csv(gpts: &[GptRecord]) -> String {
    if gpts.is_empty() {
        return String::new();
    }

    let mut lines = vec![GPTS_HEADER.to_string()];
    for gpt in gpts {
        let tools = gpt.tools.join("; ");
        let starters = gpt.prompt_starters.join("; ");
        let interactions = gpt.num_interactions.unwrap_or(0).to_string();
        lines.push(csv_row([
            gpt.id.as_str(),
            gpt.name.as_str(),
            gpt.description.as_str(),
            gpt.instructions.as_str(),
            gpt.created_at.as_deref().unwrap_or_default(),
            gpt.updated_at.as_deref().unwrap_or_default(),
            gpt.version.as_deref().unwrap_or_default(),
            tools.as_str(),
            starters.as_str(),
            gpt.share_recipient.as_deref().unwrap_or_default(),
            interactions.as_str(),
        ]));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,\"b\"\nc"), "\"a,\"\"b\"\"\nc\"");
        assert_eq!(escape_csv("line\r"), "\"line\r\"");
    }

    #[test]
    fn test_files_to_csv() {
        let files = vec![ExtractedFile::text(
            "notes_v2.md",
            "notes, v2.md",
            "md",
            "abc",
        )];
        assert_eq!(
            files_to_csv(&files),
            "filename,originalName,size\nnotes_v2.md,\"notes, v2.md\",3"
        );
    }

    #[test]
    fn test_gpts_to_csv() {
        let gpt = GptRecord {
            id: "g-1".into(),
            name: "Helper".into(),
            tools: vec!["browser".into(), "python".into()],
            ..Default::default()
        };
        let csv = gpts_to_csv(&[gpt]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(GPTS_HEADER));
        assert_eq!(lines.next(), Some("g-1,Helper,,,,,,browser; python,,,0"));
        assert!(gpts_to_csv(&[]).is_empty());
    }
}
