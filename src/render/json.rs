//! JSON rendering for conversations and records.

use crate::error::{Error, Result};
use crate::model::{Conversation, ConversationRecord, ExtractedFile};
use serde::Serialize;

use super::RenderOptions;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any value in the requested format.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Serialization(format!("JSON serialization error: {}", e)))
}

/// Convert a conversation to its JSON export record.
pub fn to_json(conversation: &Conversation, options: &RenderOptions) -> Result<String> {
    let record =
        ConversationRecord::from_conversation(conversation, options.export_timestamp().to_rfc3339());
    to_json_string(&record, options.json_format)
}

/// JSON export record listing `files` next to the messages.
pub fn to_json_with_files(
    conversation: &Conversation,
    files: &[ExtractedFile],
    options: &RenderOptions,
) -> Result<String> {
    let record =
        ConversationRecord::from_conversation(conversation, options.export_timestamp().to_rfc3339())
            .with_files(files);
    to_json_string(&record, options.json_format)
}

/// Parse a JSON export back into a conversation.
pub fn parse_conversation_json(json: &str) -> Result<Conversation> {
    let record: ConversationRecord = serde_json::from_str(json)?;
    Ok(record.into_conversation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentNode, Message, Metadata};

    fn conversation() -> Conversation {
        let mut conv = Conversation::new(Metadata::new("Test", "Gemini"));
        conv.add_message(Message::user(vec![ContentNode::text("Hello")]));
        conv
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&conversation(), &RenderOptions::default()).unwrap();
        assert!(json.contains("\"platformTitle\": \"Gemini\""));
        assert!(json.contains("\n  \"title\""));
    }

    #[test]
    fn test_to_json_compact() {
        let options = RenderOptions::new().with_json_format(JsonFormat::Compact);
        let json = to_json(&conversation(), &options).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_parse_back() {
        let json = to_json(&conversation(), &RenderOptions::default()).unwrap();
        assert_eq!(parse_conversation_json(&json).unwrap(), conversation());
    }
}
