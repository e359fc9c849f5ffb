//! Text extraction from loosely shaped trace payloads.
//!
//! Payloads are tried against an explicit, ordered list of strategies; the first one
//! that yields non-blank text wins.

use serde_json::Value;

use crate::observability::SessionEvent;

/// Nested payloads deeper than this are not unwrapped.
const MAX_NESTING: usize = 4;

/// Named extraction strategies in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStrategy {
    /// JSON string.
    PlainText,
    /// Array of `{role, content}` messages; text of the last non-empty one.
    MessageList,
    /// Array of `{type, text}` blocks joined by newlines.
    ContentBlocks,
    ContentField,
    MessageField,
    QueryField,
    ResponseField,
    TextField,
    /// Compact JSON of any other non-empty value.
    Serialized,
}

impl ExtractionStrategy {
    /// All strategies, in the order they are tried.
    pub const ALL: [Self; 9] = [
        Self::PlainText,
        Self::MessageList,
        Self::ContentBlocks,
        Self::ContentField,
        Self::MessageField,
        Self::QueryField,
        Self::ResponseField,
        Self::TextField,
        Self::Serialized,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlainText => "plain_text",
            Self::MessageList => "message_list",
            Self::ContentBlocks => "content_blocks",
            Self::ContentField => "content_field",
            Self::MessageField => "message_field",
            Self::QueryField => "query_field",
            Self::ResponseField => "response_field",
            Self::TextField => "text_field",
            Self::Serialized => "serialized",
        }
    }

    const fn field_name(self) -> Option<&'static str> {
        match self {
            Self::ContentField => Some("content"),
            Self::MessageField => Some("message"),
            Self::QueryField => Some("query"),
            Self::ResponseField => Some("response"),
            Self::TextField => Some("text"),
            _ => None,
        }
    }

    fn apply(self, value: &Value, depth: usize) -> Option<String> {
        let text = match self {
            Self::PlainText => value.as_str().map(str::to_string),
            Self::MessageList => message_list_text(value, depth),
            Self::ContentBlocks => content_blocks_text(value),
            Self::Serialized => serialized_text(value),
            field_strategy => {
                let field = field_strategy.field_name()?;
                let nested = value.as_object()?.get(field)?;
                extract_nested(nested, depth + 1)
            }
        };
        text.filter(|text| !text.trim().is_empty())
    }
}

/// Extracted text plus the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    pub strategy: ExtractionStrategy,
}

/// First non-blank text any strategy yields for `value`.
#[must_use]
pub fn extract_text(value: &Value) -> Option<Extracted> {
    if value.is_null() {
        return None;
    }
    ExtractionStrategy::ALL.iter().find_map(|strategy| {
        strategy.apply(value, 0).map(|text| Extracted {
            text,
            strategy: *strategy,
        })
    })
}

/// [`extract_text`] with the selected strategy logged for `record_id`.
pub(crate) fn extract_logged(
    value: Option<&Value>,
    record_id: &str,
    source: &'static str,
) -> Option<String> {
    let extracted = extract_text(value?)?;
    tracing::debug!(
        event = SessionEvent::HistoryExtractionSelected.as_str(),
        record_id,
        source,
        strategy = extracted.strategy.as_str(),
        "payload text extracted"
    );
    Some(extracted.text)
}

/// Structured strategies only; serialization is never used for nested fields.
pub(crate) fn extract_nested(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_NESTING || value.is_null() {
        return None;
    }
    ExtractionStrategy::ALL
        .iter()
        .filter(|strategy| **strategy != ExtractionStrategy::Serialized)
        .find_map(|strategy| strategy.apply(value, depth))
}

fn is_message(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.get("role").is_some_and(Value::is_string))
}

fn message_list_text(value: &Value, depth: usize) -> Option<String> {
    let messages = value.as_array()?;
    if messages.is_empty() || !messages.iter().all(is_message) {
        return None;
    }
    messages.iter().rev().find_map(|message| {
        let content = message.get("content")?;
        extract_nested(content, depth + 1).filter(|text| !text.trim().is_empty())
    })
}

fn content_blocks_text(value: &Value) -> Option<String> {
    let blocks = value.as_array()?;
    if blocks.is_empty() {
        return None;
    }
    let mut texts = Vec::with_capacity(blocks.len());
    for block in blocks {
        let text = block.as_object()?.get("text")?.as_str()?;
        if !text.trim().is_empty() {
            texts.push(text);
        }
    }
    Some(texts.join("\n"))
}

fn is_text_block(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.get("text").is_some_and(Value::is_string))
}

/// Strings, and message/block arrays that held only blank text, are not serialized.
fn serialized_text(value: &Value) -> Option<String> {
    let skip = match value {
        Value::Null | Value::String(_) => true,
        Value::Array(items) => items
            .iter()
            .all(|item| is_message(item) || is_text_block(item)),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    };
    if skip {
        return None;
    }
    serde_json::to_string(value).ok()
}
