//! Persisted session item format (agent-SDK compatible JSON).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content block type used for assistant text output.
pub const OUTPUT_TEXT_BLOCK_TYPE: &str = "output_text";

/// Conversation role of a stored item or reconstructed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One block of structured assistant content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub annotations: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<Vec<Value>>,
}

impl ContentBlock {
    #[must_use]
    pub fn output_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: OUTPUT_TEXT_BLOCK_TYPE.to_string(),
            annotations: Vec::new(),
            logprobs: Some(Vec::new()),
        }
    }
}

/// Item content: plain text, or an envelope of content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// One stored conversation entry.
///
/// Unknown top-level keys are kept in `metadata` and written back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionItem {
    pub role: Role,
    pub content: ItemContent,
    /// Envelope type (`message` for structured assistant items).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl SessionItem {
    /// Plain `{role: user, content: <text>}` item.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: ItemContent::Text(text.into()),
            kind: None,
            status: None,
            id: None,
            metadata: Map::new(),
        }
    }

    /// Plain-text assistant item (orchestration layers may write these directly).
    #[must_use]
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            ..Self::user(text)
        }
    }

    /// Structured assistant message envelope with a single output text block.
    #[must_use]
    pub fn assistant_message(text: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: ItemContent::Blocks(vec![ContentBlock::output_text(text)]),
            kind: Some("message".to_string()),
            status: Some("complete".to_string()),
            id: Some(id.into()),
            metadata: Map::new(),
        }
    }

    /// Attach one free-form metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Text of the item; content blocks are joined with newlines.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.content {
            ItemContent::Text(text) => text.clone(),
            ItemContent::Blocks(blocks) => blocks
                .iter()
                .map(|block| block.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assistant_envelope_matches_wire_shape() -> anyhow::Result<()> {
        let item = SessionItem::assistant_message("hi there", "msg_1");
        let value = serde_json::to_value(&item)?;
        assert_eq!(
            value,
            json!({
                "role": "assistant",
                "content": [{
                    "text": "hi there",
                    "type": "output_text",
                    "annotations": [],
                    "logprobs": []
                }],
                "type": "message",
                "status": "complete",
                "id": "msg_1"
            })
        );
        Ok(())
    }

    #[test]
    fn user_item_serializes_role_and_content_only() -> anyhow::Result<()> {
        let value = serde_json::to_value(SessionItem::user("hello"))?;
        assert_eq!(value, json!({"role": "user", "content": "hello"}));
        Ok(())
    }

    #[test]
    fn unknown_keys_survive_as_metadata() -> anyhow::Result<()> {
        let raw = r#"{"role":"assistant","content":"ok","agent_name":"Triage Agent"}"#;
        let item: SessionItem = serde_json::from_str(raw)?;
        assert_eq!(item.metadata.get("agent_name"), Some(&json!("Triage Agent")));
        let encoded = serde_json::to_value(&item)?;
        assert_eq!(encoded["agent_name"], json!("Triage Agent"));
        Ok(())
    }
}
