//! Reconstructed conversation message.

use serde::Serialize;

use crate::session::Role;

/// One reconstructed conversation entry; ephemeral, never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    /// Position in the reconstructed sequence.
    pub index: usize,
    /// Agent that produced the message (trace-summary mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl ConversationMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            index: 0,
            agent: None,
        }
    }

    #[must_use]
    pub fn with_agent(mut self, agent: Option<String>) -> Self {
        self.agent = agent;
        self
    }
}

/// Rewrite `index` fields to match sequence positions.
pub(crate) fn reindex(messages: &mut [ConversationMessage]) {
    for (index, message) in messages.iter_mut().enumerate() {
        message.index = index;
    }
}
