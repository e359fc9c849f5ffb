//! Rebuild a stored session from reconstructed trace history.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::history::{
    ConversationMessage, HistoryReconstructor, ReconstructionDiagnostics, ReconstructionMode,
};
use crate::observability::SessionEvent;
use crate::session::{Role, SessionItem, SessionStore};

/// Metadata key carrying the producing agent of an assistant item.
pub const AGENT_NAME_METADATA_KEY: &str = "agent_name";

/// Outcome of a rebuild attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RebuildOutcome {
    /// Messages were found and appended to the session.
    Restored {
        items: Vec<SessionItem>,
        messages: Vec<ConversationMessage>,
        diagnostics: ReconstructionDiagnostics,
    },
    /// Nothing to restore; the session was left untouched.
    NoHistory {
        diagnostics: ReconstructionDiagnostics,
    },
}

impl RebuildOutcome {
    #[must_use]
    pub fn diagnostics(&self) -> &ReconstructionDiagnostics {
        match self {
            Self::Restored { diagnostics, .. } | Self::NoHistory { diagnostics } => diagnostics,
        }
    }

    #[must_use]
    pub fn restored_count(&self) -> usize {
        match self {
            Self::Restored { items, .. } => items.len(),
            Self::NoHistory { .. } => 0,
        }
    }
}

/// Map reconstructed messages to session items in the agent-SDK item format.
///
/// Assistant items get the id `msg_<position>`, position being the item's index.
#[must_use]
pub fn messages_to_items(messages: &[ConversationMessage]) -> Vec<SessionItem> {
    messages
        .iter()
        .enumerate()
        .map(|(position, message)| match message.role {
            Role::User => SessionItem::user(message.content.clone()),
            Role::Assistant => {
                let item = SessionItem::assistant_message(
                    message.content.clone(),
                    format!("msg_{position}"),
                );
                match &message.agent {
                    Some(agent) => item.with_metadata(AGENT_NAME_METADATA_KEY, agent.clone()),
                    None => item,
                }
            }
        })
        .collect()
}

/// Writes reconstructed history into the session store.
pub struct SessionRebuilder {
    reconstructor: HistoryReconstructor,
    store: Arc<SessionStore>,
}

impl SessionRebuilder {
    #[must_use]
    pub fn new(reconstructor: HistoryReconstructor, store: Arc<SessionStore>) -> Self {
        Self {
            reconstructor,
            store,
        }
    }

    /// Reconstruct `session_id` and append the result to the store.
    ///
    /// # Errors
    /// Returns an error when the store write fails. Fetch failures only show up in the
    /// outcome's diagnostics.
    pub async fn rebuild(
        &self,
        session_id: &str,
        mode: ReconstructionMode,
    ) -> Result<RebuildOutcome> {
        let reconstruction = self.reconstructor.reconstruct(session_id, mode).await;
        if reconstruction.messages.is_empty() {
            tracing::info!(
                event = SessionEvent::SessionRebuildNoHistory.as_str(),
                session_id,
                mode = mode.as_str(),
                fetch_errors = reconstruction.diagnostics.errors.len(),
                "no prior conversation found; starting fresh"
            );
            return Ok(RebuildOutcome::NoHistory {
                diagnostics: reconstruction.diagnostics,
            });
        }

        let items = messages_to_items(&reconstruction.messages);
        self.store
            .add_items(session_id, items.clone())
            .await
            .with_context(|| format!("failed to store rebuilt history for session {session_id}"))?;
        tracing::info!(
            event = SessionEvent::SessionRebuildRestored.as_str(),
            session_id,
            mode = mode.as_str(),
            restored_items = items.len(),
            backend = self.store.backend_name(),
            "session rebuilt from trace history"
        );
        Ok(RebuildOutcome::Restored {
            items,
            messages: reconstruction.messages,
            diagnostics: reconstruction.diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assistant_items_are_numbered_by_position_and_carry_agent() -> anyhow::Result<()> {
        let messages = vec![
            ConversationMessage::new(Role::User, "hello"),
            ConversationMessage::new(Role::Assistant, "hi there")
                .with_agent(Some("Triage".to_string())),
        ];
        let items = messages_to_items(&messages);
        assert_eq!(serde_json::to_value(&items[0])?, json!({"role": "user", "content": "hello"}));
        assert_eq!(items[1].id.as_deref(), Some("msg_1"));
        assert_eq!(
            items[1].metadata.get(AGENT_NAME_METADATA_KEY),
            Some(&json!("Triage"))
        );
        assert_eq!(items[1].text(), "hi there");
        Ok(())
    }
}
