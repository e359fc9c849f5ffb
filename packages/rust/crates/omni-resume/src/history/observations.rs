//! Canonical reconstruction: one user/assistant pair per trace turn.

use crate::session::Role;
use crate::trace::Observation;

use super::extract::extract_logged;
use super::message::{ConversationMessage, reindex};

#[derive(Default)]
struct Turn {
    user: Option<String>,
    assistant: Option<String>,
}

impl Turn {
    fn flush_into(&mut self, messages: &mut Vec<ConversationMessage>) {
        if let Some(user) = self.user.take() {
            messages.push(ConversationMessage::new(Role::User, user));
        }
        if let Some(assistant) = self.assistant.take() {
            messages.push(ConversationMessage::new(Role::Assistant, assistant));
        }
    }
}

/// Observations sorted by start time; missing times first, ties keep input order.
pub(crate) fn sorted_by_start(observations: &[Observation]) -> Vec<&Observation> {
    let mut sorted: Vec<&Observation> = observations.iter().collect();
    sorted.sort_by_key(|observation| observation.start_time);
    sorted
}

/// Rebuild the conversation from a flat list of observations.
///
/// A change of trace id (in start-time order) opens a new turn. The first
/// `user-interaction` span with text is the turn's user message; the last generation
/// with text is its assistant message.
#[must_use]
pub fn reconstruct_from_observations(observations: &[Observation]) -> Vec<ConversationMessage> {
    let mut messages = Vec::new();
    let mut turn = Turn::default();
    let mut current_trace: Option<&str> = None;

    for observation in sorted_by_start(observations) {
        if current_trace != Some(observation.trace_id.as_str()) {
            turn.flush_into(&mut messages);
            current_trace = Some(observation.trace_id.as_str());
        }
        if turn.user.is_none()
            && let Some(text) = extract_logged(
                observation.user_interaction_input(),
                &observation.id,
                "span_input",
            )
        {
            turn.user = Some(text);
        }
        if observation.is_generation()
            && let Some(text) = extract_logged(
                observation.generation_output(),
                &observation.id,
                "generation_output",
            )
        {
            turn.assistant = Some(text);
        }
    }
    turn.flush_into(&mut messages);
    reindex(&mut messages);
    messages
}
