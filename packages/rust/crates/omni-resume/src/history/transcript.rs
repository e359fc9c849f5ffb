//! Helpers for presenting a reconstructed conversation.

use crate::session::Role;

use super::message::ConversationMessage;

/// Positions whose role repeats the previous message's role.
#[must_use]
pub fn check_alternation(messages: &[ConversationMessage]) -> Vec<usize> {
    messages
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].role == pair[1].role)
        .map(|(position, _)| position + 1)
        .collect()
}

/// Plain-text transcript block for prompt context; empty when there is nothing to show.
#[must_use]
pub fn format_transcript(messages: &[ConversationMessage]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let mut out = String::from("Previous conversation:\n\n");
    for message in messages {
        let speaker = match message.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        out.push_str(speaker);
        out.push_str(": ");
        out.push_str(&message.content);
        out.push_str("\n\n");
    }
    out
}
