//! Picking the assistant's reply out of a thread.

use course_agent_service::{Role, ThreadMessage};

/// The reply used when the thread holds no assistant message.
pub const NO_RESPONSE: &str = "[No response from assistant]";

/// Returns the text of the first assistant message, in the order given.
///
/// Services list messages newest first, so this is the latest reply.
pub fn latest_reply(messages: &[ThreadMessage]) -> String {
    messages
        .iter()
        .find(|msg| msg.role == Role::Assistant)
        .map(|msg| msg.text.clone())
        .unwrap_or_else(|| NO_RESPONSE.to_owned())
}
