//! Response-related utilities for Slack interactions.
//!
//! Payload builders and user-facing message texts shared by the handler,
//! the dispatch strategies and the worker.

use serde_json::{Value, json};

pub const USAGE_HINT: &str =
    "Please provide a message to trumpify! Usage: `/trumpify your message here`";

pub const PERMISSION_DENIED: &str = "Sorry, you don't have permission to use this command.";

/// Create a JSON payload for an ephemeral response
///
/// Ephemeral messages are only visible to the user who triggered the command.
///
/// # Examples
///
/// ```
/// use trumpify::slack::response_builder::create_ephemeral_payload;
///
/// let payload = create_ephemeral_payload("This message is only visible to you");
/// assert_eq!(payload["response_type"], "ephemeral");
/// ```
#[must_use]
pub fn create_ephemeral_payload(text: &str) -> Value {
    json!({
        "response_type": "ephemeral",
        "text": text
    })
}

/// Create a JSON payload that posts into the channel for everyone to see.
///
/// With a `thread_ts` the message lands in that thread instead of the
/// channel.
#[must_use]
pub fn create_in_channel_payload(text: &str, thread_ts: Option<&str>) -> Value {
    let mut payload = json!({
        "response_type": "in_channel",
        "text": text
    });
    if let Some(ts) = thread_ts {
        payload["thread_ts"] = Value::String(ts.to_string());
    }
    payload
}

#[must_use]
pub fn create_challenge_payload(challenge: &str) -> Value {
    json!({ "challenge": challenge })
}

/// Message shown when processing fails after validation.
#[must_use]
pub fn error_message(description: &str) -> String {
    format!("Sorry, something went wrong: {description}")
}

/// Channel message used by the paired-reply flow.
#[must_use]
pub fn labeled_message(display_name: &str, rewritten: &str) -> String {
    format!("*{display_name}* says: {rewritten}")
}

/// Ephemeral stand-in for a channel post the bot was not allowed to make.
#[must_use]
pub fn fallback_message(original: &str, rewritten: &str) -> String {
    format!(
        "I can't post in this channel yet. Invite me with `/invite @trumpify`, \
         or copy the message below.\n\n*Original:* {original}\n*Trumpified:* {rewritten}"
    )
}
