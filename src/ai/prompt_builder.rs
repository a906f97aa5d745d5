//! Prompt construction for the rewrite call.

use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use serde_json::{Value, json};

pub const TRUMP_SYSTEM_PROMPT: &str = "You are a translator that rewrites messages in Donald Trump's distinctive speaking style.

Key characteristics to emulate:
- Superlatives and exaggeration (\"the best\", \"tremendous\", \"huge\", \"like never before\")
- Repetition for emphasis (\"Very, very bad. Very bad.\")
- Self-references and boasting
- Simple, punchy sentences mixed with run-on thoughts
- Nicknames and colorful insults for things/people being criticized
- Phrases like \"Believe me\", \"Let me tell you\", \"Many people are saying\", \"Everyone knows\"
- Dramatic declarations (\"It's a disaster!\", \"Total failure!\", \"Unbelievable!\")
- Casual asides and tangents

Keep the core meaning and intent of the original message, but transform the tone and style completely. Keep the response concise - don't make it much longer than the original. Output ONLY the trumpified message, no explanations.";

/// System instruction followed by the user's text, verbatim.
#[must_use]
pub fn build_prompt(text: &str) -> Vec<ChatCompletionMessage> {
    vec![
        ChatCompletionMessage {
            role: MessageRole::system,
            content: Content::Text(TRUMP_SYSTEM_PROMPT.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        },
        ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::Text(text.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        },
    ]
}

/// Convert prompt messages into the chat-completions wire format.
///
/// Only text content is sent; the rewrite prompt never carries images.
#[must_use]
pub fn to_wire_messages(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(|m| {
            let role_str = match m.role {
                MessageRole::system => "system",
                MessageRole::user | MessageRole::function | MessageRole::tool => "user",
                MessageRole::assistant => "assistant",
            };

            match &m.content {
                Content::Text(t) => Some(json!({ "role": role_str, "content": t })),
                Content::ImageUrl(_) => None,
            }
        })
        .collect()
}
