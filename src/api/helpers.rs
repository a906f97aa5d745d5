//! Lambda proxy response builders.

use serde_json::{Value, json};

use crate::core::models::Reply;
use crate::slack::response_builder::{create_challenge_payload, create_ephemeral_payload};

/// Returns a 200 OK response with an empty body.
#[must_use]
pub fn ok_empty() -> Value {
    json!({ "statusCode": 200, "body": "" })
}

/// Returns a 200 OK response carrying a JSON body.
#[must_use]
pub fn ok_json(body: &Value) -> Value {
    json!({
        "statusCode": 200,
        "headers": { "Content-Type": "application/json" },
        "body": body.to_string()
    })
}

/// Returns a 200 OK response with an ephemeral Slack message.
#[must_use]
pub fn ok_ephemeral(text: &str) -> Value {
    ok_json(&create_ephemeral_payload(text))
}

/// Returns an error response with the given status code and a plain-text message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "Content-Type": "text/plain" },
        "body": message
    })
}

/// Render a handler [`Reply`] as a Lambda proxy response.
#[must_use]
pub fn render(reply: &Reply) -> Value {
    match reply {
        Reply::Empty => ok_empty(),
        Reply::Ephemeral(text) => ok_ephemeral(text),
        Reply::Challenge(token) => ok_json(&create_challenge_payload(token)),
        Reply::Error { status, message } => err_response(*status, message),
    }
}
