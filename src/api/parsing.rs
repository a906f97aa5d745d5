use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::errors::SlackError;

/// The parts of a Lambda HTTP proxy event the handler looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundRequest {
    pub method: String,
    pub path: Option<String>,
    pub headers: Value,
    pub body: String,
}

impl InboundRequest {
    /// Build a request by hand, mainly for tests and local tooling.
    #[must_use]
    pub fn new(method: &str, body: &str) -> Self {
        Self {
            method: method.to_string(),
            path: None,
            headers: Value::Object(serde_json::Map::new()),
            body: body.to_string(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Some(map) = self.headers.as_object_mut() {
            map.insert(name.to_string(), Value::String(value.to_string()));
        }
        self
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        get_header_value(&self.headers, name)
    }

    #[must_use]
    pub fn is_post(&self) -> bool {
        self.method.eq_ignore_ascii_case("POST")
    }
}

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Extract method, path, headers and body from an API Gateway / function URL
/// proxy event (payload format 2.0 or 1.0).
///
/// A missing body is treated as empty.
///
/// # Errors
///
/// Returns `SlackError::ParseError` if a base64 body does not decode to UTF-8.
pub fn parse_proxy_event(payload: &Value) -> Result<InboundRequest, SlackError> {
    let method = v_str(payload, &["requestContext", "http", "method"])
        .or_else(|| v_str(payload, &["httpMethod"]))
        .unwrap_or_default()
        .to_string();

    let path = v_str(payload, &["rawPath"])
        .or_else(|| v_str(payload, &["path"]))
        .map(ToString::to_string);

    let headers = payload
        .get("headers")
        .filter(|h| h.is_object())
        .cloned()
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

    let raw_body = payload.get("body").and_then(Value::as_str).unwrap_or("");
    let is_base64 = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let body = if is_base64 {
        let bytes = STANDARD
            .decode(raw_body)
            .map_err(|e| SlackError::ParseError(format!("Invalid base64 body: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| SlackError::ParseError(format!("Body is not UTF-8: {e}")))?
    } else {
        raw_body.to_string()
    };

    Ok(InboundRequest {
        method,
        path,
        headers,
        body,
    })
}
