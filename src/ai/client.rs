//! LLM (Mistral) API client module
//!
//! Encapsulates the chat-completion call that rewrites a message.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{info, warn};

use super::prompt_builder::{build_prompt, to_wire_messages};
use crate::errors::SlackError;

pub const MISTRAL_API_BASE_URL: &str = "https://api.mistral.ai";
pub const DEFAULT_MODEL: &str = "mistral-small-latest";
pub const TEMPERATURE: f64 = 0.8;
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Anything that can turn a message into its stylized paraphrase.
#[async_trait]
pub trait Rewriter: Send + Sync {
    /// Returns the rewritten text, or `text` itself when the provider
    /// produced nothing usable.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::ProviderError` if the provider call fails.
    async fn rewrite(&self, text: &str) -> Result<String, SlackError>;
}

/// Chat-completion client for the rewrite call
pub struct RewriteClient {
    api_key: String,
    model_name: String,
    base_url: String,
}

impl RewriteClient {
    #[must_use]
    pub fn new(api_key: String, model_name: Option<String>) -> Self {
        Self::with_base_url(api_key, model_name, MISTRAL_API_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(api_key: String, model_name: Option<String>, base_url: &str) -> Self {
        Self {
            api_key,
            model_name: model_name.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    #[must_use]
    pub fn request_body(&self, text: &str) -> Value {
        json!({
            "model": self.model_name,
            "messages": to_wire_messages(&build_prompt(text)),
            "temperature": TEMPERATURE,
            "max_tokens": MAX_OUTPUT_TOKENS,
        })
    }
}

#[async_trait]
impl Rewriter for RewriteClient {
    async fn rewrite(&self, text: &str) -> Result<String, SlackError> {
        #[cfg(feature = "debug-logs")]
        info!("Rewriting text: {:?}", text);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            "Rewriting {} chars with model {}",
            text.chars().count(),
            self.model_name
        );

        let response = HTTP_CLIENT
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(|e| SlackError::ProviderError(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(SlackError::ProviderError(format!(
                "status={status} body={error_text}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SlackError::ProviderError(format!("invalid JSON response: {e}")))?;

        Ok(extract_content(&body).unwrap_or_else(|| {
            warn!("Completion returned no content, keeping original text");
            text.to_string()
        }))
    }
}

/// Pull the first choice's text out of a chat-completion response.
///
/// Content may be a plain string or a list of typed chunks; only `text`
/// chunks are kept. Blank output counts as no output.
#[must_use]
pub fn extract_content(body: &Value) -> Option<String> {
    let content = body
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?;

    let text = match content {
        Value::String(s) => s.clone(),
        Value::Array(chunks) => chunks
            .iter()
            .filter(|c| c.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|c| c.get("text").and_then(Value::as_str))
            .collect::<String>(),
        _ => return None,
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
