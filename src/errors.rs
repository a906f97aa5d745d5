use std::fmt;

use thiserror::Error;

/// Machine-checkable error code returned by the Slack Web API in its
/// `{"ok": false, "error": "..."}` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlackErrorCode {
    NotInChannel,
    ChannelNotFound,
    Other(String),
}

impl SlackErrorCode {
    /// True when the bot cannot post into the target channel, either because
    /// it was never invited or because the channel is invisible to it.
    #[must_use]
    pub fn is_channel_access_denied(&self) -> bool {
        matches!(self, Self::NotInChannel | Self::ChannelNotFound)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotInChannel => "not_in_channel",
            Self::ChannelNotFound => "channel_not_found",
            Self::Other(code) => code,
        }
    }
}

impl From<&str> for SlackErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "not_in_channel" => Self::NotInChannel,
            "channel_not_found" => Self::ChannelNotFound,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SlackErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("Server configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid Slack signature: {0}")]
    SignatureError(String),

    #[error("Failed to parse Slack event: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    ValidationError(String),

    #[error("Failed to access Slack API: {0}")]
    ApiError(String),

    #[error("Slack API {method} failed: {code}")]
    SlackApi { method: String, code: SlackErrorCode },

    #[error("Failed to rewrite message: {0}")]
    ProviderError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),
}

impl SlackError {
    /// Structured Slack error code, when the failure came from an `ok: false`
    /// Web API response.
    #[must_use]
    pub fn slack_code(&self) -> Option<&SlackErrorCode> {
        match self {
            SlackError::SlackApi { code, .. } => Some(code),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_channel_access_denied(&self) -> bool {
        self.slack_code()
            .is_some_and(SlackErrorCode::is_channel_access_denied)
    }
}

impl From<reqwest::Error> for SlackError {
    fn from(error: reqwest::Error) -> Self {
        SlackError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for SlackError {
    fn from(error: serde_json::Error) -> Self {
        SlackError::ParseError(error.to_string())
    }
}
