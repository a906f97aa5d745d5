use serde::{Deserialize, Serialize};

/// Unit of background work handed from the API function to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteTask {
    pub correlation_id: String,
    pub user_id: String,
    pub channel_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

/// What the handler answers to the original HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// 200 with an empty body; Slack shows nothing to the invoking user.
    Empty,
    Ephemeral(String),
    Challenge(String),
    Error { status: u16, message: String },
}

impl Reply {
    #[must_use]
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self::Ephemeral(text.into())
    }

    #[must_use]
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::Error {
            status,
            message: message.into(),
        }
    }
}
