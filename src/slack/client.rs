//! Slack API client module
//!
//! Encapsulates the Slack Web API calls the command needs: a profile lookup,
//! channel posts, ephemeral posts and `response_url` callbacks.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use slack_morphism::errors::SlackClientError;
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::{
    SlackApiChatPostEphemeralRequest, SlackApiChatPostMessageRequest, SlackApiUsersInfoRequest,
};
use slack_morphism::{
    SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackMessageContent, SlackTs, SlackUserId,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::{SlackError, SlackErrorCode};

// Build the Slack client connector safely without panicking.
// If connector construction fails, store None and surface a SlackError at call sites.
static SLACK_CLIENT: std::sync::LazyLock<Option<Arc<SlackHyperClient>>> =
    std::sync::LazyLock::new(|| build_slack_client(None));

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

fn build_slack_client(api_url: Option<&str>) -> Option<Arc<SlackHyperClient>> {
    match SlackClientHyperConnector::new() {
        Ok(connector) => {
            let connector = match api_url {
                Some(url) => connector.with_slack_api_url(url),
                None => connector,
            };
            Some(Arc::new(SlackHyperClient::new(connector)))
        }
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    }
}

/// Name and avatar used to post on a user's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Profile used when the lookup fails: the raw user id, no avatar.
    #[must_use]
    pub fn anonymous(user_id: &str) -> Self {
        Self {
            display_name: user_id.to_string(),
            avatar_url: None,
        }
    }
}

/// A `chat.postMessage` call. Link and media unfurling are always disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub channel: SlackChannelId,
    pub text: String,
    pub thread_ts: Option<SlackTs>,
    pub username: Option<String>,
    pub icon_url: Option<String>,
}

impl OutgoingMessage {
    #[must_use]
    pub fn new(channel_id: &str, text: impl Into<String>) -> Self {
        Self {
            channel: SlackChannelId(channel_id.to_string()),
            text: text.into(),
            thread_ts: None,
            username: None,
            icon_url: None,
        }
    }

    #[must_use]
    pub fn in_thread(mut self, thread_ts: Option<&str>) -> Self {
        self.thread_ts = thread_ts.map(|ts| SlackTs(ts.to_string()));
        self
    }

    /// Post under the user's name and avatar instead of the bot's.
    #[must_use]
    pub fn as_user(mut self, profile: &UserProfile) -> Self {
        self.username = Some(profile.display_name.clone());
        self.icon_url.clone_from(&profile.avatar_url);
        self
    }

    #[must_use]
    pub fn to_request(&self) -> SlackApiChatPostMessageRequest {
        SlackApiChatPostMessageRequest::new(
            self.channel.clone(),
            SlackMessageContent::new().with_text(self.text.clone()),
        )
        .opt_thread_ts(self.thread_ts.clone())
        .opt_username(self.username.clone())
        .opt_icon_url(self.icon_url.clone())
        .with_unfurl_links(false)
        .with_unfurl_media(false)
    }
}

/// A `chat.postEphemeral` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EphemeralMessage {
    pub channel: SlackChannelId,
    pub user: SlackUserId,
    pub text: String,
    pub thread_ts: Option<SlackTs>,
}

impl EphemeralMessage {
    #[must_use]
    pub fn new(channel_id: &str, user_id: &str, text: impl Into<String>) -> Self {
        Self {
            channel: SlackChannelId(channel_id.to_string()),
            user: SlackUserId(user_id.to_string()),
            text: text.into(),
            thread_ts: None,
        }
    }

    #[must_use]
    pub fn in_thread(mut self, thread_ts: Option<&str>) -> Self {
        self.thread_ts = thread_ts.map(|ts| SlackTs(ts.to_string()));
        self
    }

    #[must_use]
    pub fn to_request(&self) -> SlackApiChatPostEphemeralRequest {
        SlackApiChatPostEphemeralRequest::new(
            self.channel.clone(),
            self.user.clone(),
            SlackMessageContent::new().with_text(self.text.clone()),
        )
        .opt_thread_ts(self.thread_ts.clone())
    }
}

/// The slice of the Slack platform the command talks to.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the profile cannot be fetched.
    async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, SlackError>;

    /// Posts a channel message and returns its `ts`.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::SlackApi` carrying Slack's error code when the
    /// post is rejected.
    async fn post_message(&self, message: &OutgoingMessage) -> Result<SlackTs, SlackError>;

    /// # Errors
    ///
    /// Returns an error if Slack rejects the ephemeral post.
    async fn post_ephemeral(&self, message: &EphemeralMessage) -> Result<(), SlackError>;

    /// # Errors
    ///
    /// Returns an error if the `response_url` POST does not succeed.
    async fn send_response_url(&self, response_url: &str, payload: &Value)
    -> Result<(), SlackError>;
}

/// Slack Web API client
pub struct SlackClient {
    token: SlackApiToken,
    client: Option<Arc<SlackHyperClient>>,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
            client: SLACK_CLIENT.clone(),
        }
    }

    /// Client talking to a Web API other than `https://slack.com/api`.
    #[must_use]
    pub fn with_base_url(token: String, base_url: &str) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
            client: build_slack_client(Some(base_url.trim_end_matches('/'))),
        }
    }

    fn connector(&self) -> Result<&SlackHyperClient, SlackError> {
        self.client.as_deref().ok_or_else(|| {
            SlackError::ApiError("Slack HTTP connector not initialized".to_string())
        })
    }
}

/// Keep Slack's own error code so callers can tell a missing channel
/// membership apart from other failures.
fn web_api_error(method: &str, error: SlackClientError) -> SlackError {
    match error {
        SlackClientError::ApiError(e) => SlackError::SlackApi {
            method: method.to_string(),
            code: SlackErrorCode::from(e.code.as_str()),
        },
        other => SlackError::ApiError(format!("{method} failed: {other}")),
    }
}

/// Extract display name and avatar from a `users.info` user object.
///
/// Prefers the display name, then the real name, then the account handle.
fn profile_from_user(user_id: &str, user: &Value) -> UserProfile {
    let profile = user.get("profile");

    let non_blank = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    };

    let display_name = non_blank(profile.and_then(|p| p.get("display_name")))
        .or_else(|| non_blank(profile.and_then(|p| p.get("real_name"))))
        .or_else(|| non_blank(user.get("name")))
        .unwrap_or_else(|| user_id.to_string());

    let avatar_url = ["image_192", "image_72", "image_48"]
        .iter()
        .find_map(|key| non_blank(profile.and_then(|p| p.get(*key))));

    UserProfile {
        display_name,
        avatar_url,
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, SlackError> {
        let session = self.connector()?.open_session(&self.token);
        let user_info_req = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));

        match session.users_info(&user_info_req).await {
            // Avatar sizes are only exposed through the serialized `image_N` keys.
            Ok(info) => match serde_json::to_value(&info.user) {
                Ok(user) => Ok(profile_from_user(user_id, &user)),
                Err(e) => {
                    warn!("Failed to read user info for {}: {}", user_id, e);
                    Ok(UserProfile::anonymous(user_id))
                }
            },
            Err(e) => {
                warn!("Failed to fetch user info for {}: {}", user_id, e);
                Ok(UserProfile::anonymous(user_id))
            }
        }
    }

    async fn post_message(&self, message: &OutgoingMessage) -> Result<SlackTs, SlackError> {
        let session = self.connector()?.open_session(&self.token);

        let resp = session
            .chat_post_message(&message.to_request())
            .await
            .map_err(|e| web_api_error("chat.postMessage", e))?;

        debug!("Posted message {} in channel {}", resp.ts.0, message.channel.0);
        Ok(resp.ts)
    }

    async fn post_ephemeral(&self, message: &EphemeralMessage) -> Result<(), SlackError> {
        let session = self.connector()?.open_session(&self.token);

        session
            .chat_post_ephemeral(&message.to_request())
            .await
            .map_err(|e| web_api_error("chat.postEphemeral", e))?;

        Ok(())
    }

    async fn send_response_url(
        &self,
        response_url: &str,
        payload: &Value,
    ) -> Result<(), SlackError> {
        if response_url.is_empty() {
            return Err(SlackError::ValidationError(
                "missing response_url".to_string(),
            ));
        }

        let resp = HTTP_CLIENT.post(response_url).json(payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(SlackError::ApiError(format!(
                "response_url POST failed: status={status} body={body_text}"
            )));
        }

        Ok(())
    }
}
