use std::env;
use std::fmt;
use std::str::FromStr;

use crate::errors::SlackError;

/// How a rewritten message is delivered back into Slack.
///
/// Chosen once per deployment through `TRUMPIFY_STRATEGY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchStrategy {
    /// Relay through the command's `response_url` as an in-channel message.
    #[default]
    Sync,
    /// Post as the invoking user via `username`/`icon_url` overrides.
    Impersonate,
    /// Acknowledge immediately and post a labeled message plus the original
    /// text as a threaded reply in the background.
    Async,
    /// Like `Impersonate`, but degrade to an ephemeral reply when the bot is
    /// not allowed to post in the channel.
    ImpersonateWithFallback,
}

impl FromStr for DispatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "sync" | "relay" => Ok(Self::Sync),
            "impersonate" => Ok(Self::Impersonate),
            "async" | "paired" => Ok(Self::Async),
            "impersonate-fallback" | "impersonate_fallback" => Ok(Self::ImpersonateWithFallback),
            other => Err(format!("unknown dispatch strategy '{other}'")),
        }
    }
}

impl fmt::Display for DispatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sync => "sync",
            Self::Impersonate => "impersonate",
            Self::Async => "async",
            Self::ImpersonateWithFallback => "impersonate-fallback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Presence is checked per request so a missing secret fails closed with a 500.
    pub slack_signing_secret: Option<String>,
    pub slack_bot_token: String,
    pub mistral_api_key: String,
    pub mistral_model: Option<String>,
    pub allowed_user_ids: Vec<String>,
    pub strategy: DispatchStrategy,
    pub rewrite_queue_url: Option<String>,
    pub verify_signatures: bool,
}

impl AppConfig {
    /// # Errors
    ///
    /// See [`AppConfig::from_vars`].
    pub fn from_env() -> Result<Self, SlackError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::ConfigError` when a required variable is missing,
    /// a value does not parse, or the async strategy has no queue to hand
    /// its work to.
    pub fn from_vars<F>(lookup: F) -> Result<Self, SlackError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            non_empty(key).ok_or_else(|| {
                SlackError::ConfigError(format!("{key}: environment variable not found"))
            })
        };

        let strategy = match non_empty("TRUMPIFY_STRATEGY") {
            Some(raw) => raw
                .parse::<DispatchStrategy>()
                .map_err(|e| SlackError::ConfigError(format!("TRUMPIFY_STRATEGY: {e}")))?,
            None => DispatchStrategy::default(),
        };

        let verify_signatures = match non_empty("SLACK_VERIFY_SIGNATURES") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                SlackError::ConfigError(format!("SLACK_VERIFY_SIGNATURES: invalid boolean '{raw}'"))
            })?,
            None => true,
        };

        // A frozen Lambda would suspend in-process background work.
        let rewrite_queue_url = non_empty("REWRITE_QUEUE_URL");
        if strategy == DispatchStrategy::Async && rewrite_queue_url.is_none() {
            return Err(SlackError::ConfigError(
                "REWRITE_QUEUE_URL: required by the async strategy".to_string(),
            ));
        }

        Ok(Self {
            slack_signing_secret: non_empty("SLACK_SIGNING_SECRET"),
            slack_bot_token: required("SLACK_BOT_TOKEN")?,
            mistral_api_key: required("MISTRAL_API_KEY")?,
            mistral_model: non_empty("MISTRAL_MODEL"),
            allowed_user_ids: non_empty("ALLOWED_USER_IDS")
                .map(|raw| parse_allow_list(&raw))
                .unwrap_or_default(),
            strategy,
            rewrite_queue_url,
            verify_signatures,
        })
    }

    /// An empty allow-list admits everyone.
    #[must_use]
    pub fn is_user_allowed(&self, user_id: &str) -> bool {
        self.allowed_user_ids.is_empty() || self.allowed_user_ids.iter().any(|id| id == user_id)
    }
}

#[must_use]
pub fn parse_allow_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
