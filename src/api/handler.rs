//! API Lambda handler for the `/trumpify` slash command.
//!
//! This module handles:
//! - Request validation (method, signing secret, signature)
//! - The Slack URL verification handshake
//! - Allow-list gating and empty-text usage hints
//! - Delegating delivery to the configured dispatch strategy

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::dispatch::{self, Dispatch};
use super::helpers;
use super::parsing::{InboundRequest, parse_proxy_event};
use super::queue::{SqsQueue, TaskQueue};
use super::signature;
use crate::ai::{RewriteClient, Rewriter};
use crate::core::config::AppConfig;
use crate::core::models::Reply;
use crate::errors::SlackError;
use crate::slack::response_builder::{PERMISSION_DENIED, USAGE_HINT, error_message};
use crate::slack::{SlackApi, SlackClient, parse_form_data};

pub use self::function_handler as handler;

/// The external collaborators a request may touch.
#[derive(Clone)]
pub struct Services {
    pub rewriter: Arc<dyn Rewriter>,
    pub slack: Arc<dyn SlackApi>,
    /// Where background work goes; only the async strategy needs one.
    pub queue: Option<Arc<dyn TaskQueue>>,
}

impl Services {
    /// Wire up the production clients for `config`.
    pub async fn from_config(config: &AppConfig) -> Self {
        let rewriter: Arc<dyn Rewriter> = Arc::new(RewriteClient::new(
            config.mistral_api_key.clone(),
            config.mistral_model.clone(),
        ));
        let slack: Arc<dyn SlackApi> = Arc::new(SlackClient::new(config.slack_bot_token.clone()));

        let queue: Option<Arc<dyn TaskQueue>> = match &config.rewrite_queue_url {
            Some(url) => Some(Arc::new(SqsQueue::from_env(url.clone()).await)),
            None => None,
        };

        Self {
            rewriter,
            slack,
            queue,
        }
    }
}

/// Configuration and clients built once per cold start and shared by every
/// invocation of the API function.
pub struct ApiState {
    inner: Result<(AppConfig, Services), SlackError>,
}

impl ApiState {
    #[must_use]
    pub fn new(config: AppConfig, services: Services) -> Self {
        Self {
            inner: Ok((config, services)),
        }
    }

    /// Load the configuration and wire the production clients.
    ///
    /// A configuration error is kept and answered with a 500 on each request
    /// rather than failing the cold start.
    pub async fn from_env() -> Self {
        match AppConfig::from_env() {
            Ok(config) => {
                let services = Services::from_config(&config).await;
                Self::new(config, services)
            }
            Err(e) => {
                error!("Config error: {}", e);
                Self { inner: Err(e) }
            }
        }
    }
}

/// Process one inbound request and decide the reply.
///
/// Never fails: every outcome, including provider and Slack failures, is a
/// [`Reply`].
pub async fn handle_request(
    config: &AppConfig,
    services: &Services,
    request: &InboundRequest,
) -> Reply {
    let dispatcher = dispatch::for_strategy(config.strategy);
    handle_with(config, services, dispatcher.as_ref(), request).await
}

/// [`handle_request`] with an explicit dispatcher.
pub async fn handle_with(
    config: &AppConfig,
    services: &Services,
    dispatcher: &dyn Dispatch,
    request: &InboundRequest,
) -> Reply {
    if !request.is_post() {
        return Reply::error(405, "Method not allowed");
    }

    // ========================================================================
    // Fail closed without a signing secret
    // ========================================================================

    let Some(signing_secret) = config.slack_signing_secret.as_deref() else {
        error!("Missing SLACK_SIGNING_SECRET");
        return Reply::error(500, "Server configuration error");
    };

    if config.verify_signatures
        && let Err(reply) = verify_signature(request, signing_secret)
    {
        return reply;
    }

    let command = match parse_form_data(&request.body) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to parse Slack command body: {}", e);
            return Reply::error(400, "Invalid form body");
        }
    };

    // ========================================================================
    // URL verification handshake
    // ========================================================================

    if command.is_url_verification() {
        info!("Answering URL verification challenge");
        return Reply::Challenge(command.challenge().to_string());
    }

    // ========================================================================
    // Gating and validation
    // ========================================================================

    if !config.is_user_allowed(command.user_id()) {
        warn!("User {} is not on the allow-list", command.user_id());
        return Reply::ephemeral(PERMISSION_DENIED);
    }

    if command.text().trim().is_empty() {
        return Reply::ephemeral(USAGE_HINT);
    }

    // ========================================================================
    // Rewrite and deliver
    // ========================================================================

    info!(
        "Dispatching /trumpify for user {} in channel {} (strategy={})",
        command.user_id(),
        command.channel_id(),
        config.strategy
    );

    match dispatcher.dispatch(services, &command).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Error processing trumpify request: {}", e);
            Reply::ephemeral(error_message(&e.to_string()))
        }
    }
}

fn verify_signature(request: &InboundRequest, signing_secret: &str) -> Result<(), Reply> {
    let Some(sig) = request.header("X-Slack-Signature") else {
        error!("Missing X-Slack-Signature header");
        return Err(Reply::error(401, "Missing X-Slack-Signature header"));
    };

    let Some(timestamp) = request.header("X-Slack-Request-Timestamp") else {
        error!("Missing X-Slack-Request-Timestamp header");
        return Err(Reply::error(401, "Missing X-Slack-Request-Timestamp header"));
    };

    signature::verify_slack_signature(&request.body, timestamp, sig, signing_secret).map_err(
        |e| {
            error!("Slack signature verification failed: {}", e);
            Reply::error(401, "Invalid Slack signature")
        },
    )
}

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never returns an error; malformed events and misconfiguration are
/// rendered as 4xx/5xx proxy responses.
#[tracing::instrument(level = "info", skip(state, event))]
pub async fn function_handler(state: &ApiState, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let request = match parse_proxy_event(&event.payload) {
        Ok(r) => r,
        Err(e) => {
            error!("Malformed proxy event: {}", e);
            return Ok(helpers::err_response(400, &format!("Parse Error: {e}")));
        }
    };

    if let Some(path) = &request.path {
        info!(raw_path = %path, method = %request.method, "Request path");
    }

    if !request.is_post() {
        return Ok(helpers::render(&Reply::error(405, "Method not allowed")));
    }

    let (config, services) = match &state.inner {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Config error: {}", e);
            return Ok(helpers::err_response(500, "Server configuration error"));
        }
    };

    let reply = handle_request(config, services, &request).await;
    Ok(helpers::render(&reply))
}
