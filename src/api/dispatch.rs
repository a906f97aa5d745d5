//! Delivery strategies for a validated command.
//!
//! Exactly one strategy is active per deployment; all of them share the same
//! entry point so the handler never branches on the strategy itself.

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use super::handler::Services;
use crate::core::config::DispatchStrategy;
use crate::core::models::{Reply, RewriteTask};
use crate::errors::SlackError;
use crate::slack::InboundCommand;
use crate::slack::response_builder::{create_in_channel_payload, fallback_message};
use crate::slack::{OutgoingMessage, SlackApi};

#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Deliver the rewrite of `command.text()` and decide the HTTP reply.
    ///
    /// # Errors
    ///
    /// Returns provider or Slack failures; the handler renders them as an
    /// ephemeral error.
    async fn dispatch(
        &self,
        services: &Services,
        command: &InboundCommand,
    ) -> Result<Reply, SlackError>;
}

#[must_use]
pub fn for_strategy(strategy: DispatchStrategy) -> Box<dyn Dispatch> {
    match strategy {
        DispatchStrategy::Sync => Box::new(SyncRelay),
        DispatchStrategy::Impersonate => Box::new(ImpersonationPost),
        DispatchStrategy::Async => Box::new(AsyncPairedReply),
        DispatchStrategy::ImpersonateWithFallback => Box::new(ImpersonationWithFallback),
    }
}

fn require_post_target(command: &InboundCommand) -> Result<(), SlackError> {
    if command.user_id().is_empty() || command.channel_id().is_empty() {
        return Err(SlackError::ValidationError(
            "user_id and channel_id are required to post".to_string(),
        ));
    }
    Ok(())
}

/// Relays the rewrite through `response_url` as an in-channel message.
pub struct SyncRelay;

#[async_trait]
impl Dispatch for SyncRelay {
    async fn dispatch(
        &self,
        services: &Services,
        command: &InboundCommand,
    ) -> Result<Reply, SlackError> {
        let rewritten = services.rewriter.rewrite(command.text()).await?;

        services
            .slack
            .send_response_url(
                command.response_url(),
                &create_in_channel_payload(&rewritten, command.thread_ts()),
            )
            .await?;

        info!("Relayed rewrite through response_url");
        Ok(Reply::Empty)
    }
}

/// Posts the rewrite into the channel under the invoking user's name and avatar.
pub struct ImpersonationPost;

impl ImpersonationPost {
    async fn post(
        slack: &dyn SlackApi,
        command: &InboundCommand,
        rewritten: &str,
    ) -> Result<(), SlackError> {
        let profile = slack.get_user_profile(command.user_id()).await?;
        let message = OutgoingMessage::new(command.channel_id(), rewritten)
            .in_thread(command.thread_ts())
            .as_user(&profile);
        slack.post_message(&message).await?;

        info!(
            "Posted rewrite as {} in channel {}",
            profile.display_name,
            command.channel_id()
        );
        Ok(())
    }
}

#[async_trait]
impl Dispatch for ImpersonationPost {
    async fn dispatch(
        &self,
        services: &Services,
        command: &InboundCommand,
    ) -> Result<Reply, SlackError> {
        require_post_target(command)?;
        let rewritten = services.rewriter.rewrite(command.text()).await?;
        Self::post(services.slack.as_ref(), command, &rewritten).await?;
        Ok(Reply::Empty)
    }
}

/// Acknowledges at once and leaves the rewrite and both posts to the queue.
pub struct AsyncPairedReply;

#[async_trait]
impl Dispatch for AsyncPairedReply {
    async fn dispatch(
        &self,
        services: &Services,
        command: &InboundCommand,
    ) -> Result<Reply, SlackError> {
        require_post_target(command)?;

        let Some(queue) = services.queue.as_ref() else {
            return Err(SlackError::ConfigError(
                "no task queue configured for background work".to_string(),
            ));
        };

        let task = RewriteTask {
            correlation_id: Uuid::new_v4().to_string(),
            user_id: command.user_id().to_string(),
            channel_id: command.channel_id().to_string(),
            text: command.text().to_string(),
            thread_ts: command.thread_ts().map(ToString::to_string),
        };

        queue.enqueue(&task).await?;
        Ok(Reply::Empty)
    }
}

/// Impersonation post that falls back to a private copy of both texts when
/// the bot has no access to the channel.
pub struct ImpersonationWithFallback;

#[async_trait]
impl Dispatch for ImpersonationWithFallback {
    async fn dispatch(
        &self,
        services: &Services,
        command: &InboundCommand,
    ) -> Result<Reply, SlackError> {
        require_post_target(command)?;
        let rewritten = services.rewriter.rewrite(command.text()).await?;

        match ImpersonationPost::post(services.slack.as_ref(), command, &rewritten).await {
            Ok(()) => Ok(Reply::Empty),
            Err(e) if e.is_channel_access_denied() => {
                warn!(
                    "Cannot post in channel {} ({}), replying ephemerally",
                    command.channel_id(),
                    e
                );
                Ok(Reply::Ephemeral(fallback_message(command.text(), &rewritten)))
            }
            Err(e) => Err(e),
        }
    }
}
