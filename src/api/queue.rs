//! Hand-off of background work for the paired-reply strategy.

use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use std::sync::Arc;
use tracing::info;

use crate::ai::Rewriter;
use crate::core::models::RewriteTask;
use crate::errors::SlackError;
use crate::slack::SlackApi;
use crate::worker::deliver;

/// Somewhere a [`RewriteTask`] can be handed so it runs after the HTTP
/// response has been sent.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the task could not be handed off.
    async fn enqueue(&self, task: &RewriteTask) -> Result<(), SlackError>;
}

/// Sends tasks to the worker function through SQS.
pub struct SqsQueue {
    client: SqsClient,
    queue_url: String,
}

impl SqsQueue {
    pub async fn from_env(queue_url: String) -> Self {
        let shared_config = aws_config::from_env().load().await;
        Self {
            client: SqsClient::new(&shared_config),
            queue_url,
        }
    }
}

#[async_trait]
impl TaskQueue for SqsQueue {
    async fn enqueue(&self, task: &RewriteTask) -> Result<(), SlackError> {
        let message_body = serde_json::to_string(task)
            .map_err(|e| SlackError::ApiError(format!("Failed to serialize task: {e}")))?;

        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(message_body)
            .send()
            .await
            .map_err(|e| SlackError::AwsError(format!("Failed to send message to SQS: {e}")))?;

        info!(
            "Queued rewrite task (correlation_id={})",
            task.correlation_id
        );
        Ok(())
    }
}

/// Runs tasks on a detached Tokio task in the current process.
///
/// Never wired by the Lambda functions: a frozen sandbox would suspend the
/// work. Meant for long-running local hosts and tests.
pub struct SpawnQueue {
    rewriter: Arc<dyn Rewriter>,
    slack: Arc<dyn SlackApi>,
}

impl SpawnQueue {
    #[must_use]
    pub fn new(rewriter: Arc<dyn Rewriter>, slack: Arc<dyn SlackApi>) -> Self {
        Self { rewriter, slack }
    }
}

#[async_trait]
impl TaskQueue for SpawnQueue {
    async fn enqueue(&self, task: &RewriteTask) -> Result<(), SlackError> {
        let rewriter = Arc::clone(&self.rewriter);
        let slack = Arc::clone(&self.slack);
        let task = task.clone();

        tokio::spawn(async move {
            deliver::process_task(rewriter.as_ref(), slack.as_ref(), &task).await;
        });

        Ok(())
    }
}
