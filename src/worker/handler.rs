use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, warn};

use super::deliver;
use crate::ai::{RewriteClient, Rewriter};
use crate::core::config::AppConfig;
use crate::core::models::RewriteTask;
use crate::slack::{SlackApi, SlackClient};

/// Pull every `RewriteTask` out of an SQS event.
///
/// Records whose body is missing or not a task are logged and skipped; they
/// would fail identically on every redelivery.
#[must_use]
pub fn tasks_from_sqs_event(payload: &Value) -> Vec<RewriteTask> {
    let Some(records) = payload.get("Records").and_then(Value::as_array) else {
        warn!("SQS event has no Records array");
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| {
            let Some(body) = record.get("body").and_then(Value::as_str) else {
                error!("Failed to extract SQS message body");
                return None;
            };
            serde_json::from_str::<RewriteTask>(body)
                .map_err(|e| {
                    error!("Failed to parse SQS message body into RewriteTask: {}", e);
                })
                .ok()
        })
        .collect()
}

/// Run every task of an event against the given collaborators.
pub async fn process_event(rewriter: &dyn Rewriter, slack: &dyn SlackApi, payload: &Value) {
    for task in tasks_from_sqs_event(payload) {
        info!(
            "Processing rewrite task (corr_id={}, channel={})",
            task.correlation_id, task.channel_id
        );
        deliver::process_task(rewriter, slack, &task).await;
    }
}

/// Lambda handler for the Worker entrypoint. Parses SQS messages, rewrites, and delivers.
///
/// # Errors
///
/// Returns an error only when configuration cannot be loaded.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<(), Error> {
    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;

    let rewriter = RewriteClient::new(config.mistral_api_key.clone(), config.mistral_model.clone());
    let slack = SlackClient::new(config.slack_bot_token.clone());

    process_event(&rewriter, &slack, &event.payload).await;
    Ok(())
}

pub use self::function_handler as handler;
