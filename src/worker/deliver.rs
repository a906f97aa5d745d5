use tracing::{error, info};

use crate::ai::Rewriter;
use crate::core::models::RewriteTask;
use crate::errors::SlackError;
use crate::slack::response_builder::{error_message, labeled_message};
use crate::slack::{EphemeralMessage, OutgoingMessage, SlackApi};

/// Rewrite the task's text and post the labeled result plus the original.
///
/// The labeled message goes into the originating thread when there is one,
/// otherwise into the channel. The original text is then threaded under the
/// existing thread, or under the labeled message when no thread was given.
///
/// # Errors
///
/// Returns the first provider or Slack error encountered.
pub async fn deliver_paired_reply(
    rewriter: &dyn Rewriter,
    slack: &dyn SlackApi,
    task: &RewriteTask,
) -> Result<(), SlackError> {
    if task.channel_id.is_empty() || task.user_id.is_empty() {
        return Err(SlackError::ValidationError(
            "user_id and channel_id are required to post".to_string(),
        ));
    }

    let rewritten = rewriter.rewrite(&task.text).await?;
    let profile = slack.get_user_profile(&task.user_id).await?;

    let labeled = OutgoingMessage::new(
        &task.channel_id,
        labeled_message(&profile.display_name, &rewritten),
    )
    .in_thread(task.thread_ts.as_deref());
    let posted_ts = slack.post_message(&labeled).await?;

    let parent_ts = task.thread_ts.clone().unwrap_or(posted_ts.0);
    let original = OutgoingMessage::new(&task.channel_id, task.text.clone())
        .in_thread(Some(&parent_ts));
    slack.post_message(&original).await?;

    info!(
        "Paired reply delivered in channel {} (corr_id={})",
        task.channel_id, task.correlation_id
    );
    Ok(())
}

/// Tell the user privately that their request failed.
///
/// A failure here is logged and dropped; there is nobody left to tell.
pub async fn notify_failure(slack: &dyn SlackApi, task: &RewriteTask, failure: &SlackError) {
    if task.channel_id.is_empty() || task.user_id.is_empty() {
        error!(
            "Cannot notify about failure without user and channel (corr_id={}): {}",
            task.correlation_id, failure
        );
        return;
    }

    let notice = EphemeralMessage::new(
        &task.channel_id,
        &task.user_id,
        error_message(&failure.to_string()),
    )
    .in_thread(task.thread_ts.as_deref());

    if let Err(e) = slack.post_ephemeral(&notice).await {
        error!(
            "Failed to send error notification to user {} (corr_id={}): {}",
            task.user_id, task.correlation_id, e
        );
    }
}

/// Run one background unit to completion, converting failures into a
/// best-effort ephemeral notice.
pub async fn process_task(rewriter: &dyn Rewriter, slack: &dyn SlackApi, task: &RewriteTask) {
    if let Err(e) = deliver_paired_reply(rewriter, slack, task).await {
        error!(
            "Background rewrite failed (corr_id={}): {}",
            task.correlation_id, e
        );
        notify_failure(slack, task, &e).await;
    }
}
