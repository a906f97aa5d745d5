#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use slack_morphism::SlackTs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use trumpify::ai::Rewriter;
use trumpify::api::Services;
use trumpify::api::parsing::InboundRequest;
use trumpify::api::queue::TaskQueue;
use trumpify::core::config::{AppConfig, DispatchStrategy};
use trumpify::core::models::RewriteTask;
use trumpify::slack::{EphemeralMessage, OutgoingMessage, SlackApi, UserProfile};
use trumpify::{SlackError, SlackErrorCode};

pub const SIGNING_SECRET: &str = "test-signing-secret";

pub fn test_config(strategy: DispatchStrategy) -> AppConfig {
    AppConfig {
        slack_signing_secret: Some(SIGNING_SECRET.to_string()),
        slack_bot_token: "xoxb-test".to_string(),
        mistral_api_key: "mk-test".to_string(),
        mistral_model: None,
        allowed_user_ids: Vec::new(),
        strategy,
        rewrite_queue_url: None,
        verify_signatures: false,
    }
}

pub fn post(body: &str) -> InboundRequest {
    InboundRequest::new("POST", body)
}

pub fn command_body(text: &str) -> String {
    format!(
        "token=t&team_id=T1&channel_id=C1&channel_name=general&user_id=U1&user_name=dana\
         &command=%2Ftrumpify&text={}&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2F1\
         &trigger_id=1.2",
        text.replace(' ', "+")
    )
}

// ============================================================================
// Rewriter fake
// ============================================================================

pub enum RewriteOutcome {
    Text(String),
    /// Behave like a provider that returned no content.
    Identity,
    Fail(String),
}

pub struct FakeRewriter {
    outcome: RewriteOutcome,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl FakeRewriter {
    pub fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self::new(RewriteOutcome::Text(text.to_string()), None))
    }

    pub fn identity() -> Arc<Self> {
        Arc::new(Self::new(RewriteOutcome::Identity, None))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self::new(RewriteOutcome::Fail(message.to_string()), None))
    }

    /// A rewriter that does not answer until `gate` is notified.
    pub fn gated(text: &str, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self::new(RewriteOutcome::Text(text.to_string()), Some(gate)))
    }

    fn new(outcome: RewriteOutcome, gate: Option<Arc<Notify>>) -> Self {
        Self {
            outcome,
            gate,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Rewriter for FakeRewriter {
    async fn rewrite(&self, text: &str) -> Result<String, SlackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        match &self.outcome {
            RewriteOutcome::Text(t) => Ok(t.clone()),
            RewriteOutcome::Identity => Ok(text.to_string()),
            RewriteOutcome::Fail(m) => Err(SlackError::ProviderError(m.clone())),
        }
    }
}

// ============================================================================
// Slack fake
// ============================================================================

#[derive(Default)]
pub struct FakeSlack {
    pub posts: Mutex<Vec<OutgoingMessage>>,
    pub ephemerals: Mutex<Vec<EphemeralMessage>>,
    pub responses: Mutex<Vec<(String, Value)>>,
    pub profile_lookups: Mutex<Vec<String>>,
    post_failure: Option<SlackErrorCode>,
    fail_post_after: Option<usize>,
    fail_ephemeral: bool,
    next_ts: AtomicUsize,
}

impl FakeSlack {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every `chat.postMessage` is rejected with `code`.
    pub fn rejecting_posts(code: SlackErrorCode) -> Arc<Self> {
        Arc::new(Self {
            post_failure: Some(code),
            ..Self::default()
        })
    }

    /// Posts succeed `n` times, then fail with `code`.
    pub fn rejecting_posts_after(n: usize, code: SlackErrorCode) -> Arc<Self> {
        Arc::new(Self {
            post_failure: Some(code),
            fail_post_after: Some(n),
            ..Self::default()
        })
    }

    /// Posts are rejected with `code` and so are ephemeral notices.
    pub fn rejecting_everything(code: SlackErrorCode) -> Arc<Self> {
        Arc::new(Self {
            post_failure: Some(code),
            fail_ephemeral: true,
            ..Self::default()
        })
    }

    pub fn posts(&self) -> Vec<OutgoingMessage> {
        self.posts.lock().unwrap().clone()
    }

    pub fn ephemerals(&self) -> Vec<EphemeralMessage> {
        self.ephemerals.lock().unwrap().clone()
    }

    pub fn responses(&self) -> Vec<(String, Value)> {
        self.responses.lock().unwrap().clone()
    }

    pub fn profile() -> UserProfile {
        UserProfile {
            display_name: "Dana Scully".to_string(),
            avatar_url: Some("https://avatars.example/dana_192.png".to_string()),
        }
    }
}

#[async_trait]
impl SlackApi for FakeSlack {
    async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, SlackError> {
        self.profile_lookups.lock().unwrap().push(user_id.to_string());
        Ok(Self::profile())
    }

    async fn post_message(&self, message: &OutgoingMessage) -> Result<SlackTs, SlackError> {
        let n = self.next_ts.fetch_add(1, Ordering::SeqCst);

        if let Some(code) = &self.post_failure {
            let fails = self.fail_post_after.is_none_or(|after| n >= after);
            if fails {
                return Err(SlackError::SlackApi {
                    method: "chat.postMessage".to_string(),
                    code: code.clone(),
                });
            }
        }

        self.posts.lock().unwrap().push(message.clone());
        Ok(SlackTs(format!("1700000000.{:06}", n + 1)))
    }

    async fn post_ephemeral(&self, message: &EphemeralMessage) -> Result<(), SlackError> {
        if self.fail_ephemeral {
            return Err(SlackError::SlackApi {
                method: "chat.postEphemeral".to_string(),
                code: SlackErrorCode::Other("user_not_in_channel".to_string()),
            });
        }
        self.ephemerals.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn send_response_url(
        &self,
        response_url: &str,
        payload: &Value,
    ) -> Result<(), SlackError> {
        self.responses
            .lock()
            .unwrap()
            .push((response_url.to_string(), payload.clone()));
        Ok(())
    }
}

// ============================================================================
// Queue fake
// ============================================================================

#[derive(Default)]
pub struct RecordingQueue {
    pub tasks: Mutex<Vec<RewriteTask>>,
}

#[async_trait]
impl TaskQueue for RecordingQueue {
    async fn enqueue(&self, task: &RewriteTask) -> Result<(), SlackError> {
        self.tasks.lock().unwrap().push(task.clone());
        Ok(())
    }
}

pub fn services(rewriter: Arc<FakeRewriter>, slack: Arc<FakeSlack>) -> Services {
    Services {
        rewriter,
        slack,
        queue: Some(Arc::new(RecordingQueue::default())),
    }
}
