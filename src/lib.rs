//! Trumpify - a Slack slash command that rewrites a message in Donald Trump's
//! speaking style using a Mistral chat-completion model.
//!
//! This crate implements a two-Lambda architecture:
//! 1. An API Lambda that receives `/trumpify`, validates it, and delivers the
//!    rewrite with the deployment's dispatch strategy
//! 2. A Worker Lambda that runs queued paired-reply tasks from SQS
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda for serverless execution
//! - SQS for handing background work from the API to the worker
//! - reqwest for the Slack Web API and the Mistral chat-completions API
//! - Tokio for async runtime
//!
//! # Example
//!
//! ```no_run
//! use trumpify::ai::{RewriteClient, Rewriter};
//! use trumpify::slack::{OutgoingMessage, SlackApi, SlackClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     trumpify::setup_logging();
//!
//!     let rewriter = RewriteClient::new("dummy_mistral_key".to_string(), None);
//!     let slack = SlackClient::new("dummy_token".to_string());
//!
//!     let rewritten = rewriter.rewrite("the economy is struggling").await?;
//!     let profile = slack.get_user_profile("U12345678").await?;
//!     slack
//!         .post_message(&OutgoingMessage::new("C12345678", rewritten).as_user(&profile))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod slack;
pub mod worker;

pub use errors::{SlackError, SlackErrorCode};

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. Builds with the `debug-logs` feature also
/// emit debug events. Calling it more than once is harmless.
///
/// # Example
///
/// ```
/// trumpify::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;

    let level = if cfg!(feature = "debug-logs") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_filter(level);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
