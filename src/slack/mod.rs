//! All Slack-specific functionality

pub mod client;
pub mod command_parser;
pub mod response_builder;

// Re-export main types for convenience
pub use client::{EphemeralMessage, OutgoingMessage, SlackApi, SlackClient, UserProfile};
pub use command_parser::{InboundCommand, parse_form_data};
