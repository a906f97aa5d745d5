//! API Lambda handler and request processing

pub mod dispatch;
pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod queue;
pub mod signature;

// Re-export the main handler for convenience
pub use handler::{ApiState, Services, handle_request, handler};
