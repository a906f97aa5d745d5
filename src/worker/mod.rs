//! Worker Lambda: runs queued paired-reply tasks

pub mod deliver;
pub mod handler;

pub use handler::handler;
