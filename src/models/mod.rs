//! Data models for configuration and session results

pub mod config;
pub mod metrics;

pub use config::Config;
pub use metrics::{SessionResult, SessionStatus};
