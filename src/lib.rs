//! Match Load Tester
//!
//! A load-testing harness for real-time game servers. It spawns a population
//! of simulated players paired into matches, holds each WebSocket connection
//! open for a fixed measurement window, records the inter-arrival time of
//! every server-pushed update and reduces the whole population into summary
//! latency statistics.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod plan;
pub mod session;
pub mod stats;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use executor::{Connector, PopulationRunner, WebSocketConnector};
pub use models::{Config, SessionResult, SessionStatus};
pub use plan::{ClientSpawnPlan, MatchId};
pub use session::{MessageStream, Session};
pub use stats::{LatencyDistribution, RunSummary};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_ENDPOINT_BASE: &str = "ws://localhost:5000";
    pub const DEFAULT_GAMES: u32 = 100;
    pub const DEFAULT_INPUTS_PER_SECOND: u32 = 4;
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const MAX_GAMES: u32 = 100_000;
    pub const MAX_WINDOW_SECONDS: u64 = 3600;
    pub const MAX_CONNECT_TIMEOUT_SECONDS: u64 = 300;
}
