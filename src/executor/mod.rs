//! Client population runner
//!
//! Fans out one connection session per planned client, each on its own
//! tokio task, and fans the results back in behind a join-all barrier.
//! A failing session contributes an empty result; it never aborts its
//! siblings or the run.

use crate::{
    error::{AppError, Result},
    logging::SessionLogger,
    models::{Config, SessionResult},
    plan::{endpoint_for, ClientSpawnPlan, MatchId},
    session::{self, MessageStream, Session},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Opens the connection for one client
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn MessageStream>>;
}

/// Production connector speaking WebSocket to the game server
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    connect_timeout: Duration,
}

impl WebSocketConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn MessageStream>> {
        let stream = session::connect(endpoint, self.connect_timeout).await?;
        Ok(Box::new(stream))
    }
}

/// Execution parameters for one population run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Base URI; per-client endpoints are derived from it
    pub endpoint_base: String,
    /// Measurement window per session
    pub window: Duration,
    /// Bound on connection establishment
    pub connect_timeout: Duration,
}

impl From<&Config> for ExecutionConfig {
    fn from(config: &Config) -> Self {
        Self {
            endpoint_base: config.endpoint_base.clone(),
            window: config.window(),
            connect_timeout: config.connect_timeout(),
        }
    }
}

/// Everything the aggregator needs from one run
#[derive(Debug, Clone)]
pub struct PopulationOutcome {
    /// One result per planned client, indexed by client slot
    pub results: Vec<SessionResult>,
    /// From just before the first spawn to just after the join barrier
    pub elapsed: Duration,
    pub started_at: DateTime<Utc>,
}

/// Spawns and joins the simulated client population
pub struct PopulationRunner {
    config: ExecutionConfig,
    connector: Arc<dyn Connector>,
    session_logger: Arc<SessionLogger>,
}

impl PopulationRunner {
    pub fn new(
        config: ExecutionConfig,
        connector: Arc<dyn Connector>,
        session_logger: Arc<SessionLogger>,
    ) -> Self {
        Self {
            config,
            connector,
            session_logger,
        }
    }

    /// Runner that connects over WebSocket
    pub fn websocket(config: &Config, session_logger: Arc<SessionLogger>) -> Self {
        let execution = ExecutionConfig::from(config);
        let connector = Arc::new(WebSocketConnector::new(execution.connect_timeout));
        Self::new(execution, connector, session_logger)
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Run every planned client concurrently and wait for all of them
    pub async fn run(&self, plan: &ClientSpawnPlan) -> Result<PopulationOutcome> {
        if plan.is_empty() {
            return Err(AppError::test_execution(
                "spawn plan is empty; at least one match (two players) is required",
            ));
        }

        let session = Session::new(self.config.window);
        let mut slots = Vec::with_capacity(plan.len());
        let mut tasks = Vec::with_capacity(plan.len());

        let started_at = Utc::now();
        let start = Instant::now();

        for (index, &match_id) in plan.ids().iter().enumerate() {
            let endpoint = endpoint_for(&self.config.endpoint_base, match_id);
            let connector = Arc::clone(&self.connector);
            let logger = Arc::clone(&self.session_logger);

            tasks.push(tokio::spawn(run_client(
                index,
                match_id,
                endpoint.clone(),
                session,
                connector,
                logger,
            )));
            slots.push((index, match_id, endpoint));
        }

        let joined = join_all(tasks).await;
        let elapsed = start.elapsed();

        let mut results = Vec::with_capacity(slots.len());
        for ((index, match_id, endpoint), joined) in slots.into_iter().zip(joined) {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    let reason = if e.is_panic() { "task panicked" } else { "task cancelled" };
                    self.session_logger.log_task_aborted(index, &endpoint, reason).await;
                    results.push(SessionResult::failed(
                        index,
                        match_id,
                        endpoint,
                        format!("session task aborted: {}", reason),
                        0,
                    ));
                }
            }
        }

        Ok(PopulationOutcome {
            results,
            elapsed,
            started_at,
        })
    }
}

/// One simulated client from connect to close
async fn run_client(
    index: usize,
    match_id: MatchId,
    endpoint: String,
    session: Session,
    connector: Arc<dyn Connector>,
    logger: Arc<SessionLogger>,
) -> SessionResult {
    let mut stream = match connector.connect(&endpoint).await {
        Ok(stream) => stream,
        Err(e) => {
            logger.log_connect_failed(index, &endpoint, &e).await;
            return SessionResult::failed(index, match_id, endpoint, e.to_string(), 0);
        }
    };
    logger.log_connected(index, &endpoint).await;

    let started_at = Utc::now();
    let measurement = session.run(stream.as_mut()).await;

    let result = match measurement.end.failure_reason() {
        None => SessionResult::completed(
            index,
            match_id,
            endpoint,
            measurement.latencies,
            started_at,
            measurement.elapsed,
        ),
        Some(reason) => {
            SessionResult::failed(index, match_id, endpoint, reason, measurement.latencies.len())
        }
    };

    logger.log_closed(&result).await;
    result
}
