//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{load_config, validate_config},
    error::Result,
    executor::{Connector, ExecutionConfig, PopulationRunner, WebSocketConnector},
    log_debug, log_info,
    logging::LoggerFactory,
    models::Config,
    output::{ReportPrinter, RunHeader},
    plan::ClientSpawnPlan,
    stats::RunSummary,
};
use std::sync::Arc;

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance, loading and validating the
    /// configuration before any network activity
    pub fn new(cli: Cli) -> Result<Self> {
        let config = load_config(cli)?;
        Ok(Self { config })
    }

    /// Application for an already built configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the load test against the configured WebSocket endpoint
    pub async fn run(&self) -> Result<RunSummary> {
        let connector = Arc::new(WebSocketConnector::new(self.config.connect_timeout()));
        self.run_with_connector(connector).await
    }

    /// Run the load test with a custom connector
    pub async fn run_with_connector(&self, connector: Arc<dyn Connector>) -> Result<RunSummary> {
        let config = &self.config;
        let printer = ReportPrinter::new(config);

        let warnings = validate_config(config)?;
        if !config.quiet {
            for warning in &warnings {
                eprintln!("{}", warning.format(config.enable_color));
            }
        }

        let factory = LoggerFactory::new(config.clone());
        let logger = factory.create_logger("APP").await;
        log_debug!(logger, "Starting run {}", factory.run_id());

        let plan = ClientSpawnPlan::from_seed(config.games, config.seed);
        log_debug!(
            logger,
            "Planned {} clients across {} matches",
            plan.len(),
            plan.match_count()
        );

        if !config.quiet {
            if let Some(banner) = printer.render_header(&RunHeader::new(config, plan.len()))? {
                println!("{}", banner);
            }
        }

        let session_logger = Arc::new(factory.create_session_logger().await);
        let runner = PopulationRunner::new(ExecutionConfig::from(config), connector, session_logger);
        let outcome = runner.run(&plan).await?;

        let summary = RunSummary::from_results(&outcome.results, outcome.elapsed);
        log_info!(
            logger,
            "Run finished: {} completed, {} failed sessions",
            summary.completed_sessions,
            summary.failed_sessions
        );

        println!("{}", printer.render_report(config, &summary, &outcome.results)?);

        Ok(summary)
    }
}
