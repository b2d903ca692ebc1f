//! Match Load Tester - Main CLI Application
//!
//! Spawns a population of simulated match players against a game server
//! and reports the latency of server-pushed updates.

use clap::Parser;
use match_load_tester::{
    app::App,
    cli::Cli,
    error::{AppError, ErrorReporter, Result},
    PKG_NAME, VERSION,
};
use std::{error::Error, process};

#[tokio::main]
async fn main() {
    // Report panics without exiting: a panicking session task is reaped by
    // the population runner and the run continues
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        eprintln!("Application panic: {}", panic_info);
        default_hook(panic_info);
    }));

    // Usage errors are configuration errors: exit 1, not clap's default 2
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            process::exit(1);
        }
        Err(e) => e.exit(),
    };

    let use_color = cli.use_colors();
    let verbose = cli.verbose || cli.debug;

    match tokio::spawn(run_application(cli)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            ErrorReporter::new(use_color, verbose).report_error(&e);

            if let Some(source) = e.source() {
                eprintln!("Caused by: {}", source);
            }

            print_error_suggestions(&e);

            process::exit(e.exit_code());
        }
        Err(join_error) => {
            let error = AppError::internal(format!("application task failed: {}", join_error));
            ErrorReporter::new(use_color, verbose).report_error(&error);
            process::exit(error.exit_code());
        }
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!(
            "{} v{} ({}, built {})",
            PKG_NAME,
            VERSION,
            option_env!("GIT_COMMIT").unwrap_or("unknown"),
            option_env!("BUILD_TIME").unwrap_or("unknown")
        );
        eprintln!("Debug mode enabled");
        eprintln!("{}", cli.get_config_summary());
    }

    let app = App::new(cli)?;
    app.run().await?;

    // A run that produced a report succeeds even without data
    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - The endpoint base must start with ws:// or wss:// and carry no query");
            eprintln!("  - Games must be between 2 and {}", match_load_tester::defaults::MAX_GAMES);
            eprintln!("  - The window must be between 0 and {} seconds", match_load_tester::defaults::MAX_WINDOW_SECONDS);
        }
        AppError::TestExecution(_) => {
            eprintln!();
            eprintln!("Execution troubleshooting:");
            eprintln!("  - Reduce the population with --games");
            eprintln!("  - Raise the open file limit (ulimit -n)");
        }
        _ => {}
    }
}
