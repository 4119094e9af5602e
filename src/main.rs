//! mlongo - Main entry point.
//!
//! Command-line tool for inspecting and managing MongoDB collections and
//! indexes. Results go to stdout, logs to stderr.

use mlongo::app;
use mlongo::cli::{self, Invocation};
use mlongo::config::DEFAULT_LOG_LEVEL;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(log_level: &str, json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse and validate arguments before anything touches the network
    let invocation = cli::route(std::env::args_os());

    match &invocation {
        Ok(Invocation::Run { config, .. }) => init_tracing(&config.log_level, config.json_logs),
        _ => init_tracing(DEFAULT_LOG_LEVEL, false),
    }

    let mut stdout = std::io::stdout();
    let code = app::execute(invocation, &mut stdout).await;
    ExitCode::from(code)
}
