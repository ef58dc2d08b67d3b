//! workflow-notify entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: flags and their environment fallbacks
//!    (see [`config`]), validated before any network call.
//! 2. **Wire observability**: `tracing-subscriber` with a text or JSON
//!    formatter, plus an OTLP exporter when an endpoint is configured.
//! 3. **Construct infrastructure**: `GithubClient` and `TelegramClient`,
//!    injected into a `Dispatcher`.
//! 4. **Run once and exit**: `0` when the message was sent (or rendered, for
//!    `--dry-run`), `1` on any failure.

mod config;
mod telemetry;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dispatch::Dispatcher;
use github::GithubClient;
use telegram::TelegramClient;
use tracing::{error, info};

use crate::config::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _telemetry = match telemetry::init(cli.log_format, cli.otlp_endpoint.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("workflow-notify: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Notification failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("Starting workflow notification");

    let config = cli.into_config()?;
    info!(
        repository = %config.dispatch.repository,
        run_id = %config.dispatch.run_id,
        dry_run = config.dispatch.dry_run,
        "Loaded configuration"
    );

    let source = GithubClient::new(config.github).context("failed to build GitHub client")?;
    let sink = TelegramClient::new(config.telegram).context("failed to build Telegram client")?;

    let outcome = Dispatcher::new(source, sink, config.dispatch).run().await?;

    if outcome.delivered {
        info!(notification_id = %outcome.notification_id, "Notification delivered");
    } else {
        println!("{}", outcome.message.text);
    }
    Ok(())
}
