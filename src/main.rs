use anyhow::Result;
use clap::Parser;
use std::io;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use autopress_lib::bootstrap::{self, AppRuntime};
use autopress_lib::cli::{commands, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = bootstrap::resolve_config(cli.config.as_deref())?;

    let logs_dir = match bootstrap::tracing::logs_dir_for(&config) {
        Ok(dir) => Some(dir),
        Err(err) => {
            eprintln!("Log directory unavailable, logging to stderr only: {err}");
            None
        }
    };
    bootstrap::tracing::init_tracing_subscriber(logs_dir.as_deref())?;

    let deps = bootstrap::wire_dependencies(config).await?;
    let runtime = AppRuntime::new(deps);

    // The first Ctrl+C asks the pipeline to stop at the next keyword boundary.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping after the current keyword");
                on_signal.cancel();
            }
            Err(err) => warn!(error = %err, "Failed to listen for Ctrl+C"),
        }
    });

    let mut stdout = io::stdout();
    commands::dispatch(&runtime, cli.command, &cancel, &mut stdout).await
}
