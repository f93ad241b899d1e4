use std::io;
use std::sync::Arc;

use anyhow::Context;

use tribunal_reminders_app::{AppConfig, LoggingNotifier, ReminderApp};

/// Reads JSON case events from stdin, one per line, until interrupted.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tribunal_observability::init();

    let config = AppConfig::from_env().context("loading configuration")?;
    tracing::info!(
        max_attempts = config.jobs.retry.max_attempts,
        workers = config.jobs.store.worker_threads,
        "configuration loaded"
    );

    let app = Arc::new(ReminderApp::build(&config, Arc::new(LoggingNotifier))?);
    app.start()?;

    // Plain thread: tokio's stdin read cannot be cancelled on shutdown.
    tribunal_reminders_app::spawn_feed(app.clone(), io::BufReader::new(io::stdin()))
        .context("spawning case event feed")?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!("shutdown requested");

    app.stop(true)?;
    // Returning from main ends the process even if the feed thread is
    // still blocked on stdin.
    Ok(())
}
