// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value store daemon (kvsd)
//!
//! Rebuilds the store from the transaction log, then keeps the log open for
//! writes until it is told to stop or the log fails.

use kvs_daemon::{lifecycle, Config, LifecycleError};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Write startup marker to log (before tracing setup, so it precedes this run's output)
    write_startup_marker(&config)?;

    // Set up logging
    let log_guard = setup_logging(&config)?;

    info!(backend = %config.backend, "Starting kvsd");

    let daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut log_errors = daemon.service.errors();

    info!(
        keys = daemon.service.store().len(),
        last_sequence = daemon.replay.last_sequence,
        "Daemon ready"
    );

    // Signal ready for parent process (e.g., systemd, supervisor waiting for startup)
    println!("READY");

    let outcome = tokio::select! {
        Some(e) = log_errors.recv() => {
            error!(error = %e, "Transaction log failed, stopping");
            Err(LifecycleError::Fatal(e))
        }

        // Graceful shutdown on SIGTERM
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
            Ok(())
        }

        // Graceful shutdown on SIGINT
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
            Ok(())
        }
    };

    daemon.shutdown().await;
    info!(uptime_secs = daemon.start_time.elapsed().as_secs(), "Daemon stopped");
    drop(log_guard);

    outcome.map_err(Into::into)
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- kvsd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- kvsd: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    // Create log directory if needed
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let invalid_path = || {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid log path {}", config.log_path.display()),
        )
    };
    let dir = config.log_path.parent().ok_or_else(invalid_path)?;
    let file_name = config.log_path.file_name().ok_or_else(invalid_path)?;
    std::fs::create_dir_all(dir)?;

    // Set up file appender
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
