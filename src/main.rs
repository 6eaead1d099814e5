// SessionFrame - Time-indexed tables into recording sessions
// Copyright (c) 2025 SessionFrame Contributors
// Licensed under the MIT License

use sessionframe::cli::commands::load_or_default;
use sessionframe::cli::{Cli, Commands};
use sessionframe::logging::init_logging;
use clap::Parser;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging settings come from the configuration when it can be read; commands
    // report configuration errors themselves
    let config = load_or_default(&cli.config).ok();
    let logging_config = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());

    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "SessionFrame - time-indexed tables into recording sessions"
    );

    // Create shutdown signal channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Shutdown signal received, stopping after the current batch");
        eprintln!("\n⚠️  Shutdown signal received, completing current batch...");
        let _ = shutdown_tx.send(true);
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            2
        }
    };

    // process::exit skips destructors, flush the file log first
    drop(logging_guard);
    process::exit(exit_code);
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler, listening for Ctrl+C only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Export(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Check(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
