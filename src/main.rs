// BPA Export - Ambulatory production exporter
// Copyright (c) 2025 BPA Export Contributors
// Licensed under the MIT License

use bpa_export::cli::{exit_code, Cli, Commands};
use bpa_export::config::{load_config, LoggingConfig};
use bpa_export::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the configuration when it loads; commands report
    // their own configuration errors
    let loaded = if cli.command.uses_config() {
        load_config(&cli.config).ok()
    } else {
        None
    };
    let logging_config = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(|| LoggingConfig {
            local_enabled: false,
            ..LoggingConfig::default()
        });
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(exit_code::FATAL);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "BPA Export");

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            exit_code::FATAL
        }
    };

    // Flush the non-blocking file writer before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Export(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
        Commands::TestConnection(args) => args.execute(&cli.config).await,
        Commands::Stats(args) => args.execute(&cli.config).await,
    }
}
