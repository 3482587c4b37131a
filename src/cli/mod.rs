//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use crate::domain::BpaError;
use clap::{Parser, Subcommand};

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    /// The period has no records; nothing was written
    pub const NO_DATA: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    /// Validation warnings and the operator (or `--strict`) declined
    pub const VALIDATION: i32 = 3;
    pub const DATA_SOURCE: i32 = 4;
    pub const FATAL: i32 = 5;
}

/// Maps an error onto the exit code the operator sees
pub fn exit_code_for(error: &BpaError) -> i32 {
    match error {
        BpaError::EmptyResult { .. } => exit_code::NO_DATA,
        BpaError::Configuration(_) | BpaError::ConfigValidation(_) => exit_code::CONFIGURATION,
        BpaError::Validation(_) => exit_code::VALIDATION,
        BpaError::DataSource(_) => exit_code::DATA_SOURCE,
        _ => exit_code::FATAL,
    }
}

/// BPA Export - ambulatory production exporter
#[derive(Parser, Debug)]
#[command(name = "bpa-export")]
#[command(version, about, long_about = None)]
#[command(author = "BPA Export Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "bpa-export.toml", env = "BPA_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BPA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export one competency as a BPA-I file, CSV or XLSX
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Check that the record source is reachable
    TestConnection(commands::connection::TestConnectionArgs),

    /// Show counts for the records of a competency
    Stats(commands::stats::StatsArgs),
}

impl Commands {
    /// Whether the command reads the configuration file
    pub fn uses_config(&self) -> bool {
        !matches!(self, Commands::Init(_))
    }
}
