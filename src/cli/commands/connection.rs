//! Test connection command implementation

use super::build_source;
use crate::cli::{exit_code, exit_code_for};
use crate::config::load_config;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the test-connection command
#[derive(Args, Debug)]
pub struct TestConnectionArgs {
    /// Check a CSV extract instead of the database
    #[arg(long, value_name = "FILE")]
    pub source_csv: Option<PathBuf>,
}

impl TestConnectionArgs {
    /// Execute the test-connection command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let source = build_source(&config, self.source_csv.as_deref());
        println!("🔌 Testing {}", source.describe());

        match source.test_connection().await {
            Ok(()) => {
                println!("✅ Connection successful");
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, source = %source.describe(), "Connection test failed");
                println!("❌ Connection failed: {e}");
                Ok(exit_code::DATA_SOURCE)
            }
        }
    }
}
