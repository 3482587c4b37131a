//! Init command implementation
//!
//! Writes the default configuration file.

use crate::cli::exit_code;
use crate::config::default_config_template;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "bpa-export.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIGURATION);
        }

        match fs::write(&self.output, default_config_template()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your facility CNES, CNPJ and name", self.output);
                println!("  2. Put BPA_DB_PASSWORD=... in a .env file next to it");
                println!("  3. Validate configuration: bpa-export validate-config");
                println!("  4. Check the database: bpa-export test-connection");
                println!("  5. Run export: bpa-export export --competency YYYYMM");
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(exit_code::FATAL)
            }
        }
    }
}
