//! Validate config command implementation

use crate::cli::{exit_code, exit_code_for};
use crate::config::load_config;
use crate::core::export::codec_settings;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates; codec_settings repeats the identifier checks
        // the export itself performs
        let config = match load_config(config_path).and_then(|c| codec_settings(&c).map(|_| c)) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Database: {}@{}:{}/{} (schema {})",
            config.database.user,
            config.database.host,
            config.database.port,
            config.database.dbname,
            config.database.schema
        );
        println!(
            "  Password: {}",
            if config.database.password.is_some() {
                "set"
            } else {
                "not set"
            }
        );
        println!("  Facility: {} ({})", config.facility.name, config.facility.cnes);
        println!(
            "  Destination: {} [{}]",
            config.destination.name, config.destination.kind
        );
        println!("  Output Directory: {}", config.export.output_dir);
        println!("  Layout: {}", config.export.layout);
        println!("  Encoding: {}", config.export.encoding.name());
        println!(
            "  Logging: {}",
            if config.logging.local_enabled {
                format!("{} ({})", config.logging.local_path, config.logging.local_rotation)
            } else {
                "console only".to_string()
            }
        );

        Ok(exit_code::SUCCESS)
    }
}
