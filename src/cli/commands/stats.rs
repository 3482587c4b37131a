//! Stats command implementation
//!
//! Prints the counts of a competency's records without writing anything.

use super::build_source;
use crate::cli::{exit_code, exit_code_for};
use crate::config::load_config;
use crate::core::export::{ExportPipeline, FetchOutcome};
use crate::domain::Competency;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the stats command
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Competency period (YYYYMM); every record when omitted
    #[arg(short = 'm', long)]
    pub competency: Option<Competency>,

    /// Read records from a CSV extract instead of the database
    #[arg(long, value_name = "FILE")]
    pub source_csv: Option<PathBuf>,

    /// Print the statistics as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsArgs {
    /// Execute the stats command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let source = build_source(&config, self.source_csv.as_deref());
        let pipeline = match ExportPipeline::new(&config, source) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let batch = match pipeline.fetch(self.competency).await {
            Ok(FetchOutcome::Records(batch)) => batch,
            Ok(FetchOutcome::NoData { .. }) => {
                println!("ℹ️  No records found");
                return Ok(exit_code::NO_DATA);
            }
            Err(e) => {
                eprintln!("❌ Failed to fetch records: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let stats = batch.statistics();
        if self.json {
            println!("{}", serde_json::to_string_pretty(stats)?);
            return Ok(exit_code::SUCCESS);
        }

        println!("📊 Statistics");
        if let Some(competency) = self.competency {
            println!("  Competency: {competency}");
        }
        println!("  Records: {}", stats.total_records);
        println!("  Distinct patients: {}", stats.distinct_patients);
        println!("  Distinct professionals: {}", stats.distinct_professionals);
        println!("  Distinct procedures: {}", stats.distinct_procedures);
        if let (Some(first), Some(last)) = (stats.first_service_date, stats.last_service_date) {
            println!("  Service dates: {first} .. {last}");
        }
        Ok(exit_code::SUCCESS)
    }
}
