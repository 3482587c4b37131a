//! Export command implementation
//!
//! This module implements the `export` command: fetch one competency, show
//! what was found, surface validation warnings and write the file.

use super::build_source;
use crate::cli::{exit_code, exit_code_for};
use crate::config::load_config;
use crate::core::export::{ExportFormat, ExportPipeline, FetchOutcome};
use crate::domain::Competency;
use clap::Args;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Competency period (YYYYMM); required for the bpa format
    #[arg(short = 'm', long)]
    pub competency: Option<Competency>,

    /// Output format: bpa, csv or xlsx
    #[arg(short, long, default_value = "bpa")]
    pub format: ExportFormat,

    /// Override the output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Read records from a CSV extract instead of the database
    #[arg(long, value_name = "FILE")]
    pub source_csv: Option<PathBuf>,

    /// Proceed without asking when validation finds problems
    #[arg(short, long)]
    pub yes: bool,

    /// Stop when validation finds any problem
    #[arg(long, conflicts_with = "yes")]
    pub strict: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(
            competency = ?self.competency.map(|c| c.to_string()),
            format = %self.format,
            "Starting export command"
        );

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };
        if let Some(output) = &self.output {
            tracing::info!(output = %output.display(), "Overriding output directory from CLI");
            config.export.output_dir = output.display().to_string();
        }

        if self.format.is_fixed_width() && self.competency.is_none() {
            eprintln!("❌ --competency YYYYMM is required for the bpa format");
            return Ok(exit_code::CONFIGURATION);
        }

        let source = build_source(&config, self.source_csv.as_deref());
        let pipeline = match ExportPipeline::new(&config, source) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("🚀 Fetching records...");
        let batch = match pipeline.fetch(self.competency).await {
            Ok(FetchOutcome::Records(batch)) => batch,
            Ok(FetchOutcome::NoData { .. }) => {
                println!(
                    "ℹ️  No records found for competency {}. Nothing was written.",
                    self.competency
                        .map_or_else(|| "(all)".to_string(), |c| c.to_string())
                );
                return Ok(exit_code::NO_DATA);
            }
            Err(e) => {
                eprintln!("❌ Failed to fetch records: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let stats = batch.statistics();
        println!("  Records: {}", stats.total_records);
        println!("  Patients: {}", stats.distinct_patients);
        println!("  Procedures: {}", stats.distinct_procedures);
        println!();

        let mut validation = None;
        if self.format.is_fixed_width() {
            let report = match pipeline.validate(&batch) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("❌ {e}");
                    return Ok(exit_code_for(&e));
                }
            };
            if !report.is_clean() {
                println!("⚠️  {}", report.format_summary(10));
                if self.strict {
                    eprintln!("❌ Validation problems found and --strict is set");
                    return Ok(exit_code::VALIDATION);
                }
                if !self.yes && !confirm("Proceed with export anyway? [y/N]: ")? {
                    println!("Export cancelled.");
                    return Ok(exit_code::VALIDATION);
                }
            }
            validation = Some(report);
        }

        let output_dir = PathBuf::from(&config.export.output_dir);
        let rendered = match validation {
            Some(report) => pipeline.render_validated(&batch, report, self.format, &output_dir),
            None => pipeline.render(&batch, self.format, &output_dir),
        };
        match rendered {
            Ok(report) => {
                report.log_summary();
                println!("✅ Export completed");
                println!("  File: {}", report.path.display());
                println!("  Records: {}", report.record_count);
                if let Some(header) = &report.header {
                    println!("  Pages: {}", header.total_pages);
                    println!("  Control: {}", header.control);
                }
                if report.failed_records > 0 {
                    println!(
                        "⚠️  {} record(s) could not be formatted and were written as empty lines",
                        report.failed_records
                    );
                }
                Ok(exit_code::SUCCESS)
            }
            Err(e) if e.is_no_data() => {
                println!("ℹ️  {e}. Nothing was written.");
                Ok(exit_code::NO_DATA)
            }
            Err(e) => {
                eprintln!("❌ Export failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

/// Asks a yes/no question on the terminal; declines when stdin is not one
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    print!("{prompt}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
