//! Core export logic.
//!
//! # Modules
//!
//! - [`codec`] - Field formatters and the fixed-width record codec
//! - [`aggregate`] - Header totals (lines, pages, control value)
//! - [`validation`] - Advisory per-record checks
//! - [`statistics`] - Batch counts shown before an export
//! - [`export`] - Fetch/render pipeline, state machine and file output
//!
//! # Export Workflow
//!
//! 1. **Fetch**: read the competency's records from a [`crate::adapters::RecordSource`]
//! 2. **Validate**: collect advisory warnings (fixed-width only)
//! 3. **Aggregate**: fold the batch into the header totals
//! 4. **Write**: format header and detail lines, encode, write atomically
//!
//! # Example
//!
//! ```rust,no_run
//! use bpa_export::adapters::PostgresSource;
//! use bpa_export::config::load_config;
//! use bpa_export::core::export::{ExportFormat, ExportPipeline, ValidationPolicy};
//! use bpa_export::domain::Competency;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bpa-export.toml")?;
//! let source = Arc::new(PostgresSource::new(config.database.clone()));
//! let pipeline = ExportPipeline::new(&config, source)?;
//!
//! let competency: Competency = "202401".parse()?;
//! let report = pipeline
//!     .run(competency, ExportFormat::Bpa, ValidationPolicy::Proceed)
//!     .await?;
//!
//! println!("Wrote {} records to {}", report.record_count, report.path.display());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod codec;
pub mod export;
pub mod statistics;
pub mod validation;
