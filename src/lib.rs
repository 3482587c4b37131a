// BPA Export - Ambulatory production exporter
// Copyright (c) 2025 BPA Export Contributors
// Licensed under the MIT License

//! # BPA Export
//!
//! Exports a facility's monthly ambulatory production as a BPA-I fixed-width
//! file (header line plus one detail line per procedure), or as a plain CSV
//! or XLSX dump of the same records.
//!
//! ## Overview
//!
//! This library provides:
//! - **Fetching** the records of a competency period from PostgreSQL or a CSV extract
//! - **Validating** identifiers and dates (advisory only)
//! - **Aggregating** header totals: lines, pages and the control value
//! - **Formatting** fixed-width header and detail lines in two layout versions
//! - **Writing** the output atomically in UTF-8 or Latin-1
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Codec, aggregator, validation and export pipeline
//! - [`adapters`] - Record sources (PostgreSQL, CSV, in-memory)
//! - [`domain`] - Records, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bpa_export::adapters::PostgresSource;
//! use bpa_export::config::load_config;
//! use bpa_export::core::export::{ExportFormat, ExportPipeline, FetchOutcome};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("bpa-export.toml")?;
//!     let source = Arc::new(PostgresSource::new(config.database.clone()));
//!     let pipeline = ExportPipeline::new(&config, source)?;
//!
//!     match pipeline.fetch(Some("202401".parse()?)).await? {
//!         FetchOutcome::Records(batch) => {
//!             let report = pipeline.render(&batch, ExportFormat::Bpa, Path::new("exports"))?;
//!             println!("Wrote {}", report.path.display());
//!         }
//!         FetchOutcome::NoData { .. } => println!("Nothing to export"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Formatting a single line
//!
//! The codec is usable without a source or a file:
//!
//! ```rust
//! use bpa_export::core::codec::fields::{format_numeric, format_text};
//! use bpa_export::domain::FieldValue;
//!
//! assert_eq!(format_numeric(&FieldValue::Null, 6), "000000");
//! assert_eq!(format_numeric(&FieldValue::from("12a3"), 4), "0123");
//! assert_eq!(format_text(&FieldValue::from("Café Ação"), 5).chars().count(), 5);
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`], whose error
//! [`domain::BpaError`] tells "no data for this period" apart from a failure:
//!
//! ```rust
//! use bpa_export::domain::BpaError;
//!
//! let err = BpaError::EmptyResult { competency: "202401".to_string() };
//! assert!(err.is_no_data());
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
