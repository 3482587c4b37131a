//! Configuration management for the exporter.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! The exporter reads a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `BPA_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Shape checks on the facility identifiers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bpa_export::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bpa-export.toml")?;
//!
//! println!("CNES: {}", config.facility.cnes);
//! println!("Layout: {}", config.export.layout);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DatabaseConfig`] - PostgreSQL connection and schema
//! - [`FacilityConfig`] - CNES, CNPJ and organization names for the header
//! - [`DestinationConfig`] - Receiving secretariat and its kind
//! - [`ExportConfig`] - Output directory, encoding, layout, file prefix
//! - [`LoggingConfig`] - Local log files
//!
//! # Example Configuration
//!
//! ```toml
//! [database]
//! host = "localhost"
//! dbname = "bd0553"
//! password = "${BPA_DB_PASSWORD}"
//!
//! [facility]
//! cnes = "2560372"
//! cnpj = "25.062.282/0001-82"
//! name = "Hospital Municipal"
//!
//! [export]
//! encoding = "latin-1"
//! layout = "extended"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{default_config_template, load_config, parse_config};
pub use schema::{
    ApplicationConfig, BpaConfig, DatabaseConfig, DestinationConfig, ExportConfig,
    FacilityConfig, LoggingConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
