//! Domain models and types for the exporter.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`Competency`], [`Cnes`], [`Cnpj`])
//! - **The record model** ([`Record`], [`FieldValue`])
//! - **Error types** ([`BpaError`], [`FieldFormatError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BpaError>`]:
//!
//! ```rust
//! use bpa_export::domain::{BpaError, Competency, Result};
//! use std::str::FromStr;
//!
//! fn parse(raw: &str) -> Result<Competency> {
//!     Competency::from_str(raw).map_err(BpaError::ConfigValidation)
//! }
//!
//! assert!(parse("202401").is_ok());
//! assert!(parse("2024-01").is_err());
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{BpaError, FieldFormatError};
pub use ids::{Cnes, Cnpj, Competency};
pub use record::{FieldValue, Record};
pub use result::Result;
