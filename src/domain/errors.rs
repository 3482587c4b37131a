//! Domain error types
//!
//! This module defines the error hierarchy for the exporter. The variants of
//! [`BpaError`] map one-to-one onto the failure classes an export run can hit:
//! a failing data source, an empty result, a configuration that does not pass
//! its shape checks, and an unwritable destination. Per-field problems are
//! modelled separately by [`FieldFormatError`] because they are always
//! recovered locally by the codec.

use thiserror::Error;

/// Main exporter error type
///
/// This is the primary error type used throughout the library.
/// It does not expose third-party error types; their messages are captured
/// as strings at the conversion boundary.
#[derive(Debug, Error)]
pub enum BpaError {
    /// Fetching records failed (connectivity, query error)
    #[error("Data source error: {0}")]
    DataSource(String),

    /// The fetch succeeded but produced no records for the requested period
    #[error("No records found for competency {competency}")]
    EmptyResult { competency: String },

    /// A single field or record could not be formatted
    #[error("Field format error: {0}")]
    FieldFormat(#[from] FieldFormatError),

    /// Operator-supplied identifiers failed their shape check
    #[error("Configuration validation error: {0}")]
    ConfigValidation(String),

    /// The destination could not be written
    #[error("Write error: {0}")]
    Write(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Advisory validation was declined by the operator
    #[error("Validation error: {0}")]
    Validation(String),

    /// The export state machine was asked for an illegal transition
    #[error("Export state error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl BpaError {
    /// Whether this error means "nothing to export" rather than a failure
    pub fn is_no_data(&self) -> bool {
        matches!(self, BpaError::EmptyResult { .. })
    }
}

/// Formatting failure for one field of one record
///
/// The codec never propagates these; it logs them and substitutes the
/// documented fallback (or an empty line when the whole record is unusable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldFormatError {
    /// The assembled line does not have the width the layout declares
    #[error("record {record_index}: line is {actual} characters, layout requires {expected}")]
    WidthMismatch {
        record_index: usize,
        expected: usize,
        actual: usize,
    },

    /// The record carries no columns at all
    #[error("record {record_index}: record has no columns")]
    EmptyRecord { record_index: usize },

    /// A field holds characters the configured output encoding cannot carry
    #[error("record {record_index}: field '{field}' cannot be encoded as {encoding}")]
    Unencodable {
        record_index: usize,
        field: &'static str,
        encoding: &'static str,
    },
}

impl FieldFormatError {
    /// 1-based position of the offending record in its batch
    pub fn record_index(&self) -> usize {
        match self {
            FieldFormatError::WidthMismatch { record_index, .. }
            | FieldFormatError::EmptyRecord { record_index }
            | FieldFormatError::Unencodable { record_index, .. } => *record_index,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for BpaError {
    fn from(err: std::io::Error) -> Self {
        BpaError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BpaError {
    fn from(err: serde_json::Error) -> Self {
        BpaError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BpaError {
    fn from(err: toml::de::Error) -> Self {
        BpaError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for BpaError {
    fn from(err: csv::Error) -> Self {
        BpaError::Serialization(format!("CSV error: {err}"))
    }
}

impl From<rust_xlsxwriter::XlsxError> for BpaError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        BpaError::Write(format!("XLSX error: {err}"))
    }
}

impl From<tokio_postgres::Error> for BpaError {
    fn from(err: tokio_postgres::Error) -> Self {
        BpaError::DataSource(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpa_error_display() {
        let err = BpaError::ConfigValidation("cnes must have 7 digits".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration validation error: cnes must have 7 digits"
        );
    }

    #[test]
    fn test_empty_result_is_no_data() {
        let err = BpaError::EmptyResult {
            competency: "202401".to_string(),
        };
        assert!(err.is_no_data());
        assert_eq!(err.to_string(), "No records found for competency 202401");

        let err = BpaError::DataSource("connection refused".to_string());
        assert!(!err.is_no_data());
    }

    #[test]
    fn test_field_format_error_conversion() {
        let field_err = FieldFormatError::WidthMismatch {
            record_index: 3,
            expected: 349,
            actual: 340,
        };
        assert_eq!(field_err.record_index(), 3);
        let err: BpaError = field_err.into();
        assert!(matches!(err, BpaError::FieldFormat(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: BpaError = io_err.into();
        assert!(matches!(err, BpaError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: BpaError = toml_err.into();
        assert!(matches!(err, BpaError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_bpa_error_implements_std_error() {
        let err = BpaError::Write("disk full".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
