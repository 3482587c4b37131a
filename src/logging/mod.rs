//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted log files with daily or hourly rotation
//! - Configurable log levels
//! - Human-readable console output
//!
//! # Example
//!
//! ```no_run
//! use bpa_export::logging::init_logging;
//! use bpa_export::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(competency = "202401", "Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export run
///
/// # Example
///
/// ```no_run
/// use bpa_export::log_export_start;
/// use bpa_export::domain::Competency;
///
/// let competency = Competency::new(2024, 1).unwrap();
/// log_export_start!(competency, "bpa");
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($competency:expr, $format:expr) => {
        tracing::info!(
            competency = %$competency,
            format = %$format,
            "Starting export"
        );
    };
}

/// Log the completion of an export run
///
/// # Example
///
/// ```no_run
/// use bpa_export::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(42, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($count:expr, $duration:expr) => {
        tracing::info!(
            record_count = $count,
            duration_ms = $duration.as_millis(),
            "Export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use bpa_export::log_error_with_context;
/// use bpa_export::domain::BpaError;
///
/// let error = BpaError::Write("read-only directory".to_string());
/// log_error_with_context!(&error, "Failed to write export file");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
    ($error:expr, $context:expr, $($field:tt)+) => {
        tracing::error!(
            error = %$error,
            context = $context,
            $($field)+,
            "Error occurred"
        );
    };
}

/// Log a locally recovered formatting problem for one record
///
/// Records are only formatted while the file is being written, so the stage
/// is always `WRITING`.
///
/// # Example
///
/// ```no_run
/// use bpa_export::log_record_fallback;
/// use bpa_export::domain::{Competency, FieldFormatError};
///
/// let competency = Competency::new(2024, 1).unwrap();
/// let error = FieldFormatError::EmptyRecord { record_index: 7 };
/// log_record_fallback!(&error, competency, "empty line");
/// ```
#[macro_export]
macro_rules! log_record_fallback {
    ($error:expr, $competency:expr, $fallback:expr) => {
        tracing::warn!(
            competency = %$competency,
            stage = %$crate::core::export::ExportState::Writing,
            record_index = $error.record_index(),
            error = %$error,
            fallback = $fallback,
            "Record formatting recovered"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{BpaError, Competency, FieldFormatError};
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        let competency = Competency::new(2024, 1).unwrap();
        log_export_start!(competency, "bpa");
        log_export_complete!(3_usize, Duration::from_millis(5));

        let error = BpaError::DataSource("connection refused".to_string());
        log_error_with_context!(&error, "fetch failed");
        log_error_with_context!(&error, "fetch failed", competency = %competency, stage = "fetching");

        let fallback = FieldFormatError::EmptyRecord { record_index: 2 };
        log_record_fallback!(&fallback, competency, "empty line");
    }
}
