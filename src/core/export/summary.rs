//! Export report
//!
//! This module defines the output format selector and the report returned by
//! every completed render.

use crate::core::aggregate::HeaderDescriptor;
use crate::core::export::state::{ExportState, StateTrail};
use crate::core::validation::ValidationReport;
use crate::domain::Competency;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Fixed-width BPA-I file
    #[default]
    Bpa,
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Whether this is the fixed-width format
    pub fn is_fixed_width(&self) -> bool {
        matches!(self, ExportFormat::Bpa)
    }

    /// File extension of the tabular formats
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Bpa => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Bpa => "bpa",
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bpa" | "txt" | "fixed" => Ok(ExportFormat::Bpa),
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(format!(
                "Unknown export format '{other}'. Must be one of: bpa, csv, xlsx"
            )),
        }
    }
}

/// Summary of one render
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub format: ExportFormat,

    /// Period the batch belongs to, when known
    pub competency: Option<Competency>,

    /// Final path of the written file
    pub path: PathBuf,

    /// Number of records in the batch
    pub record_count: usize,

    /// Records written as empty lines because they could not be formatted
    pub failed_records: usize,

    /// Field-level fallbacks applied to kept records
    pub substitutions: usize,

    /// Header totals (fixed-width only)
    pub header: Option<HeaderDescriptor>,

    /// Advisory validation findings (fixed-width only)
    pub validation: Option<ValidationReport>,

    /// States visited by the run
    pub trail: StateTrail,

    pub bytes_written: usize,

    /// Duration of the render
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl ExportReport {
    /// Whether the run reached `DONE` with every record formatted
    pub fn is_successful(&self) -> bool {
        self.trail.current() == ExportState::Done && self.failed_records == 0
    }

    /// Number of advisory warnings
    pub fn warning_count(&self) -> usize {
        self.validation
            .as_ref()
            .map_or(0, |report| report.warnings.len())
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            format = %self.format,
            competency = ?self.competency.map(|c| c.to_string()),
            path = %self.path.display(),
            record_count = self.record_count,
            failed_records = self.failed_records,
            substitutions = self.substitutions,
            warnings = self.warning_count(),
            bytes_written = self.bytes_written,
            duration_ms = self.duration.as_millis() as u64,
            trail = %self.trail,
            "Export completed"
        );

        if let Some(header) = &self.header {
            tracing::info!(
                total_lines = header.total_lines,
                total_pages = header.total_pages,
                control = header.control,
                "Header totals"
            );
        }

        if self.failed_records > 0 {
            tracing::warn!(
                failed_records = self.failed_records,
                "Export completed with records replaced by empty lines"
            );
        }
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("bpa", ExportFormat::Bpa ; "bpa")]
    #[test_case("CSV", ExportFormat::Csv ; "upper csv")]
    #[test_case("xlsx", ExportFormat::Xlsx ; "xlsx")]
    #[test_case("excel", ExportFormat::Xlsx ; "excel alias")]
    fn test_format_parse(raw: &str, expected: ExportFormat) {
        assert_eq!(raw.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_format() {
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    fn report(trail: StateTrail, failed_records: usize) -> ExportReport {
        ExportReport {
            format: ExportFormat::Csv,
            competency: None,
            path: PathBuf::from("out.csv"),
            record_count: 3,
            failed_records,
            substitutions: 0,
            header: None,
            validation: None,
            trail,
            bytes_written: 10,
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_success_requires_done_and_no_failures() {
        let mut trail = StateTrail::new();
        trail.advance(ExportState::Writing).unwrap();
        assert!(!report(trail.clone(), 0).is_successful());

        trail.advance(ExportState::Done).unwrap();
        assert!(report(trail.clone(), 0).is_successful());
        assert!(!report(trail, 1).is_successful());
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(report(StateTrail::new(), 0)).unwrap();
        assert_eq!(json["format"], "csv");
        assert_eq!(json["trail"]["states"][0], "FETCHING");
    }
}
