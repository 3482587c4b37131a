//! Validation report structures

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One advisory finding about one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    /// 1-based position of the record in the batch
    pub record_index: usize,
    /// Logical field the finding is about
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record {}: {}: {}",
            self.record_index, self.field, self.message
        )
    }
}

/// Outcome of validating a batch
///
/// Warnings never block an export by themselves; the caller decides.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Number of records checked
    pub total_checked: usize,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_checked(&mut self) {
        self.total_checked += 1;
    }

    pub fn push(&mut self, record_index: usize, field: &'static str, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            record_index,
            field,
            message: message.into(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of distinct records with at least one warning
    pub fn records_with_warnings(&self) -> usize {
        let mut indices: Vec<usize> = self.warnings.iter().map(|w| w.record_index).collect();
        indices.dedup();
        indices.len()
    }

    /// Warning counts per field, in field-name order
    pub fn counts_by_field(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for warning in &self.warnings {
            *counts.entry(warning.field).or_insert(0) += 1;
        }
        counts
    }

    /// Human-readable summary listing at most `limit` warnings
    pub fn format_summary(&self, limit: usize) -> String {
        let mut summary = String::new();
        summary.push_str("Validation Report\n");
        summary.push_str(&format!("  Records checked: {}\n", self.total_checked));
        summary.push_str(&format!(
            "  Records with warnings: {}\n",
            self.records_with_warnings()
        ));
        for (field, count) in self.counts_by_field() {
            summary.push_str(&format!("  {field}: {count}\n"));
        }
        if !self.warnings.is_empty() {
            summary.push_str("\nWarnings:\n");
            for warning in self.warnings.iter().take(limit) {
                summary.push_str(&format!("  - {warning}\n"));
            }
            if self.warnings.len() > limit {
                summary.push_str(&format!(
                    "  ... and {} more\n",
                    self.warnings.len() - limit
                ));
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_is_clean() {
        let report = ValidationReport::new();
        assert!(report.is_clean());
        assert_eq!(report.records_with_warnings(), 0);
    }

    #[test]
    fn test_counts() {
        let mut report = ValidationReport::new();
        report.push(1, "cns_paciente", "must have 15 digits");
        report.push(1, "cod_procedimento", "must have 10 digits");
        report.push(3, "cns_paciente", "must have 15 digits");

        assert!(!report.is_clean());
        assert_eq!(report.records_with_warnings(), 2);
        assert_eq!(report.counts_by_field().get("cns_paciente"), Some(&2));
    }

    #[test]
    fn test_summary_truncates_listing() {
        let mut report = ValidationReport::new();
        for i in 1..=5 {
            report.record_checked();
            report.push(i, "cod_cbo", "must have 6 alphanumeric characters");
        }
        let summary = report.format_summary(2);
        assert!(summary.contains("Records checked: 5"));
        assert!(summary.contains("record 2: cod_cbo"));
        assert!(!summary.contains("record 3: cod_cbo"));
        assert!(summary.contains("... and 3 more"));
    }
}
