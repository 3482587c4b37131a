//! Batch statistics shown before an export

use crate::core::codec::fields::{digits_of, parse_date};
use crate::core::codec::layout::columns;
use crate::domain::Record;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// Counts over a fetched batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStatistics {
    pub total_records: usize,
    /// Distinct patient health-card numbers
    pub distinct_patients: usize,
    pub distinct_professionals: usize,
    pub distinct_procedures: usize,
    pub first_service_date: Option<NaiveDate>,
    pub last_service_date: Option<NaiveDate>,
}

impl BatchStatistics {
    pub fn from_records(records: &[Record]) -> Self {
        let mut patients = HashSet::new();
        let mut professionals = HashSet::new();
        let mut procedures = HashSet::new();
        let mut first: Option<NaiveDate> = None;
        let mut last: Option<NaiveDate> = None;

        for record in records {
            insert_digits(&mut patients, record, columns::PATIENT_CNS);
            insert_digits(&mut professionals, record, columns::PROFESSIONAL_CNS);
            insert_digits(&mut procedures, record, columns::PROCEDURE);

            if let Some(date) = parse_date(record.first_present(columns::SERVICE_DATE)) {
                first = Some(first.map_or(date, |d| d.min(date)));
                last = Some(last.map_or(date, |d| d.max(date)));
            }
        }

        Self {
            total_records: records.len(),
            distinct_patients: patients.len(),
            distinct_professionals: professionals.len(),
            distinct_procedures: procedures.len(),
            first_service_date: first,
            last_service_date: last,
        }
    }

    /// Logs the statistics at info level
    pub fn log(&self) {
        tracing::info!(
            total_records = self.total_records,
            distinct_patients = self.distinct_patients,
            distinct_professionals = self.distinct_professionals,
            distinct_procedures = self.distinct_procedures,
            first_service_date = ?self.first_service_date,
            last_service_date = ?self.last_service_date,
            "Batch statistics"
        );
    }
}

fn insert_digits(set: &mut HashSet<String>, record: &Record, names: &[&str]) {
    let digits = digits_of(record.first_present(names));
    if !digits.is_empty() {
        set.insert(digits);
    }
}
