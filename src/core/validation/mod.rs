//! Advisory record validation
//!
//! Runs the shape predicates in [`rules`] over each record of a batch and
//! collects the findings in a [`ValidationReport`]. Validation never rejects
//! a batch on its own.

pub mod report;
pub mod rules;

pub use report::{ValidationReport, ValidationWarning};

use crate::core::codec::fields::{format_date, parse_date};
use crate::core::codec::layout::columns;
use crate::domain::{Competency, Record};
use rules::{is_valid_cbo, is_valid_cns, is_valid_date_field, is_valid_procedure};

/// Checks every record of a batch
pub fn validate_batch(competency: Competency, records: &[Record]) -> ValidationReport {
    let mut report = ValidationReport::new();
    for (offset, record) in records.iter().enumerate() {
        validate_record(competency, offset + 1, record, &mut report);
        report.record_checked();
    }
    tracing::debug!(
        competency = %competency,
        record_count = records.len(),
        warning_count = report.warnings.len(),
        "Validation finished"
    );
    report
}

fn validate_record(
    competency: Competency,
    index: usize,
    record: &Record,
    report: &mut ValidationReport,
) {
    let procedure = record.first_present(columns::PROCEDURE);
    if procedure.is_absent() {
        report.push(index, "procedure", "missing procedure code");
    } else if !is_valid_procedure(&procedure.to_plain_string()) {
        report.push(index, "procedure", format!("'{procedure}' must have 10 digits"));
    }

    let patient = record.first_present(columns::PATIENT_CNS);
    if patient.is_absent() {
        report.push(index, "patient_cns", "missing patient CNS");
    } else if !is_valid_cns(&patient.to_plain_string()) {
        report.push(index, "patient_cns", format!("'{patient}' must have 15 digits"));
    }

    let professional = record.first_present(columns::PROFESSIONAL_CNS);
    if !professional.is_absent() && !is_valid_cns(&professional.to_plain_string()) {
        report.push(
            index,
            "professional_cns",
            format!("'{professional}' must have 15 digits"),
        );
    }

    let occupation = record.first_present(columns::OCCUPATION);
    if occupation.is_absent() {
        report.push(index, "cbo", "missing occupation code");
    } else if !is_valid_cbo(&occupation.to_plain_string()) {
        report.push(
            index,
            "cbo",
            format!("'{occupation}' must have 6 alphanumeric characters"),
        );
    }

    let service = record.first_present(columns::SERVICE_DATE);
    match parse_date(service) {
        None => report.push(index, "service_date", "missing or unreadable service date"),
        Some(date) if !is_valid_date_field(&format_date(service)) => {
            report.push(index, "service_date", format!("{date} is out of range"))
        }
        Some(date) if !competency.contains(date) => report.push(
            index,
            "service_date",
            format!("{date} is outside competency {competency}"),
        ),
        Some(_) => {}
    }

    let birth = record.first_present(columns::BIRTH_DATE);
    if !birth.is_absent() && !is_valid_date_field(&format_date(birth)) {
        report.push(index, "birth_date", format!("'{birth}' is not a valid date"));
    }
}
