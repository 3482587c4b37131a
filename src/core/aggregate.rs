//! Batch aggregation
//!
//! The header line carries totals that depend on the whole batch, so the
//! aggregator folds every record once before any line is written.

use crate::core::codec::fields::{format_numeric, quantity_units};
use crate::core::codec::layout::columns;
use crate::domain::{BpaError, Competency, Record, Result};
use serde::Serialize;

/// Detail lines per page
pub const RECORDS_PER_PAGE: usize = 20;

/// Modulus of the control fold
pub const CONTROL_MODULUS: u64 = 1111;

/// Offset added to the folded residue so the control is never zero
pub const CONTROL_OFFSET: u64 = 1111;

/// Totals derived from a full batch, written into the header line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderDescriptor {
    pub competency: Competency,
    pub total_lines: usize,
    pub total_pages: usize,
    /// Always within `[1111, 2221]`
    pub control: u64,
}

impl HeaderDescriptor {
    /// Folds every record of a batch
    ///
    /// An empty batch is reported as [`BpaError::EmptyResult`] rather than
    /// producing a zero-filled header.
    ///
    /// ```
    /// use bpa_export::core::aggregate::HeaderDescriptor;
    /// use bpa_export::domain::{Competency, Record};
    ///
    /// let competency = Competency::new(2024, 1).unwrap();
    /// let records = vec![Record::new().with("cod_procedimento", "0301010064").with("quantidade", "1")];
    /// let header = HeaderDescriptor::from_records(competency, &records).unwrap();
    /// assert_eq!(header.total_lines, 1);
    /// assert_eq!(header.total_pages, 1);
    /// assert!((1111..=2221).contains(&header.control));
    ///
    /// assert!(HeaderDescriptor::from_records(competency, &[]).is_err());
    /// ```
    pub fn from_records(competency: Competency, records: &[Record]) -> Result<Self> {
        if records.is_empty() {
            return Err(BpaError::EmptyResult {
                competency: competency.to_string(),
            });
        }
        let residue = records
            .iter()
            .fold(0, |acc, record| (acc + control_contribution(record)) % CONTROL_MODULUS);
        Ok(Self {
            competency,
            total_lines: records.len(),
            total_pages: records.len().div_ceil(RECORDS_PER_PAGE),
            control: residue + CONTROL_OFFSET,
        })
    }
}

/// One record's share of the control fold, already reduced by the modulus
///
/// Uses the procedure code as it appears in the detail line (10 digits) and
/// the source quantity in whole units. A missing or unreadable quantity counts
/// as zero here even though its detail token falls back to `000100`.
pub fn control_contribution(record: &Record) -> u64 {
    let procedure = format_numeric(record.first_present(columns::PROCEDURE), 10)
        .parse::<u64>()
        .unwrap_or(0);
    let quantity = quantity_units(record.first_present(columns::QUANTITY));
    (procedure % CONTROL_MODULUS + quantity % CONTROL_MODULUS) % CONTROL_MODULUS
}

/// Page number (1-based) of the record at 1-based `index`
pub fn page_of(index: usize) -> usize {
    1 + index.saturating_sub(1) / RECORDS_PER_PAGE
}

/// Position within its page (1-based) of the record at 1-based `index`
pub fn sequence_of(index: usize) -> usize {
    1 + index.saturating_sub(1) % RECORDS_PER_PAGE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn competency() -> Competency {
        Competency::new(2024, 1).unwrap()
    }

    fn record(procedure: &str, quantity: &str) -> Record {
        Record::new()
            .with("cod_procedimento", procedure)
            .with("quantidade", quantity)
    }

    #[test]
    fn test_pages_round_up() {
        let records: Vec<Record> = (1..=25).map(|_| record("0301010064", "1")).collect();
        let header = HeaderDescriptor::from_records(competency(), &records).unwrap();
        assert_eq!(header.total_lines, 25);
        assert_eq!(header.total_pages, 2);

        let header = HeaderDescriptor::from_records(competency(), &records[..20]).unwrap();
        assert_eq!(header.total_pages, 1);
    }

    #[test]
    fn test_empty_batch_is_no_data() {
        let err = HeaderDescriptor::from_records(competency(), &[]).unwrap_err();
        assert!(err.is_no_data());
    }

    #[test]
    fn test_control_fold() {
        // 301010064 % 1111 = 168, plus quantity 2
        let records = vec![record("0301010064", "2")];
        let header = HeaderDescriptor::from_records(competency(), &records).unwrap();
        assert_eq!(header.control, 170 + 1111);

        let records = vec![record("0301010064", "2"), record("0301010064", "2")];
        let header = HeaderDescriptor::from_records(competency(), &records).unwrap();
        assert_eq!(header.control, 340 + 1111);

        // 1110 + 1 wraps to zero residue, the offset keeps the control non-zero
        let records = vec![record("0000001110", "1")];
        let header = HeaderDescriptor::from_records(competency(), &records).unwrap();
        assert_eq!(header.control, 1111);
    }

    #[test]
    fn test_control_stays_in_range() {
        let inputs = ["9999999999", "0000000000", "", "abc", "1110", "1111"];
        for (i, procedure) in inputs.iter().enumerate() {
            for quantity in ["0", "1", "1110", "99999", "bad", "2.75"] {
                let records: Vec<Record> =
                    (0..=i).map(|_| record(procedure, quantity)).collect();
                let header = HeaderDescriptor::from_records(competency(), &records).unwrap();
                assert!(
                    (1111..=2221).contains(&header.control),
                    "control {} out of range",
                    header.control
                );
            }
        }
    }

    #[test]
    fn test_quantity_truncates_to_whole_units() {
        assert_eq!(control_contribution(&record("0000000000", "2.75")), 2);
        assert_eq!(control_contribution(&record("0000000000", "bad")), 0);
        assert_eq!(control_contribution(&Record::new()), 0);
    }

    #[test]
    fn test_unusable_quantity_adds_nothing() {
        let missing = Record::new().with("cod_procedimento", "0000001110");
        let header = HeaderDescriptor::from_records(competency(), &[missing]).unwrap();
        assert_eq!(header.control, 1110 + 1111);

        let records = vec![record("0000001110", "abc")];
        let header = HeaderDescriptor::from_records(competency(), &records).unwrap();
        assert_eq!(header.control, 2221);
    }

    #[test]
    fn test_page_and_sequence() {
        assert_eq!((page_of(1), sequence_of(1)), (1, 1));
        assert_eq!((page_of(20), sequence_of(20)), (1, 20));
        assert_eq!((page_of(21), sequence_of(21)), (2, 1));
        assert_eq!((page_of(25), sequence_of(25)), (2, 5));
    }
}
