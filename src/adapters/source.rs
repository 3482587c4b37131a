//! Record source abstraction
//!
//! This module defines the trait every record provider implements. The export
//! pipeline only ever talks to a `dyn RecordSource`, so the database, a CSV
//! extract and the in-memory test source are interchangeable.

use crate::core::codec::fields::parse_date;
use crate::core::codec::layout::columns;
use crate::domain::{Competency, Record, Result};
use async_trait::async_trait;

/// Provider of ambulatory production records
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetches the records of one competency, or every record when `None`
    ///
    /// An empty vector is a successful fetch; the caller decides what an empty
    /// period means.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::BpaError::DataSource`] when the provider
    /// cannot be reached or the query fails.
    async fn fetch_records(&self, competency: Option<&Competency>) -> Result<Vec<Record>>;

    /// Short human-readable description (host, file path, ...)
    fn describe(&self) -> String;

    /// Checks that the provider is reachable
    async fn test_connection(&self) -> Result<()>;
}

/// Keeps the records whose service date falls inside `competency`
///
/// With no competency every record is kept. Records without a readable
/// service date are dropped from filtered results.
pub fn retain_competency(records: Vec<Record>, competency: Option<&Competency>) -> Vec<Record> {
    let Some(competency) = competency else {
        return records;
    };
    records
        .into_iter()
        .filter(|record| {
            parse_date(record.first_present(columns::SERVICE_DATE))
                .is_some_and(|date| competency.contains(date))
        })
        .collect()
}
