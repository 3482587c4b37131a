//! In-memory record source

use crate::adapters::source::{retain_competency, RecordSource};
use crate::domain::{Competency, Record, Result};
use async_trait::async_trait;

/// Serves a fixed set of records
///
/// Filtering by competency uses the service date, the same way the database
/// query does. Records without a readable service date are only returned for
/// unfiltered fetches.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<Record>,
}

impl MemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn fetch_records(&self, competency: Option<&Competency>) -> Result<Vec<Record>> {
        Ok(retain_competency(self.records.clone(), competency))
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }

    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_filters_by_service_date() {
        let source = MemorySource::new(vec![
            Record::new().with("data_atendimento", "2024-01-31"),
            Record::new().with("data_atendimento", "2024-02-01"),
            Record::new().with("cod_procedimento", "0301010064"),
        ]);
        let january = Competency::new(2024, 1).unwrap();

        assert_eq!(source.fetch_records(Some(&january)).await.unwrap().len(), 1);
        assert_eq!(source.fetch_records(None).await.unwrap().len(), 3);
        assert!(source.test_connection().await.is_ok());
    }
}
