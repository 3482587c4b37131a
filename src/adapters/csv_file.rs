//! CSV extract record source
//!
//! Reads a comma-separated extract whose header row carries the same column
//! names the database query produces. Every cell is read as text; empty cells
//! become null.

use crate::adapters::source::{retain_competency, RecordSource};
use crate::domain::{BpaError, Competency, FieldValue, Record, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Record source reading a CSV file
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    /// Uses another field delimiter (`;` is common in spreadsheet exports)
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| {
                BpaError::DataSource(format!("Failed to open {}: {}", self.path.display(), e))
            })?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| {
                BpaError::DataSource(format!(
                    "Failed to read header row of {}: {}",
                    self.path.display(),
                    e
                ))
            })?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut records = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row.map_err(|e| {
                BpaError::DataSource(format!(
                    "Failed to read row {} of {}: {}",
                    line + 2,
                    self.path.display(),
                    e
                ))
            })?;
            let record: Record = headers
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    let value = match row.get(idx) {
                        Some(cell) if !cell.trim().is_empty() => FieldValue::from(cell),
                        _ => FieldValue::Null,
                    };
                    (name.clone(), value)
                })
                .collect();
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    async fn fetch_records(&self, competency: Option<&Competency>) -> Result<Vec<Record>> {
        let records = self.read_all()?;
        let total = records.len();
        let records = retain_competency(records, competency);
        tracing::info!(
            path = %self.path.display(),
            rows_read = total,
            rows_kept = records.len(),
            "Read CSV extract"
        );
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }

    async fn test_connection(&self) -> Result<()> {
        if self.path.is_file() {
            Ok(())
        } else {
            Err(BpaError::DataSource(format!(
                "CSV extract not found: {}",
                self.path.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn extract(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_and_filters_rows() {
        let file = extract(
            "cod_procedimento,data_atendimento,quantidade\n\
             0301010064,2024-01-10,2\n\
             0301010072,2024-02-10,\n",
        );
        let source = CsvSource::new(file.path());
        let january = Competency::new(2024, 1).unwrap();

        let records = source.fetch_records(Some(&january)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("cod_procedimento"), "0301010064");

        let all = source.fetch_records(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].value("quantidade"), &FieldValue::Null);
    }

    #[tokio::test]
    async fn test_semicolon_delimiter() {
        let file = extract("cod_procedimento;sexo\n0301010064;F\n");
        let source = CsvSource::new(file.path()).with_delimiter(b';');
        let records = source.fetch_records(None).await.unwrap();
        assert_eq!(records[0].text("sexo"), "F");
    }

    #[tokio::test]
    async fn test_missing_file_is_data_source_error() {
        let source = CsvSource::new("/nonexistent/extract.csv");
        assert!(matches!(
            source.fetch_records(None).await,
            Err(BpaError::DataSource(_))
        ));
        assert!(source.test_connection().await.is_err());
    }
}
