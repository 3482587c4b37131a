//! Record sources for the exporter.
//!
//! - [`postgresql`] - The facility database (production use)
//! - [`csv_file`] - A CSV extract with the same column names
//! - [`memory`] - A fixed list of records (tests, embedding)
//!
//! Every source implements [`RecordSource`]; the export pipeline holds an
//! `Arc<dyn RecordSource>` and does not know which one it is talking to.
//!
//! ```rust
//! use bpa_export::adapters::{MemorySource, RecordSource};
//! use bpa_export::domain::{Competency, Record};
//!
//! # async fn example() -> bpa_export::domain::Result<()> {
//! let source = MemorySource::new(vec![
//!     Record::new().with("data_atendimento", "2024-01-15"),
//! ]);
//! let january = Competency::new(2024, 1).expect("valid competency");
//! let records = source.fetch_records(Some(&january)).await?;
//! assert_eq!(records.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod csv_file;
pub mod memory;
pub mod postgresql;
pub mod source;

pub use csv_file::CsvSource;
pub use memory::MemorySource;
pub use postgresql::PostgresSource;
pub use source::{retain_competency, RecordSource};
