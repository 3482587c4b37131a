//! CLI command implementations

pub mod connection;
pub mod export;
pub mod init;
pub mod stats;
pub mod validate;

use crate::adapters::{CsvSource, PostgresSource, RecordSource};
use crate::config::BpaConfig;
use std::path::Path;
use std::sync::Arc;

/// The database source, or a CSV extract when one is given
pub(crate) fn build_source(config: &BpaConfig, source_csv: Option<&Path>) -> Arc<dyn RecordSource> {
    match source_csv {
        Some(path) => Arc::new(CsvSource::new(path)),
        None => Arc::new(PostgresSource::new(config.database.clone())),
    }
}
