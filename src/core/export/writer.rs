//! Output file naming and atomic writes
//!
//! Every export is built in memory first. The bytes go to a temporary file in
//! the destination directory, which is renamed onto the final name only once
//! everything has been written and synced. A failed write leaves no file under
//! the final name.

use crate::core::export::summary::ExportFormat;
use crate::domain::{BpaError, Competency, Result};
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// `<prefix>.<MON>`, e.g. `PACERIV.JAN`
pub fn fixed_width_file_name(prefix: &str, competency: Competency) -> String {
    format!("{prefix}.{}", competency.month_abbrev())
}

/// `bpa_export_<YYYYMMDD_HHMMSS>.<ext>`
pub fn tabular_file_name(format: ExportFormat, now: NaiveDateTime) -> String {
    format!(
        "bpa_export_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Writes `bytes` to `dir/name` through a temporary sibling file
///
/// Creates `dir` if needed. An existing file with the same name is replaced.
///
/// # Errors
///
/// Returns [`BpaError::Write`] if the directory cannot be created or the file
/// cannot be written or renamed.
pub fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| {
        BpaError::Write(format!(
            "Failed to create output directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    let target = dir.join(name);
    let write_error = |action: &str, e: std::io::Error| {
        BpaError::Write(format!("Failed to {action} {}: {}", target.display(), e))
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| write_error("stage", e))?;
    temp.write_all(bytes).map_err(|e| write_error("write", e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| write_error("sync", e))?;
    temp.persist(&target)
        .map_err(|e| write_error("persist", e.error))?;

    tracing::debug!(path = %target.display(), bytes = bytes.len(), "Output file written");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fixed_width_file_name() {
        let jan = Competency::new(2024, 1).unwrap();
        let dec = Competency::new(2023, 12).unwrap();
        assert_eq!(fixed_width_file_name("PACERIV", jan), "PACERIV.JAN");
        assert_eq!(fixed_width_file_name("PACERIV", dec), "PACERIV.DEZ");
    }

    #[test]
    fn test_tabular_file_name() {
        let now = NaiveDate::from_ymd_opt(2024, 2, 5)
            .unwrap()
            .and_hms_opt(9, 3, 7)
            .unwrap();
        assert_eq!(
            tabular_file_name(ExportFormat::Csv, now),
            "bpa_export_20240205_090307.csv"
        );
        assert_eq!(
            tabular_file_name(ExportFormat::Xlsx, now),
            "bpa_export_20240205_090307.xlsx"
        );
    }

    #[test]
    fn test_write_atomic_creates_dir_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");

        let path = write_atomic(&out, "PACERIV.JAN", b"first").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"first");

        write_atomic(&out, "PACERIV.JAN", b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        let entries: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary file left behind");
    }

    #[test]
    fn test_unwritable_destination_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let result = write_atomic(&blocker.join("sub"), "PACERIV.JAN", b"data");
        assert!(matches!(result, Err(BpaError::Write(_))));
    }
}
