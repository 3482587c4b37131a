//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use bpa_export::config::load_config;
use bpa_export::core::codec::{DestinationKind, LayoutVersion, OutputEncoding};
use bpa_export::domain::BpaError;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("BPA_APPLICATION_LOG_LEVEL");
    std::env::remove_var("BPA_DATABASE_HOST");
    std::env::remove_var("BPA_DATABASE_PORT");
    std::env::remove_var("BPA_FACILITY_CNES");
    std::env::remove_var("BPA_EXPORT_ENCODING");
    std::env::remove_var("BPA_EXPORT_LAYOUT");
    std::env::remove_var("TEST_BPA_DB_PASSWORD");
    std::env::remove_var("TEST_BPA_CNPJ");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const MINIMAL: &str = r#"
[facility]
cnes = "2560372"
cnpj = "25.062.282/0001-82"
name = "Hospital Municipal"
"#;

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_BPA_DB_PASSWORD", "s3cret");

    let toml_content = r#"
[application]
log_level = "debug"

[database]
host = "db.internal"
port = 5433
dbname = "bd0553"
user = "reader"
password = "${TEST_BPA_DB_PASSWORD}"
schema = "sigh"
connect_timeout_seconds = 5

[facility]
cnes = "2560372"
cnpj = "25.062.282/0001-82"
name = "Hospital Municipal"
acronym = "HMUN"

[destination]
name = "Secretaria Estadual de Saude"
kind = "E"

[export]
output_dir = "/tmp/bpa"
encoding = "latin-1"
layout = "compact"
version_tag = "D04.10"
file_prefix = "PACERIV"

[logging]
local_enabled = false
local_path = "/tmp/bpa-logs"
local_rotation = "hourly"
"#;
    let file = write_config(toml_content);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.database.host, "db.internal");
    assert_eq!(config.database.port, 5433);
    let password: &str = config.database.password.as_ref().unwrap().expose_secret().as_ref();
    assert_eq!(password, "s3cret");
    assert_eq!(config.database.connect_timeout_seconds, 5);
    assert_eq!(config.facility.acronym, "HMUN");
    assert_eq!(config.destination.kind, DestinationKind::State);
    assert_eq!(config.export.encoding, OutputEncoding::Latin1);
    assert_eq!(config.export.layout, LayoutVersion::Compact);
    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");

    cleanup_env_vars();
}

#[test]
fn test_minimal_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(MINIMAL);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.database.host, "localhost");
    assert_eq!(config.database.port, 5432);
    assert_eq!(config.database.schema, "sigh");
    assert!(config.database.password.is_none());
    assert_eq!(config.facility.acronym, "SESAU");
    assert_eq!(config.destination.kind, DestinationKind::Municipal);
    assert_eq!(config.export.output_dir, "./exports");
    assert_eq!(config.export.encoding, OutputEncoding::Utf8);
    assert_eq!(config.export.layout, LayoutVersion::Extended);
    assert_eq!(config.export.file_prefix, "PACERIV");
    assert!(config.logging.local_enabled);
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("BPA_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("BPA_DATABASE_PORT", "6543");
    std::env::set_var("BPA_EXPORT_ENCODING", "latin1");
    std::env::set_var("BPA_EXPORT_LAYOUT", "compact");

    let file = write_config(MINIMAL);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.database.port, 6543);
    assert_eq!(config.export.encoding, OutputEncoding::Latin1);
    assert_eq!(config.export.layout, LayoutVersion::Compact);

    cleanup_env_vars();
}

#[test]
fn test_env_override_is_validated() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("BPA_FACILITY_CNES", "12345");

    let file = write_config(MINIMAL);
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, BpaError::ConfigValidation(_)));
    assert!(err.to_string().contains("facility.cnes"));

    cleanup_env_vars();
}

#[test]
fn test_missing_env_vars_reported_together() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let toml_content = r#"
# password = "${IGNORED_IN_COMMENT}"
[database]
password = "${TEST_BPA_DB_PASSWORD}"

[facility]
cnes = "2560372"
cnpj = "${TEST_BPA_CNPJ}"
name = "Hospital Municipal"
"#;
    let file = write_config(toml_content);
    let err = load_config(file.path()).unwrap_err();
    let message = err.to_string();

    assert!(matches!(err, BpaError::Configuration(_)));
    assert!(message.contains("TEST_BPA_DB_PASSWORD"));
    assert!(message.contains("TEST_BPA_CNPJ"));
    assert!(!message.contains("IGNORED_IN_COMMENT"));
}

#[test]
fn test_invalid_cnpj_is_validation_error() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[facility]
cnes = "2560372"
cnpj = "11.111.111/1111-11"
name = "Hospital Municipal"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, BpaError::ConfigValidation(_)));
    assert!(err.to_string().contains("facility.cnpj"));
}

#[test]
fn test_missing_facility_section_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[export]\nlayout = \"extended\"\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, BpaError::Configuration(_)));
}

#[test]
fn test_unknown_layout_fails_to_parse() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(&format!("{MINIMAL}\n[export]\nlayout = \"wide\"\n"));
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_missing_file() {
    let err = load_config("/nonexistent/bpa-export.toml").unwrap_err();
    assert!(matches!(err, BpaError::Configuration(_)));
}
