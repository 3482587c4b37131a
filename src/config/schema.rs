//! Configuration schema types
//!
//! This module defines the configuration structure for the exporter.

use crate::config::SecretString;
use crate::core::codec::{DestinationKind, LayoutVersion, OutputEncoding};
use crate::domain::{Cnes, Cnpj};
use serde::{Deserialize, Serialize};

/// Main exporter configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BpaConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Issuing facility
    pub facility: FacilityConfig,

    /// Receiving health secretariat
    #[serde(default)]
    pub destination: DestinationConfig,

    /// Output settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BpaConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.database.validate()?;
        self.facility.validate()?;
        self.destination.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default = "default_db_name")]
    pub dbname: String,

    #[serde(default = "default_db_user")]
    pub user: String,

    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Schema holding the ambulatory tables
    #[serde(default = "default_db_schema")]
    pub schema: String,

    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("database.host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("database.port must be > 0".to_string());
        }
        if self.dbname.trim().is_empty() {
            return Err("database.dbname cannot be empty".to_string());
        }
        if self.user.trim().is_empty() {
            return Err("database.user cannot be empty".to_string());
        }
        // The schema name is interpolated into `SET search_path`
        if self.schema.is_empty()
            || !self
                .schema
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(format!(
                "database.schema must be a plain identifier (letters, digits, '_'), got '{}'",
                self.schema
            ));
        }
        if self.connect_timeout_seconds == 0 {
            return Err("database.connect_timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            dbname: default_db_name(),
            user: default_db_user(),
            password: None,
            schema: default_db_schema(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

/// Issuing facility identification written into every file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityConfig {
    /// CNES, 7 digits
    pub cnes: String,

    /// CNPJ of the issuing entity, 14 digits
    pub cnpj: String,

    /// Issuing organization name (header, 30 characters)
    pub name: String,

    /// Issuing organization short code (header, 6 characters)
    #[serde(default = "default_acronym")]
    pub acronym: String,
}

impl FacilityConfig {
    fn validate(&self) -> Result<(), String> {
        Cnes::new(self.cnes.as_str()).map_err(|e| format!("facility.cnes: {e}"))?;
        Cnpj::new(&self.cnpj).map_err(|e| format!("facility.cnpj: {e}"))?;
        if self.name.trim().is_empty() {
            return Err("facility.name cannot be empty".to_string());
        }
        if self.acronym.trim().is_empty() {
            return Err("facility.acronym cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Receiving health secretariat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    #[serde(default = "default_destination_name")]
    pub name: String,

    /// `M` (municipal) or `E` (state)
    #[serde(default)]
    pub kind: DestinationKind,
}

impl DestinationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("destination.name cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            name: default_destination_name(),
            kind: DestinationKind::default(),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory that receives the generated files
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Encoding of the fixed-width file
    #[serde(default)]
    pub encoding: OutputEncoding,

    /// Detail-line layout revision
    #[serde(default)]
    pub layout: LayoutVersion,

    /// Free-form version tag written into the header (10 characters)
    #[serde(default = "default_version_tag")]
    pub version_tag: String,

    /// Fixed-width file name prefix; the month abbreviation is the extension
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_dir.trim().is_empty() {
            return Err("export.output_dir cannot be empty".to_string());
        }
        if self.file_prefix.is_empty()
            || self
                .file_prefix
                .chars()
                .any(|c| std::path::is_separator(c) || c == '.')
        {
            return Err(format!(
                "export.file_prefix must be a plain file name without '.', got '{}'",
                self.file_prefix
            ));
        }
        if self.version_tag.chars().count() > 10 {
            return Err(format!(
                "export.version_tag must be at most 10 characters, got '{}'",
                self.version_tag
            ));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            encoding: OutputEncoding::default(),
            layout: LayoutVersion::default(),
            version_tag: default_version_tag(),
            file_prefix: default_file_prefix(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "bd0553".to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_schema() -> String {
    "sigh".to_string()
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_acronym() -> String {
    "SESAU".to_string()
}

fn default_destination_name() -> String {
    "Secretaria Municipal de Saude".to_string()
}

fn default_output_dir() -> String {
    "./exports".to_string()
}

fn default_version_tag() -> String {
    "D04.10".to_string()
}

fn default_file_prefix() -> String {
    "PACERIV".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
