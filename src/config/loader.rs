//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::BpaConfig;
use crate::config::secret_string;
use crate::domain::errors::BpaError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of environment variables that override configuration keys
pub const ENV_PREFIX: &str = "BPA_";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BpaConfig
/// 4. Applies environment variable overrides (BPA_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`BpaError::Configuration`] if the file cannot be read or parsed
/// or references unset variables, and [`BpaError::ConfigValidation`] if a
/// value fails its shape check.
///
/// # Examples
///
/// ```no_run
/// use bpa_export::config::loader::load_config;
///
/// let config = load_config("bpa-export.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BpaConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BpaError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BpaError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let config = parse_config(&contents)?;
    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Parses and validates configuration text
///
/// Same pipeline as [`load_config`] minus the file read.
pub fn parse_config(contents: &str) -> Result<BpaConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: BpaConfig = toml::from_str(&contents)
        .map_err(|e| BpaError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config
        .validate()
        .map_err(|e| BpaError::ConfigValidation(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BpaError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BpaError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the BPA_* prefix
///
/// Environment variables follow the pattern: BPA_<SECTION>_<KEY>
/// For example: BPA_DATABASE_HOST, BPA_EXPORT_OUTPUT_DIR
fn apply_env_overrides(config: &mut BpaConfig) -> Result<()> {
    if let Some(val) = env_override("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Database overrides
    if let Some(val) = env_override("DATABASE_HOST") {
        config.database.host = val;
    }
    if let Some(val) = env_override("DATABASE_PORT") {
        config.database.port = parse_override("DATABASE_PORT", &val)?;
    }
    if let Some(val) = env_override("DATABASE_DBNAME") {
        config.database.dbname = val;
    }
    if let Some(val) = env_override("DATABASE_USER") {
        config.database.user = val;
    }
    if let Some(val) = env_override("DATABASE_PASSWORD") {
        config.database.password = Some(secret_string(val));
    }
    if let Some(val) = env_override("DATABASE_SCHEMA") {
        config.database.schema = val;
    }
    if let Some(val) = env_override("DATABASE_CONNECT_TIMEOUT_SECONDS") {
        config.database.connect_timeout_seconds =
            parse_override("DATABASE_CONNECT_TIMEOUT_SECONDS", &val)?;
    }

    // Facility overrides
    if let Some(val) = env_override("FACILITY_CNES") {
        config.facility.cnes = val;
    }
    if let Some(val) = env_override("FACILITY_CNPJ") {
        config.facility.cnpj = val;
    }
    if let Some(val) = env_override("FACILITY_NAME") {
        config.facility.name = val;
    }
    if let Some(val) = env_override("FACILITY_ACRONYM") {
        config.facility.acronym = val;
    }

    if let Some(val) = env_override("DESTINATION_NAME") {
        config.destination.name = val;
    }
    if let Some(val) = env_override("DESTINATION_KIND") {
        config.destination.kind = val
            .parse()
            .map_err(|e| BpaError::Configuration(format!("{ENV_PREFIX}DESTINATION_KIND: {e}")))?;
    }

    // Export overrides
    if let Some(val) = env_override("EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }
    if let Some(val) = env_override("EXPORT_ENCODING") {
        config.export.encoding = val
            .parse()
            .map_err(|e| BpaError::Configuration(format!("{ENV_PREFIX}EXPORT_ENCODING: {e}")))?;
    }
    if let Some(val) = env_override("EXPORT_LAYOUT") {
        config.export.layout = val
            .parse()
            .map_err(|e| BpaError::Configuration(format!("{ENV_PREFIX}EXPORT_LAYOUT: {e}")))?;
    }
    if let Some(val) = env_override("EXPORT_VERSION_TAG") {
        config.export.version_tag = val;
    }
    if let Some(val) = env_override("EXPORT_FILE_PREFIX") {
        config.export.file_prefix = val;
    }

    // Logging overrides
    if let Some(val) = env_override("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Some(val) = env_override("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env_override("LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        BpaError::Configuration(format!(
            "{ENV_PREFIX}{key} has an invalid value '{value}'"
        ))
    })
}

/// Default configuration file written by `bpa-export init`
pub fn default_config_template() -> &'static str {
    r#"# BPA export configuration
#
# Values of the form ${VAR} are read from the environment (a .env file in
# the working directory is loaded first). Any key can also be overridden with
# BPA_<SECTION>_<KEY>, for example BPA_DATABASE_HOST.

[application]
log_level = "info"

[database]
host = "localhost"
port = 5432
dbname = "bd0553"
user = "postgres"
password = "${BPA_DB_PASSWORD}"
schema = "sigh"
connect_timeout_seconds = 10

[facility]
cnes = "2560372"
cnpj = "00000000000191"
name = "Hospital Municipal"
acronym = "SESAU"

[destination]
name = "Secretaria Municipal de Saude"
# M (municipal) or E (state)
kind = "M"

[export]
output_dir = "./exports"
# utf-8 or latin-1
encoding = "utf-8"
# extended (349 columns) or compact (177 columns)
layout = "extended"
version_tag = "D04.10"
file_prefix = "PACERIV"

[logging]
local_enabled = true
local_path = "./logs"
# daily, hourly or never
local_rotation = "daily"
"#
}
