//! Database credential wrapper
//!
//! The PostgreSQL password is the only secret in the configuration. It is held
//! as a [`SecretString`], so it is zeroized on drop, redacted in `Debug`
//! output, and only reachable through `expose_secret()` when the connection
//! is opened.
//!
//! ```rust
//! use bpa_export::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let password = secret_string("db-password".to_string());
//! let raw: &str = password.expose_secret().as_ref();
//! assert_eq!(raw, "db-password");
//! assert!(!format!("{password:?}").contains("db-password"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Password text that is wiped when dropped
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// `database.password` as stored in [`crate::config::DatabaseConfig`]
pub type SecretString = Secret<SecretValue>;

/// Wraps a password read from an environment override
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use secrecy::ExposeSecret;

    fn exposed(secret: &SecretString) -> &str {
        secret.expose_secret().as_ref()
    }

    #[test]
    fn test_password_is_redacted_in_debug() {
        let config = DatabaseConfig {
            password: Some(secret_string("hunter2".to_string())),
            ..Default::default()
        };
        let debug_output = format!("{config:?}");

        assert!(!debug_output.contains("hunter2"));
        assert_eq!(config.password.as_ref().map(exposed), Some("hunter2"));
    }

    #[test]
    fn test_password_from_toml() {
        let config: DatabaseConfig = toml::from_str(r#"password = "s3cret""#).unwrap();
        assert_eq!(config.password.as_ref().map(exposed), Some("s3cret"));
    }
}
