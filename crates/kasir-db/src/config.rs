//! # Application Configuration
//!
//! Environment-driven settings for the store and the binaries.
//!
//! | Variable                 | Default      |
//! |--------------------------|--------------|
//! | `KASIR_DATABASE_PATH`    | `./kasir.db` |
//! | `KASIR_MAX_CONNECTIONS`  | `5`          |
//! | `KASIR_STORE_NAME`       | `Toko Kasir` |
//! | `KASIR_RUN_MIGRATIONS`   | `true`       |
//! | `KASIR_UTC_OFFSET_HOURS` | `7` (WIB)    |

use chrono::{FixedOffset, Offset, Utc};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::pool::DbConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
    /// Shown on receipts and in the seed banner.
    pub store_name: String,
    pub run_migrations: bool,
    /// Store-local offset used to cut day/week/month/year report windows.
    pub utc_offset: FixedOffset,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from("./kasir.db"),
            max_connections: 5,
            store_name: "Toko Kasir".to_string(),
            run_migrations: true,
            utc_offset: wib(),
        }
    }
}

fn wib() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap_or_else(|| Utc.fix())
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let database_path = lookup("KASIR_DATABASE_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let max_connections = parse_or(&lookup, "KASIR_MAX_CONNECTIONS", defaults.max_connections)?;
        if max_connections == 0 {
            return Err(invalid("KASIR_MAX_CONNECTIONS", "0", "must be greater than 0"));
        }

        let store_name = lookup("KASIR_STORE_NAME")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or(defaults.store_name);

        let run_migrations = parse_or(&lookup, "KASIR_RUN_MIGRATIONS", defaults.run_migrations)?;

        let utc_offset = match lookup("KASIR_UTC_OFFSET_HOURS") {
            None => defaults.utc_offset,
            Some(raw) => {
                let hours: i32 = raw
                    .trim()
                    .parse()
                    .map_err(|_| invalid("KASIR_UTC_OFFSET_HOURS", &raw, "not a whole number"))?;
                hours.checked_mul(3600).and_then(FixedOffset::east_opt).ok_or_else(|| {
                    invalid("KASIR_UTC_OFFSET_HOURS", &raw, "must be between -23 and 23")
                })?
            }
        };

        Ok(AppConfig {
            database_path,
            max_connections,
            store_name,
            run_migrations,
            utc_offset,
        })
    }

    /// Pool settings for [`Database::new`](crate::Database::new).
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .run_migrations(self.run_migrations)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &raw, &e.to_string())),
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database_path, PathBuf::from("./kasir.db"));
        assert_eq!(config.utc_offset.local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("KASIR_DATABASE_PATH", "/var/lib/kasir/toko.db"),
            ("KASIR_MAX_CONNECTIONS", "8"),
            ("KASIR_STORE_NAME", "Warung Bu Sri"),
            ("KASIR_RUN_MIGRATIONS", "false"),
            ("KASIR_UTC_OFFSET_HOURS", "8"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/kasir/toko.db"));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.store_name, "Warung Bu Sri");
        assert!(!config.run_migrations);
        assert_eq!(config.utc_offset.local_minus_utc(), 8 * 3600);

        let db = config.db_config();
        assert_eq!(db.max_connections, 8);
        assert!(!db.run_migrations);
    }

    #[test]
    fn test_invalid_values() {
        let err = AppConfig::from_lookup(lookup_from(&[("KASIR_MAX_CONNECTIONS", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "KASIR_MAX_CONNECTIONS"));

        assert!(AppConfig::from_lookup(lookup_from(&[("KASIR_MAX_CONNECTIONS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("KASIR_RUN_MIGRATIONS", "ya")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("KASIR_UTC_OFFSET_HOURS", "30")])).is_err());
    }
}
