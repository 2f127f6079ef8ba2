//! Roster service configuration.
//!
//! Configuration is loaded from environment variables. The database URL is
//! redacted in Debug output.

use crate::actors::ManagerSettings;
use crate::auth::SuperAdminSeed;
use crate::roster::EventConfig;
use common::secret::SecretString;
use common::types::{Handle, UserId};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default event capacity.
pub const DEFAULT_CAPACITY: u32 = 20;

/// Default venue and date text.
pub const DEFAULT_UNSET: &str = "Not Set";

/// Default Postgres pool size.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Log output format, from `ROSTER_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines (default).
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue(format!(
                "ROSTER_LOG_FORMAT must be \"text\" or \"json\", got {raw:?}"
            ))),
        }
    }
}

/// Roster service configuration.
#[derive(Clone)]
pub struct Config {
    /// Postgres URL for the admin store. `None` selects the in-memory store.
    pub database_url: Option<SecretString>,

    /// Maximum Postgres pool connections (default: 5).
    pub db_max_connections: u32,

    /// Seed super-admins from `ROSTER_SUPER_ADMINS`.
    pub super_admins: SuperAdminSeed,

    /// Event configuration at startup.
    pub default_event: EventConfig,

    /// Log output format (default: text).
    pub log_format: LogFormat,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("super_admins", &self.super_admins)
            .field("default_event", &self.default_event)
            .field("log_format", &self.log_format)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

fn parse_number<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{key} must be a number, got {raw:?}"))),
        None => Ok(default),
    }
}

/// Parse a comma-separated seed list. Numeric entries are user ids, the rest
/// are handles.
fn parse_super_admins(raw: &str) -> Result<SuperAdminSeed, ConfigError> {
    let mut seed = SuperAdminSeed::default();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if let Ok(id) = entry.parse::<UserId>() {
            seed.ids.insert(id);
            continue;
        }
        let handle = Handle::parse(entry).map_err(|e| {
            ConfigError::InvalidValue(format!("ROSTER_SUPER_ADMINS entry {entry:?}: {e}"))
        })?;
        seed.handles.insert(handle);
    }

    Ok(seed)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| SecretString::from(url.clone()));

        let db_max_connections = parse_number(
            vars,
            "ROSTER_DB_MAX_CONNECTIONS",
            DEFAULT_DB_MAX_CONNECTIONS,
        )?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "ROSTER_DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        let super_admins = match vars.get("ROSTER_SUPER_ADMINS") {
            Some(raw) => parse_super_admins(raw)?,
            None => SuperAdminSeed::default(),
        };

        let capacity = parse_number(vars, "ROSTER_DEFAULT_CAPACITY", DEFAULT_CAPACITY)?;

        let venue = vars
            .get("ROSTER_DEFAULT_VENUE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_UNSET.to_string());

        let date = vars
            .get("ROSTER_DEFAULT_DATE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_UNSET.to_string());

        let log_format = match vars.get("ROSTER_LOG_FORMAT") {
            Some(raw) => LogFormat::parse(raw)?,
            None => LogFormat::default(),
        };

        Ok(Config {
            database_url,
            db_max_connections,
            super_admins,
            default_event: EventConfig {
                capacity,
                venue,
                date,
            },
            log_format,
        })
    }

    /// Startup settings for the roster manager.
    #[must_use]
    pub fn manager_settings(&self) -> ManagerSettings {
        ManagerSettings {
            event: self.default_event.clone(),
            seed: self.super_admins.clone(),
        }
    }
}
