//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub ledger: LedgerConfig,
    pub matching: MatchingConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Document store (PostgreSQL) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Vote ledger configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Attempts per transaction before giving up (at least 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the first retry, doubled per attempt
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    /// Upper bound for a single backoff
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Root collection of community questions
    #[serde(default = "default_questions_collection")]
    pub questions_collection: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            questions_collection: default_questions_collection(),
        }
    }
}

/// Partner matching configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Number of candidates returned by a partner search
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Collection holding user profiles
    #[serde(default = "default_users_collection")]
    pub users_collection: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            users_collection: default_users_collection(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "study-hub".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_backoff_ms() -> u64 {
    20
}

fn default_max_backoff_ms() -> u64 {
    500
}

fn default_questions_collection() -> String {
    study_core::DEFAULT_QUESTIONS_COLLECTION.to_string()
}

fn default_top_n() -> usize {
    10
}

fn default_users_collection() -> String {
    "users".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_var(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    default_max_connections,
                )?,
                min_connections: parse_var(
                    &lookup,
                    "DATABASE_MIN_CONNECTIONS",
                    default_min_connections,
                )?,
            },
            ledger: LedgerConfig {
                max_attempts: parse_var(&lookup, "LEDGER_MAX_ATTEMPTS", default_max_attempts)?,
                base_backoff_ms: parse_var(
                    &lookup,
                    "LEDGER_BASE_BACKOFF_MS",
                    default_base_backoff_ms,
                )?,
                max_backoff_ms: parse_var(
                    &lookup,
                    "LEDGER_MAX_BACKOFF_MS",
                    default_max_backoff_ms,
                )?,
                questions_collection: lookup("LEDGER_QUESTIONS_COLLECTION")
                    .unwrap_or_else(default_questions_collection),
            },
            matching: MatchingConfig {
                top_n: parse_var(&lookup, "MATCH_TOP_N", default_top_n)?,
                users_collection: lookup("MATCH_USERS_COLLECTION")
                    .unwrap_or_else(default_users_collection),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "LEDGER_MAX_ATTEMPTS",
                "must be at least 1".to_string(),
            ));
        }
        if self.ledger.base_backoff_ms > self.ledger.max_backoff_ms {
            return Err(ConfigError::InvalidValue(
                "LEDGER_BASE_BACKOFF_MS",
                format!("exceeds LEDGER_MAX_BACKOFF_MS ({})", self.ledger.max_backoff_ms),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::InvalidValue(
                "DATABASE_MIN_CONNECTIONS",
                format!(
                    "exceeds DATABASE_MAX_CONNECTIONS ({})",
                    self.database.max_connections
                ),
            ));
        }
        Ok(())
    }
}

fn parse_var<T, F, D>(lookup: &F, key: &'static str, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> T,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/study")]))
                .unwrap();

        assert_eq!(config.app.name, "study-hub");
        assert_eq!(config.app.env, Environment::Development);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.ledger.max_attempts, 5);
        assert_eq!(config.ledger.base_backoff_ms, 20);
        assert_eq!(config.ledger.max_backoff_ms, 500);
        assert_eq!(config.ledger.questions_collection, "communityQuestions");
        assert_eq!(config.matching.top_n, 10);
        assert_eq!(config.matching.users_collection, "users");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/study"),
            ("APP_ENV", "Production"),
            ("LEDGER_MAX_ATTEMPTS", "8"),
            ("LEDGER_QUESTIONS_COLLECTION", "questions"),
            ("MATCH_TOP_N", " 3 "),
        ]))
        .unwrap();

        assert_eq!(config.app.env, Environment::Production);
        assert_eq!(config.ledger.max_attempts, 8);
        assert_eq!(config.ledger.questions_collection, "questions");
        assert_eq!(config.matching.top_n, 3);
    }

    #[test]
    fn test_missing_database_url() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn test_invalid_number() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/study"),
            ("LEDGER_MAX_ATTEMPTS", "many"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for LEDGER_MAX_ATTEMPTS: many");
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/study"),
            ("LEDGER_MAX_ATTEMPTS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("LEDGER_MAX_ATTEMPTS", _)));
    }

    #[test]
    fn test_backoff_bounds_checked() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/study"),
            ("LEDGER_BASE_BACKOFF_MS", "1000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("LEDGER_BASE_BACKOFF_MS", _)));
    }
}
