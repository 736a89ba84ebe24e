//! # Configuration Module
//!
//! Settings are read from the process environment (optionally seeded from a
//! `.env` file) and validated before anything connects to Telegram or MongoDB.

use std::fmt;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::localization::FALLBACK_LANGUAGE;

// Constants for store access
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Validated bot configuration
#[derive(Clone)]
pub struct Config {
    /// Telegram bot credential
    pub bot_token: String,
    /// MongoDB connection string
    pub mongo_uri: String,
    /// Database holding the recipe collection
    pub database_name: String,
    /// Recipe collection name
    pub collection_name: String,
    /// Upper bound for a single store operation
    pub store_timeout: Duration,
    /// Upper bound for the startup connect and ping
    pub connect_timeout: Duration,
    /// Language used for users whose Telegram language is not supported
    pub default_language: String,
    pub log_format: LogFormat,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("mongo_uri", &redact_uri(&self.mongo_uri))
            .field("database_name", &self.database_name)
            .field("collection_name", &self.collection_name)
            .field("store_timeout", &self.store_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("default_language", &self.default_language)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Replace the `user:password@` part of a connection string so it can be logged
pub fn redact_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://<redacted>@{}", &rest[at + 1..]),
        None => uri.to_string(),
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build and validate configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let seconds = |key: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                None => Ok(Duration::from_secs(default)),
                Some(value) => match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                    _ => Err(ConfigError::Invalid { key, value }),
                },
            }
        };

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            mongo_uri: required("MONGO_URI")?,
            database_name: required("DB_NAME")?,
            collection_name: required("COLLECTION_NAME")?,
            store_timeout: seconds("STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT_SECS)?,
            connect_timeout: seconds("CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
            default_language: lookup("DEFAULT_LANGUAGE")
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string()),
            log_format: LogFormat::parse(lookup("LOG_FORMAT").as_deref()),
        })
    }
}
