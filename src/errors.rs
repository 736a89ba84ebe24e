//! # Error Types Module
//!
//! Structured errors for the recipe store and the configuration loader. Both are
//! converted into user-visible replies or a fatal startup exit at the boundary;
//! nothing here is allowed to take down the dispatcher.

use thiserror::Error;

/// Failures of a recipe store operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Connectivity failure or the per-operation timeout expired
    #[error("recipe store unavailable: {0}")]
    Unavailable(String),
    /// The query was valid but no document matched
    #[error("recipe {0} not found")]
    NotFound(String),
    /// The identifier is not a well-formed object id
    #[error("invalid recipe id {0:?}")]
    InvalidId(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Configuration problems detected before the bot session starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required setting {0} is missing or empty")]
    Missing(&'static str),
    #[error("setting {key} has invalid value {value:?}, expected a positive integer")]
    Invalid { key: &'static str, value: String },
}
