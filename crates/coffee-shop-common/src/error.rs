//! Error types shared across Coffee Shop crates

use thiserror::Error;

/// Errors raised while loading or validating an [`Environment`](crate::Environment)
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The record could not be parsed or merged from its sources
    #[error("Failed to load environment: {details}")]
    Load { details: String },

    /// A field holds a value that cannot be used
    #[error("Invalid environment field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl EnvironmentError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised while building service configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to parse configuration: {details}")]
    ParseError { details: String },

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}
