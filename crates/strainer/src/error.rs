//! Error types for query construction and presentation.

use strainer_options::OptionsError;
use thiserror::Error;

/// Errors raised while building or running a [`Query`](crate::Query).
#[derive(Debug, Error)]
pub enum QueryError {
    /// Query, column, filter or set options failed validation.
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// A built-in option holds a value of the wrong type.
    #[error("option '{key}' must be {expected}")]
    InvalidOption { key: String, expected: &'static str },

    /// A hook the query relies on was never configured.
    #[error("{hook} is not implemented: declare it on the query definition or pass a scope explicitly")]
    NotImplemented { hook: &'static str },

    /// Configuration could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A render payload could not be serialized.
    #[error("failed to serialize render payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while reading a [`TableConfig`](crate::TableConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for strainer operations.
pub type Result<T> = std::result::Result<T, QueryError>;
