//! Error types for option validation.

use std::collections::BTreeSet;

use thiserror::Error;

/// Errors raised while validating or mutating an [`OptionsMap`](crate::OptionsMap).
///
/// All of these are configuration errors: they are raised eagerly when an
/// owning object is constructed and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// One or more supplied keys are not declared in the schema.
    #[error("unknown options: {} (valid options: {})", join(.unknown), join(.valid))]
    Unknown {
        /// Every key present in the validated values.
        input: BTreeSet<String>,
        /// Keys declared by the schema.
        valid: BTreeSet<String>,
        /// The offending keys.
        unknown: BTreeSet<String>,
    },

    /// One or more required keys are absent.
    #[error("missing required options: {} (required: {})", join(.missing), join(.required))]
    Missing {
        /// Keys the schema requires.
        required: BTreeSet<String>,
        /// The required keys that were not supplied and had no default.
        missing: BTreeSet<String>,
    },

    /// A nested option was given a plain value instead of a mapping.
    #[error("option '{key}' expects nested options")]
    NotNested { key: String },

    /// A plain option was given a mapping.
    #[error("option '{key}' does not take nested options")]
    UnexpectedNested { key: String },

    /// The options were frozen by their owner and can no longer change.
    #[error("cannot modify frozen options (attempted to set '{key}')")]
    Frozen { key: String },
}

impl OptionsError {
    /// Returns the offending keys: unknown keys, missing keys, or the single
    /// key named by the other variants.
    pub fn keys(&self) -> BTreeSet<String> {
        match self {
            OptionsError::Unknown { unknown, .. } => unknown.clone(),
            OptionsError::Missing { missing, .. } => missing.clone(),
            OptionsError::NotNested { key }
            | OptionsError::UnexpectedNested { key }
            | OptionsError::Frozen { key } => {
                BTreeSet::from([key.clone()])
            }
        }
    }
}

fn join(keys: &BTreeSet<String>) -> String {
    keys.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// Result type for option operations.
pub type Result<T> = std::result::Result<T, OptionsError>;
