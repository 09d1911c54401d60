//! Error types for configuration loading.

use thiserror::Error;

use crate::expression::ExpressionError;

/// A specialized Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading menu configuration.
///
/// Only loading can fail. Evaluation and filtering recover locally and report
/// problems as [`Diagnostic`](crate::expression::Diagnostic)s.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A visibility condition has an unsupported shape.
    #[error("invalid condition at {location}: {source}")]
    Condition {
        /// Where the condition was found, e.g. `menu.items[0].items[1]`.
        location: String,
        /// The parse error.
        #[source]
        source: ExpressionError,
    },

    /// An access requirement is not recognized.
    #[error("unknown requirement at {location}: {requirement}")]
    UnknownRequirement {
        /// Where the requirement was found.
        location: String,
        /// The raw requirement.
        requirement: String,
    },

    /// A named menu tree is not an array.
    #[error("invalid menu tree '{tree}': {reason}")]
    InvalidTree {
        /// Source path of the tree, e.g. `navbar.items`.
        tree: String,
        /// Description of the problem.
        reason: String,
    },

    /// The local configuration has an unexpected shape.
    #[error("invalid local configuration: {reason}")]
    Invalid {
        /// Description of the problem.
        reason: String,
    },

    /// The local configuration is not valid JSON.
    #[error("invalid local configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates an invalid configuration error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            reason: reason.into(),
        }
    }
}
