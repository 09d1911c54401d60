//! Error types for the condition parser.

use thiserror::Error;

/// A specialized Result type for condition parsing.
pub type ExpressionResult<T> = Result<T, ExpressionError>;

/// Errors that can occur while parsing a condition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpressionError {
    /// The `op` tag names no known operator.
    #[error("unknown operator: {op}{}", suggestion_suffix(.suggestion))]
    UnknownOperator {
        /// The unrecognized operator.
        op: String,
        /// The closest known operator, if any is close enough.
        suggestion: Option<String>,
    },

    /// The operator was given the wrong number of operands.
    #[error("operator '{op}' expects {expected} operand(s), found {found}")]
    Arity {
        /// Canonical operator name.
        op: &'static str,
        /// Expected count, human readable.
        expected: &'static str,
        /// Number of operands found.
        found: usize,
    },

    /// The operator has no `args` (or `arg`) field.
    #[error("operator '{op}' requires an 'args' array")]
    MissingOperands {
        /// Canonical operator name.
        op: &'static str,
    },

    /// The value is not a condition shape at all.
    #[error("malformed condition: {reason}")]
    Malformed {
        /// Description of the problem.
        reason: String,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

impl ExpressionError {
    /// Creates an unknown operator error.
    pub fn unknown_operator(op: impl Into<String>, suggestion: Option<String>) -> Self {
        ExpressionError::UnknownOperator {
            op: op.into(),
            suggestion,
        }
    }

    /// Creates a malformed condition error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        ExpressionError::Malformed {
            reason: reason.into(),
        }
    }
}
