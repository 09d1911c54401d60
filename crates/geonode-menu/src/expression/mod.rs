//! Visibility conditions for menu items.
//!
//! A condition is a closed AST ([`Condition`]) parsed from the loosely typed
//! values found in menu configuration and evaluated against a monitored-state
//! snapshot.
//!
//! # Supported Syntax
//!
//! ## Literals
//! - `true`, `false`, numbers, `null`, arrays
//! - `{"value": "text"}` for literal strings and objects
//!
//! ## Paths
//! - `"user"`, `"user.perms[0]"` - context bindings first, then monitored state
//! - `"{state('router')}"` - monitored state only
//!
//! ## Operators
//! - `{"op": "and", "args": [...]}`, `{"op": "or", "args": [...]}`
//! - `{"op": "not", "arg": c}`
//! - `{"op": "eq", "args": [a, b]}`, `{"op": "ne", "args": [a, b]}`
//! - `{"op": "in", "args": [needle, haystack]}`
//!
//! # Example
//!
//! ```
//! use geonode_menu_rs::expression::{ConditionParser, Evaluator};
//! use geonode_menu_rs::state::MonitoredState;
//! use serde_json::{json, Map};
//!
//! let condition = ConditionParser::parse_lenient(&json!({"op": "??unknown"}));
//!
//! let state = MonitoredState::default();
//! let context = Map::new();
//! let mut evaluator = Evaluator::new(&state, &context);
//!
//! assert!(!evaluator.is_truthy(&condition));
//! assert_eq!(evaluator.diagnostics().len(), 1);
//! ```

mod ast;
mod error;
mod evaluator;
mod parser;
mod template;

pub use ast::Condition;
pub use error::{ExpressionError, ExpressionResult};
pub use evaluator::{Diagnostic, Evaluator};
pub use parser::ConditionParser;
pub use template::{resolve_fields, resolve_value};

#[cfg(test)]
mod tests;
