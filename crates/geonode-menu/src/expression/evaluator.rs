//! Condition evaluation against the monitored state.
//!
//! This module provides the [`Evaluator`] for resolving parsed [`Condition`]s
//! to values. Evaluation never fails: missing paths are undefined (`None`),
//! undefined is falsy, and invalid conditions evaluate to `false` with a
//! [`Diagnostic`] recorded.
//!
//! # Example
//!
//! ```
//! use geonode_menu_rs::expression::{ConditionParser, Evaluator};
//! use geonode_menu_rs::state::MonitoredState;
//! use serde_json::{json, Map};
//!
//! let state = MonitoredState::from_snapshot(json!({"router": "/viewer/"}));
//! let context = Map::new();
//! let mut evaluator = Evaluator::new(&state, &context);
//!
//! let condition = ConditionParser::parse(&json!({
//!     "op": "eq",
//!     "args": ["router", {"value": "/viewer/"}]
//! })).unwrap();
//! assert!(evaluator.is_truthy(&condition));
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use super::ast::Condition;
use crate::state::{get_segments, is_truthy, parse_path, MonitoredState, PathSegment};

/// A recovered problem found while evaluating or loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The menu item being evaluated, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// What went wrong.
    pub message: String,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(subject: Option<String>, message: impl Into<String>) -> Self {
        Self {
            subject,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "{subject}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Evaluates conditions against a monitored-state snapshot and local
/// context bindings.
///
/// One evaluator is created per projection pass; it borrows the snapshot
/// captured at entry so every condition sees the same state.
#[derive(Debug)]
pub struct Evaluator<'a> {
    state: &'a MonitoredState,
    context: &'a Map<String, Value>,
    subject: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Evaluator<'a> {
    /// Creates a new evaluator.
    ///
    /// # Arguments
    ///
    /// * `state` - The monitored-state snapshot
    /// * `context` - Local bindings, taking precedence over the snapshot
    pub fn new(state: &'a MonitoredState, context: &'a Map<String, Value>) -> Self {
        Self {
            state,
            context,
            subject: None,
            diagnostics: Vec::new(),
        }
    }

    /// Sets the item that subsequent diagnostics refer to.
    pub fn set_subject(&mut self, subject: Option<String>) {
        self.subject = subject;
    }

    /// Resolves a dotted path, context bindings first.
    ///
    /// A context binding wins as soon as its first segment matches, even when
    /// the rest of the path is missing from it.
    pub fn lookup(&self, path: &str) -> Option<&'a Value> {
        let segments = parse_path(path);
        if let Some((PathSegment::Key(first), rest)) = segments.split_first() {
            if let Some(bound) = self.context.get(first) {
                return get_segments(bound, rest);
            }
        }
        get_segments(self.state.as_value(), &segments)
    }

    /// Resolves a dotted path against the monitored state only.
    pub fn lookup_state(&self, path: &str) -> Option<&'a Value> {
        self.state.lookup(path)
    }

    /// Evaluates a condition to a value. `None` is undefined.
    pub fn evaluate(&mut self, condition: &Condition) -> Option<Value> {
        match condition {
            Condition::Literal(value) => Some(value.clone()),
            Condition::Path(path) => self.lookup(path).cloned(),
            Condition::State(path) => self.lookup_state(path).cloned(),

            Condition::And(operands) => {
                for operand in operands {
                    if !self.is_truthy(operand) {
                        return Some(Value::Bool(false));
                    }
                }
                Some(Value::Bool(true))
            }
            Condition::Or(operands) => {
                for operand in operands {
                    if self.is_truthy(operand) {
                        return Some(Value::Bool(true));
                    }
                }
                Some(Value::Bool(false))
            }
            Condition::Not(inner) => Some(Value::Bool(!self.is_truthy(inner))),

            Condition::Eq(left, right) => {
                let (l, r) = (self.evaluate(left), self.evaluate(right));
                Some(Value::Bool(values_equal(l.as_ref(), r.as_ref())))
            }
            Condition::Ne(left, right) => {
                let (l, r) = (self.evaluate(left), self.evaluate(right));
                Some(Value::Bool(!values_equal(l.as_ref(), r.as_ref())))
            }
            Condition::In { needle, haystack } => {
                let (n, h) = (self.evaluate(needle), self.evaluate(haystack));
                Some(Value::Bool(contains(n.as_ref(), h.as_ref())))
            }

            Condition::Invalid { reason, .. } => {
                self.record(format!("invalid condition evaluated as false: {reason}"));
                Some(Value::Bool(false))
            }
        }
    }

    /// Evaluates a condition and applies truthiness.
    pub fn is_truthy(&mut self, condition: &Condition) -> bool {
        let value = self.evaluate(condition);
        is_truthy(value.as_ref())
    }

    /// Records a diagnostic for the current subject.
    pub fn record(&mut self, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(self.subject.clone(), message);
        tracing::warn!(subject = ?diagnostic.subject, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    /// Returns the diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the evaluator, returning its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Equality with undefined kept distinct from `null`.
///
/// Numbers compare by value, so `1` equals `1.0`.
fn values_equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (None, Some(_)) | (Some(_), None) => false,
        (Some(Value::Number(l)), Some(Value::Number(r))) => match (l.as_f64(), r.as_f64()) {
            (Some(l), Some(r)) => l == r,
            _ => l == r,
        },
        (Some(l), Some(r)) => l == r,
    }
}

fn contains(needle: Option<&Value>, haystack: Option<&Value>) -> bool {
    let (Some(needle), Some(haystack)) = (needle, haystack) else {
        return false;
    };
    match (haystack, needle) {
        (Value::Array(items), _) => items.iter().any(|item| values_equal(Some(item), Some(needle))),
        (Value::String(s), Value::String(part)) => s.contains(part.as_str()),
        (Value::Object(map), Value::String(key)) => map.contains_key(key),
        _ => false,
    }
}
