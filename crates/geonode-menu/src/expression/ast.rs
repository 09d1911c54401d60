//! Abstract Syntax Tree (AST) for visibility conditions.

use serde_json::{json, Value};

/// A parsed visibility condition.
///
/// The set of variants is closed: configuration shapes outside of it are
/// rejected by [`ConditionParser::parse`](super::ConditionParser::parse) or,
/// in lenient loading, kept as [`Condition::Invalid`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A literal value, passed through unchanged.
    Literal(Value),

    /// A dotted path resolved against the context bindings first, then the
    /// monitored state.
    Path(String),

    /// A dotted path resolved against the monitored state only
    /// (the `{state('...')}` template form).
    State(String),

    /// Logical AND of all operands. Empty means `true`.
    And(Vec<Condition>),

    /// Logical OR of all operands. Empty means `false`.
    Or(Vec<Condition>),

    /// Logical NOT.
    Not(Box<Condition>),

    /// Equality of two operands.
    Eq(Box<Condition>, Box<Condition>),

    /// Inequality of two operands.
    Ne(Box<Condition>, Box<Condition>),

    /// Membership of `needle` in `haystack`.
    In {
        /// The value looked for.
        needle: Box<Condition>,
        /// Array, string or object searched.
        haystack: Box<Condition>,
    },

    /// A condition that failed to parse. Always evaluates to `false`.
    Invalid {
        /// The raw configuration value.
        raw: Value,
        /// Why it was rejected.
        reason: String,
    },
}

impl Condition {
    /// Creates a path condition.
    pub fn path(path: impl Into<String>) -> Self {
        Condition::Path(path.into())
    }

    /// Creates a literal condition.
    pub fn literal(value: impl Into<Value>) -> Self {
        Condition::Literal(value.into())
    }

    /// Creates an AND of the given operands.
    pub fn and(operands: Vec<Condition>) -> Self {
        Condition::And(operands)
    }

    /// Creates an OR of the given operands.
    pub fn or(operands: Vec<Condition>) -> Self {
        Condition::Or(operands)
    }

    /// Creates a NOT condition.
    pub fn negate(inner: Condition) -> Self {
        Condition::Not(Box::new(inner))
    }

    /// Creates an equality condition.
    pub fn eq(left: Condition, right: Condition) -> Self {
        Condition::Eq(Box::new(left), Box::new(right))
    }

    /// Creates a membership condition.
    pub fn contains(needle: Condition, haystack: Condition) -> Self {
        Condition::In {
            needle: Box::new(needle),
            haystack: Box::new(haystack),
        }
    }

    /// Returns true if this condition or any operand failed to parse.
    pub fn is_invalid(&self) -> bool {
        match self {
            Condition::Invalid { .. } => true,
            Condition::Literal(_) | Condition::Path(_) | Condition::State(_) => false,
            Condition::And(ops) | Condition::Or(ops) => ops.iter().any(Condition::is_invalid),
            Condition::Not(inner) => inner.is_invalid(),
            Condition::Eq(l, r) | Condition::Ne(l, r) => l.is_invalid() || r.is_invalid(),
            Condition::In { needle, haystack } => needle.is_invalid() || haystack.is_invalid(),
        }
    }

    /// Converts the condition back to its configuration form.
    ///
    /// Literal strings are written as `{"value": ...}` so they are not read
    /// back as paths.
    pub fn to_value(&self) -> Value {
        match self {
            Condition::Literal(Value::String(s)) => json!({ "value": s }),
            Condition::Literal(Value::Object(map)) => json!({ "value": map }),
            Condition::Literal(value) => value.clone(),
            Condition::Path(path) => Value::String(path.clone()),
            Condition::State(path) => Value::String(format!("{{state('{path}')}}")),
            Condition::And(ops) => operator_value("and", ops.iter()),
            Condition::Or(ops) => operator_value("or", ops.iter()),
            Condition::Not(inner) => json!({ "op": "not", "arg": inner.to_value() }),
            Condition::Eq(l, r) => operator_value("eq", [l.as_ref(), r.as_ref()].into_iter()),
            Condition::Ne(l, r) => operator_value("ne", [l.as_ref(), r.as_ref()].into_iter()),
            Condition::In { needle, haystack } => {
                operator_value("in", [needle.as_ref(), haystack.as_ref()].into_iter())
            }
            Condition::Invalid { raw, .. } => raw.clone(),
        }
    }
}

fn operator_value<'c>(op: &str, operands: impl Iterator<Item = &'c Condition>) -> Value {
    let args: Vec<Value> = operands.map(Condition::to_value).collect();
    json!({ "op": op, "args": args })
}
