//! Parser turning configuration values into [`Condition`] trees.
//!
//! Accepted shapes:
//!
//! - `true`, `false`, numbers, `null`, arrays: literals
//! - `"a.b.c"`: a path, context first then monitored state
//! - `"{state('a.b')}"`: a monitored-state path
//! - `"{a.b}"`: same as `"a.b"`
//!
//! Any other `{...}` template, or a string with characters that cannot
//! appear in a path, is rejected.
//! - `{"value": x}`: a literal (use this for literal strings)
//! - `{"path": "a.b"}`: a path
//! - `{"op": "and" | "or", "args": [...]}`
//! - `{"op": "not", "arg": c}` or `{"op": "not", "args": [c]}`
//! - `{"op": "eq" | "ne" | "in", "args": [a, b]}`

use serde_json::{Map, Value};
use strsim::levenshtein;

use super::ast::Condition;
use super::error::{ExpressionError, ExpressionResult};

/// Maximum Levenshtein distance to consider an operator as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    And,
    Or,
    Not,
    Eq,
    Ne,
    In,
}

impl Operator {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "and" | "&&" | "all" => Some(Operator::And),
            "or" | "||" | "any" => Some(Operator::Or),
            "not" | "!" => Some(Operator::Not),
            "eq" | "==" | "===" => Some(Operator::Eq),
            "ne" | "!=" | "!==" => Some(Operator::Ne),
            "in" => Some(Operator::In),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::In => "in",
        }
    }
}

const OPERATOR_NAMES: &[&str] = &["and", "or", "not", "eq", "ne", "in", "all", "any"];

/// Parser for visibility conditions.
pub struct ConditionParser;

impl ConditionParser {
    /// Parses a configuration value into a condition.
    ///
    /// # Errors
    ///
    /// Returns an error for any shape outside the known variants.
    ///
    /// # Example
    ///
    /// ```
    /// use geonode_menu_rs::expression::{Condition, ConditionParser};
    /// use serde_json::json;
    ///
    /// let condition = ConditionParser::parse(&json!("user")).unwrap();
    /// assert_eq!(condition, Condition::path("user"));
    /// ```
    pub fn parse(value: &Value) -> ExpressionResult<Condition> {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) => {
                Ok(Condition::Literal(value.clone()))
            }
            Value::String(s) => parse_string(s),
            Value::Object(map) => parse_object(map),
        }
    }

    /// Parses a configuration value, keeping rejected shapes as
    /// [`Condition::Invalid`] instead of failing.
    pub fn parse_lenient(value: &Value) -> Condition {
        Self::parse(value).unwrap_or_else(|e| Condition::Invalid {
            raw: value.clone(),
            reason: e.to_string(),
        })
    }

    /// Parses a display-field template such as `"{state('router')}"`.
    ///
    /// Returns `None` when the string is not a template, in which case it is
    /// plain display text.
    pub fn parse_template(s: &str) -> Option<Condition> {
        let inner = s.trim().strip_prefix('{')?.strip_suffix('}')?.trim();
        if let Some(path) = state_call(inner) {
            return Some(Condition::State(path.to_string()));
        }
        if !inner.is_empty() && inner.chars().all(is_path_char) {
            return Some(Condition::Path(inner.to_string()));
        }
        None
    }
}

fn parse_string(s: &str) -> ExpressionResult<Condition> {
    if let Some(template) = ConditionParser::parse_template(s) {
        return Ok(template);
    }
    let trimmed = s.trim();
    if trimmed.is_empty() {
        // An empty path would select the whole snapshot
        return Ok(Condition::Literal(Value::String(String::new())));
    }
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Err(ExpressionError::malformed(format!(
            "unsupported expression template '{trimmed}': only {{state('path')}} and {{path}} are accepted"
        )));
    }
    if !trimmed.chars().all(is_path_char) {
        return Err(ExpressionError::malformed(format!(
            "'{trimmed}' is not a state path"
        )));
    }
    Ok(Condition::Path(trimmed.to_string()))
}

/// Extracts `p` from `state('p')` or `state("p")`.
fn state_call(inner: &str) -> Option<&str> {
    let args = inner.strip_prefix("state")?.trim_start();
    let args = args.strip_prefix('(')?.strip_suffix(')')?.trim();
    args.strip_prefix('\'')
        .and_then(|a| a.strip_suffix('\''))
        .or_else(|| args.strip_prefix('"').and_then(|a| a.strip_suffix('"')))
}

fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '$' | '.' | '[' | ']' | '\'' | '"')
}

fn parse_object(map: &Map<String, Value>) -> ExpressionResult<Condition> {
    let Some(tag) = map.get("op") else {
        if let Some(value) = map.get("value") {
            return Ok(Condition::Literal(value.clone()));
        }
        if let Some(path) = map.get("path") {
            return match path {
                Value::String(p) => Ok(Condition::Path(p.clone())),
                _ => Err(ExpressionError::malformed("'path' must be a string")),
            };
        }
        return Err(ExpressionError::malformed(
            "object condition needs an 'op', 'value' or 'path' field",
        ));
    };

    let Value::String(tag) = tag else {
        return Err(ExpressionError::malformed("'op' must be a string"));
    };

    let op = Operator::from_tag(tag)
        .ok_or_else(|| ExpressionError::unknown_operator(tag.clone(), suggest_operator(tag)))?;

    let operands = operands(map, op)?;

    match op {
        Operator::And => Ok(Condition::And(operands)),
        Operator::Or => Ok(Condition::Or(operands)),
        Operator::Not => {
            let [inner] = exact::<1>(op, operands, "1")?;
            Ok(Condition::Not(Box::new(inner)))
        }
        Operator::Eq => {
            let [left, right] = exact::<2>(op, operands, "2")?;
            Ok(Condition::Eq(Box::new(left), Box::new(right)))
        }
        Operator::Ne => {
            let [left, right] = exact::<2>(op, operands, "2")?;
            Ok(Condition::Ne(Box::new(left), Box::new(right)))
        }
        Operator::In => {
            let [needle, haystack] = exact::<2>(op, operands, "2")?;
            Ok(Condition::In {
                needle: Box::new(needle),
                haystack: Box::new(haystack),
            })
        }
    }
}

fn operands(map: &Map<String, Value>, op: Operator) -> ExpressionResult<Vec<Condition>> {
    match (map.get("args"), map.get("arg")) {
        (Some(Value::Array(args)), _) => args.iter().map(ConditionParser::parse).collect(),
        (Some(_), _) => Err(ExpressionError::malformed(format!(
            "'args' of operator '{}' must be an array",
            op.name()
        ))),
        (None, Some(arg)) => Ok(vec![ConditionParser::parse(arg)?]),
        (None, None) => Err(ExpressionError::MissingOperands { op: op.name() }),
    }
}

fn exact<const N: usize>(
    op: Operator,
    operands: Vec<Condition>,
    expected: &'static str,
) -> ExpressionResult<[Condition; N]> {
    let found = operands.len();
    operands.try_into().map_err(|_| ExpressionError::Arity {
        op: op.name(),
        expected,
        found,
    })
}

/// Finds the closest known operator name using Levenshtein distance.
fn suggest_operator(tag: &str) -> Option<String> {
    let tag_lower = tag.to_lowercase();
    let (best, distance) = OPERATOR_NAMES
        .iter()
        .map(|name| (*name, levenshtein(&tag_lower, name)))
        .min_by_key(|(_, d)| *d)?;

    // Only suggest if the distance is within threshold and not an exact match
    if distance > 0 && distance <= MAX_SUGGESTION_DISTANCE && distance < tag_lower.len() {
        Some(best.to_string())
    } else {
        None
    }
}
