//! Resolution of template expressions in display fields.

use serde_json::{Map, Value};

use super::evaluator::Evaluator;
use super::parser::ConditionParser;

/// Resolves every template string in a map of display fields.
///
/// Fields whose template resolves to undefined are removed.
pub fn resolve_fields(fields: &Map<String, Value>, evaluator: &mut Evaluator<'_>) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|(key, value)| resolve_value(value, evaluator).map(|v| (key.clone(), v)))
        .collect()
}

/// Resolves template strings inside a value, walking arrays and objects.
///
/// Inside arrays an undefined result becomes `null` so positions are kept.
pub fn resolve_value(value: &Value, evaluator: &mut Evaluator<'_>) -> Option<Value> {
    match value {
        Value::String(s) => match ConditionParser::parse_template(s) {
            Some(condition) => evaluator.evaluate(&condition),
            None => Some(value.clone()),
        },
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .map(|item| resolve_value(item, evaluator).unwrap_or(Value::Null))
                .collect(),
        )),
        Value::Object(map) => Some(Value::Object(resolve_fields(map, evaluator))),
        _ => Some(value.clone()),
    }
}
