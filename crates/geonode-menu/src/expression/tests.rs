//! Tests for condition parsing and evaluation.

use super::*;
use crate::state::MonitoredState;
use serde_json::{json, Map, Value};

// ==================== Test Helpers ====================

fn eval(condition: &Condition, snapshot: Value, context: Value) -> (Option<Value>, usize) {
    let state = MonitoredState::from_snapshot(snapshot);
    let context: Map<String, Value> = match context {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let mut evaluator = Evaluator::new(&state, &context);
    let value = evaluator.evaluate(condition);
    (value, evaluator.diagnostics().len())
}

fn truthy(raw: Value, snapshot: Value) -> bool {
    let condition = ConditionParser::parse(&raw).unwrap();
    let state = MonitoredState::from_snapshot(snapshot);
    let context = Map::new();
    let mut evaluator = Evaluator::new(&state, &context);
    evaluator.is_truthy(&condition)
}

// ==================== Parser Tests ====================

#[test]
fn test_parse_literals() {
    assert_eq!(
        ConditionParser::parse(&json!(true)).unwrap(),
        Condition::literal(true)
    );
    assert_eq!(
        ConditionParser::parse(&json!(null)).unwrap(),
        Condition::Literal(Value::Null)
    );
    assert_eq!(
        ConditionParser::parse(&json!({"value": "admin"})).unwrap(),
        Condition::literal("admin")
    );
    assert_eq!(
        ConditionParser::parse(&json!(["a", "b"])).unwrap(),
        Condition::Literal(json!(["a", "b"]))
    );
}

#[test]
fn test_parse_paths() {
    assert_eq!(
        ConditionParser::parse(&json!("user.name")).unwrap(),
        Condition::path("user.name")
    );
    assert_eq!(
        ConditionParser::parse(&json!({"path": "router"})).unwrap(),
        Condition::path("router")
    );
    assert_eq!(
        ConditionParser::parse(&json!("{user}")).unwrap(),
        Condition::path("user")
    );
}

#[test]
fn test_parse_state_template() {
    assert_eq!(
        ConditionParser::parse(&json!("{state('router')}")).unwrap(),
        Condition::State("router".to_string())
    );
    assert_eq!(
        ConditionParser::parse(&json!("{ state(\"a.b\") }")).unwrap(),
        Condition::State("a.b".to_string())
    );
}

#[test]
fn test_parse_empty_string_is_falsy_literal() {
    let condition = ConditionParser::parse(&json!("  ")).unwrap();
    assert_eq!(condition, Condition::literal(""));
}

#[test]
fn test_parse_operators() {
    let condition = ConditionParser::parse(&json!({
        "op": "and",
        "args": ["user", {"op": "not", "arg": "readonly"}]
    }))
    .unwrap();

    assert_eq!(
        condition,
        Condition::and(vec![
            Condition::path("user"),
            Condition::negate(Condition::path("readonly")),
        ])
    );
}

#[test]
fn test_parse_operator_aliases_case_insensitive() {
    let a = ConditionParser::parse(&json!({"op": "AND", "args": []})).unwrap();
    let b = ConditionParser::parse(&json!({"op": "&&", "args": []})).unwrap();
    let c = ConditionParser::parse(&json!({"op": "all", "args": []})).unwrap();

    assert_eq!(a, Condition::and(vec![]));
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn test_parse_unknown_operator_rejected() {
    let err = ConditionParser::parse(&json!({"op": "??unknown", "args": []})).unwrap_err();
    assert_eq!(err, ExpressionError::unknown_operator("??unknown", None));
}

#[test]
fn test_parse_unknown_operator_suggestion() {
    let err = ConditionParser::parse(&json!({"op": "adn", "args": []})).unwrap_err();

    assert_eq!(
        err,
        ExpressionError::unknown_operator("adn", Some("and".to_string()))
    );
    assert!(err.to_string().contains("did you mean 'and'?"));
}

#[test]
fn test_parse_arity_errors() {
    let err = ConditionParser::parse(&json!({"op": "eq", "args": ["a"]})).unwrap_err();
    assert_eq!(
        err,
        ExpressionError::Arity {
            op: "eq",
            expected: "2",
            found: 1
        }
    );

    let err = ConditionParser::parse(&json!({"op": "not", "args": ["a", "b"]})).unwrap_err();
    assert!(matches!(err, ExpressionError::Arity { op: "not", .. }));
}

#[test]
fn test_parse_missing_operands() {
    let err = ConditionParser::parse(&json!({"op": "or"})).unwrap_err();
    assert_eq!(err, ExpressionError::MissingOperands { op: "or" });
}

#[test]
fn test_parse_malformed_object() {
    let err = ConditionParser::parse(&json!({"label": "x"})).unwrap_err();
    assert!(matches!(err, ExpressionError::Malformed { .. }));

    let err = ConditionParser::parse(&json!({"op": 3})).unwrap_err();
    assert!(matches!(err, ExpressionError::Malformed { .. }));
}

#[test]
fn test_parse_nested_error_propagates() {
    let err = ConditionParser::parse(&json!({
        "op": "or",
        "args": ["user", {"op": "xor", "args": []}]
    }))
    .unwrap_err();
    assert!(matches!(err, ExpressionError::UnknownOperator { .. }));
}

#[test]
fn test_parse_lenient_keeps_invalid() {
    let raw = json!({"op": "??unknown"});
    let condition = ConditionParser::parse_lenient(&raw);

    match &condition {
        Condition::Invalid { raw: kept, reason } => {
            assert_eq!(kept, &raw);
            assert!(reason.contains("unknown operator"));
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
    assert!(condition.is_invalid());
}

#[test]
fn test_parse_unsupported_template_rejected() {
    for raw in ["{!state('user')}", "{state('router') && state('browser')}", "{user ? 'a' : 'b'}"] {
        let err = ConditionParser::parse(&json!(raw)).unwrap_err();
        assert!(
            matches!(err, ExpressionError::Malformed { ref reason } if reason.contains("unsupported expression template")),
            "{raw}: {err:?}"
        );
    }
}

#[test]
fn test_parse_non_path_string_rejected() {
    for raw in ["!user", "user && admin", "state('router')"] {
        let err = ConditionParser::parse(&json!(raw)).unwrap_err();
        assert!(
            matches!(err, ExpressionError::Malformed { ref reason } if reason.contains("not a state path")),
            "{raw}: {err:?}"
        );
    }
}

#[test]
fn test_parse_lenient_keeps_unsupported_strings_invalid() {
    assert!(ConditionParser::parse_lenient(&json!("{!state('user')}")).is_invalid());
    assert!(ConditionParser::parse_lenient(&json!("user && admin")).is_invalid());
    assert_eq!(
        ConditionParser::parse_lenient(&json!("user['first-name']")),
        Condition::path("user['first-name']")
    );
}

#[test]
fn test_parse_template_plain_text_is_not_template() {
    assert_eq!(ConditionParser::parse_template("Home"), None);
    assert_eq!(ConditionParser::parse_template("{not a path}"), None);
    assert_eq!(ConditionParser::parse_template("{}"), None);
}

#[test]
fn test_to_value_reparses_to_same_condition() {
    let raw = json!({
        "op": "or",
        "args": [
            {"op": "in", "args": [{"value": "admin"}, "user.groups"]},
            {"op": "ne", "args": ["{state('router')}", {"value": "/"}]}
        ]
    });
    let condition = ConditionParser::parse(&raw).unwrap();
    let reparsed = ConditionParser::parse(&condition.to_value()).unwrap();

    assert_eq!(condition, reparsed);
}

// ==================== Evaluator Tests ====================

#[test]
fn test_evaluate_literal_passthrough() {
    let (value, _) = eval(&Condition::literal(42), json!({}), json!({}));
    assert_eq!(value, Some(json!(42)));
}

#[test]
fn test_evaluate_missing_path_is_undefined() {
    let (value, diagnostics) = eval(&Condition::path("a.b.c"), json!({"a": {}}), json!({}));

    assert_eq!(value, None);
    assert_eq!(diagnostics, 0);
}

#[test]
fn test_context_takes_precedence_over_state() {
    let condition = Condition::path("user.name");
    let (value, _) = eval(
        &condition,
        json!({"user": {"name": "from-state"}}),
        json!({"user": {"name": "from-context"}}),
    );
    assert_eq!(value, Some(json!("from-context")));
}

#[test]
fn test_context_binding_shadows_even_when_rest_missing() {
    let (value, _) = eval(
        &Condition::path("user.role"),
        json!({"user": {"role": "ADMIN"}}),
        json!({"user": {"name": "a"}}),
    );
    assert_eq!(value, None);
}

#[test]
fn test_state_condition_ignores_context() {
    let (value, _) = eval(
        &Condition::State("user".to_string()),
        json!({"user": "state"}),
        json!({"user": "context"}),
    );
    assert_eq!(value, Some(json!("state")));
}

#[test]
fn test_and_or_not() {
    let snapshot = json!({"a": true, "b": 0, "c": "x"});

    assert!(truthy(json!({"op": "and", "args": ["a", "c"]}), snapshot.clone()));
    assert!(!truthy(json!({"op": "and", "args": ["a", "b"]}), snapshot.clone()));
    assert!(truthy(json!({"op": "or", "args": ["b", "c"]}), snapshot.clone()));
    assert!(!truthy(json!({"op": "or", "args": ["b", "missing"]}), snapshot.clone()));
    assert!(truthy(json!({"op": "not", "arg": "missing"}), snapshot.clone()));
    assert!(truthy(json!({"op": "and", "args": []}), snapshot.clone()));
    assert!(!truthy(json!({"op": "or", "args": []}), snapshot));
}

#[test]
fn test_eq_undefined_semantics() {
    let snapshot = json!({"nothing": null});

    // undefined equals only undefined
    assert!(truthy(json!({"op": "eq", "args": ["missing", "also.missing"]}), snapshot.clone()));
    assert!(!truthy(json!({"op": "eq", "args": ["missing", null]}), snapshot.clone()));
    assert!(!truthy(json!({"op": "eq", "args": ["missing", "nothing"]}), snapshot.clone()));
    assert!(truthy(json!({"op": "ne", "args": ["missing", "nothing"]}), snapshot));
}

#[test]
fn test_eq_numbers_by_value() {
    assert!(truthy(json!({"op": "eq", "args": ["n", 1.0]}), json!({"n": 1})));
}

#[test]
fn test_membership() {
    let snapshot = json!({
        "groups": ["editors", "admins"],
        "router": "/catalogue/#/dataset/1",
        "perms": {"change_resourcebase": true}
    });

    assert!(truthy(
        json!({"op": "in", "args": [{"value": "admins"}, "groups"]}),
        snapshot.clone()
    ));
    assert!(!truthy(
        json!({"op": "in", "args": [{"value": "viewers"}, "groups"]}),
        snapshot.clone()
    ));
    assert!(truthy(
        json!({"op": "in", "args": [{"value": "dataset"}, "router"]}),
        snapshot.clone()
    ));
    assert!(truthy(
        json!({"op": "in", "args": [{"value": "change_resourcebase"}, "perms"]}),
        snapshot.clone()
    ));
    assert!(!truthy(
        json!({"op": "in", "args": ["missing", "groups"]}),
        snapshot
    ));
}

#[test]
fn test_unknown_operator_degrades_to_false() {
    let condition = ConditionParser::parse_lenient(&json!({"op": "??unknown"}));
    let (value, diagnostics) = eval(&condition, json!({}), json!({}));

    assert_eq!(value, Some(Value::Bool(false)));
    assert_eq!(diagnostics, 1);
}

#[test]
fn test_diagnostic_carries_subject() {
    let state = MonitoredState::default();
    let context = Map::new();
    let mut evaluator = Evaluator::new(&state, &context);
    evaluator.set_subject(Some("upload".to_string()));

    let condition = ConditionParser::parse_lenient(&json!({"label": "oops"}));
    assert!(!evaluator.is_truthy(&condition));

    let diagnostics = evaluator.into_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].subject.as_deref(), Some("upload"));
    assert!(diagnostics[0].to_string().starts_with("upload: "));
}

// ==================== Template Tests ====================

#[test]
fn test_resolve_fields() {
    let state = MonitoredState::from_snapshot(json!({"router": "/viewer/"}));
    let context: Map<String, Value> = json!({"user": {"name": "admin"}})
        .as_object()
        .cloned()
        .unwrap();
    let mut evaluator = Evaluator::new(&state, &context);

    let fields = json!({
        "label": "Profile",
        "href": "{user.name}",
        "current": "{state('router')}",
        "gone": "{state('missing')}",
        "nested": {"tooltip": ["{user.name}", "{missing}"]}
    });
    let resolved = resolve_fields(fields.as_object().unwrap(), &mut evaluator);

    assert_eq!(
        Value::Object(resolved),
        json!({
            "label": "Profile",
            "href": "admin",
            "current": "/viewer/",
            "nested": {"tooltip": ["admin", null]}
        })
    );
}
