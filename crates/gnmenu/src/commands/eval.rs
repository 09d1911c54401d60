//! Eval command implementation.
//!
//! Evaluates one visibility condition with the same bindings a projection
//! would use. Handy for debugging why an item is hidden.

use geonode_menu_rs::evaluate_condition;
use geonode_menu_rs::expression::{Condition, ConditionParser};
use geonode_menu_rs::menu::LoadMode;
use geonode_menu_rs::state::is_truthy;
use serde_json::Value;

use super::{CommandContext, InputSources, Result};
use crate::output::{format_diagnostics, format_eval_json, format_eval_table};

/// Options for the eval command.
#[derive(Debug)]
pub struct EvalOptions {
    /// Condition as JSON text, or a bare state path.
    pub condition: String,
}

/// Reads the condition argument.
///
/// Text that is not JSON is taken as a path string, so `gnmenu eval user`
/// works without quoting.
fn condition_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_condition(raw: &Value, mode: LoadMode) -> Result<Condition> {
    match mode {
        LoadMode::Strict => Ok(ConditionParser::parse(raw)?),
        LoadMode::Lenient => Ok(ConditionParser::parse_lenient(raw)),
    }
}

/// Executes the eval command.
///
/// # Errors
///
/// Returns an error if the state cannot be loaded, or in strict mode if the
/// condition has an unsupported shape.
pub fn execute(ctx: &CommandContext, opts: &EvalOptions, sources: &InputSources) -> Result<()> {
    let raw = condition_value(&opts.condition);
    let condition = parse_condition(&raw, sources.mode)?;

    let local = sources.load_local_or_default()?;
    let state = sources.load_state()?;

    tracing::debug!(condition = %condition.to_value(), "parsed condition");

    let (value, diagnostics) = evaluate_condition(&local, &state, &condition);
    let truthy = is_truthy(value.as_ref());

    if ctx.json_output {
        let output = format_eval_json(raw, value.as_ref(), truthy, &diagnostics)?;
        println!("{output}");
    } else if !ctx.quiet {
        print!("{}", format_eval_table(value.as_ref(), truthy, ctx.use_colors));
        eprint!("{}", format_diagnostics(&diagnostics, ctx.use_colors));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition_value_json() {
        assert_eq!(condition_value(r#"{"op": "not", "arg": "user"}"#), json!({"op": "not", "arg": "user"}));
        assert_eq!(condition_value("true"), json!(true));
    }

    #[test]
    fn test_condition_value_bare_path() {
        assert_eq!(condition_value("user.name"), json!("user.name"));
    }

    #[test]
    fn test_parse_condition_modes() {
        let raw = json!({"op": "xor", "args": []});
        assert!(parse_condition(&raw, LoadMode::Strict).is_err());
        assert!(parse_condition(&raw, LoadMode::Lenient).unwrap().is_invalid());
    }
}
