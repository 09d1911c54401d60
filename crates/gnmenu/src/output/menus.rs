//! Menu projection output formatting.

use geonode_menu_rs::expression::Diagnostic;
use geonode_menu_rs::menu::MenuItem;
use geonode_menu_rs::{ParsedConfiguration, TreeName};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;

use crate::commands::check::CheckResult;

use super::helpers::{format_kind, indent, item_label, item_target, truncate_str};

/// Header line of item tables.
fn items_header() -> String {
    format!("{:<20} {:<8} {:<25} {}", "ID", "Type", "Label", "Target")
}

/// Appends one row per item, children indented under their group.
fn push_item_rows(output: &mut String, items: &[MenuItem], depth: usize, use_colors: bool) {
    for item in items {
        let id = truncate_str(&format!("{}{}", indent(depth), item.id()), 20);
        let kind = format_kind(&format!("{:<8}", item.kind()), use_colors);
        let label = truncate_str(&item_label(item), 25);
        let target = truncate_str(&item_target(item), 40);

        output.push_str(format!("{:<20} {} {:<25} {}", id, kind, label, target).trim_end());
        output.push('\n');

        if let Some(children) = item.children() {
            push_item_rows(output, children, depth + 1, use_colors);
        }
    }
}

fn push_header(output: &mut String, header: &str, use_colors: bool) {
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(header);
        output.push('\n');
    }
}

/// JSON output structure for a single projected tree.
#[derive(Serialize)]
pub struct TreeOutput<'a> {
    pub tree: &'static str,
    pub key: &'static str,
    pub items: &'a [MenuItem],
    #[serde(skip_serializing_if = "no_diagnostics")]
    pub diagnostics: &'a [Diagnostic],
}

fn no_diagnostics(diagnostics: &&[Diagnostic]) -> bool {
    diagnostics.is_empty()
}

/// Formats a projection as JSON.
///
/// Without a tree this is the augmented configuration; with one it is just
/// that tree's allowed items.
pub fn format_projection_json(
    parsed: &ParsedConfiguration,
    tree: Option<TreeName>,
) -> Result<String, serde_json::Error> {
    match tree {
        Some(name) => serde_json::to_string_pretty(&TreeOutput {
            tree: name.as_str(),
            key: name.projection_key(),
            items: parsed.allowed(name),
            diagnostics: &parsed.diagnostics,
        }),
        None => serde_json::to_string_pretty(parsed),
    }
}

/// Formats the allowed items of the given trees as tables.
pub fn format_projection_table(parsed: &ParsedConfiguration, trees: &[TreeName], use_colors: bool) -> String {
    let mut output = String::new();

    for (index, name) in trees.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let title = format!("{} ({})", name, name.projection_key());
        if use_colors {
            output.push_str(&format!("{}\n", title.green().bold()));
        } else {
            output.push_str(&title);
            output.push('\n');
        }

        let items = parsed.allowed(*name);
        if items.is_empty() {
            output.push_str("  (no items)\n");
            continue;
        }

        push_header(&mut output, &items_header(), use_colors);
        push_item_rows(&mut output, items, 0, use_colors);
    }

    output
}

/// JSON output structure for the filters command.
#[derive(Serialize)]
pub struct FiltersOutput<'a> {
    pub filters: &'a [MenuItem],
}

/// Formats custom menu filters as JSON.
pub fn format_filters_json(filters: &[MenuItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&FiltersOutput { filters })
}

/// Formats custom menu filters as a table.
pub fn format_filters_table(filters: &[MenuItem], use_colors: bool) -> String {
    if filters.is_empty() {
        return "No filters found.\n".to_string();
    }

    let mut output = String::new();
    push_header(&mut output, &format!("{:<20} {:<25} {}", "ID", "Label", "Query"), use_colors);

    for filter in filters {
        let id = truncate_str(&filter.id().to_string(), 20);
        let label = truncate_str(&item_label(filter), 25);
        let query = truncate_str(&item_target(filter), 40);
        output.push_str(format!("{:<20} {:<25} {}", id, label, query).trim_end());
        output.push('\n');
    }

    output
}

/// JSON output structure for a successful check.
#[derive(Serialize)]
pub struct CheckOutput<'a> {
    pub status: &'static str,
    pub path: String,
    pub trees: Vec<TreeCountOutput>,
    pub warnings: &'a [Diagnostic],
}

/// Item count of one tree.
#[derive(Serialize)]
pub struct TreeCountOutput {
    pub tree: &'static str,
    pub items: usize,
}

/// Formats a check result as JSON.
pub fn format_check_json(result: &CheckResult) -> Result<String, serde_json::Error> {
    let output = CheckOutput {
        status: "ok",
        path: result.path.display().to_string(),
        trees: result
            .counts
            .iter()
            .map(|(name, items)| TreeCountOutput {
                tree: name.as_str(),
                items: *items,
            })
            .collect(),
        warnings: &result.warnings,
    };
    serde_json::to_string_pretty(&output)
}

/// Formats a check result for humans.
pub fn format_check_table(result: &CheckResult, use_colors: bool) -> String {
    let mut output = String::new();

    let status = format!("{} is valid", result.path.display());
    if use_colors {
        output.push_str(&format!("{}\n\n", status.green()));
    } else {
        output.push_str(&format!("{status}\n\n"));
    }

    push_header(&mut output, &format!("{:<14} {}", "Tree", "Items"), use_colors);
    for (name, items) in &result.counts {
        output.push_str(&format!("{:<14} {}\n", name.as_str(), items));
    }

    if !result.warnings.is_empty() {
        output.push('\n');
        output.push_str(&super::helpers::format_diagnostics(&result.warnings, use_colors));
    }

    output
}

/// JSON output structure for the eval command.
#[derive(Serialize)]
pub struct EvalOutput<'a> {
    pub condition: Value,
    /// `null` when the result is undefined.
    pub value: Option<&'a Value>,
    pub defined: bool,
    pub truthy: bool,
    pub diagnostics: &'a [Diagnostic],
}

/// Formats an evaluation result as JSON.
pub fn format_eval_json(
    condition: Value,
    value: Option<&Value>,
    truthy: bool,
    diagnostics: &[Diagnostic],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&EvalOutput {
        condition,
        value,
        defined: value.is_some(),
        truthy,
        diagnostics,
    })
}

/// Formats an evaluation result for humans.
pub fn format_eval_table(value: Option<&Value>, truthy: bool, use_colors: bool) -> String {
    let shown = value.map_or_else(|| "undefined".to_string(), Value::to_string);
    let verdict = if truthy { "truthy" } else { "falsy" };

    let verdict = match (use_colors, truthy) {
        (true, true) => verdict.green().to_string(),
        (true, false) => verdict.red().to_string(),
        (false, _) => verdict.to_string(),
    };
    format!("{shown} ({verdict})\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use geonode_menu_rs::menu::LoadMode;
    use geonode_menu_rs::{get_parsed_configuration, LocalConfig};
    use serde_json::json;

    fn parsed() -> ParsedConfiguration {
        let local = LocalConfig::from_value(
            &json!({"geoNodeConfiguration": {"menu": {"items": [
                {"id": "browse", "type": "group", "label": "Browse", "items": [
                    {"id": "maps", "type": "link", "href": "/maps"}
                ]},
                {"id": "divider", "type": "divider"}
            ]}}}),
            LoadMode::Strict,
        )
        .unwrap();
        get_parsed_configuration(&local, &json!({}))
    }

    #[test]
    fn test_projection_table_indents_children() {
        let output = format_projection_table(&parsed(), &[TreeName::MenuLeft], false);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "menu-left (menuItemsLeftAllowed)");
        assert!(lines[2].starts_with("browse"));
        assert!(lines[2].contains("Browse"));
        assert!(lines[3].starts_with("  maps"));
        assert!(lines[3].ends_with("/maps"));
        assert!(lines[4].starts_with("divider"));
    }

    #[test]
    fn test_projection_table_empty_tree() {
        let output = format_projection_table(&parsed(), &[TreeName::Footer], false);
        assert!(output.contains("(no items)"));
    }

    #[test]
    fn test_projection_json_single_tree() {
        let output = format_projection_json(&parsed(), Some(TreeName::MenuLeft)).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["key"], "menuItemsLeftAllowed");
        assert_eq!(value["items"][0]["items"][0]["id"], "maps");
        assert!(value.get("diagnostics").is_none());
    }

    #[test]
    fn test_projection_json_full() {
        let output = format_projection_json(&parsed(), None).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert!(value["menu"]["items"].is_array());
        assert_eq!(value["menuItemsLeftAllowed"][1]["id"], "divider");
        assert_eq!(value["navbarItemsAllowed"], json!([]));
    }

    #[test]
    fn test_filters_table_empty() {
        assert_eq!(format_filters_table(&[], false), "No filters found.\n");
    }

    #[test]
    fn test_eval_table_undefined() {
        assert_eq!(format_eval_table(None, false, false), "undefined (falsy)\n");
        assert_eq!(format_eval_table(Some(&json!("a")), true, false), "\"a\" (truthy)\n");
    }

    #[test]
    fn test_eval_json() {
        let output = format_eval_json(json!("user"), None, false, &[]).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["defined"], false);
        assert!(value["value"].is_null());
    }
}
