//! Common helper functions for output formatting.

use geonode_menu_rs::expression::Diagnostic;
use geonode_menu_rs::menu::MenuItem;
use owo_colors::OwoColorize;
use serde_json::Value;

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Returns the two-space indent for a tree depth.
pub fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Returns the label shown for an item, falling back to its id.
pub fn item_label(item: &MenuItem) -> String {
    item.label()
        .map(str::to_string)
        .unwrap_or_else(|| item.id().to_string())
}

/// Returns where an item points: a link's href or a filter's query.
pub fn item_target(item: &MenuItem) -> String {
    match item {
        MenuItem::Link { href, .. } => href.clone(),
        MenuItem::Filter { common } => match common.fields.get("query") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        _ => String::new(),
    }
}

/// Formats an (already padded) item type for display.
pub fn format_kind(kind: &str, use_colors: bool) -> String {
    if !use_colors {
        return kind.to_string();
    }
    match kind.trim_end() {
        "group" => kind.bold().to_string(),
        "filter" => kind.cyan().to_string(),
        "link" => kind.blue().to_string(),
        _ => kind.dimmed().to_string(),
    }
}

/// Formats diagnostics as warning lines.
pub fn format_diagnostics(diagnostics: &[Diagnostic], use_colors: bool) -> String {
    let mut output = String::new();
    for diagnostic in diagnostics {
        let prefix = if use_colors {
            "warning:".yellow().to_string()
        } else {
            "warning:".to_string()
        };
        output.push_str(&format!("{prefix} {diagnostic}\n"));
    }
    output
}
