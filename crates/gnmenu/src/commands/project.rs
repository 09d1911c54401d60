//! Project command implementation.
//!
//! Filters every menu tree of the local configuration for the session in the
//! state snapshot and prints the allowed items.

use geonode_menu_rs::{get_parsed_configuration, TreeName};

use super::{CommandContext, InputSources, Result};
use crate::output::{format_diagnostics, format_projection_json, format_projection_table};

/// Options for the project command.
#[derive(Debug, Default)]
pub struct ProjectOptions {
    /// Only show this tree.
    pub tree: Option<TreeName>,
}

/// Executes the project command.
///
/// # Errors
///
/// Returns an error if the local configuration or state cannot be loaded.
pub fn execute(ctx: &CommandContext, opts: &ProjectOptions, sources: &InputSources) -> Result<()> {
    let local = sources.load_local()?;
    let state = sources.load_state()?;

    let parsed = get_parsed_configuration(&local, &state);

    if ctx.json_output {
        let output = format_projection_json(&parsed, opts.tree)?;
        println!("{output}");
    } else if !ctx.quiet {
        let trees = selected_trees(opts);
        print!("{}", format_projection_table(&parsed, &trees, ctx.use_colors));

        let warnings = [local.diagnostics(), parsed.diagnostics.as_slice()].concat();
        if !warnings.is_empty() {
            eprint!("{}", format_diagnostics(&warnings, ctx.use_colors));
        }
    }

    Ok(())
}

/// Returns the trees to print, in projection order.
fn selected_trees(opts: &ProjectOptions) -> Vec<TreeName> {
    match opts.tree {
        Some(tree) => vec![tree],
        None => TreeName::ALL.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_trees_default_all() {
        assert_eq!(selected_trees(&ProjectOptions::default()).len(), 7);
    }

    #[test]
    fn test_selected_trees_single() {
        let opts = ProjectOptions {
            tree: Some(TreeName::Footer),
        };
        assert_eq!(selected_trees(&opts), vec![TreeName::Footer]);
    }
}
