//! Filters command implementation.
//!
//! Lists the custom search filters reachable from the main menu and the
//! filter form.

use geonode_menu_rs::get_custom_menu_filters;

use super::{CommandContext, InputSources, Result};
use crate::output::{format_filters_json, format_filters_table};

/// Executes the filters command.
///
/// # Errors
///
/// Returns an error if the local configuration or state cannot be loaded.
pub fn execute(ctx: &CommandContext, sources: &InputSources) -> Result<()> {
    let local = sources.load_local()?;
    let state = sources.load_state()?;

    let filters = get_custom_menu_filters(&local, &state);
    tracing::debug!(count = filters.len(), "collected custom filters");

    if ctx.json_output {
        let output = format_filters_json(&filters)?;
        println!("{output}");
    } else if !ctx.quiet {
        print!("{}", format_filters_table(&filters, ctx.use_colors));
    }

    Ok(())
}
