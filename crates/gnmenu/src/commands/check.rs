//! Check command implementation.
//!
//! Loads the local configuration strictly and reports the size of each tree.
//! Shapes that strict loading tolerates (malformed nodes, for instance) are
//! reported as warnings.

use std::path::PathBuf;

use geonode_menu_rs::expression::Diagnostic;
use geonode_menu_rs::menu::{count_nodes, LoadMode};
use geonode_menu_rs::{LocalConfig, TreeName};

use super::{CommandContext, InputSources, Result};
use crate::output::{format_check_json, format_check_table};

/// Result of a successful check.
#[derive(Debug)]
pub struct CheckResult {
    /// The checked file.
    pub path: PathBuf,
    /// Node count of every tree.
    pub counts: Vec<(TreeName, usize)>,
    /// Problems recovered while loading.
    pub warnings: Vec<Diagnostic>,
}

impl CheckResult {
    fn new(path: PathBuf, local: &LocalConfig) -> Self {
        let counts = TreeName::ALL
            .into_iter()
            .map(|name| (name, count_nodes(local.configuration.tree(name))))
            .collect();

        Self {
            path,
            counts,
            warnings: local.diagnostics().to_vec(),
        }
    }
}

/// Executes the check command.
///
/// Loading is always strict, whatever `--lenient` says.
///
/// # Errors
///
/// Returns the first load error found.
pub fn execute(ctx: &CommandContext, sources: &InputSources) -> Result<()> {
    let path = sources.require_config_path()?.to_path_buf();
    let local = sources.load_local_with(LoadMode::Strict)?;
    let result = CheckResult::new(path, &local);

    if ctx.json_output {
        let output = format_check_json(&result)?;
        println!("{output}");
    } else if !ctx.quiet {
        print!("{}", format_check_table(&result, ctx.use_colors));
    }

    Ok(())
}
