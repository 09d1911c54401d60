//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands are split by whether they read the local configuration and
//! state snapshot: settings and completions run without inputs, so they keep
//! working when the settings point at a missing file.

use crate::cli::{Cli, Commands, SettingsCommands, Shell};
use crate::commands::{self, CommandContext, CommandError, InputSources, Result};

/// Trait for commands that run without configuration inputs.
pub trait StandaloneCommand {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Trait for commands that read the local configuration and state.
pub trait InputCommand {
    /// Execute the command against the resolved input sources.
    fn execute(&self, ctx: &CommandContext, sources: &InputSources) -> Result<()>;
}

/// Commands that don't read configuration inputs.
pub enum StandaloneDispatch<'a> {
    Settings(&'a Option<SettingsCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> StandaloneDispatch<'a> {
    /// Try to create a standalone dispatch from the CLI command.
    /// Returns None if the command reads configuration inputs.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Settings { command }) => Some(Self::Settings(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl StandaloneCommand for StandaloneDispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Settings(command) => dispatch_settings(ctx, command),
            Self::Completions(shell) => commands::completions::execute(shell).map_err(CommandError::Io),
            Self::Help => {
                if !ctx.quiet {
                    println!("gnmenu - GeoNode menu inspector");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch settings subcommands.
fn dispatch_settings(ctx: &CommandContext, command: &Option<SettingsCommands>) -> Result<()> {
    match command {
        Some(SettingsCommands::Show) | None => commands::settings::execute_show(ctx),
        Some(SettingsCommands::Set { key, value }) => {
            let opts = commands::settings::SettingsSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::settings::execute_set(ctx, &opts)
        }
        Some(SettingsCommands::Path) => commands::settings::execute_path(ctx),
    }
}

/// Commands that read the local configuration and state.
pub enum InputDispatch<'a> {
    Project { tree: Option<crate::cli::TreeArg> },
    Filters,
    Check,
    Eval { condition: &'a str },
}

impl<'a> InputDispatch<'a> {
    /// Create an input dispatch from the CLI command.
    /// Returns None for standalone commands (use StandaloneDispatch first).
    pub fn from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Project { tree }) => Some(Self::Project { tree: *tree }),
            Some(Commands::Filters) => Some(Self::Filters),
            Some(Commands::Check) => Some(Self::Check),
            Some(Commands::Eval { condition }) => Some(Self::Eval { condition }),
            _ => None,
        }
    }
}

impl InputCommand for InputDispatch<'_> {
    fn execute(&self, ctx: &CommandContext, sources: &InputSources) -> Result<()> {
        match self {
            Self::Project { tree } => {
                let opts = commands::project::ProjectOptions {
                    tree: tree.map(Into::into),
                };
                commands::project::execute(ctx, &opts, sources)
            }
            Self::Filters => commands::filters::execute(ctx, sources),
            Self::Check => commands::check::execute(ctx, sources),
            Self::Eval { condition } => {
                let opts = commands::eval::EvalOptions {
                    condition: condition.to_string(),
                };
                commands::eval::execute(ctx, &opts, sources)
            }
        }
    }
}
