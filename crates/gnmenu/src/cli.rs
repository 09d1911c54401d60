//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the gnmenu CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use geonode_menu_rs::TreeName;

/// gnmenu - Inspect GeoNode menu configurations
#[derive(Parser, Debug)]
#[command(name = "gnmenu")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Local configuration file (default: from settings)
    #[arg(short, long, global = true, env = "GNMENU_CONFIG")]
    pub config: Option<PathBuf>,

    /// Application state snapshot as JSON, "-" for stdin (default: empty state)
    #[arg(short, long, global = true, env = "GNMENU_STATE")]
    pub state: Option<PathBuf>,

    /// Keep unsupported conditions instead of rejecting the configuration
    #[arg(long, global = true)]
    pub lenient: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the menu items allowed for the session
    #[command(alias = "p")]
    Project {
        /// Only show one menu tree
        #[arg(short, long, value_enum)]
        tree: Option<TreeArg>,
    },

    /// Show the custom search filters from the main menu and filter form
    #[command(alias = "f")]
    Filters,

    /// Validate the local configuration
    Check,

    /// Evaluate one condition against the state
    Eval {
        /// Condition as JSON (a bare word is read as a state path)
        condition: String,
    },

    /// View or modify settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Menu trees selectable with `--tree`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeArg {
    MenuLeft,
    MenuRight,
    Navbar,
    CardsMenu,
    Footer,
    CardOptions,
    FiltersForm,
}

impl From<TreeArg> for TreeName {
    fn from(arg: TreeArg) -> Self {
        match arg {
            TreeArg::MenuLeft => TreeName::MenuLeft,
            TreeArg::MenuRight => TreeName::MenuRight,
            TreeArg::Navbar => TreeName::Navbar,
            TreeArg::CardsMenu => TreeName::CardsMenu,
            TreeArg::Footer => TreeName::Footer,
            TreeArg::CardOptions => TreeName::CardOptions,
            TreeArg::FiltersForm => TreeName::FiltersForm,
        }
    }
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Set a settings value
    Set {
        /// Settings key
        key: String,

        /// Settings value
        value: String,
    },

    /// Print settings file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::parse_from(["gnmenu"]);
        assert!(cli.command.is_none());
        assert!(!cli.lenient);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "gnmenu",
            "project",
            "--json",
            "--no-color",
            "--lenient",
            "--config",
            "local.json",
            "--state",
            "state.json",
        ]);
        assert!(cli.json);
        assert!(cli.no_color);
        assert!(cli.lenient);
        assert_eq!(cli.config, Some(PathBuf::from("local.json")));
        assert_eq!(cli.state, Some(PathBuf::from("state.json")));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["gnmenu", "-q", "-v", "check"]).is_err());
    }

    #[test]
    fn test_project_tree() {
        let cli = Cli::parse_from(["gnmenu", "project", "--tree", "cards-menu"]);
        if let Some(Commands::Project { tree }) = cli.command {
            assert_eq!(tree, Some(TreeArg::CardsMenu));
            assert_eq!(TreeName::from(TreeArg::CardsMenu), TreeName::CardsMenu);
        } else {
            panic!("Expected Project command");
        }
    }

    #[test]
    fn test_project_alias() {
        let cli = Cli::parse_from(["gnmenu", "p"]);
        assert!(matches!(cli.command, Some(Commands::Project { tree: None })));
    }

    #[test]
    fn test_tree_arg_names_match_library() {
        for arg in TreeArg::value_variants() {
            let name = arg.to_possible_value().unwrap();
            assert_eq!(name.get_name(), TreeName::from(*arg).as_str());
        }
    }

    #[test]
    fn test_eval() {
        let cli = Cli::parse_from(["gnmenu", "eval", r#"{"op":"not","arg":"user"}"#]);
        if let Some(Commands::Eval { condition }) = cli.command {
            assert_eq!(condition, r#"{"op":"not","arg":"user"}"#);
        } else {
            panic!("Expected Eval command");
        }
    }

    #[test]
    fn test_settings_set() {
        let cli = Cli::parse_from(["gnmenu", "settings", "set", "load.lenient", "true"]);
        if let Some(Commands::Settings {
            command: Some(SettingsCommands::Set { key, value }),
        }) = cli.command
        {
            assert_eq!(key, "load.lenient");
            assert_eq!(value, "true");
        } else {
            panic!("Expected Settings Set command");
        }
    }

    #[test]
    fn test_completions() {
        let cli = Cli::parse_from(["gnmenu", "completions", "zsh"]);
        if let Some(Commands::Completions { shell }) = cli.command {
            assert!(matches!(shell, Shell::Zsh));
        } else {
            panic!("Expected Completions command");
        }
    }
}
