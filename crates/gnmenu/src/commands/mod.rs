//! Command implementations for the gnmenu CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod check;
pub mod completions;
pub mod eval;
pub mod filters;
pub mod project;
pub mod settings;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use geonode_menu_rs::menu::LoadMode;
use geonode_menu_rs::LocalConfig;
use serde_json::{Map, Value};

use crate::cli::Cli;
use settings::Settings;

/// Path that reads the state from stdin.
const STDIN_PATH: &str = "-";

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Local configuration could not be loaded.
    #[error("load error: {0}")]
    Load(#[from] geonode_menu_rs::ConfigError),

    /// Condition parsing error.
    #[error("condition error: {0}")]
    Condition(#[from] geonode_menu_rs::expression::ExpressionError),

    /// Settings or input selection error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color,
            quiet: cli.quiet,
        }
    }

    /// Applies settings the command line left unspecified.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        if settings.output.color == Some(false) {
            self.use_colors = false;
        }
        self
    }
}

/// Where the local configuration and state snapshot come from.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSources {
    /// Local configuration file.
    pub config_path: Option<PathBuf>,
    /// State snapshot file, or `-` for stdin.
    pub state_path: Option<PathBuf>,
    /// How unsupported shapes are handled.
    pub mode: LoadMode,
}

impl InputSources {
    /// Resolves the inputs with priority: flag > settings.
    pub fn resolve(cli: &Cli, settings: &Settings) -> Self {
        let mode = if cli.lenient || settings.load.lenient == Some(true) {
            LoadMode::Lenient
        } else {
            LoadMode::Strict
        };

        Self {
            config_path: cli.config.clone().or_else(|| settings.config.clone()),
            state_path: cli.state.clone().or_else(|| settings.state.clone()),
            mode,
        }
    }

    /// Returns the local configuration path, failing if none was given.
    pub fn require_config_path(&self) -> Result<&Path> {
        self.config_path.as_deref().ok_or_else(|| {
            CommandError::Config(
                "No local configuration given. Pass --config or run 'gnmenu settings set config <path>'"
                    .to_string(),
            )
        })
    }

    /// Loads the local configuration in the resolved mode.
    pub fn load_local(&self) -> Result<LocalConfig> {
        self.load_local_with(self.mode)
    }

    /// Loads the local configuration in the given mode.
    pub fn load_local_with(&self, mode: LoadMode) -> Result<LocalConfig> {
        let path = self.require_config_path()?;
        tracing::debug!(path = %path.display(), ?mode, "loading local configuration");
        let content = fs::read_to_string(path)?;
        Ok(LocalConfig::from_json_str(&content, mode)?)
    }

    /// Loads the local configuration, or the default one when no path is
    /// given.
    pub fn load_local_or_default(&self) -> Result<LocalConfig> {
        if self.config_path.is_some() {
            return self.load_local();
        }
        Ok(LocalConfig::from_value(&Value::Object(Map::new()), self.mode)?)
    }

    /// Loads the state snapshot. No path means an empty state.
    pub fn load_state(&self) -> Result<Value> {
        let Some(path) = &self.state_path else {
            return Ok(Value::Object(Map::new()));
        };

        let content = if path.as_os_str() == STDIN_PATH {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        } else {
            fs::read_to_string(path)?
        };

        let state: Value = serde_json::from_str(&content)?;
        if !state.is_object() {
            return Err(CommandError::Config(format!(
                "State snapshot must be a JSON object: {}",
                path.display()
            )));
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("gnmenu").chain(args.iter().copied()))
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = Settings {
            config: Some(PathBuf::from("/settings/local.json")),
            state: Some(PathBuf::from("/settings/state.json")),
            ..Settings::default()
        };

        let sources = InputSources::resolve(&cli(&["--config", "/flag/local.json", "check"]), &settings);
        assert_eq!(sources.config_path, Some(PathBuf::from("/flag/local.json")));
        assert_eq!(sources.state_path, Some(PathBuf::from("/settings/state.json")));
        assert_eq!(sources.mode, LoadMode::Strict);
    }

    #[test]
    fn test_lenient_from_settings() {
        let mut settings = Settings::default();
        settings.load.lenient = Some(true);

        let sources = InputSources::resolve(&cli(&["check"]), &settings);
        assert_eq!(sources.mode, LoadMode::Lenient);
    }

    #[test]
    fn test_missing_config_is_error() {
        let sources = InputSources {
            config_path: None,
            state_path: None,
            mode: LoadMode::Strict,
        };
        assert!(matches!(sources.load_local(), Err(CommandError::Config(_))));
        assert!(sources.load_local_or_default().is_ok());
        assert_eq!(sources.load_state().unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_load_files() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("local.json");
        let state_path = dir.path().join("state.json");
        fs::write(&config_path, r#"{"geoNodeConfiguration": {"navbar": {"items": []}}}"#).unwrap();
        fs::write(&state_path, r#"{"security": {"user": {"name": "a"}}}"#).unwrap();

        let sources = InputSources {
            config_path: Some(config_path),
            state_path: Some(state_path),
            mode: LoadMode::Strict,
        };
        assert!(sources.load_local().is_ok());
        assert_eq!(sources.load_state().unwrap()["security"]["user"]["name"], "a");
    }

    #[test]
    fn test_state_must_be_object() {
        let dir = TempDir::new().unwrap();
        let state_path = dir.path().join("state.json");
        fs::write(&state_path, "[1, 2]").unwrap();

        let sources = InputSources {
            config_path: None,
            state_path: Some(state_path),
            mode: LoadMode::Strict,
        };
        assert!(matches!(sources.load_state(), Err(CommandError::Config(_))));
    }
}
