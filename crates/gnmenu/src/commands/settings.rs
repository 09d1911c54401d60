//! Settings command implementation.
//!
//! View and manage gnmenu settings.
//! Settings file is located at ~/.config/gnmenu/settings.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandError, Result};

/// Current settings file version. Increment when making breaking changes to schema.
const SETTINGS_VERSION: u32 = 1;

/// Environment variable overriding the settings file path.
const SETTINGS_ENV: &str = "GNMENU_SETTINGS";

/// Settings file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Settings schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Default local configuration file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<PathBuf>,

    /// Default state snapshot file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PathBuf>,

    /// Loading settings.
    #[serde(default)]
    pub load: LoadSettings,

    /// Output settings.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Returns the current settings version (used by serde default).
fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            config: None,
            state: None,
            load: LoadSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

/// Loading settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadSettings {
    /// Keep unsupported conditions instead of rejecting the configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lenient: Option<bool>,
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Gets the settings file path.
///
/// Uses XDG-style paths: ~/.config/gnmenu/settings.toml on all platforms.
pub fn get_settings_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(SETTINGS_ENV) {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("gnmenu").join("settings.toml"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("gnmenu").join("settings.toml"))
        .ok_or_else(|| CommandError::Config("Could not determine settings directory".to_string()))
}

/// Loads the settings from disk.
pub fn load_settings() -> Result<Settings> {
    let path = get_settings_path()?;

    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read settings: {}", e)))?;

    let settings: Settings = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse settings: {}", e)))?;

    migrate_settings(settings)
}

/// Migrates settings to the current version.
fn migrate_settings(mut settings: Settings) -> Result<Settings> {
    if settings.version > SETTINGS_VERSION {
        return Err(CommandError::Config(format!(
            "Settings version {} is newer than supported version {}",
            settings.version, SETTINGS_VERSION
        )));
    }
    settings.version = SETTINGS_VERSION;
    Ok(settings)
}

/// Saves the settings to disk.
fn save_settings(settings: &Settings) -> Result<PathBuf> {
    let path = get_settings_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CommandError::Config(format!("Failed to create settings directory: {}", e)))?;
    }

    let content = toml::to_string_pretty(settings)
        .map_err(|e| CommandError::Config(format!("Failed to serialize settings: {}", e)))?;

    fs::write(&path, content)
        .map_err(|e| CommandError::Config(format!("Failed to write settings: {}", e)))?;

    Ok(path)
}

/// Executes the settings show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let settings = load_settings()?;
    let path = get_settings_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "settings": settings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Settings";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if path.exists() {
            if let Some(ref config) = settings.config {
                println!("  config: {}", config.display());
            }
            if let Some(ref state) = settings.state {
                println!("  state: {}", state.display());
            }

            println!("\n[load]");
            if let Some(lenient) = settings.load.lenient {
                println!("  lenient: {}", lenient);
            }

            println!("\n[output]");
            if let Some(color) = settings.output.color {
                println!("  color: {}", color);
            }
        } else {
            println!("(No settings file exists. Run 'gnmenu settings set <key> <value>' to create one.)");
        }
    }

    Ok(())
}

/// Options for the settings set command.
pub struct SettingsSetOptions {
    /// Settings key.
    pub key: String,
    /// Settings value.
    pub value: String,
}

/// Applies one `key = value` assignment to the settings.
fn apply_setting(settings: &mut Settings, opts: &SettingsSetOptions) -> Result<()> {
    match opts.key.as_str() {
        "config" => settings.config = Some(PathBuf::from(&opts.value)),
        "state" => settings.state = Some(PathBuf::from(&opts.value)),
        "load.lenient" => settings.load.lenient = Some(parse_bool(&opts.value)?),
        "output.color" => settings.output.color = Some(parse_bool(&opts.value)?),
        _ => {
            return Err(CommandError::Config(format!(
                "Unknown settings key '{}'. Valid keys: config, state, load.lenient, output.color",
                opts.key
            )));
        }
    }
    Ok(())
}

/// Executes the settings set command.
pub fn execute_set(ctx: &CommandContext, opts: &SettingsSetOptions) -> Result<()> {
    let mut settings = load_settings()?;
    apply_setting(&mut settings, opts)?;
    let path = save_settings(&settings)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "key": opts.key,
            "value": opts.value,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Set {} = {}", opts.key, opts.value);
    }

    Ok(())
}

/// Executes the settings path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_settings_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Parses a boolean value from a string.
fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CommandError::Config(format!(
            "Invalid boolean value '{}'. Use true/false, yes/no, 1/0, or on/off",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn opts(key: &str, value: &str) -> SettingsSetOptions {
        SettingsSetOptions {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert!(settings.config.is_none());
        assert!(settings.load.lenient.is_none());
    }

    #[test]
    fn test_parse_settings_toml() {
        let settings: Settings = toml::from_str(
            r#"
config = "/srv/geonode/localConfig.json"

[load]
lenient = true
"#,
        )
        .unwrap();

        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.config, Some(PathBuf::from("/srv/geonode/localConfig.json")));
        assert_eq!(settings.load.lenient, Some(true));
        assert!(settings.output.color.is_none());
    }

    #[test]
    fn test_migrate_rejects_future_version() {
        let settings = Settings {
            version: SETTINGS_VERSION + 1,
            ..Settings::default()
        };
        assert!(migrate_settings(settings).is_err());
    }

    #[test]
    fn test_apply_setting() {
        let mut settings = Settings::default();
        apply_setting(&mut settings, &opts("config", "local.json")).unwrap();
        apply_setting(&mut settings, &opts("load.lenient", "yes")).unwrap();
        apply_setting(&mut settings, &opts("output.color", "off")).unwrap();

        assert_eq!(settings.config, Some(PathBuf::from("local.json")));
        assert_eq!(settings.load.lenient, Some(true));
        assert_eq!(settings.output.color, Some(false));
    }

    #[test]
    fn test_apply_setting_rejects_unknown_key() {
        let mut settings = Settings::default();
        let err = apply_setting(&mut settings, &opts("token", "x")).unwrap_err();
        assert!(err.to_string().contains("Unknown settings key"));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    #[serial]
    fn test_settings_path_env_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        env::set_var(SETTINGS_ENV, &path);

        assert_eq!(get_settings_path().unwrap(), path);

        env::remove_var(SETTINGS_ENV);
    }

    #[test]
    #[serial]
    fn test_settings_path_xdg() {
        let dir = TempDir::new().unwrap();
        env::remove_var(SETTINGS_ENV);
        env::set_var("XDG_CONFIG_HOME", dir.path());

        assert_eq!(
            get_settings_path().unwrap(),
            dir.path().join("gnmenu").join("settings.toml")
        );

        env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    #[serial]
    fn test_save_and_load_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        env::set_var(SETTINGS_ENV, &path);

        assert_eq!(load_settings().unwrap(), Settings::default());

        let mut settings = Settings::default();
        apply_setting(&mut settings, &opts("state", "state.json")).unwrap();
        assert_eq!(save_settings(&settings).unwrap(), path);
        assert_eq!(load_settings().unwrap(), settings);

        env::remove_var(SETTINGS_ENV);
    }
}
