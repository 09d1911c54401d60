use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::settings::load_settings;
use commands::{CommandContext, CommandError, InputSources};
use dispatch::{InputCommand, InputDispatch, StandaloneCommand, StandaloneDispatch};

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

fn run(cli: &Cli) -> commands::Result<()> {
    let ctx = CommandContext::from_cli(cli);

    // Settings and completions must work even with broken settings
    if let Some(dispatch) = StandaloneDispatch::try_from_cli(cli) {
        return dispatch.execute(&ctx);
    }

    let settings = load_settings()?;
    let ctx = ctx.with_settings(&settings);
    let sources = InputSources::resolve(cli, &settings);
    tracing::debug!(?sources, "resolved inputs");

    match InputDispatch::from_cli(cli) {
        Some(dispatch) => dispatch.execute(&ctx, &sources),
        None => Err(CommandError::Config(format!("unsupported command: {:?}", cli.command))),
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise `--verbose` shows debug events and `--quiet`
/// shows only errors.
fn setup_tracing(cli: &Cli) {
    use tracing_subscriber::EnvFilter;

    let default_level = if cli.verbose {
        "geonode_menu_rs=debug,gnmenu=debug,warn"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed by an embedding test harness
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .try_init()
        .ok();
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Load(_) => "LOAD_ERROR",
        CommandError::Condition(_) => "CONDITION_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    match e {
        CommandError::Config(_) => ExitCode::from(5),
        CommandError::Load(_) => ExitCode::from(1),
        CommandError::Condition(_) => ExitCode::from(1),
        CommandError::Io(_) => ExitCode::from(3),
        CommandError::Json(_) => ExitCode::from(1),
    }
}
