//! Atomic Pomodoro - a minimal focus/break timer for the terminal
//!
//! Alternate focus and break sessions:
//! - 25 minutes of focused work
//! - 5 minutes of break
//! - Lengths editable live from the settings panel

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::io::BufReader;
use tokio::sync::mpsc;

use atomic_pomodoro::cli::{Cli, Commands, Display, RunArgs, SettingsCommand};
use atomic_pomodoro::notification::DesktopNotifier;
use atomic_pomodoro::sound::{try_create_player, AlarmSound};
use atomic_pomodoro::store::{JsonFileStore, SettingsStore};
use atomic_pomodoro::timer::IntervalScheduler;
use atomic_pomodoro::types::ModeTime;
use atomic_pomodoro::{App, LocalBus};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    let code = match execute(cli).await {
        Ok(()) => 0,
        Err(e) => {
            Display::show_error(&format!("{e:#}"));
            1
        }
    };

    // The stdin reader thread cannot be cancelled; exit without waiting on it.
    std::process::exit(code);
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("verbose mode enabled");
    }

    match cli.command.clone() {
        Some(Commands::Run(args)) => run_window(&cli, args).await,
        None => run_window(&cli, RunArgs::default()).await,
        Some(Commands::Settings { command }) => run_settings(&cli, command),
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            Ok(())
        }
    }
}

/// Opens the settings store selected on the command line and seeds defaults.
fn open_settings(cli: &Cli) -> Result<SettingsStore> {
    let settings = if cli.ephemeral {
        SettingsStore::in_memory()
    } else {
        let path = match &cli.store {
            Some(path) => path.clone(),
            None => JsonFileStore::default_path()?,
        };
        tracing::debug!(path = %path.display(), "opening settings");
        SettingsStore::open_file(path)?
    };
    settings.seed_defaults().context("failed to write default settings")?;
    Ok(settings)
}

/// Opens the interactive timer window.
async fn run_window(cli: &Cli, args: RunArgs) -> Result<()> {
    let settings = open_settings(cli)?;

    let bus = LocalBus::new();
    let notifier = DesktopNotifier::new(bus.sender());
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();

    let mut app = App::new(
        settings,
        Box::new(IntervalScheduler::new(tick_tx)),
        bus,
        Box::new(std::io::stdout()),
        Box::new(std::io::stdout()),
    )?;

    if !args.no_notify {
        app = app.with_notifier(Box::new(notifier));
    }
    if !args.no_sound {
        if let Some(player) = try_create_player() {
            let alarm = AlarmSound::resolve(args.alarm.as_deref());
            tracing::debug!(alarm = %alarm.name(), "alarm selected");
            app = app.with_player(Box::new(player), alarm);
        }
    }

    app.run(BufReader::new(tokio::io::stdin()), tick_rx).await
}

/// Executes a `settings` subcommand.
fn run_settings(cli: &Cli, command: SettingsCommand) -> Result<()> {
    let settings = open_settings(cli)?;

    match command {
        SettingsCommand::Show => {}
        SettingsCommand::Set {
            mode,
            minute,
            seconds,
        } => {
            let mut config = settings.session_config()?;
            config.set(mode, ModeTime::new(minute, seconds));
            settings.set_session_config(&config)?;
        }
        SettingsCommand::Progress { state } => {
            settings.set_progress_in_taskbar(state.is_on())?;
        }
        SettingsCommand::Reset => {
            settings.reset()?;
        }
    }

    println!(
        "{}",
        Display::settings_summary(&settings.session_config()?, settings.progress_in_taskbar()?)
    );
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args_runs_window() {
        let cli = Cli::parse_from(["atomic-pomodoro"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_open_settings_ephemeral_seeds_defaults() {
        let cli = Cli::parse_from(["atomic-pomodoro", "--ephemeral"]);
        let settings = open_settings(&cli).unwrap();
        assert_eq!(
            settings.session_config().unwrap(),
            atomic_pomodoro::SessionConfig::default()
        );
    }

    #[test]
    fn test_open_settings_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("window-state-main.json");
        let cli = Cli::parse_from([
            "atomic-pomodoro",
            "--store",
            path.to_str().unwrap(),
        ]);
        open_settings(&cli).unwrap();
        assert!(path.exists());
    }
}
