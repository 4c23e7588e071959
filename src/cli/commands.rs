//! Command definitions for the Atomic Pomodoro CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::Mode;

// ============================================================================
// CLI Structure
// ============================================================================

/// Atomic Pomodoro - a minimal focus/break timer
#[derive(Parser, Debug)]
#[command(
    name = "atomic-pomodoro",
    version,
    about = "A minimal Pomodoro timer for the terminal",
    long_about = "A minimal Pomodoro timer that runs in the terminal.\n\
                  Alternate focus and break sessions, edit their lengths live, and\n\
                  get a desktop notification and an alarm when a session ends.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file to use instead of the one in the config directory
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Keep settings in memory only; nothing is read from or written to disk
    #[arg(long, global = true, conflicts_with = "store")]
    pub ephemeral: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Open the timer window (default)
    Run(RunArgs),

    /// Inspect or change the persisted settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Do not play the alarm when a session ends
    #[arg(long)]
    pub no_sound: bool,

    /// Do not post a desktop notification when a session ends
    #[arg(long)]
    pub no_notify: bool,

    /// Sound file to play when a session ends
    #[arg(long, value_name = "PATH")]
    pub alarm: Option<PathBuf>,
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,

    /// Set the duration of a mode
    Set {
        /// Mode to change (focus or break)
        mode: Mode,
        /// Whole minutes
        minute: u32,
        /// Additional seconds
        #[arg(default_value_t = 0)]
        seconds: u32,
    },

    /// Show or hide session progress on the taskbar
    Progress {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Restore the default settings
    Reset,
}

/// An on/off argument.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        self == Switch::On
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["atomic-pomodoro"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
            assert!(cli.store.is_none());
            assert!(!cli.ephemeral);
        }

        #[test]
        fn test_parse_short_verbose_flag() {
            let cli = Cli::parse_from(["atomic-pomodoro", "-v"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_global_store_after_subcommand() {
            let cli = Cli::parse_from(["atomic-pomodoro", "settings", "show", "--store", "/tmp/s.json"]);
            assert_eq!(cli.store, Some(PathBuf::from("/tmp/s.json")));
            assert!(matches!(
                cli.command,
                Some(Commands::Settings {
                    command: SettingsCommand::Show
                })
            ));
        }

        #[test]
        fn test_store_conflicts_with_ephemeral() {
            let result =
                Cli::try_parse_from(["atomic-pomodoro", "--ephemeral", "--store", "/tmp/s.json"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_completions_zsh() {
            let cli = Cli::parse_from(["atomic-pomodoro", "completions", "zsh"]);
            match cli.command {
                Some(Commands::Completions { shell }) => {
                    assert_eq!(shell, clap_complete::Shell::Zsh);
                }
                _ => panic!("Expected Completions command"),
            }
        }

        #[test]
        fn test_parse_unknown_command() {
            assert!(Cli::try_parse_from(["atomic-pomodoro", "unknown"]).is_err());
        }
    }

    // ------------------------------------------------------------------------
    // Run Command Tests
    // ------------------------------------------------------------------------

    mod run_args_tests {
        use super::*;

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["atomic-pomodoro", "run"]);
            match cli.command {
                Some(Commands::Run(args)) => {
                    assert!(!args.no_sound);
                    assert!(!args.no_notify);
                    assert!(args.alarm.is_none());
                }
                _ => panic!("Expected Run command"),
            }
        }

        #[test]
        fn test_parse_run_all_options() {
            let cli = Cli::parse_from([
                "atomic-pomodoro",
                "run",
                "--no-sound",
                "--no-notify",
                "--alarm",
                "/tmp/ring.ogg",
            ]);
            match cli.command {
                Some(Commands::Run(args)) => {
                    assert!(args.no_sound);
                    assert!(args.no_notify);
                    assert_eq!(args.alarm, Some(PathBuf::from("/tmp/ring.ogg")));
                }
                _ => panic!("Expected Run command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Settings Command Tests
    // ------------------------------------------------------------------------

    mod settings_command_tests {
        use super::*;

        fn settings(args: &[&str]) -> SettingsCommand {
            let mut argv = vec!["atomic-pomodoro", "settings"];
            argv.extend_from_slice(args);
            match Cli::parse_from(argv).command {
                Some(Commands::Settings { command }) => command,
                _ => panic!("Expected Settings command"),
            }
        }

        #[test]
        fn test_parse_set() {
            assert_eq!(
                settings(&["set", "break", "10", "30"]),
                SettingsCommand::Set {
                    mode: Mode::Break,
                    minute: 10,
                    seconds: 30
                }
            );
        }

        #[test]
        fn test_parse_set_seconds_default_to_zero() {
            assert_eq!(
                settings(&["set", "focus", "50"]),
                SettingsCommand::Set {
                    mode: Mode::Focus,
                    minute: 50,
                    seconds: 0
                }
            );
        }

        #[test]
        fn test_parse_progress() {
            assert_eq!(
                settings(&["progress", "on"]),
                SettingsCommand::Progress { state: Switch::On }
            );
            assert!(Switch::On.is_on());
            assert!(!Switch::Off.is_on());
        }

        #[test]
        fn test_parse_reset() {
            assert_eq!(settings(&["reset"]), SettingsCommand::Reset);
        }

        #[test]
        fn test_set_rejects_negative_and_unknown_mode() {
            assert!(Cli::try_parse_from(["atomic-pomodoro", "settings", "set", "focus", "-5"]).is_err());
            assert!(Cli::try_parse_from(["atomic-pomodoro", "settings", "set", "nap", "5"]).is_err());
        }
    }
}
