//! CLI module for Atomic Pomodoro.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting for the terminal window

pub mod commands;
pub mod display;

pub use commands::{Cli, Commands, RunArgs, SettingsCommand, Switch};
pub use display::Display;
