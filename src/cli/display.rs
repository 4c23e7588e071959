//! Display utilities for the Atomic Pomodoro window.
//!
//! This module renders:
//! - The countdown status line
//! - The settings panel
//! - Completion and error messages
//! - Help text

use crate::host::AppInfo;
use crate::settings::SettingsPanel;
use crate::types::{Mode, RunState, SessionConfig, TimerState};

/// Clears the current terminal line and returns the cursor to column 0.
pub const CLEAR_LINE: &str = "\r\x1b[2K";

/// Keyboard help shown by `h`.
pub const HELP_TEXT: &str = "\
Commands
  s, start                          start a session
  p, pause                          pause the countdown
  r, resume                         resume the countdown
  x, restart                        abandon the session
  m, mode [focus|break]             switch mode while idle
  o, settings                       open the settings panel
  c, close                          close the settings panel
  set <focus|break> <minute|seconds> <value>
                                    change a duration
  progress <on|off>                 show progress on the taskbar
  h, help                           show this help
  q, quit                           quit
  <enter>                           start, pause or resume";

// ============================================================================
// Display
// ============================================================================

/// Display utilities for the terminal window.
pub struct Display;

impl Display {
    /// Window title line.
    pub fn header(info: Option<&AppInfo>) -> String {
        match info {
            Some(info) => format!("Atomic Pomodoro v{} ({})", info.version, info.platform),
            None => "Atomic Pomodoro".to_string(),
        }
    }

    /// The countdown with the actions available in the current state.
    pub fn status_line(state: &TimerState) -> String {
        let hint = match state.run_state {
            RunState::Idle => format!("[s]tart · [m] {}", Self::switch_hint(state.mode)),
            RunState::Running => "[p]ause · [x] restart".to_string(),
            RunState::Paused => "paused · [r]esume · [x] restart".to_string(),
        };
        format!("{}  {}  {}", state.mode.label(), state.display_time(), hint)
    }

    /// Label for the mode-switch affordance.
    pub fn switch_hint(mode: Mode) -> &'static str {
        match mode {
            Mode::Focus => "or start break",
            Mode::Break => "or start focusing",
        }
    }

    /// The settings panel.
    pub fn settings_panel(panel: &SettingsPanel) -> String {
        let config = panel.working_config();
        let mut out = String::from("Settings\n");
        for mode in [Mode::Focus, Mode::Break] {
            let time = config.get(mode);
            let lock = if panel.is_input_enabled(mode) {
                ""
            } else {
                "  (locked while running)"
            };
            out.push_str(&format!(
                "  {:<6} minute {:>3}  seconds {:>2}{}\n",
                Self::mode_name(mode),
                time.minute,
                time.seconds,
                lock
            ));
        }
        out.push_str(&format!(
            "  Progress in taskbar: {}",
            on_off(panel.progress_in_taskbar())
        ));
        out
    }

    /// Stored settings as printed by `settings show`.
    pub fn settings_summary(config: &SessionConfig, progress_in_taskbar: bool) -> String {
        format!(
            "focus     {}\nbreak     {}\nprogress  {}",
            config.focus,
            config.break_time,
            on_off(progress_in_taskbar)
        )
    }

    /// Message printed when a session runs out.
    pub fn session_finished(finished: Mode, next: Mode) -> String {
        format!(
            "{} finished. Next up: {}.",
            Self::mode_name(finished),
            Self::mode_name(next).to_lowercase()
        )
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }

    fn mode_name(mode: Mode) -> &'static str {
        match mode {
            Mode::Focus => "Focus",
            Mode::Break => "Break",
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

// ============================================================================
// Tests
// ============================================================================
