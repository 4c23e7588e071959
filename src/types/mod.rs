//! Core data types for Atomic Pomodoro.
//!
//! This module defines the data structures used for:
//! - Session modes and run states
//! - Configured session durations (persisted in the settings store)
//! - The live timer state driven by the state machine
//! - Taskbar progress reports

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Milliseconds in one second.
pub const MS_PER_SECOND: u64 = 1_000;

/// Milliseconds in one minute.
pub const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;

/// Default focus session length in minutes.
pub const DEFAULT_FOCUS_MINUTES: u32 = 25;

/// Default break session length in minutes.
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

// ============================================================================
// Mode
// ============================================================================

/// Which kind of session the countdown is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Focused work
    #[default]
    Focus,
    /// Rest between focus sessions
    Break,
}

impl Mode {
    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::Break => "break",
        }
    }

    /// Returns the mode that follows this one when a session completes.
    pub fn other(self) -> Self {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }

    /// Label shown under the countdown.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Focus => "✍️ Focus",
            Mode::Break => "🏖️ Break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" | "f" => Ok(Mode::Focus),
            "break" | "b" => Ok(Mode::Break),
            other => Err(format!("unknown mode '{other}' (expected focus or break)")),
        }
    }
}

// ============================================================================
// RunState
// ============================================================================

/// Whether the countdown is ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No session in progress
    #[default]
    Idle,
    /// Counting down
    Running,
    /// Session in progress, countdown halted
    Paused,
}

impl RunState {
    /// Returns the string representation of the run state.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
        }
    }

    /// Returns true if a session has been started and not yet finished.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, RunState::Running | RunState::Paused)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ModeTime
// ============================================================================

/// A configured session length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModeTime {
    /// Whole minutes
    pub minute: u32,
    /// Additional seconds
    pub seconds: u32,
}

impl ModeTime {
    /// Creates a duration from minutes and seconds.
    pub const fn new(minute: u32, seconds: u32) -> Self {
        Self { minute, seconds }
    }

    /// Converts the duration to milliseconds.
    pub fn as_ms(&self) -> u64 {
        construct_ms(*self)
    }

    /// Returns a copy with one field replaced.
    pub fn with_field(mut self, field: DurationField, value: u32) -> Self {
        match field {
            DurationField::Minute => self.minute = value,
            DurationField::Seconds => self.seconds = value,
        }
        self
    }
}

impl fmt::Display for ModeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minute, self.seconds)
    }
}

/// Converts a duration to milliseconds: `minute * 60000 + seconds * 1000`.
pub fn construct_ms(time: ModeTime) -> u64 {
    u64::from(time.minute) * MS_PER_MINUTE + u64::from(time.seconds) * MS_PER_SECOND
}

// ============================================================================
// DurationField
// ============================================================================

/// Which half of a [`ModeTime`] an edit touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationField {
    /// The minute component
    Minute,
    /// The seconds component
    Seconds,
}

impl DurationField {
    /// Returns the string representation of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationField::Minute => "minute",
            DurationField::Seconds => "seconds",
        }
    }
}

impl fmt::Display for DurationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" | "minutes" | "min" | "m" => Ok(DurationField::Minute),
            "seconds" | "second" | "sec" | "s" => Ok(DurationField::Seconds),
            other => Err(format!("unknown field '{other}' (expected minute or seconds)")),
        }
    }
}

// ============================================================================
// SessionConfig
// ============================================================================

/// Configured durations for both modes, stored under the `TIME` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Focus session length
    pub focus: ModeTime,
    /// Break session length
    #[serde(rename = "break")]
    pub break_time: ModeTime,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            focus: ModeTime::new(DEFAULT_FOCUS_MINUTES, 0),
            break_time: ModeTime::new(DEFAULT_BREAK_MINUTES, 0),
        }
    }
}

impl SessionConfig {
    /// Returns the configured duration for a mode.
    pub fn get(&self, mode: Mode) -> ModeTime {
        match mode {
            Mode::Focus => self.focus,
            Mode::Break => self.break_time,
        }
    }

    /// Replaces the configured duration for a mode.
    pub fn set(&mut self, mode: Mode, time: ModeTime) {
        match mode {
            Mode::Focus => self.focus = time,
            Mode::Break => self.break_time = time,
        }
    }

    /// Returns a copy with a single field of one mode replaced.
    pub fn with_edit(mut self, mode: Mode, field: DurationField, value: u32) -> Self {
        let edited = self.get(mode).with_field(field, value);
        self.set(mode, edited);
        self
    }

    /// Returns the configured duration for a mode in milliseconds.
    pub fn duration_ms(&self, mode: Mode) -> u64 {
        self.get(mode).as_ms()
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Live state of the countdown. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Active mode
    pub mode: Mode,
    /// Whether the countdown is ticking
    pub run_state: RunState,
    /// Milliseconds left in the session (or the previewed duration while idle)
    pub remaining_ms: u64,
    /// Length of the in-flight session; 0 while idle
    pub total_ms: u64,
}

impl TimerState {
    /// Creates an idle focus state showing the configured focus duration.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            mode: Mode::Focus,
            run_state: RunState::Idle,
            remaining_ms: config.duration_ms(Mode::Focus),
            total_ms: 0,
        }
    }

    /// Returns true if the countdown is ticking.
    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Returns true if the session is paused.
    pub fn is_paused(&self) -> bool {
        self.run_state == RunState::Paused
    }

    /// Returns true if no session is in progress.
    pub fn is_idle(&self) -> bool {
        self.run_state == RunState::Idle
    }

    /// Milliseconds elapsed in the in-flight session.
    pub fn elapsed_ms(&self) -> u64 {
        self.total_ms.saturating_sub(self.remaining_ms)
    }

    /// The `mm:ss` text shown in the window.
    pub fn display_time(&self) -> String {
        format_clock(self.remaining_ms)
    }
}

/// Formats milliseconds as `mm:ss`, reading the value as a clock offset from
/// zero: the minute field wraps at 60 like a wall clock.
pub fn format_clock(ms: u64) -> String {
    let total_seconds = ms / MS_PER_SECOND;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

// ============================================================================
// ProgressReport
// ============================================================================

/// A value for the host's taskbar progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum ProgressReport {
    /// Completion fraction in `[0, 1]`
    Fraction(f64),
    /// Remove the indicator (`-1` on the wire)
    Clear,
}

impl ProgressReport {
    /// Wire value of the clear sentinel.
    pub const CLEAR_VALUE: f64 = -1.0;

    /// Builds a fraction report from elapsed and total time, clamped to `[0, 1]`.
    ///
    /// A zero total reports full completion.
    pub fn from_elapsed(elapsed_ms: u64, total_ms: u64) -> Self {
        if total_ms == 0 {
            return ProgressReport::Fraction(1.0);
        }
        let fraction = elapsed_ms as f64 / total_ms as f64;
        ProgressReport::Fraction(fraction.clamp(0.0, 1.0))
    }

    /// Returns the value sent on `set-taskbar-progress`.
    pub fn as_wire(&self) -> f64 {
        match self {
            ProgressReport::Fraction(f) => *f,
            ProgressReport::Clear => Self::CLEAR_VALUE,
        }
    }
}

impl From<f64> for ProgressReport {
    fn from(value: f64) -> Self {
        if value < 0.0 || value.is_nan() {
            ProgressReport::Clear
        } else {
            ProgressReport::Fraction(value.min(1.0))
        }
    }
}

impl From<ProgressReport> for f64 {
    fn from(report: ProgressReport) -> Self {
        report.as_wire()
    }
}

// ============================================================================
// Tests
// ============================================================================
