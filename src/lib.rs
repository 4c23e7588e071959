//! Atomic Pomodoro Library
//!
//! This library provides the core functionality for the Atomic Pomodoro timer.
//! It includes:
//! - Timer state machine for focus and break sessions
//! - Persisted key-value settings store
//! - Settings panel with live edits
//! - Host shell messaging and taskbar progress
//! - Desktop notifications and alarm playback
//! - CLI command parsing, display utilities and the window event loop

pub mod app;
pub mod cli;
pub mod host;
pub mod notification;
pub mod settings;
pub mod sound;
pub mod store;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    construct_ms, format_clock, DurationField, Mode, ModeTime, ProgressReport, RunState,
    SessionConfig, TimerState,
};

pub use timer::{
    IntervalScheduler, ManualScheduler, TickHandle, TickScheduler, TickToken, TimerError,
    TimerEvent, TimerMachine,
};

pub use store::{JsonFileStore, KeyValueStore, MemoryStore, SettingsStore, StoreError, StoreExt};

pub use settings::{SettingsEdit, SettingsError, SettingsPanel};

pub use host::{AppInfo, BusSender, HostMessage, LocalBus, MessageBus, Subscription, TerminalHost, Topic};

pub use notification::{DesktopNotifier, MockNotifier, NotificationContent, NotificationError, Notifier};

pub use sound::{AlarmSound, MockSoundPlayer, RodioSoundPlayer, SoundError, SoundPlayer};

pub use app::{App, Flow, UiCommand};
