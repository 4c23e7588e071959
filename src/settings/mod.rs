//! Settings panel: live editing of session durations and the taskbar flag.
//!
//! The panel keeps a working copy of the persisted settings. Each edit is
//! written to the store straight away and handed back as a [`SettingsEdit`]
//! so the caller can forward it to the timer; there is no separate "save"
//! step and closing the panel only hides it.

use thiserror::Error;
use tracing::{debug, info};

use crate::store::{SettingsStore, StoreError};
use crate::types::{DurationField, Mode, SessionConfig, TimerState};

// ============================================================================
// SettingsEdit
// ============================================================================

/// An applied settings change, as seen by the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEdit {
    /// A duration field changed.
    Duration {
        /// Mode whose duration was edited
        mode: Mode,
        /// Which field changed
        field: DurationField,
        /// The full config after the edit
        new_config: SessionConfig,
    },
    /// The taskbar progress checkbox changed.
    ProgressInTaskbar {
        /// New flag value
        enabled: bool,
    },
}

// ============================================================================
// SettingsError
// ============================================================================

/// Errors raised by the settings panel.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Duration inputs for the active mode are read-only during a session.
    #[error("{mode} duration cannot be changed while a {mode} session is in progress")]
    Locked { mode: Mode },

    /// The entered value is not a non-negative whole number.
    #[error("invalid value '{value}': expected a whole number of 0 or more")]
    InvalidValue { value: String },

    /// Persisting the edit failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SettingsPanel
// ============================================================================

/// Editable view over the persisted settings.
#[derive(Debug)]
pub struct SettingsPanel {
    settings: SettingsStore,
    working: SessionConfig,
    progress_in_taskbar: bool,
    open: bool,
    locked_mode: Option<Mode>,
}

impl SettingsPanel {
    /// Creates a closed panel seeded from the store.
    pub fn new(settings: SettingsStore) -> Result<Self, SettingsError> {
        let working = settings.session_config()?;
        let progress_in_taskbar = settings.progress_in_taskbar()?;
        Ok(Self {
            settings,
            working,
            progress_in_taskbar,
            open: false,
            locked_mode: None,
        })
    }

    /// Shows the panel, refreshing the working copy from the store.
    pub fn open(&mut self) -> Result<(), SettingsError> {
        self.working = self.settings.session_config()?;
        self.progress_in_taskbar = self.settings.progress_in_taskbar()?;
        self.open = true;
        debug!("settings panel opened");
        Ok(())
    }

    /// Hides the panel. Edits are already persisted.
    pub fn close(&mut self) {
        self.open = false;
        debug!("settings panel closed");
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The working copy of the durations.
    pub fn working_config(&self) -> &SessionConfig {
        &self.working
    }

    /// The working copy of the taskbar flag.
    pub fn progress_in_taskbar(&self) -> bool {
        self.progress_in_taskbar
    }

    /// Locks the active mode's inputs while a session is in progress and
    /// unlocks them otherwise.
    pub fn sync_with_timer(&mut self, state: &TimerState) {
        self.locked_mode = state.run_state.is_in_progress().then_some(state.mode);
    }

    /// Returns true if the duration inputs for `mode` accept edits.
    pub fn is_input_enabled(&self, mode: Mode) -> bool {
        self.locked_mode != Some(mode)
    }

    /// Sets one duration field, persisting it immediately.
    ///
    /// The edit is merged onto the latest stored config so changes made
    /// elsewhere are kept.
    pub fn edit_duration(
        &mut self,
        mode: Mode,
        field: DurationField,
        value: u32,
    ) -> Result<SettingsEdit, SettingsError> {
        if !self.is_input_enabled(mode) {
            return Err(SettingsError::Locked { mode });
        }

        let latest = self.settings.session_config()?;
        let new_config = latest.with_edit(mode, field, value);

        self.settings.set_session_config(&new_config)?;
        self.working = new_config;

        info!(%mode, %field, value, "duration edited");
        Ok(SettingsEdit::Duration {
            mode,
            field,
            new_config,
        })
    }

    /// Like [`edit_duration`](Self::edit_duration), parsing raw input text.
    ///
    /// A cleared field counts as 0.
    pub fn edit_duration_input(
        &mut self,
        mode: Mode,
        field: DurationField,
        raw: &str,
    ) -> Result<SettingsEdit, SettingsError> {
        let value = parse_duration_input(raw)?;
        self.edit_duration(mode, field, value)
    }

    /// Sets the taskbar progress flag. Always editable.
    pub fn set_progress_in_taskbar(&mut self, enabled: bool) -> Result<SettingsEdit, SettingsError> {
        self.settings.set_progress_in_taskbar(enabled)?;
        self.progress_in_taskbar = enabled;
        info!(enabled, "taskbar progress toggled");
        Ok(SettingsEdit::ProgressInTaskbar { enabled })
    }
}

fn parse_duration_input(raw: &str) -> Result<u32, SettingsError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse::<u32>().map_err(|_| SettingsError::InvalidValue {
        value: trimmed.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModeTime, RunState};

    fn create_panel() -> (SettingsPanel, SettingsStore) {
        let settings = SettingsStore::in_memory();
        let panel = SettingsPanel::new(settings.clone()).unwrap();
        (panel, settings)
    }

    fn running(mode: Mode) -> TimerState {
        TimerState {
            mode,
            run_state: RunState::Running,
            remaining_ms: 1_000,
            total_ms: 2_000,
        }
    }

    mod open_close_tests {
        use super::*;

        #[test]
        fn test_new_panel_is_closed_and_seeded() {
            let (panel, _settings) = create_panel();
            assert!(!panel.is_open());
            assert_eq!(*panel.working_config(), SessionConfig::default());
            assert!(!panel.progress_in_taskbar());
        }

        #[test]
        fn test_open_refreshes_from_store() {
            let (mut panel, settings) = create_panel();
            settings.set_progress_in_taskbar(true).unwrap();
            panel.open().unwrap();
            assert!(panel.is_open());
            assert!(panel.progress_in_taskbar());
        }

        #[test]
        fn test_close_keeps_edits() {
            let (mut panel, settings) = create_panel();
            panel.open().unwrap();
            panel.edit_duration(Mode::Focus, DurationField::Minute, 40).unwrap();
            panel.close();
            assert!(!panel.is_open());
            assert_eq!(settings.session_config().unwrap().focus, ModeTime::new(40, 0));
        }
    }

    mod edit_tests {
        use super::*;

        #[test]
        fn test_edit_persists_and_reports() {
            let (mut panel, settings) = create_panel();
            let edit = panel
                .edit_duration(Mode::Break, DurationField::Seconds, 30)
                .unwrap();

            let expected = SessionConfig {
                focus: ModeTime::new(25, 0),
                break_time: ModeTime::new(5, 30),
            };
            assert_eq!(
                edit,
                SettingsEdit::Duration {
                    mode: Mode::Break,
                    field: DurationField::Seconds,
                    new_config: expected,
                }
            );
            assert_eq!(*panel.working_config(), expected);
            assert_eq!(settings.session_config().unwrap(), expected);
        }

        #[test]
        fn test_edit_merges_onto_latest_store() {
            let (mut panel, settings) = create_panel();
            settings
                .set_session_config(&SessionConfig {
                    focus: ModeTime::new(50, 0),
                    break_time: ModeTime::new(5, 0),
                })
                .unwrap();

            panel.edit_duration(Mode::Break, DurationField::Minute, 10).unwrap();
            let stored = settings.session_config().unwrap();
            assert_eq!(stored.focus, ModeTime::new(50, 0));
            assert_eq!(stored.break_time, ModeTime::new(10, 0));
        }

        #[test]
        fn test_active_mode_locked_during_session() {
            let (mut panel, settings) = create_panel();
            panel.sync_with_timer(&running(Mode::Focus));

            let err = panel
                .edit_duration(Mode::Focus, DurationField::Minute, 1)
                .unwrap_err();
            assert!(matches!(err, SettingsError::Locked { mode: Mode::Focus }));
            assert_eq!(settings.session_config().unwrap(), SessionConfig::default());
        }

        #[test]
        fn test_other_mode_editable_during_session() {
            let (mut panel, settings) = create_panel();
            panel.sync_with_timer(&running(Mode::Focus));

            assert!(panel.is_input_enabled(Mode::Break));
            panel.edit_duration(Mode::Break, DurationField::Minute, 7).unwrap();
            assert_eq!(settings.session_config().unwrap().break_time, ModeTime::new(7, 0));
        }

        #[test]
        fn test_unlocked_when_idle_again() {
            let (mut panel, _settings) = create_panel();
            panel.sync_with_timer(&running(Mode::Focus));
            panel.sync_with_timer(&TimerState::new(&SessionConfig::default()));
            assert!(panel.is_input_enabled(Mode::Focus));
        }

        #[test]
        fn test_progress_editable_during_session() {
            let (mut panel, settings) = create_panel();
            panel.sync_with_timer(&running(Mode::Break));
            let edit = panel.set_progress_in_taskbar(true).unwrap();
            assert_eq!(edit, SettingsEdit::ProgressInTaskbar { enabled: true });
            assert!(settings.progress_in_taskbar().unwrap());
        }
    }

    mod write_failure_tests {
        use std::path::PathBuf;
        use std::sync::Arc;

        use serde_json::Value;

        use super::*;
        use crate::store::{
            KeyValueStore, MemoryStore, StoreError, StoreExt, PROGRESS_IN_TASKBAR_KEY, TIME_KEY,
        };

        /// Serves reads from a seeded store and rejects every write.
        struct ReadOnlyStore(MemoryStore);

        impl KeyValueStore for ReadOnlyStore {
            fn get(&self, key: &str) -> Option<Value> {
                self.0.get(key)
            }

            fn set(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
                Err(StoreError::Write {
                    path: PathBuf::from("/read-only/window-state-main.json"),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                })
            }
        }

        fn create_read_only_panel() -> (SettingsPanel, SettingsStore) {
            let memory = MemoryStore::new();
            memory
                .set_typed(TIME_KEY, &SessionConfig::default())
                .unwrap();
            memory.set(PROGRESS_IN_TASKBAR_KEY, Value::Bool(false)).unwrap();
            let settings = SettingsStore::new(Arc::new(ReadOnlyStore(memory)));
            (SettingsPanel::new(settings.clone()).unwrap(), settings)
        }

        #[test]
        fn test_failed_duration_write_keeps_working_copy() {
            let (mut panel, settings) = create_read_only_panel();

            let err = panel
                .edit_duration(Mode::Focus, DurationField::Minute, 99)
                .unwrap_err();
            assert!(matches!(err, SettingsError::Store(StoreError::Write { .. })));
            assert_eq!(*panel.working_config(), SessionConfig::default());
            assert_eq!(settings.session_config().unwrap(), SessionConfig::default());
        }

        #[test]
        fn test_failed_progress_write_keeps_flag() {
            let (mut panel, settings) = create_read_only_panel();

            assert!(panel.set_progress_in_taskbar(true).is_err());
            assert!(!panel.progress_in_taskbar());
            assert!(!settings.progress_in_taskbar().unwrap());
        }
    }

    mod input_parsing_tests {
        use super::*;

        #[test]
        fn test_cleared_input_is_zero() {
            assert_eq!(parse_duration_input("").unwrap(), 0);
            assert_eq!(parse_duration_input("  ").unwrap(), 0);
        }

        #[test]
        fn test_rejects_negative_and_fractional() {
            assert!(matches!(
                parse_duration_input("-1"),
                Err(SettingsError::InvalidValue { .. })
            ));
            assert!(parse_duration_input("2.5").is_err());
            assert!(parse_duration_input("ten").is_err());
        }

        #[test]
        fn test_invalid_input_does_not_touch_store() {
            let (mut panel, settings) = create_panel();
            assert!(panel
                .edit_duration_input(Mode::Focus, DurationField::Minute, "abc")
                .is_err());
            assert_eq!(settings.session_config().unwrap(), SessionConfig::default());
        }

        #[test]
        fn test_valid_input() {
            let (mut panel, settings) = create_panel();
            panel
                .edit_duration_input(Mode::Focus, DurationField::Minute, " 45 ")
                .unwrap();
            assert_eq!(settings.session_config().unwrap().focus, ModeTime::new(45, 0));
        }
    }
}
