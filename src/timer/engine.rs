//! Timer state machine for Atomic Pomodoro.
//!
//! This module provides the session countdown:
//! - Transitions between Idle, Running and Paused for the active mode
//! - One repeating one-second decrement, owned by the machine
//! - Automatic mode flip when a session reaches zero
//! - Live application of settings edits while idle
//! - Taskbar progress reports

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::settings::SettingsEdit;
use crate::store::SettingsStore;
use crate::types::{Mode, ProgressReport, RunState, TimerState, MS_PER_SECOND};

use super::error::TimerError;
use super::ticker::{TickHandle, TickScheduler, TickToken};

// ============================================================================
// TimerEvent
// ============================================================================

/// Events published by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// A session started
    Started {
        /// Mode of the session
        mode: Mode,
        /// Session length
        total_ms: u64,
    },
    /// Countdown halted
    Paused {
        /// Time left at the moment of pausing
        remaining_ms: u64,
    },
    /// Countdown continued
    Resumed {
        /// Time left at the moment of resuming
        remaining_ms: u64,
    },
    /// Session abandoned and timer reset
    Restarted {
        /// Mode that stays active
        mode: Mode,
        /// Configured duration shown again
        remaining_ms: u64,
    },
    /// Mode changed while idle
    ModeSwitched {
        /// New mode
        mode: Mode,
        /// Configured duration for the new mode
        remaining_ms: u64,
    },
    /// Idle preview changed because of a settings edit
    RemainingChanged {
        /// New preview duration
        remaining_ms: u64,
    },
    /// One second elapsed
    Tick {
        /// Time left after this tick
        remaining_ms: u64,
    },
    /// Taskbar progress update
    Progress(ProgressReport),
    /// A session ran to zero and the mode flipped
    SessionCompleted {
        /// Mode that just ended
        finished: Mode,
        /// Mode now active
        next: Mode,
    },
}

// ============================================================================
// TimerMachine
// ============================================================================

/// Owns the timer state and the single active tick.
pub struct TimerMachine {
    /// Current timer state
    state: TimerState,
    /// Source of configured durations
    settings: SettingsStore,
    /// Arms the repeating decrement
    scheduler: Box<dyn TickScheduler>,
    /// The one active decrement, if any
    ticker: Option<TickHandle>,
    /// Generation of the most recently armed tick
    generation: u64,
    /// Whether ticks report taskbar progress
    progress_enabled: bool,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerMachine {
    /// Creates an idle machine in focus mode, previewing the configured
    /// focus duration.
    pub fn new(
        settings: SettingsStore,
        scheduler: Box<dyn TickScheduler>,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Result<Self, TimerError> {
        let config = settings.session_config()?;
        let progress_enabled = settings.progress_in_taskbar()?;

        Ok(Self {
            state: TimerState::new(&config),
            settings,
            scheduler,
            ticker: None,
            generation: 0,
            progress_enabled,
            event_tx,
        })
    }

    /// Returns a reference to the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns true if ticks report taskbar progress.
    pub fn progress_enabled(&self) -> bool {
        self.progress_enabled
    }

    /// Token of the active decrement, if one is armed.
    pub fn active_tick(&self) -> Option<TickToken> {
        self.ticker.as_ref().map(TickHandle::token)
    }

    /// Starts a session for the active mode.
    ///
    /// # Errors
    ///
    /// Returns an error unless the timer is idle.
    pub fn start(&mut self) -> Result<(), TimerError> {
        self.require("start", RunState::Idle)?;

        let total_ms = self.settings.session_config()?.duration_ms(self.state.mode);

        self.state.total_ms = total_ms;
        self.state.remaining_ms = total_ms;
        self.state.run_state = RunState::Running;
        self.arm_ticker();

        info!(mode = %self.state.mode, total_ms, "session started");
        self.emit(TimerEvent::Started {
            mode: self.state.mode,
            total_ms,
        })
    }

    /// Halts the countdown without resetting it.
    ///
    /// # Errors
    ///
    /// Returns an error unless the timer is running.
    pub fn pause(&mut self) -> Result<(), TimerError> {
        self.require("pause", RunState::Running)?;

        self.cancel_ticker();
        self.state.run_state = RunState::Paused;

        info!(remaining_ms = self.state.remaining_ms, "session paused");
        self.emit(TimerEvent::Paused {
            remaining_ms: self.state.remaining_ms,
        })
    }

    /// Continues a paused countdown from where it stopped.
    ///
    /// # Errors
    ///
    /// Returns an error unless the timer is paused.
    pub fn resume(&mut self) -> Result<(), TimerError> {
        self.require("resume", RunState::Paused)?;

        self.state.run_state = RunState::Running;
        self.arm_ticker();

        info!(remaining_ms = self.state.remaining_ms, "session resumed");
        self.emit(TimerEvent::Resumed {
            remaining_ms: self.state.remaining_ms,
        })
    }

    /// Abandons the session and shows the configured duration again.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is in progress.
    pub fn restart(&mut self) -> Result<(), TimerError> {
        if !self.state.run_state.is_in_progress() {
            return Err(self.invalid("restart"));
        }

        let remaining_ms = self.settings.session_config()?.duration_ms(self.state.mode);

        self.cancel_ticker();
        self.reset_to_idle(self.state.mode, remaining_ms);

        info!(mode = %self.state.mode, "session restarted");
        if self.progress_enabled {
            self.emit(TimerEvent::Progress(ProgressReport::Clear))?;
        }
        self.emit(TimerEvent::Restarted {
            mode: self.state.mode,
            remaining_ms,
        })
    }

    /// Selects a mode while idle and previews its configured duration.
    ///
    /// Selecting the current mode reloads its duration from the store.
    ///
    /// # Errors
    ///
    /// Returns an error unless the timer is idle.
    pub fn switch_mode(&mut self, target: Mode) -> Result<(), TimerError> {
        self.require("switch mode", RunState::Idle)?;

        let remaining_ms = self.settings.session_config()?.duration_ms(target);

        self.cancel_ticker();
        self.reset_to_idle(target, remaining_ms);

        debug!(mode = %target, remaining_ms, "mode switched");
        self.emit(TimerEvent::ModeSwitched {
            mode: target,
            remaining_ms,
        })
    }

    /// Switches to the mode that is not active.
    ///
    /// # Errors
    ///
    /// Returns an error unless the timer is idle.
    pub fn toggle_mode(&mut self) -> Result<(), TimerError> {
        self.switch_mode(self.state.mode.other())
    }

    /// Delivers a tick from the scheduler. Ticks whose token does not match
    /// the active decrement are dropped.
    pub fn handle_tick(&mut self, token: TickToken) -> Result<(), TimerError> {
        if self.active_tick() != Some(token) {
            trace!(generation = token.generation(), "ignoring stale tick");
            return Ok(());
        }
        self.tick()
    }

    /// Removes one second from the running countdown and completes the
    /// session when it reaches zero. Does nothing unless running.
    pub fn tick(&mut self) -> Result<(), TimerError> {
        if !self.state.is_running() {
            return Ok(());
        }

        self.state.remaining_ms = self.state.remaining_ms.saturating_sub(MS_PER_SECOND);
        let remaining_ms = self.state.remaining_ms;

        self.emit(TimerEvent::Tick { remaining_ms })?;

        if self.progress_enabled {
            let report = ProgressReport::from_elapsed(self.state.elapsed_ms(), self.state.total_ms);
            self.emit(TimerEvent::Progress(report))?;
        }

        if remaining_ms == 0 {
            self.cancel_ticker();
            self.on_session_complete()?;
        }

        Ok(())
    }

    /// Applies a settings edit coming from the settings panel.
    ///
    /// While idle, editing the active mode's duration updates the preview at
    /// once. An in-flight countdown is never touched.
    pub fn apply_edit(&mut self, edit: &SettingsEdit) -> Result<(), TimerError> {
        match *edit {
            SettingsEdit::Duration {
                mode, new_config, ..
            } => {
                if self.state.is_idle() && mode == self.state.mode {
                    self.state.remaining_ms = new_config.duration_ms(mode);
                    self.emit(TimerEvent::RemainingChanged {
                        remaining_ms: self.state.remaining_ms,
                    })?;
                }
            }
            SettingsEdit::ProgressInTaskbar { enabled } => {
                let was_enabled = std::mem::replace(&mut self.progress_enabled, enabled);
                if was_enabled && !enabled && self.state.run_state.is_in_progress() {
                    self.emit(TimerEvent::Progress(ProgressReport::Clear))?;
                }
            }
        }
        Ok(())
    }

    /// Flips the mode after a session ran to zero.
    fn on_session_complete(&mut self) -> Result<(), TimerError> {
        let finished = self.state.mode;
        let next = finished.other();
        let remaining_ms = self.settings.session_config()?.duration_ms(next);

        self.reset_to_idle(next, remaining_ms);

        info!(%finished, %next, "session completed");
        if self.progress_enabled {
            self.emit(TimerEvent::Progress(ProgressReport::Clear))?;
        }
        self.emit(TimerEvent::SessionCompleted { finished, next })
    }

    fn reset_to_idle(&mut self, mode: Mode, remaining_ms: u64) {
        self.state.mode = mode;
        self.state.run_state = RunState::Idle;
        self.state.remaining_ms = remaining_ms;
        self.state.total_ms = 0;
    }

    /// Cancels any existing decrement, then arms a fresh one.
    fn arm_ticker(&mut self) {
        self.cancel_ticker();
        self.generation += 1;
        let token = TickToken::new(self.generation);
        self.ticker = Some(self.scheduler.schedule(token));
        trace!(generation = self.generation, "tick armed");
    }

    fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.cancel();
        }
    }

    fn require(&self, operation: &'static str, expected: RunState) -> Result<(), TimerError> {
        if self.state.run_state == expected {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> TimerError {
        TimerError::InvalidTransition {
            operation,
            state: self.state.run_state,
        }
    }

    fn emit(&self, event: TimerEvent) -> Result<(), TimerError> {
        self.event_tx
            .send(event)
            .map_err(|_| TimerError::ChannelClosed)
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }
}

impl std::fmt::Debug for TimerMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerMachine")
            .field("state", &self.state)
            .field("ticker", &self.ticker)
            .field("progress_enabled", &self.progress_enabled)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
