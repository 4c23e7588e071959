//! Alarm playback for finished sessions.
//!
//! # Architecture
//!
//! ```text
//!  --alarm <path> ──┐
//!                   ├──▶ AlarmSound::File ──▶ RodioSoundPlayer ──▶ sink
//!  theme sound ─────┘            │ missing or undecodable
//!                                ▼
//!  (none) ──────────▶ AlarmSound::Chime ───▶ three sine notes
//! ```
//!
//! Playback is fire-and-forget. Failures are reported to the caller, which
//! logs them and carries on.

mod chime;
mod error;
mod player;
mod source;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

pub use chime::{chime_notes, CHIME_NOTES};
pub use error::SoundError;
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::{find_theme_alarm, AlarmSound};

/// Something that can sound the alarm.
pub trait SoundPlayer {
    /// Starts playing `alarm` without waiting for it to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if playback could not be started.
    fn play(&self, alarm: &AlarmSound) -> Result<(), SoundError>;
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, alarm: &AlarmSound) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, alarm)
    }
}

/// Records alarms instead of playing them. Clones share their log.
#[derive(Debug, Clone, Default)]
pub struct MockSoundPlayer {
    play_calls: Arc<Mutex<Vec<AlarmSound>>>,
    should_fail: Arc<AtomicBool>,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.calls().len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<AlarmSound> {
        self.calls().clone()
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Vec<AlarmSound>> {
        self.play_calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, alarm: &AlarmSound) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("mock failure".to_string()));
        }
        self.calls().push(alarm.clone());
        Ok(())
    }
}
