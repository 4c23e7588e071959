//! Built-in alarm chime.
//!
//! A short rising three-note chime synthesized with rodio's sine generator,
//! used when no alarm file is configured or the file cannot be played.

use std::time::Duration;

use rodio::source::{Amplify, SineWave, TakeDuration};
use rodio::Source;

/// Chime notes as `(frequency_hz, length_ms)`.
pub const CHIME_NOTES: &[(f32, u64)] = &[(660.0, 180), (880.0, 180), (1320.0, 420)];

/// Playback volume of the chime.
const CHIME_VOLUME: f32 = 0.25;

/// One note of the chime.
pub type ChimeNote = Amplify<TakeDuration<SineWave>>;

/// Returns the chime as notes to be queued one after another.
#[must_use]
pub fn chime_notes() -> Vec<ChimeNote> {
    CHIME_NOTES
        .iter()
        .map(|&(freq, ms)| {
            SineWave::new(freq)
                .take_duration(Duration::from_millis(ms))
                .amplify(CHIME_VOLUME)
        })
        .collect()
}
