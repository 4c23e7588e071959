//! rodio-backed alarm playback.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::chime::chime_notes;
use super::error::SoundError;
use super::source::AlarmSound;

/// Plays alarms on the default output device.
///
/// Each alarm gets its own detached sink, so `play` returns immediately and
/// overlapping alarms mix instead of queueing.
pub struct RodioSoundPlayer {
    // Dropping the stream silences every sink created from its handle.
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl RodioSoundPlayer {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` when the host has no usable
    /// output device.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;
        debug!("audio output opened");

        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Starts the alarm. A file that cannot be opened or decoded is replaced
    /// by the chime.
    pub fn play(&self, alarm: &AlarmSound) -> Result<(), SoundError> {
        let AlarmSound::File { path } = alarm else {
            return self.play_chime();
        };

        self.play_file(path).or_else(|e| {
            if !e.should_fallback_to_chime() {
                return Err(e);
            }
            warn!(path = %path.display(), error = %e, "alarm file unusable, playing chime");
            self.play_chime()
        })
    }

    fn play_file(&self, path: &Path) -> Result<(), SoundError> {
        let file = File::open(path).map_err(|source| SoundError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| SoundError::Undecodable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let sink = self.sink()?;
        sink.append(source);
        sink.detach();
        debug!(path = %path.display(), "alarm started");
        Ok(())
    }

    fn play_chime(&self) -> Result<(), SoundError> {
        let sink = self.sink()?;
        chime_notes().into_iter().for_each(|note| sink.append(note));
        sink.detach();
        debug!("chime started");
        Ok(())
    }

    fn sink(&self) -> Result<Sink, SoundError> {
        Sink::try_new(&self.handle).map_err(|e| SoundError::Sink(e.to_string()))
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer").finish_non_exhaustive()
    }
}

/// Opens the output device, logging and returning `None` when there is none.
#[must_use]
pub fn try_create_player() -> Option<RodioSoundPlayer> {
    RodioSoundPlayer::new()
        .inspect_err(|e| warn!(error = %e, "audio not available, alarm disabled"))
        .ok()
}
