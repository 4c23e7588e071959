//! Alarm playback errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SoundError {
    /// No output device could be opened.
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("cannot open alarm file {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file opened but is not audio rodio can decode.
    #[error("cannot decode alarm file {}: {reason}", path.display())]
    Undecodable { path: PathBuf, reason: String },

    #[error("cannot open an audio sink: {0}")]
    Sink(String),

    #[error("sound playback error: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// True when the file is the problem and the chime can still be played.
    #[must_use]
    pub fn should_fallback_to_chime(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::Undecodable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_file() {
        let err = SoundError::FileNotFound {
            path: PathBuf::from("/sounds/bell.oga"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("cannot open alarm file /sounds/bell.oga"));

        let err = SoundError::Undecodable {
            path: PathBuf::from("/sounds/bell.oga"),
            reason: "unrecognized format".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot decode alarm file /sounds/bell.oga: unrecognized format"
        );
    }

    #[test]
    fn test_only_file_errors_fall_back() {
        let missing = SoundError::FileNotFound {
            path: PathBuf::new(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(missing.should_fallback_to_chime());
        assert!(SoundError::Undecodable {
            path: PathBuf::new(),
            reason: String::new()
        }
        .should_fallback_to_chime());
        assert!(!SoundError::Sink("x".into()).should_fallback_to_chime());
        assert!(!SoundError::DeviceNotAvailable("x".into()).should_fallback_to_chime());
    }
}
