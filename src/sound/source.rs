//! Alarm sound selection.
//!
//! The alarm is either a sound file or the built-in chime. Without an
//! explicit file, the freedesktop sound theme is searched for a fitting
//! alarm before falling back to the chime.

use std::path::{Path, PathBuf};

/// Directories to search for theme sounds, in order of priority.
const THEME_SOUND_DIRS: &[&str] = &[
    "/usr/share/sounds/freedesktop/stereo",
    "/usr/local/share/sounds/freedesktop/stereo",
];

/// Theme sound files to try, in order of preference.
const DEFAULT_ALARM_FILES: &[&str] = &["alarm-clock-elapsed.oga", "complete.oga", "bell.oga"];

/// The sound played when a session finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmSound {
    /// A sound file on disk.
    File {
        /// Path to the file.
        path: PathBuf,
    },
    /// The synthesized chime compiled into the binary.
    Chime,
}

impl AlarmSound {
    /// Creates a file-backed alarm.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    /// Picks the alarm: `explicit` if given, otherwise a theme sound, otherwise
    /// the chime.
    #[must_use]
    pub fn resolve(explicit: Option<&Path>) -> Self {
        match explicit {
            Some(path) => Self::file(path),
            None => find_theme_alarm().map_or(Self::Chime, Self::file),
        }
    }

    /// Short name for logs and the status header.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::File { path } => path
                .file_stem()
                .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned()),
            Self::Chime => "chime".to_string(),
        }
    }
}

/// Returns the first installed theme alarm.
#[must_use]
pub fn find_theme_alarm() -> Option<PathBuf> {
    find_alarm_in(THEME_SOUND_DIRS.iter().map(Path::new))
}

fn find_alarm_in<'a>(dirs: impl Iterator<Item = &'a Path> + Clone) -> Option<PathBuf> {
    DEFAULT_ALARM_FILES.iter().find_map(|file| {
        dirs.clone()
            .map(|dir| dir.join(file))
            .find(|candidate| candidate.is_file())
    })
}
