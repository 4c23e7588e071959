//! Settings store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing persisted settings.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The settings file exists but could not be read.
    #[error("failed to read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file could not be written.
    #[error("failed to write settings file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file does not contain a JSON object.
    #[error("settings file {} is not a valid JSON object: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be converted to JSON.
    #[error("failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The platform reports no per-user configuration directory.
    #[error("no configuration directory is available on this platform")]
    NoConfigDir,
}

impl StoreError {
    /// Returns true if this error came from the filesystem.
    #[must_use]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Write { .. })
    }
}
