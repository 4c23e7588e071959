//! Notification errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    /// The notification server refused or could not be reached.
    #[error("failed to send notification: {0}")]
    SendFailed(String),

    #[error("failed to start notification worker: {0}")]
    Spawn(#[source] std::io::Error),
}

impl NotificationError {
    /// Hint logged next to the error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::SendFailed(_) => "is a notification server running? try --no-notify",
            Self::Spawn(_) => "the process may be out of threads",
        }
    }
}
