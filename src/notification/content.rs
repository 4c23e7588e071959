//! Notification text for finished sessions.

use crate::types::Mode;

/// Title and body of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

impl NotificationContent {
    /// Content announcing that a session of `finished` mode ended.
    pub fn for_finished(finished: Mode) -> Self {
        let (title, body) = match finished {
            Mode::Focus => ("Focus session finished", "Let's take a break"),
            Mode::Break => ("Break finished", "Let's start focusing"),
        };
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}
