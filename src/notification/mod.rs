//! Desktop notification integration.
//!
//! This module posts a notification when a session finishes. It includes:
//!
//! - The [`Notifier`] seam used by the application loop
//! - [`DesktopNotifier`], backed by `notify-rust`
//! - [`MockNotifier`] for tests
//!
//! On freedesktop platforms the notification carries a default action;
//! clicking it posts `show-app` onto the host bus, and the last notification
//! can be dismissed when the next session starts. Elsewhere the click is not
//! reported and the notification is left to the platform.

mod content;
pub mod error;

use std::sync::{Arc, Mutex, PoisonError};

use notify_rust::Notification;
use tracing::{debug, warn};

use crate::host::BusSender;
#[cfg(all(unix, not(target_os = "macos")))]
use crate::host::HostMessage;

pub use self::content::NotificationContent;
pub use self::error::NotificationError;

/// Application name shown by the notification service.
pub const APP_NAME: &str = "Atomic Pomodoro";

/// Action identifier for a click on the notification body.
const DEFAULT_ACTION: &str = "default";

/// Posts notifications.
pub trait Notifier: Send {
    /// Shows `content`. Must not block the caller on user interaction.
    fn notify(&self, content: &NotificationContent) -> Result<(), NotificationError>;

    /// Closes the most recent notification if it is still on screen.
    fn dismiss(&self) -> Result<(), NotificationError>;
}

// ============================================================================
// DesktopNotifier
// ============================================================================

/// Notifier backed by the desktop notification service.
///
/// Each notification is shown from a short-lived worker thread, which on
/// freedesktop platforms also waits for the click. The worker exits once the
/// notification is clicked, expires, or is dismissed.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    bus: BusSender,
    // Server-assigned id of the notification still on screen.
    shown: Arc<Mutex<Option<u32>>>,
}

impl DesktopNotifier {
    /// Creates a notifier that reports clicks on `bus`.
    pub fn new(bus: BusSender) -> Self {
        Self {
            bus,
            shown: Arc::default(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        let mut notification = Notification::new();
        notification
            .appname(APP_NAME)
            .summary(&content.title)
            .body(&content.body)
            .action(DEFAULT_ACTION, "Show");

        let bus = self.bus.clone();
        let shown = Arc::clone(&self.shown);
        std::thread::Builder::new()
            .name("notification".into())
            .spawn(move || show_and_wait(notification, bus, shown))
            .map_err(NotificationError::Spawn)?;

        debug!(title = %content.title, "notification posted");
        Ok(())
    }

    fn dismiss(&self) -> Result<(), NotificationError> {
        let Some(id) = lock(&self.shown).take() else {
            return Ok(());
        };
        close_notification(id)?;
        debug!(id, "notification dismissed");
        Ok(())
    }
}

fn lock<T>(slot: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn show_and_wait(notification: Notification, bus: BusSender, shown: Arc<Mutex<Option<u32>>>) {
    let handle = match notification.show() {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %NotificationError::SendFailed(e.to_string()), "notification not shown");
            return;
        }
    };

    let id = handle.id();
    *lock(&shown) = Some(id);

    handle.wait_for_action(|action| {
        if action == DEFAULT_ACTION {
            debug!("notification clicked");
            bus.send(HostMessage::ShowApp);
        }
    });

    let mut slot = lock(&shown);
    if *slot == Some(id) {
        *slot = None;
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn show_and_wait(notification: Notification, _bus: BusSender, _shown: Arc<Mutex<Option<u32>>>) {
    if let Err(e) = notification.show() {
        warn!(error = %NotificationError::SendFailed(e.to_string()), "notification not shown");
    }
}

/// Closes notification `id` by replacing it and closing the replacement.
///
/// The server then signals the close, which releases the worker waiting on
/// the first one.
#[cfg(all(unix, not(target_os = "macos")))]
fn close_notification(id: u32) -> Result<(), NotificationError> {
    let replacement = Notification::new()
        .appname(APP_NAME)
        .id(id)
        .show()
        .map_err(|e| NotificationError::SendFailed(e.to_string()))?;
    replacement.close();
    Ok(())
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn close_notification(_id: u32) -> Result<(), NotificationError> {
    Ok(())
}

// ============================================================================
// MockNotifier
// ============================================================================

/// Notifier that records what it was asked to show and dismiss.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<NotificationContent>>>,
    dismissals: Arc<Mutex<usize>>,
    fail: bool,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier whose every call fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Everything shown so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<NotificationContent> {
        lock(&self.sent).clone()
    }

    /// Number of `dismiss` calls so far.
    #[must_use]
    pub fn dismissals(&self) -> usize {
        *lock(&self.dismissals)
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::SendFailed("mock failure".into()));
        }
        lock(&self.sent).push(content.clone());
        Ok(())
    }

    fn dismiss(&self) -> Result<(), NotificationError> {
        *lock(&self.dismissals) += 1;
        if self.fail {
            return Err(NotificationError::SendFailed("mock failure".into()));
        }
        Ok(())
    }
}
