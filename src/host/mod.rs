//! Host shell messaging.
//!
//! The window talks to its host through four topics:
//!
//! | Topic                  | Direction  | Payload                    |
//! |------------------------|------------|----------------------------|
//! | `request-app-info`     | UI → host  | none                       |
//! | `set-app-info`         | host → UI  | `{version, platform}`      |
//! | `show-app`             | UI → host  | none                       |
//! | `set-taskbar-progress` | UI → host  | float in `[0,1]`, or `-1`  |
//!
//! Messages are queued on a [`LocalBus`] and delivered to subscribers when
//! the event loop calls [`LocalBus::dispatch_pending`]. Any thread may post
//! through a [`BusSender`].

mod shell;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::types::ProgressReport;

pub use shell::{progress_sequence, TerminalHost, ATTENTION_BELL};

// ============================================================================
// HostMessage
// ============================================================================

/// Application metadata answered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Application version
    pub version: String,
    /// Operating system name
    pub platform: String,
}

/// A message crossing the UI/host boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "payload", rename_all = "kebab-case")]
pub enum HostMessage {
    /// Ask the host for app metadata
    RequestAppInfo,
    /// App metadata reply
    SetAppInfo(AppInfo),
    /// Bring the window to the foreground
    ShowApp,
    /// Update or clear the taskbar progress indicator
    SetTaskbarProgress(ProgressReport),
}

impl HostMessage {
    /// Returns the topic this message is delivered on.
    pub fn topic(&self) -> Topic {
        match self {
            HostMessage::RequestAppInfo => Topic::RequestAppInfo,
            HostMessage::SetAppInfo(_) => Topic::SetAppInfo,
            HostMessage::ShowApp => Topic::ShowApp,
            HostMessage::SetTaskbarProgress(_) => Topic::SetTaskbarProgress,
        }
    }
}

/// Message topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    RequestAppInfo,
    SetAppInfo,
    ShowApp,
    SetTaskbarProgress,
}

impl Topic {
    /// Returns the wire name of the topic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::RequestAppInfo => "request-app-info",
            Topic::SetAppInfo => "set-app-info",
            Topic::ShowApp => "show-app",
            Topic::SetTaskbarProgress => "set-taskbar-progress",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// MessageBus
// ============================================================================

/// Callback invoked for each delivered message on a subscribed topic.
pub type Handler = Box<dyn FnMut(&HostMessage) + Send>;

/// Message-passing boundary between the window and its host.
pub trait MessageBus {
    /// Queues a message for delivery.
    fn send(&self, message: HostMessage);

    /// Registers `handler` for `topic`. The handler stays registered until
    /// the returned [`Subscription`] is dropped or unsubscribed.
    fn subscribe(&self, topic: Topic, handler: Handler) -> Subscription;
}

type SharedHandler = Arc<Mutex<Handler>>;
type HandlerTable = Mutex<HashMap<u64, (Topic, SharedHandler)>>;

/// Keeps a handler registered.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    topic: Topic,
    table: Weak<HandlerTable>,
}

impl Subscription {
    /// Removes the handler now.
    pub fn unsubscribe(self) {}

    /// The topic this subscription listens on.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
            trace!(topic = %self.topic, id = self.id, "handler unsubscribed");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish()
    }
}

/// Cloneable handle for posting onto a [`LocalBus`] from any thread.
#[derive(Debug, Clone)]
pub struct BusSender {
    tx: Sender<HostMessage>,
}

impl BusSender {
    /// Queues a message. Messages posted after the bus is gone are dropped.
    pub fn send(&self, message: HostMessage) {
        if self.tx.send(message).is_err() {
            debug!("host bus closed, dropping message");
        }
    }
}

/// In-process message bus backed by a crossbeam channel.
pub struct LocalBus {
    tx: Sender<HostMessage>,
    rx: Receiver<HostMessage>,
    handlers: Arc<HandlerTable>,
    next_id: AtomicU64,
}

impl LocalBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            handlers: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns a handle other threads can post through.
    pub fn sender(&self) -> BusSender {
        BusSender {
            tx: self.tx.clone(),
        }
    }

    /// Delivers every queued message to the handlers subscribed to its topic.
    ///
    /// Messages posted by handlers during delivery are delivered in the same
    /// call. Returns the number of messages taken off the queue.
    pub fn dispatch_pending(&self) -> usize {
        let mut delivered = 0;
        while let Ok(message) = self.rx.try_recv() {
            delivered += 1;
            let topic = message.topic();

            let targets: Vec<SharedHandler> = self
                .handlers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .values()
                .filter(|(t, _)| *t == topic)
                .map(|(_, h)| Arc::clone(h))
                .collect();

            trace!(%topic, handlers = targets.len(), "dispatching host message");
            for handler in targets {
                let mut handler = handler.lock().unwrap_or_else(PoisonError::into_inner);
                (*handler)(&message);
            }
        }
        delivered
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus for LocalBus {
    fn send(&self, message: HostMessage) {
        trace!(topic = %message.topic(), "queueing host message");
        // Both ends live in `self`, so the channel cannot be disconnected.
        let _ = self.tx.send(message);
    }

    fn subscribe(&self, topic: Topic, handler: Handler) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, (topic, Arc::new(Mutex::new(handler))));

        Subscription {
            id,
            topic,
            table: Arc::downgrade(&self.handlers),
        }
    }
}

impl fmt::Debug for LocalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBus")
            .field("pending", &self.rx.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
