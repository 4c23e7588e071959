//! One-second repeating tick sources.
//!
//! The state machine never sleeps itself. It asks a [`TickScheduler`] to arm
//! a repeating tick tagged with a [`TickToken`] and keeps the returned
//! [`TickHandle`]. Tokens from handles that have since been cancelled are
//! stale and get ignored, so a tick already queued behind a restart can never
//! touch the reset state.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::trace;

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

// ============================================================================
// TickToken / TickHandle
// ============================================================================

/// Identifies one armed repeating tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken(u64);

impl TickToken {
    /// Creates a token for the given generation.
    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    /// Returns the generation number.
    pub fn generation(&self) -> u64 {
        self.0
    }
}

type Canceller = Box<dyn FnOnce() + Send>;

/// Owner of an armed repeating tick. Cancelling or dropping it stops the tick.
pub struct TickHandle {
    token: TickToken,
    canceller: Option<Canceller>,
}

impl TickHandle {
    /// Creates a handle that runs `canceller` exactly once when cancelled.
    pub fn new(token: TickToken, canceller: impl FnOnce() + Send + 'static) -> Self {
        Self {
            token,
            canceller: Some(Box::new(canceller)),
        }
    }

    /// The token this handle's ticks carry.
    pub fn token(&self) -> TickToken {
        self.token
    }

    /// Stops the tick.
    pub fn cancel(mut self) {
        self.run_canceller();
    }

    fn run_canceller(&mut self) {
        if let Some(cancel) = self.canceller.take() {
            trace!(generation = self.token.0, "tick cancelled");
            cancel();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.run_canceller();
    }
}

impl std::fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickHandle")
            .field("token", &self.token)
            .field("armed", &self.canceller.is_some())
            .finish()
    }
}

// ============================================================================
// TickScheduler
// ============================================================================

/// Arms repeating ticks for the state machine.
pub trait TickScheduler: Send {
    /// Starts delivering `token` once per period until the handle is cancelled.
    fn schedule(&mut self, token: TickToken) -> TickHandle;
}

/// Scheduler backed by a tokio interval task.
///
/// Each armed tick is a spawned task that sends its token on `tx` every
/// period; the first delivery happens one full period after arming. Must be
/// used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    tx: mpsc::UnboundedSender<TickToken>,
    period: Duration,
}

impl IntervalScheduler {
    /// Creates a scheduler ticking once per second.
    pub fn new(tx: mpsc::UnboundedSender<TickToken>) -> Self {
        Self::with_period(tx, TICK_PERIOD)
    }

    /// Creates a scheduler with a custom period.
    pub fn with_period(tx: mpsc::UnboundedSender<TickToken>, period: Duration) -> Self {
        Self { tx, period }
    }
}

impl TickScheduler for IntervalScheduler {
    fn schedule(&mut self, token: TickToken) -> TickHandle {
        let tx = self.tx.clone();
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if tx.send(token).is_err() {
                    break;
                }
            }
        });

        let abort = task.abort_handle();
        TickHandle::new(token, move || abort.abort())
    }
}

/// Scheduler that only records what was armed. Ticks are delivered by
/// calling the state machine directly.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Debug, Default)]
struct ManualState {
    scheduled: Vec<TickToken>,
    cancelled: HashSet<TickToken>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every token ever armed, oldest first.
    #[must_use]
    pub fn scheduled(&self) -> Vec<TickToken> {
        self.lock().scheduled.clone()
    }

    /// Tokens armed and not yet cancelled.
    #[must_use]
    pub fn active(&self) -> Vec<TickToken> {
        let state = self.lock();
        state
            .scheduled
            .iter()
            .filter(|t| !state.cancelled.contains(*t))
            .copied()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, token: TickToken) -> TickHandle {
        self.lock().scheduled.push(token);
        let inner = Arc::clone(&self.inner);
        TickHandle::new(token, move || {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .cancelled
                .insert(token);
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
