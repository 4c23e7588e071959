//! Timer module for Atomic Pomodoro.
//!
//! This module contains the session countdown:
//! - `engine`: state machine with transitions, ticking and completion
//! - `ticker`: one-second repeating tick sources
//! - `error`: rejected transitions and store failures

pub mod engine;
pub mod error;
pub mod ticker;

pub use engine::{TimerEvent, TimerMachine};
pub use error::TimerError;
pub use ticker::{IntervalScheduler, ManualScheduler, TickHandle, TickScheduler, TickToken};
