//! Timer state machine error types.

use thiserror::Error;

use crate::store::StoreError;
use crate::types::RunState;

/// Errors returned by [`TimerMachine`](super::TimerMachine) operations.
///
/// A failed operation leaves the timer state untouched.
#[derive(Debug, Error)]
pub enum TimerError {
    /// The operation is not valid in the current run state.
    #[error("cannot {operation} while the timer is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: RunState,
    },

    /// Reading the configured durations failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Nobody is listening for timer events any more.
    #[error("timer event receiver has been dropped")]
    ChannelClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let err = TimerError::InvalidTransition {
            operation: "pause",
            state: RunState::Idle,
        };
        assert_eq!(err.to_string(), "cannot pause while the timer is idle");
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err = TimerError::from(StoreError::NoConfigDir);
        assert_eq!(err.to_string(), StoreError::NoConfigDir.to_string());
        assert!(!matches!(err, TimerError::InvalidTransition { .. }));
    }
}
