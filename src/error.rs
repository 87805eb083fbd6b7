//! Error types for switchwatch.
//!
//! The taxonomy is deliberately small: rejected configuration and missed
//! listener removals are reported through boolean results, and lifecycle
//! calls in the wrong state are silent no-ops. Only stream reception can
//! genuinely fail.

use thiserror::Error;

/// Errors surfaced by a [`SwitchStream`](crate::SwitchStream).
#[derive(Debug, Error)]
pub enum SwitchError {
    /// The sending side is gone, typically because the detector was dropped
    /// or the stream was unsubscribed.
    #[error("Channel disconnected: {path}")]
    Disconnected {
        /// Which channel disconnected.
        path: String,
    },

    /// No notification arrived within the requested window.
    #[error("Receive timed out after {duration_ms}ms")]
    Timeout {
        /// The elapsed timeout, in milliseconds.
        duration_ms: u64,
    },
}

/// Result type alias for switchwatch operations.
pub type SwitchResult<T> = Result<T, SwitchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SwitchError::Disconnected {
            path: "stream".to_string(),
        };
        assert_eq!(format!("{err}"), "Channel disconnected: stream");

        let err = SwitchError::Timeout { duration_ms: 250 };
        assert_eq!(format!("{err}"), "Receive timed out after 250ms");
    }
}
