//! Switch event value types.
//!
//! A [`SwitchEvent`] records one observed transition of the switch: when it
//! happened, how long after the previous transition, and which position the
//! switch resolved to. Events are created by the detector's tick loop and are
//! immutable afterwards.

use serde::{Deserialize, Serialize};

/// The resolved position of the switch at a transition.
///
/// `Unknown` is the sentinel used before any detection has occurred, and the
/// value an input source reports when the raw signal cannot be classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchPosition {
    /// The lower switch half is pressed down.
    Down,
    /// The upper switch half is pressed down.
    Up,
    /// The position is unknown or there is no fitting category.
    #[default]
    Unknown,
}

impl std::fmt::Display for SwitchPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Down => write!(f, "down"),
            Self::Up => write!(f, "up"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One detected switch transition.
///
/// Within a single detector instance, `timestamp` is non-decreasing across
/// successively created events and `delta` is never negative.
///
/// # Examples
///
/// ```
/// use switchwatch::SwitchEvent;
///
/// let event = SwitchEvent::sentinel();
/// assert!(event.is_sentinel());
/// assert_eq!(event.timestamp, 0);
/// assert_eq!(event.delta, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwitchEvent {
    /// Epoch milliseconds when the transition was observed.
    pub timestamp: i64,

    /// Milliseconds elapsed since the previous event's timestamp.
    ///
    /// `0` for the first event a detector ever produces.
    pub delta: i64,

    /// The switch position this transition resolved to.
    pub position: SwitchPosition,
}

impl SwitchEvent {
    /// Creates a new event.
    #[must_use]
    pub const fn new(timestamp: i64, delta: i64, position: SwitchPosition) -> Self {
        Self {
            timestamp,
            delta,
            position,
        }
    }

    /// The placeholder event returned before any transition has been detected.
    #[must_use]
    pub const fn sentinel() -> Self {
        Self {
            timestamp: 0,
            delta: 0,
            position: SwitchPosition::Unknown,
        }
    }

    /// Whether this is the pre-detection placeholder.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        *self == Self::sentinel()
    }
}

impl Default for SwitchEvent {
    fn default() -> Self {
        Self::sentinel()
    }
}

impl std::fmt::Display for SwitchEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}ms (+{}ms)",
            self.position, self.timestamp, self.delta
        )
    }
}
