//! Switch detection subsystem.
//!
//! The detector splits into a pure per-tick state machine ([`Sampler`]), the
//! poll worker that drives it against the real clock ([`SwitchDetector`]),
//! and a channel-backed subscriber handle ([`SwitchStream`]) for consumers
//! who prefer pulling notifications over implementing callbacks.

/// Poll worker and public detector API.
pub mod poller;
/// Per-tick detection state machine.
pub mod sampler;
/// Channel-backed subscriber handle.
pub mod stream;

pub use poller::{
    DetectorConfig, SwitchDetector, DEFAULT_QUIET_GAP, DEFAULT_TICK_INTERVAL,
};
pub use sampler::{Sampler, TickOutcome};
pub use stream::{SwitchNotification, SwitchStream};
