//! # switchwatch - debounced, sequence-aware switch input
//!
//! switchwatch polls a binary hardware input at a fixed interval, converts
//! raw transitions into timestamped events, and distinguishes two behaviors:
//! a single toggle versus a rapid burst of toggles separated by quiet gaps.
//! It is an in-process library component; the hardware read itself is
//! supplied by the embedder through the [`SwitchSource`] contract.
//!
//! ## Core concepts
//!
//! - **[`SwitchEvent`]**: immutable record of one detected transition
//!   (timestamp, delta to the previous event, resolved position)
//! - **[`SwitchListener`]**: capability a consumer implements to receive
//!   single-click and click-sequence callbacks
//! - **[`SwitchDetector`]**: owns the polling loop, transition state,
//!   sequence buffer, and listener registry
//! - **[`SwitchStream`]**: pull-style subscription over a bounded channel
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use switchwatch::{SwitchDetector, SwitchEvent, SwitchListener};
//!
//! struct MorseDecoder;
//!
//! impl SwitchListener for MorseDecoder {
//!     fn on_single_click(&self, event: SwitchEvent) {
//!         // One toggle; event.delta separates dots from dashes.
//!     }
//!     fn on_click_sequence(&self, events: Vec<SwitchEvent>) {
//!         // A burst ended: decode the whole letter.
//!     }
//! }
//!
//! let detector = SwitchDetector::new(my_gpio_source);
//! detector.add_listener(Arc::new(MorseDecoder));
//! detector.start();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod detector;
pub mod error;
pub mod event;
pub mod listener;
pub mod source;

// Re-export primary types at crate root for convenience
pub use detector::{
    DetectorConfig, Sampler, SwitchDetector, SwitchNotification, SwitchStream, TickOutcome,
    DEFAULT_QUIET_GAP, DEFAULT_TICK_INTERVAL,
};
pub use error::{SwitchError, SwitchResult};
pub use event::{SwitchEvent, SwitchPosition};
pub use listener::{ListenerHandle, ListenerRegistry, SwitchListener};
pub use source::{IdleSource, SwitchSource};
