//! Per-tick detection state machine.
//!
//! The sampler is the thread-free core of the detector: given the current
//! time and the raw edge signal for one tick, it decides whether the tick
//! produced a click, flushed a click sequence, or did nothing. The poll
//! worker owns one sampler and feeds it the real clock; tests feed it
//! simulated clocks.

use crate::event::{SwitchEvent, SwitchPosition};

/// What a single tick produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A transition was detected this tick.
    Click(SwitchEvent),
    /// A quiet gap elapsed; the accumulated sequence is handed out and the
    /// buffer is empty afterwards.
    Flush(Vec<SwitchEvent>),
    /// Nothing happened.
    Idle,
}

/// Detection state: latest event, in-flight sequence buffer, quiet gap.
///
/// Mutated only by whoever drives [`tick`](Sampler::tick); the poll worker is
/// the single writer in the threaded detector.
#[derive(Debug)]
pub struct Sampler {
    latest: SwitchEvent,
    buffer: Vec<SwitchEvent>,
    quiet_gap_ms: u64,
}

impl Sampler {
    /// Creates a sampler with the given quiet gap in milliseconds.
    #[must_use]
    pub fn new(quiet_gap_ms: u64) -> Self {
        Self {
            latest: SwitchEvent::sentinel(),
            buffer: Vec::new(),
            quiet_gap_ms,
        }
    }

    /// The most recent event, or the sentinel before any detection.
    #[must_use]
    pub const fn latest(&self) -> SwitchEvent {
        self.latest
    }

    /// Number of events accumulated since the last flush.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Updates the quiet gap. Validation against the tick interval happens
    /// at the detector layer; the sampler applies whatever it is given.
    pub fn set_quiet_gap_ms(&mut self, quiet_gap_ms: u64) {
        self.quiet_gap_ms = quiet_gap_ms;
    }

    /// Runs one tick of the detection state machine.
    ///
    /// `now_ms` is the current time in epoch milliseconds; `transition` is
    /// the raw edge signal sampled from the input source for this tick.
    ///
    /// Timestamps are clamped so they never decrease across events, which
    /// keeps `delta >= 0` even if the wall clock steps backwards.
    pub fn tick(&mut self, now_ms: i64, transition: Option<SwitchPosition>) -> TickOutcome {
        if let Some(position) = transition {
            let now_ms = now_ms.max(self.latest.timestamp);
            let delta = if self.latest.is_sentinel() {
                0
            } else {
                now_ms - self.latest.timestamp
            };

            let event = SwitchEvent::new(now_ms, delta, position);
            self.latest = event;
            self.buffer.push(event);
            return TickOutcome::Click(event);
        }

        if !self.buffer.is_empty() && now_ms - self.latest.timestamp > self.quiet_gap_ms as i64 {
            return TickOutcome::Flush(std::mem::take(&mut self.buffer));
        }

        TickOutcome::Idle
    }
}
