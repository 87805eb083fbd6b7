//! Input collaborator contract.
//!
//! The detector never reads hardware itself; it calls a [`SwitchSource`] once
//! per tick and treats the answer as an opaque edge signal. How raw pin state
//! maps to transitions and positions is the embedding system's concern.

use crate::event::SwitchPosition;

/// A source of raw switch transitions, sampled once per tick.
///
/// Implementations must return quickly: the sample executes inside the tick,
/// so a long-blocking read delays every subsequent tick.
pub trait SwitchSource: Send {
    /// Samples the switch once.
    ///
    /// Returns `None` when no transition occurred this tick, or the resolved
    /// position of a detected transition ([`SwitchPosition::Unknown`] when the
    /// source cannot classify it).
    fn poll_transition(&mut self) -> Option<SwitchPosition>;
}

impl<F> SwitchSource for F
where
    F: FnMut() -> Option<SwitchPosition> + Send,
{
    fn poll_transition(&mut self) -> Option<SwitchPosition> {
        self()
    }
}

/// A source that never reports a transition.
///
/// Stands in for hardware that has not been wired up yet, so a detector can
/// be constructed and exercised without a real pin reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleSource;

impl SwitchSource for IdleSource {
    fn poll_transition(&mut self) -> Option<SwitchPosition> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_source_never_fires() {
        let mut source = IdleSource;
        for _ in 0..100 {
            assert!(source.poll_transition().is_none());
        }
    }

    #[test]
    fn test_closure_source() {
        let mut remaining = 2;
        let mut source = move || {
            if remaining > 0 {
                remaining -= 1;
                Some(SwitchPosition::Down)
            } else {
                None
            }
        };

        assert_eq!(source.poll_transition(), Some(SwitchPosition::Down));
        assert_eq!(source.poll_transition(), Some(SwitchPosition::Down));
        assert_eq!(source.poll_transition(), None);
    }
}
