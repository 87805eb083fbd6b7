//! Listener contract and registry.
//!
//! Listeners receive two kinds of callback: one per detected transition, and
//! one per flushed click sequence. Every invocation runs on its own dispatch
//! thread, so implementations must be `Send + Sync` and may not rely on any
//! ordering relative to other listeners.

use std::sync::Arc;

use crate::event::SwitchEvent;

/// A registered listener handle.
pub type ListenerHandle = Arc<dyn SwitchListener>;

/// Receiver of switch notifications.
///
/// Callbacks are fire-and-forget: the detector hands each invocation to its
/// own thread and never awaits it, so a slow or panicking listener cannot
/// stall the tick loop or other listeners. A listener is responsible for its
/// own error handling.
pub trait SwitchListener: Send + Sync {
    /// Called once for every detected transition.
    fn on_single_click(&self, event: SwitchEvent);

    /// Called once a quiet gap has elapsed after one or more transitions,
    /// with a snapshot of all events accumulated since the previous flush,
    /// in detection order.
    fn on_click_sequence(&self, events: Vec<SwitchEvent>);
}

/// Insertion-ordered collection of listener handles.
///
/// No uniqueness is enforced: the same handle may be registered twice and
/// will then be notified twice. Removal is by handle identity and deletes
/// the first matching entry.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: Vec<ListenerHandle>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener.
    pub fn add(&mut self, listener: ListenerHandle) {
        self.entries.push(listener);
    }

    /// Removes the first entry that is the same allocation as `listener`.
    ///
    /// Returns `false` without side effects when no such entry exists.
    pub fn remove(&mut self, listener: &ListenerHandle) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| Arc::ptr_eq(entry, listener))
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Clones the current handles, in registration order.
    ///
    /// Dispatch works off this snapshot so the live registry can change
    /// concurrently without affecting in-flight notifications.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ListenerHandle> {
        self.entries.clone()
    }

    /// Number of registered listeners, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SwitchPosition;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        clicks: AtomicUsize,
    }

    impl Counting {
        fn handle() -> Arc<Self> {
            Arc::new(Self {
                clicks: AtomicUsize::new(0),
            })
        }
    }

    impl SwitchListener for Counting {
        fn on_single_click(&self, _event: SwitchEvent) {
            self.clicks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_click_sequence(&self, _events: Vec<SwitchEvent>) {}
    }

    #[test]
    fn test_add_and_remove_by_identity() {
        let mut registry = ListenerRegistry::new();
        let a = Counting::handle();
        let b = Counting::handle();

        let a_handle: ListenerHandle = a.clone();
        let b_handle: ListenerHandle = b;

        registry.add(a_handle.clone());
        assert_eq!(registry.len(), 1);

        // b was never added.
        assert!(!registry.remove(&b_handle));
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(&a_handle));
        assert!(registry.is_empty());

        // Second removal misses.
        assert!(!registry.remove(&a_handle));
    }

    #[test]
    fn test_duplicates_allowed_and_removed_one_at_a_time() {
        let mut registry = ListenerRegistry::new();
        let listener: ListenerHandle = Counting::handle();

        registry.add(listener.clone());
        registry.add(listener.clone());
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(&listener));
        assert_eq!(registry.len(), 1);
        assert!(registry.remove(&listener));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut registry = ListenerRegistry::new();
        registry.add(Counting::handle());
        registry.add(Counting::handle());
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut registry = ListenerRegistry::new();
        let counting = Counting::handle();
        registry.add(counting.clone());

        let snapshot = registry.snapshot();
        registry.clear();

        // The snapshot still notifies even though the registry is empty.
        for listener in &snapshot {
            listener.on_single_click(SwitchEvent::new(1, 0, SwitchPosition::Down));
        }
        assert_eq!(counting.clicks.load(Ordering::SeqCst), 1);
    }
}
