//! Channel-backed subscriber handle.
//!
//! A [`SwitchStream`] is the pull-style counterpart to the callback listener:
//! it registers an internal listener that forwards every notification into a
//! bounded channel. The dispatch side never blocks on a slow consumer; a full
//! stream drops the notification and counts it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::error::{SwitchError, SwitchResult};
use crate::event::SwitchEvent;
use crate::listener::{ListenerHandle, SwitchListener};

use super::poller::Shared;

/// A notification as delivered through a [`SwitchStream`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SwitchNotification {
    /// One detected transition.
    SingleClick(SwitchEvent),
    /// A flushed click sequence, in detection order.
    ClickSequence(Vec<SwitchEvent>),
}

/// The registry-side half of a subscription: a listener that forwards into
/// the stream's channel without ever blocking the dispatch thread.
pub(crate) struct StreamListener {
    tx: Sender<SwitchNotification>,
    dropped: Arc<AtomicU64>,
}

impl StreamListener {
    /// Builds a connected listener/stream pair with the given buffer
    /// capacity.
    pub(crate) fn pair(capacity: usize, shared: Weak<Shared>) -> (Arc<Self>, SwitchStream) {
        let (tx, rx) = bounded::<SwitchNotification>(capacity.max(1));
        let dropped = Arc::new(AtomicU64::new(0));

        let listener = Arc::new(Self {
            tx,
            dropped: Arc::clone(&dropped),
        });

        let stream = SwitchStream {
            rx,
            listener: Arc::downgrade(&listener),
            shared,
            dropped,
            unsubscribed: AtomicBool::new(false),
        };

        (listener, stream)
    }

    fn forward(&self, notification: SwitchNotification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl SwitchListener for StreamListener {
    fn on_single_click(&self, event: SwitchEvent) {
        self.forward(SwitchNotification::SingleClick(event));
    }

    fn on_click_sequence(&self, events: Vec<SwitchEvent>) {
        self.forward(SwitchNotification::ClickSequence(events));
    }
}

/// The receiving end of a detector subscription.
///
/// Obtained from [`SwitchDetector::subscribe`](crate::SwitchDetector::subscribe).
/// Dropping the stream attempts best-effort unregistration; once the
/// detector (or the stream's registry entry) is gone, receives report
/// [`SwitchError::Disconnected`].
pub struct SwitchStream {
    rx: Receiver<SwitchNotification>,
    // Weak on purpose: only the registry keeps the sending side alive, so
    // removing the listener (or dropping the detector) disconnects `rx`.
    listener: Weak<StreamListener>,
    shared: Weak<Shared>,
    dropped: Arc<AtomicU64>,
    unsubscribed: AtomicBool,
}

impl SwitchStream {
    /// Receives the next notification, blocking until one arrives.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchError::Disconnected`] once the sending side is gone.
    pub fn recv(&self) -> SwitchResult<SwitchNotification> {
        self.rx.recv().map_err(|_| SwitchError::Disconnected {
            path: "switch_stream".to_string(),
        })
    }

    /// Receives the next notification, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchError::Timeout`] when nothing arrived in time and
    /// [`SwitchError::Disconnected`] once the sending side is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> SwitchResult<SwitchNotification> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => SwitchError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            RecvTimeoutError::Disconnected => SwitchError::Disconnected {
                path: "switch_stream".to_string(),
            },
        })
    }

    /// Receives a notification only if one is already buffered.
    #[must_use]
    pub fn try_recv(&self) -> Option<SwitchNotification> {
        self.rx.try_recv().ok()
    }

    /// Notifications dropped because this stream's buffer was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Best-effort explicit unregistration.
    ///
    /// Idempotent. Already-buffered notifications remain receivable; the
    /// stream disconnects once in-flight dispatches have finished.
    pub fn unsubscribe(&self) {
        if self.unsubscribed.swap(true, Ordering::AcqRel) {
            return;
        }

        let (Some(shared), Some(listener)) = (self.shared.upgrade(), self.listener.upgrade())
        else {
            return;
        };

        let handle: ListenerHandle = listener;
        if let Ok(mut registry) = shared.listeners.write() {
            registry.remove(&handle);
        };
    }
}

impl Drop for SwitchStream {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for SwitchStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchStream")
            .field("buffered", &self.rx.len())
            .field("dropped", &self.dropped())
            .finish()
    }
}
