//! Poll worker and public detector API.
//!
//! [`SwitchDetector`] owns a dedicated worker thread that runs the tick loop
//! at a fixed rate: sample the input source, advance the [`Sampler`], and
//! hand any resulting notification to per-listener dispatch threads. The
//! worker is the single writer of detection state; the public API only reads
//! it (or mutates the listener registry and quiet gap behind locks).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};

use crate::event::SwitchEvent;
use crate::listener::{ListenerHandle, ListenerRegistry};
use crate::source::SwitchSource;

use super::sampler::{Sampler, TickOutcome};
use super::stream::{StreamListener, SwitchStream};

/// Default interval between input samples.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Default quiet gap that ends a click sequence.
pub const DEFAULT_QUIET_GAP: Duration = Duration::from_millis(500);

/// Detector configuration.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Interval between input samples. Fixed for the detector's lifetime.
    pub tick_interval: Duration,
    /// Minimum idle duration after which a buffered sequence is flushed.
    /// Must exceed `tick_interval` or sequence detection degrades to
    /// single-click-only.
    pub quiet_gap: Duration,
    /// Per-subscription stream buffer capacity.
    pub stream_capacity: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            quiet_gap: DEFAULT_QUIET_GAP,
            stream_capacity: 1024,
        }
    }
}

/// State shared between the public API, the poll worker, and streams.
///
/// The sampler outlives the worker thread so that stopping the detector
/// keeps buffered events and the latest event intact across a restart.
pub(crate) struct Shared {
    pub(crate) listeners: RwLock<ListenerRegistry>,
    sampler: Mutex<Sampler>,
    quiet_gap_ms: AtomicU64,
    dropped_dispatches: AtomicU64,
}

struct Worker {
    shutdown_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Debounced, sequence-aware polling detector for a single switch.
///
/// The detector samples its [`SwitchSource`] every tick and notifies
/// registered [`SwitchListener`](crate::SwitchListener)s of two scenarios:
///
/// - **Single click**: fired once per detected transition.
/// - **Click sequence**: fired once the quiet gap has elapsed after the last
///   transition, carrying every event accumulated since the previous flush.
///
/// [`start`](Self::start) must be called once to begin measuring. Each
/// listener invocation runs on its own thread and is never awaited, so a
/// slow listener cannot stall the tick loop.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use switchwatch::{SwitchDetector, SwitchEvent, SwitchListener};
///
/// struct Printer;
///
/// impl SwitchListener for Printer {
///     fn on_single_click(&self, event: SwitchEvent) {
///         println!("click: {event}");
///     }
///     fn on_click_sequence(&self, events: Vec<SwitchEvent>) {
///         println!("sequence of {}", events.len());
///     }
/// }
///
/// let detector = SwitchDetector::new(my_gpio_source);
/// detector.add_listener(Arc::new(Printer));
/// detector.start();
/// ```
pub struct SwitchDetector {
    shared: Arc<Shared>,
    source: Arc<Mutex<dyn SwitchSource>>,
    tick_interval: Duration,
    stream_capacity: usize,
    worker: Mutex<Option<Worker>>,
}

impl SwitchDetector {
    /// Creates a detector with the default configuration.
    pub fn new<S: SwitchSource + 'static>(source: S) -> Self {
        Self::with_config(source, DetectorConfig::default())
    }

    /// Creates a detector with an explicit configuration.
    ///
    /// Out-of-range values are clamped rather than rejected: the tick
    /// interval to at least 1ms, the quiet gap to strictly more than the
    /// tick interval, and the stream capacity to at least 1.
    pub fn with_config<S: SwitchSource + 'static>(source: S, config: DetectorConfig) -> Self {
        let tick_interval = config.tick_interval.max(Duration::from_millis(1));
        let quiet_gap = if config.quiet_gap > tick_interval {
            config.quiet_gap
        } else {
            tick_interval + Duration::from_millis(1)
        };
        let quiet_gap_ms = duration_ms(quiet_gap);

        Self {
            shared: Arc::new(Shared {
                listeners: RwLock::new(ListenerRegistry::new()),
                sampler: Mutex::new(Sampler::new(quiet_gap_ms)),
                quiet_gap_ms: AtomicU64::new(quiet_gap_ms),
                dropped_dispatches: AtomicU64::new(0),
            }),
            source: Arc::new(Mutex::new(source)),
            tick_interval,
            stream_capacity: config.stream_capacity.max(1),
            worker: Mutex::new(None),
        }
    }

    /// Starts the measurement process.
    ///
    /// Spawns the poll worker, which ticks immediately and then at a fixed
    /// rate of one sample per tick interval. Does nothing if the detector is
    /// already running.
    pub fn start(&self) {
        let mut worker = lock_unpoisoned(&self.worker);
        if worker.is_some() {
            return;
        }

        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let shared = Arc::clone(&self.shared);
        let source = Arc::clone(&self.source);
        let tick_interval = self.tick_interval;

        let handle = thread::Builder::new()
            .name("switchwatch-poll".to_string())
            .spawn(move || {
                let mut deadline = Instant::now();

                loop {
                    match shutdown_rx.recv_deadline(deadline) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }

                    run_tick(&shared, &source);

                    // Fixed-rate schedule; if a tick overran, resume from now
                    // instead of firing a burst of catch-up ticks.
                    deadline += tick_interval;
                    let now = Instant::now();
                    if deadline < now {
                        deadline = now;
                    }
                }
            })
            .expect("failed to spawn switchwatch poll worker");

        *worker = Some(Worker {
            shutdown_tx,
            handle,
        });
    }

    /// Stops the measurement process.
    ///
    /// Cancels tick scheduling and joins the poll worker. Buffered events and
    /// registered listeners are kept; outstanding dispatch threads are not
    /// tracked or awaited. Does nothing if the detector is not running.
    pub fn stop(&self) {
        let worker = lock_unpoisoned(&self.worker).take();
        if let Some(worker) = worker {
            drop(worker.shutdown_tx);
            let _ = worker.handle.join();
        }
    }

    /// Whether a measurement process is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        lock_unpoisoned(&self.worker).is_some()
    }

    /// Sets the quiet gap that ends a click sequence.
    ///
    /// Accepted only when strictly greater than the tick interval; otherwise
    /// returns `false` and the prior value is retained. Takes effect on the
    /// next tick, without a restart.
    pub fn set_quiet_gap(&self, quiet_gap: Duration) -> bool {
        if quiet_gap > self.tick_interval {
            self.shared
                .quiet_gap_ms
                .store(duration_ms(quiet_gap), Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// The current quiet gap.
    #[must_use]
    pub fn quiet_gap(&self) -> Duration {
        Duration::from_millis(self.shared.quiet_gap_ms.load(Ordering::Relaxed))
    }

    /// The fixed interval between input samples.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// The latest detected event, or [`SwitchEvent::sentinel`] before any
    /// detection.
    #[must_use]
    pub fn latest_event(&self) -> SwitchEvent {
        lock_unpoisoned(&self.shared.sampler).latest()
    }

    /// Number of events accumulated since the last sequence flush.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        lock_unpoisoned(&self.shared.sampler).pending()
    }

    /// Registers a listener. The detector must be started to detect events.
    pub fn add_listener(&self, listener: ListenerHandle) {
        write_unpoisoned(&self.shared.listeners, |registry| registry.add(listener));
    }

    /// Removes the given listener.
    ///
    /// Returns `false` when no entry with the same identity is registered.
    pub fn remove_listener(&self, listener: &ListenerHandle) -> bool {
        write_unpoisoned(&self.shared.listeners, |registry| {
            registry.remove(listener)
        })
    }

    /// Removes all listeners.
    pub fn remove_all_listeners(&self) {
        write_unpoisoned(&self.shared.listeners, ListenerRegistry::clear);
    }

    /// Number of registered listeners, duplicates included.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        read_unpoisoned(&self.shared.listeners, ListenerRegistry::len)
    }

    /// Registers a channel-backed subscriber and returns its receiving end.
    ///
    /// The stream buffers up to the configured capacity; notifications for a
    /// full stream are dropped, never blocking the dispatch side.
    #[must_use]
    pub fn subscribe(&self) -> SwitchStream {
        let (listener, stream) =
            StreamListener::pair(self.stream_capacity, Arc::downgrade(&self.shared));
        self.add_listener(listener);
        stream
    }

    /// Notifications abandoned because a dispatch thread could not be
    /// spawned.
    #[must_use]
    pub fn dropped_dispatches(&self) -> u64 {
        self.shared.dropped_dispatches.load(Ordering::Relaxed)
    }
}

impl Drop for SwitchDetector {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SwitchDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchDetector")
            .field("tick_interval", &self.tick_interval)
            .field("quiet_gap", &self.quiet_gap())
            .field("running", &self.is_running())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// One iteration of the tick loop: sample, advance the state machine,
/// dispatch.
fn run_tick(shared: &Arc<Shared>, source: &Arc<Mutex<dyn SwitchSource>>) {
    let transition = lock_unpoisoned(source).poll_transition();

    let outcome = {
        let mut sampler = lock_unpoisoned(&shared.sampler);
        sampler.set_quiet_gap_ms(shared.quiet_gap_ms.load(Ordering::Relaxed));
        sampler.tick(Utc::now().timestamp_millis(), transition)
    };

    match outcome {
        TickOutcome::Click(event) => {
            dispatch(shared, move |listener| listener.on_single_click(event));
        }
        TickOutcome::Flush(events) => {
            dispatch(shared, move |listener| {
                listener.on_click_sequence(events.clone());
            });
        }
        TickOutcome::Idle => {}
    }
}

/// Hands one notification to every registered listener, each on its own
/// thread. Threads are deliberately detached; listener faults stay inside
/// the listener's thread and can never reach the tick loop.
fn dispatch<F>(shared: &Arc<Shared>, notify: F)
where
    F: Fn(&ListenerHandle) + Send + Sync + 'static,
{
    let snapshot = read_unpoisoned(&shared.listeners, ListenerRegistry::snapshot);

    let notify = Arc::new(notify);
    for listener in snapshot {
        let notify = Arc::clone(&notify);
        let spawned = thread::Builder::new()
            .name("switchwatch-dispatch".to_string())
            .spawn(move || (*notify)(&listener));

        if spawned.is_err() {
            shared.dropped_dispatches.fetch_add(1, Ordering::Relaxed);
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// Poisoning can only originate from a panic inside one of these short,
// non-panicking critical sections; recover the guard rather than propagate
// a poison error through an API that is defined never to fail.

fn lock_unpoisoned<T: ?Sized>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn read_unpoisoned<T, R>(lock: &RwLock<T>, f: impl FnOnce(&T) -> R) -> R {
    let guard = lock
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    f(&guard)
}

fn write_unpoisoned<T, R>(lock: &RwLock<T>, f: impl FnOnce(&mut T) -> R) -> R {
    let mut guard = lock
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    f(&mut guard)
}
