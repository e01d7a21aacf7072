//! The event model: in-memory usage history with async initialization
//!
//! `EventModel` owns the engine's event-count state. It loads history from
//! an `EventStore` on a background task, prunes it through the retention
//! policy, and from then on serves synchronous reads and writes from
//! memory, write-through persisting each increment in the background.
//!
//! ## Readiness contract
//!
//! `initialize` is legal exactly once per instance. The completion callback
//! is delivered exactly once, always from the spawned task - never inline -
//! so callers can register state before the current turn ends. A load
//! failure leaves the model permanently not ready and the engine fails
//! closed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

use engagekit_core::Event;

use crate::lock_or_recover;
use crate::retention::RetentionPolicy;
use crate::store::EventStore;

/// Initialization-completion callback; receives `success`
pub type OnLoadedCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Owns event-count storage; async load, readiness query, increments
pub trait Model: Send + Sync {
    /// Begins the asynchronous load from the backing store
    ///
    /// Exactly one invocation is legal per instance. `on_loaded` is
    /// delivered exactly once, asynchronously, even if the underlying
    /// store is already available.
    fn initialize(&self, on_loaded: OnLoadedCallback, current_day: u32);

    /// True only after `on_loaded` has fired with success
    fn is_ready(&self) -> bool;

    /// Increments the bucket for `(name, day)`, creating it if absent
    ///
    /// Precondition: the caller gates this behind `is_ready`.
    fn increment_event(&self, name: &str, day: u32);

    /// Returns the stored record for `name`, if any
    fn event(&self, name: &str) -> Option<Event>;

    /// Sums the counts for `name` within the window ending at `current_day`
    fn event_count(&self, name: &str, current_day: u32, window_days: u32) -> u32 {
        self.event(name)
            .map(|event| event.count_in_window(current_day, window_days))
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

struct ModelState {
    phase: Phase,
    events: HashMap<String, Event>,
}

/// Production model over a pluggable store and retention policy
pub struct EventModel {
    store: Arc<dyn EventStore>,
    retention: Arc<dyn RetentionPolicy>,
    handle: Handle,
    state: Arc<Mutex<ModelState>>,
}

impl EventModel {
    pub fn new(
        store: Arc<dyn EventStore>,
        retention: Arc<dyn RetentionPolicy>,
        handle: Handle,
    ) -> Self {
        Self {
            store,
            retention,
            handle,
            state: Arc::new(Mutex::new(ModelState {
                phase: Phase::Uninitialized,
                events: HashMap::new(),
            })),
        }
    }
}

impl Model for EventModel {
    fn initialize(&self, on_loaded: OnLoadedCallback, current_day: u32) {
        {
            let mut state = lock_or_recover(&self.state);
            if state.phase != Phase::Uninitialized {
                debug_assert!(false, "EventModel::initialize called twice");
                warn!("ignoring duplicate model initialization");
                return;
            }
            state.phase = Phase::Initializing;
        }

        let store = self.store.clone();
        let retention = self.retention.clone();
        let state = self.state.clone();

        self.handle.spawn(async move {
            match store.load().await {
                Ok(loaded) => {
                    let mut kept = 0usize;
                    let mut guard = lock_or_recover(&state);
                    for mut event in loaded {
                        if !retention.should_store(&event.name) {
                            continue;
                        }
                        let name = event.name.clone();
                        event.prune(|day| {
                            retention.should_keep(&name, current_day.saturating_sub(day))
                        });
                        if !event.is_empty() {
                            kept += 1;
                            guard.events.insert(name, event);
                        }
                    }
                    guard.phase = Phase::Ready;
                    drop(guard);

                    info!(events = kept, "event model ready");
                    on_loaded(true);
                }
                Err(err) => {
                    lock_or_recover(&state).phase = Phase::Failed;
                    warn!(%err, "event store failed to load, engine fails closed");
                    on_loaded(false);
                }
            }
        });
    }

    fn is_ready(&self) -> bool {
        lock_or_recover(&self.state).phase == Phase::Ready
    }

    fn increment_event(&self, name: &str, day: u32) {
        if !self.retention.should_store(name) {
            trace!(event = name, "event not configured for storage, dropped");
            return;
        }

        let event = {
            let mut state = lock_or_recover(&self.state);
            if state.phase != Phase::Ready {
                debug_assert!(false, "increment_event before readiness");
                return;
            }
            let event = state
                .events
                .entry(name.to_string())
                .or_insert_with(|| Event::new(name));
            event.record(day);
            event.clone()
        };
        debug!(event = name, day, "event recorded");

        // Write-through persistence is decoupled from the call's return;
        // a failed write only costs history, never correctness.
        let store = self.store.clone();
        self.handle.spawn(async move {
            if let Err(err) = store.write_event(event).await {
                warn!(%err, "failed to persist event");
            }
        });
    }

    fn event(&self, name: &str) -> Option<Event> {
        lock_or_recover(&self.state).events.get(name).cloned()
    }
}
