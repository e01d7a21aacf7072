//! # EngageKit Tracker
//!
//! The feature-engagement decision engine proper: event storage backends,
//! the async-initialized event model, availability and retention policies,
//! condition validators, and the `Tracker` orchestrator the host embeds.
//!
//! ## Key Components
//!
//! - **EventStore**: The trait all storage backends implement, plus the
//!   in-memory and JSON-file backends
//! - **Model**: Owns event-count state; loads asynchronously and reports
//!   readiness exactly once
//! - **ConditionValidator**: Pure rule evaluation with full failed-rule
//!   reporting, in per-session and one-shot variants
//! - **Tracker**: The public facade; serializes initialization and exposes
//!   `notify_event` / `should_trigger_help_ui` / `dismissed`
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use engagekit_tracker::Tracker;
//!
//! let tracker = Tracker::create(storage_dir, handle, features, &rules, false)?;
//! tracker.add_on_initialized_callback(Box::new(|success| {
//!     tracing::info!(success, "engagement engine ready");
//! }));
//! ```

pub use availability::{AvailabilityModel, FixedAvailabilityModel, NeverAvailabilityModel};
pub use model::{EventModel, Model, OnLoadedCallback};
pub use retention::{ConfigRetentionPolicy, RetentionPolicy, StoreNothingPolicy};
pub use store::{EventStore, InMemoryStore, JsonFileStore};
pub use tracker::{OnInitializedCallback, Tracker};
pub use validator::{
    ConditionValidator, ConditionsResult, OnceConditionValidator, RuleConditionValidator, RuleKind,
};

mod availability;
mod model;
mod retention;
mod store;
mod tracker;
mod validator;

use std::sync::{Mutex, MutexGuard};

/// Locks a mutex, recovering the inner state if a previous holder panicked
///
/// The engine's interior state stays consistent across a poisoned lock
/// because every critical section is a plain field update.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
