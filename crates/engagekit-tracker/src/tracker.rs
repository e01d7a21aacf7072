//! The tracker orchestrator
//!
//! `Tracker` is the public-facing facade the host application embeds. It
//! owns the model, the availability model, the configuration, the condition
//! validator and the time provider for its entire lifetime; no component is
//! shared across tracker instances.
//!
//! ## Initialization
//!
//! Construction immediately begins the model's asynchronous load. Until it
//! completes, initialization callbacks queue in registration order; on
//! completion each is delivered exactly once via the runtime handle -
//! posted, never inline - and the queue is cleared. The completion closure
//! holds only a weak reference to the tracker's state, so delivery after
//! the tracker has been dropped is a safe no-op.
//!
//! ## Fail-closed
//!
//! If the store fails to load, the engine stays permanently not ready:
//! every `should_trigger_help_ui` returns false and every `notify_event`
//! is dropped. The failure is reported once, through the initialization
//! callbacks (`success=false`), and never retried.

use std::path::Path;
use std::sync::{Arc, Mutex, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info};

use engagekit_core::{
    Configuration, EditableConfiguration, FeatureConfig, FeatureDescriptor, RuleConfiguration,
    RuleSource, SystemTimeProvider, TimeProvider,
};

use crate::availability::{AvailabilityModel, NeverAvailabilityModel};
use crate::lock_or_recover;
use crate::model::{EventModel, Model};
use crate::retention::{ConfigRetentionPolicy, StoreNothingPolicy};
use crate::store::{InMemoryStore, JsonFileStore};
use crate::validator::{ConditionValidator, OnceConditionValidator, RuleConditionValidator};

/// Initialization-completion callback; receives `success`
pub type OnInitializedCallback = Box<dyn FnOnce(bool) + Send + 'static>;

#[derive(Default)]
struct InitState {
    finished: bool,
    success: bool,
    pending: Vec<OnInitializedCallback>,
}

/// The feature-engagement decision engine facade
pub struct Tracker {
    model: Arc<dyn Model>,
    availability_model: Arc<dyn AvailabilityModel>,
    configuration: Arc<dyn Configuration>,
    condition_validator: Mutex<Box<dyn ConditionValidator>>,
    time_provider: Arc<dyn TimeProvider>,
    handle: Handle,
    init: Arc<Mutex<InitState>>,
}

impl Tracker {
    /// Wires the components together and starts model initialization
    pub fn new(
        model: Arc<dyn Model>,
        availability_model: Arc<dyn AvailabilityModel>,
        configuration: Arc<dyn Configuration>,
        condition_validator: Box<dyn ConditionValidator>,
        time_provider: Arc<dyn TimeProvider>,
        handle: Handle,
    ) -> Self {
        let init = Arc::new(Mutex::new(InitState::default()));

        let weak: Weak<Mutex<InitState>> = Arc::downgrade(&init);
        let callback_handle = handle.clone();
        model.initialize(
            Box::new(move |success| {
                // The tracker may already be gone; late delivery is a no-op.
                if let Some(init) = weak.upgrade() {
                    Self::on_model_initialization_finished(&init, &callback_handle, success);
                }
            }),
            time_provider.current_day(),
        );

        Self {
            model,
            availability_model,
            configuration,
            condition_validator: Mutex::new(condition_validator),
            time_provider,
            handle,
            init,
        }
    }

    /// Factory for host registration: storage directory plus a background
    /// execution context
    ///
    /// `demo_mode=true` builds a zero-persistence engine in which every
    /// registered feature is valid and fires at most once; otherwise the
    /// rule source is parsed once and events persist under `storage_dir`.
    pub fn create(
        storage_dir: impl AsRef<Path>,
        handle: Handle,
        features: &[FeatureDescriptor],
        rule_source: &dyn RuleSource,
        demo_mode: bool,
    ) -> engagekit_core::Result<Self> {
        if demo_mode {
            let mut configuration = EditableConfiguration::new();
            for feature in features {
                configuration.set_config(
                    &feature.name,
                    FeatureConfig::valid_with_trigger(format!("{}_trigger", feature.name)),
                );
            }

            let model = EventModel::new(
                Arc::new(InMemoryStore::new()),
                Arc::new(StoreNothingPolicy),
                handle.clone(),
            );

            info!(features = features.len(), "created demo-mode tracker");
            return Ok(Self::new(
                Arc::new(model),
                Arc::new(NeverAvailabilityModel),
                Arc::new(configuration),
                Box::new(OnceConditionValidator::new()),
                Arc::new(SystemTimeProvider),
                handle,
            ));
        }

        let configuration = Arc::new(RuleConfiguration::parse(features, rule_source));
        let retention = Arc::new(ConfigRetentionPolicy::from_configs(
            features,
            configuration.as_ref(),
        ));
        let store = Arc::new(JsonFileStore::new(storage_dir)?);
        let model = EventModel::new(store, retention, handle.clone());

        info!(features = features.len(), "created tracker");
        Ok(Self::new(
            Arc::new(model),
            Arc::new(NeverAvailabilityModel),
            configuration,
            Box::new(RuleConditionValidator::new()),
            Arc::new(SystemTimeProvider),
            handle,
        ))
    }

    fn on_model_initialization_finished(
        init: &Mutex<InitState>,
        handle: &Handle,
        success: bool,
    ) {
        let pending = {
            let mut state = lock_or_recover(init);
            state.finished = true;
            state.success = success;
            std::mem::take(&mut state.pending)
        };

        debug!(success, callbacks = pending.len(), "initialization finished");
        // One task for the whole queue: independent tasks would race on a
        // multithreaded runtime and lose registration order.
        handle.spawn(async move {
            for callback in pending {
                callback(success);
            }
        });
    }

    /// Registers an initialization-completion callback
    ///
    /// Delivered exactly once, asynchronously, in registration order. A
    /// registration after the engine reached its terminal state schedules
    /// delivery of the current state immediately.
    pub fn add_on_initialized_callback(&self, callback: OnInitializedCallback) {
        let mut state = lock_or_recover(&self.init);
        if state.finished {
            let success = state.success;
            drop(state);
            self.handle.spawn(async move { callback(success) });
            return;
        }
        state.pending.push(callback);
    }

    /// Records a usage event for the current day
    ///
    /// Events before readiness are dropped, not queued; callers needing
    /// pre-ready capture must buffer externally.
    pub fn notify_event(&self, event: &str) {
        if !self.is_initialized() {
            debug!(event, "engine not ready, event dropped");
            return;
        }
        self.model
            .increment_event(event, self.time_provider.current_day());
    }

    /// Decides whether the feature's help prompt may show right now
    ///
    /// On success the feature is marked as currently showing and its
    /// trigger event is recorded; the caller must surface the prompt and
    /// later call [`Tracker::dismissed`].
    pub fn should_trigger_help_ui(&self, feature: &str) -> bool {
        if !self.is_initialized() {
            return false;
        }

        let config = self.configuration.feature_config(feature);
        let current_day = self.time_provider.current_day();

        let mut validator = lock_or_recover(&self.condition_validator);
        let result = validator.meets_conditions(
            feature,
            &config,
            self.model.as_ref(),
            self.availability_model.as_ref(),
            current_day,
        );

        if result.satisfied() {
            validator.notify_showing(feature);
            // A valid config without a trigger event is an upstream
            // configuration bug, not a runtime condition.
            debug_assert!(!config.trigger.name.is_empty());
            self.model.increment_event(&config.trigger.name, current_day);
            debug!(feature, "help prompt triggered");
            return true;
        }

        debug!(feature, failed = ?result.failed, "conditions not met");
        false
    }

    /// Clears the feature's "currently showing" state; always a no-op if
    /// nothing was showing, legal in any initialization state
    pub fn dismissed(&self, feature: &str) {
        lock_or_recover(&self.condition_validator).notify_dismissed(feature);
        debug!(feature, "prompt dismissed");
    }

    /// True once the model loaded successfully
    pub fn is_initialized(&self) -> bool {
        self.model.is_ready()
    }
}
