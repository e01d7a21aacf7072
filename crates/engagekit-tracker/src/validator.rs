//! Condition validators
//!
//! The pure decision layer: given a feature's configuration, the event
//! model, the availability model and the current day, decide whether the
//! help prompt may show, and report which rules failed.
//!
//! ## Design Philosophy
//!
//! Every rule is evaluated - there is no short-circuiting - so the result
//! always carries the complete set of failed rules for diagnostics. The
//! single exception is an invalid configuration, which makes the remaining
//! per-event rules meaningless; session-state rules are still reported
//! alongside it.
//!
//! Two variants exist:
//! - **RuleConditionValidator** - production: full rule evaluation plus
//!   "one prompt at a time" session exclusivity
//! - **OnceConditionValidator** - demo: each feature may pass at most once,
//!   ever, regardless of usage counts

use std::collections::{BTreeSet, HashSet};

use engagekit_core::{ComparatorOp, FeatureConfig};

use crate::availability::AvailabilityModel;
use crate::model::Model;

/// The individual rules a feature must satisfy before its prompt shows
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleKind {
    /// The event model has not (successfully) initialized
    ModelNotReady,
    /// The feature has no usable configuration
    InvalidConfig,
    /// Some prompt is currently on screen
    CurrentlyShowing,
    /// One-shot semantics: this feature has already fired
    AlreadyTriggered,
    /// The feature-usage rule did not hold
    Used,
    /// The prompt-shown rule did not hold
    Trigger,
    /// An additional per-event rule did not hold; carries the event name
    Event(String),
    /// The days-available rule did not hold
    Availability,
}

/// Outcome of a conditions check: pass/fail plus every failed rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionsResult {
    pub failed: BTreeSet<RuleKind>,
}

impl ConditionsResult {
    /// True iff no rule failed
    pub fn satisfied(&self) -> bool {
        self.failed.is_empty()
    }

    fn fail(&mut self, rule: RuleKind) {
        self.failed.insert(rule);
    }
}

/// Decides prompt eligibility and tracks per-session display state
///
/// `notify_showing` must be called by the orchestrator after a successful
/// check; `notify_dismissed` clears it and is idempotent.
pub trait ConditionValidator: Send {
    fn meets_conditions(
        &self,
        feature: &str,
        config: &FeatureConfig,
        model: &dyn Model,
        availability_model: &dyn AvailabilityModel,
        current_day: u32,
    ) -> ConditionsResult;

    fn notify_showing(&mut self, feature: &str);

    fn notify_dismissed(&mut self, feature: &str);
}

fn availability_rule_holds(
    feature: &str,
    config: &FeatureConfig,
    availability_model: &dyn AvailabilityModel,
) -> bool {
    // An Any rule passes without consulting the model, so engines wired
    // with a never-available model still work.
    if config.availability.op == ComparatorOp::Any {
        return true;
    }
    match availability_model.availability_days(feature) {
        Some(days) => config.availability.meets(days),
        None => false,
    }
}

/// Production validator: evaluates every configured rule
#[derive(Default)]
pub struct RuleConditionValidator {
    showing: HashSet<String>,
}

impl RuleConditionValidator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConditionValidator for RuleConditionValidator {
    fn meets_conditions(
        &self,
        feature: &str,
        config: &FeatureConfig,
        model: &dyn Model,
        availability_model: &dyn AvailabilityModel,
        current_day: u32,
    ) -> ConditionsResult {
        let mut result = ConditionsResult::default();

        if !model.is_ready() {
            result.fail(RuleKind::ModelNotReady);
        }
        // Only one prompt may be on screen at a time, whichever feature
        // owns it.
        if !self.showing.is_empty() {
            result.fail(RuleKind::CurrentlyShowing);
        }
        if !config.valid {
            result.fail(RuleKind::InvalidConfig);
            return result;
        }

        let used_count = model.event_count(&config.used.name, current_day, config.used.window_days);
        if !config.used.comparator.meets(used_count) {
            result.fail(RuleKind::Used);
        }

        let trigger_count =
            model.event_count(&config.trigger.name, current_day, config.trigger.window_days);
        if !config.trigger.comparator.meets(trigger_count) {
            result.fail(RuleKind::Trigger);
        }

        for event_config in &config.event_configs {
            let count =
                model.event_count(&event_config.name, current_day, event_config.window_days);
            if !event_config.comparator.meets(count) {
                result.fail(RuleKind::Event(event_config.name.clone()));
            }
        }

        if !availability_rule_holds(feature, config, availability_model) {
            result.fail(RuleKind::Availability);
        }

        result
    }

    fn notify_showing(&mut self, feature: &str) {
        self.showing.insert(feature.to_string());
    }

    fn notify_dismissed(&mut self, feature: &str) {
        self.showing.remove(feature);
    }
}

/// One-shot validator: a feature passes at most once, ever
///
/// Usage counts are never consulted, which lets demo mode run on a
/// store-nothing backend.
#[derive(Default)]
pub struct OnceConditionValidator {
    showing: HashSet<String>,
    triggered: HashSet<String>,
}

impl OnceConditionValidator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConditionValidator for OnceConditionValidator {
    fn meets_conditions(
        &self,
        feature: &str,
        config: &FeatureConfig,
        model: &dyn Model,
        _availability_model: &dyn AvailabilityModel,
        _current_day: u32,
    ) -> ConditionsResult {
        let mut result = ConditionsResult::default();

        if !model.is_ready() {
            result.fail(RuleKind::ModelNotReady);
        }
        if !self.showing.is_empty() {
            result.fail(RuleKind::CurrentlyShowing);
        }
        if self.triggered.contains(feature) {
            result.fail(RuleKind::AlreadyTriggered);
        }
        if !config.valid {
            result.fail(RuleKind::InvalidConfig);
        }

        result
    }

    fn notify_showing(&mut self, feature: &str) {
        self.showing.insert(feature.to_string());
        // Remembered forever: the feature never passes again.
        self.triggered.insert(feature.to_string());
    }

    fn notify_dismissed(&mut self, feature: &str) {
        self.showing.remove(feature);
    }
}
