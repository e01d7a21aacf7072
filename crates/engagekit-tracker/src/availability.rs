//! Availability models
//!
//! Answers "how many days has this feature been available", independent of
//! usage events. The "never available" implementation is a valid
//! substitution whenever availability gating is not desired.

use std::collections::HashMap;

/// Days-since-available queries, absent when unknown
pub trait AvailabilityModel: Send + Sync {
    fn availability_days(&self, feature: &str) -> Option<u32>;
}

/// Availability is never known; any non-`Any` availability rule fails
#[derive(Debug, Default)]
pub struct NeverAvailabilityModel;

impl AvailabilityModel for NeverAvailabilityModel {
    fn availability_days(&self, _feature: &str) -> Option<u32> {
        None
    }
}

/// Map-backed model for tests
#[derive(Debug, Default)]
pub struct FixedAvailabilityModel {
    days: HashMap<String, u32>,
}

impl FixedAvailabilityModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_days(mut self, feature: impl Into<String>, days: u32) -> Self {
        self.days.insert(feature.into(), days);
        self
    }
}

impl AvailabilityModel for FixedAvailabilityModel {
    fn availability_days(&self, feature: &str) -> Option<u32> {
        self.days.get(feature).copied()
    }
}
