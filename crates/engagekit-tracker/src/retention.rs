//! Event retention policies
//!
//! Decides which events are worth storing at all and how long their day
//! buckets are kept. The production policy is derived from the loaded
//! feature configurations: an event is retained for the longest
//! `storage_days` any valid feature declares for it; events no
//! configuration references are never stored.

use std::collections::HashMap;
use tracing::debug;

use engagekit_core::{Configuration, FeatureDescriptor};

/// Storage gate for event records
pub trait RetentionPolicy: Send + Sync {
    /// Whether increments of `event` should be recorded at all
    fn should_store(&self, event: &str) -> bool;

    /// Whether a bucket of age `age_days` (0 = today) is still relevant
    fn should_keep(&self, event: &str, age_days: u32) -> bool;
}

/// Production policy built from the feature configurations
pub struct ConfigRetentionPolicy {
    /// event name -> longest storage window any valid config declares
    storage_days: HashMap<String, u32>,
}

impl ConfigRetentionPolicy {
    pub fn from_configs(
        features: &[FeatureDescriptor],
        configuration: &dyn Configuration,
    ) -> Self {
        let mut storage_days: HashMap<String, u32> = HashMap::new();

        for feature in features {
            let config = configuration.feature_config(&feature.name);
            if !config.valid {
                continue;
            }

            for event_config in [&config.used, &config.trigger]
                .into_iter()
                .chain(config.event_configs.iter())
            {
                if event_config.name.is_empty() {
                    continue;
                }
                let days = storage_days.entry(event_config.name.clone()).or_insert(0);
                *days = (*days).max(event_config.storage_days);
            }
        }

        debug!(events = storage_days.len(), "retention policy initialized");
        Self { storage_days }
    }
}

impl RetentionPolicy for ConfigRetentionPolicy {
    fn should_store(&self, event: &str) -> bool {
        self.storage_days.get(event).is_some_and(|days| *days > 0)
    }

    fn should_keep(&self, event: &str, age_days: u32) -> bool {
        self.storage_days
            .get(event)
            .is_some_and(|days| age_days < *days)
    }
}

/// Demo-mode policy: nothing is stored, nothing is kept
///
/// The one-shot validator never consults event counts, so demo mode can
/// run without any usage history.
#[derive(Debug, Default)]
pub struct StoreNothingPolicy;

impl RetentionPolicy for StoreNothingPolicy {
    fn should_store(&self, _event: &str) -> bool {
        false
    }

    fn should_keep(&self, _event: &str, _age_days: u32) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engagekit_core::{
        Comparator, EditableConfiguration, EventConfig, FeatureConfig,
    };

    fn descriptor(name: &str) -> FeatureDescriptor {
        FeatureDescriptor::new(name, "test feature")
    }

    #[test]
    fn test_policy_takes_longest_window_per_event() {
        let mut configuration = EditableConfiguration::new();

        let mut config_a = FeatureConfig::valid_with_trigger("shared_trigger");
        config_a.trigger.storage_days = 30;
        configuration.set_config("a", config_a);

        let mut config_b = FeatureConfig::valid_with_trigger("shared_trigger");
        config_b.trigger.storage_days = 90;
        configuration.set_config("b", config_b);

        let policy = ConfigRetentionPolicy::from_configs(
            &[descriptor("a"), descriptor("b")],
            &configuration,
        );

        assert!(policy.should_store("shared_trigger"));
        assert!(policy.should_keep("shared_trigger", 89));
        assert!(!policy.should_keep("shared_trigger", 90));
    }

    #[test]
    fn test_unreferenced_event_is_not_stored() {
        let mut configuration = EditableConfiguration::new();
        configuration.set_config("a", FeatureConfig::valid_with_trigger("a_trigger"));

        let policy = ConfigRetentionPolicy::from_configs(&[descriptor("a")], &configuration);

        assert!(!policy.should_store("unrelated"));
        assert!(!policy.should_keep("unrelated", 0));
    }

    #[test]
    fn test_invalid_config_contributes_nothing() {
        let mut configuration = EditableConfiguration::new();
        let mut config = FeatureConfig::valid_with_trigger("a_trigger");
        config.trigger.storage_days = 90;
        config.valid = false;
        configuration.set_config("a", config);

        let policy = ConfigRetentionPolicy::from_configs(&[descriptor("a")], &configuration);
        assert!(!policy.should_store("a_trigger"));
    }

    #[test]
    fn test_extra_event_configs_are_covered() {
        let mut configuration = EditableConfiguration::new();
        let config = FeatureConfig::valid_with_trigger("a_trigger").with_event_config(
            EventConfig::new("omnibox_used", Comparator::any(), 7, 14),
        );
        configuration.set_config("a", config);

        let policy = ConfigRetentionPolicy::from_configs(&[descriptor("a")], &configuration);

        assert!(policy.should_store("omnibox_used"));
        assert!(policy.should_keep("omnibox_used", 13));
        assert!(!policy.should_keep("omnibox_used", 14));
    }

    #[test]
    fn test_zero_storage_days_means_never_stored() {
        let mut configuration = EditableConfiguration::new();
        // valid_with_trigger leaves storage_days at 0
        configuration.set_config("a", FeatureConfig::valid_with_trigger("a_trigger"));

        let policy = ConfigRetentionPolicy::from_configs(&[descriptor("a")], &configuration);
        assert!(!policy.should_store("a_trigger"));
    }

    #[test]
    fn test_store_nothing_policy() {
        let policy = StoreNothingPolicy;
        assert!(!policy.should_store("anything"));
        assert!(!policy.should_keep("anything", 0));
    }
}
