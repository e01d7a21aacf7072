//! Configuration variants and the rule-text parser
//!
//! The engine consumes per-feature rule text from an experiment-style rule
//! source and parses it once, at construction, into immutable
//! `FeatureConfig` values. Two variants exist:
//!
//! - **RuleConfiguration** - production: parses rule text for every
//!   registered feature; malformed or partial rules invalidate only the
//!   offending feature
//! - **EditableConfiguration** - demo/test: configs are injected directly
//!
//! ## Recognized rule keys
//!
//! | key | value |
//! |---|---|
//! | `event_used` | event config string |
//! | `event_trigger` | event config string |
//! | `event_<anything>` | additional event config string |
//! | `availability` | comparator string |
//!
//! Unrecognized keys are ignored so rule sources can carry payload for
//! other consumers.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::types::{EventConfig, FeatureConfig, FeatureDescriptor};
use crate::Result;

/// Maps a feature to its rule configuration
///
/// Lookups for a feature that was never registered return a config with
/// `valid=false`, which the decision engine treats as "never trigger".
pub trait Configuration: Send + Sync {
    fn feature_config(&self, feature: &str) -> FeatureConfig;
}

/// The rule-source boundary: externally supplied per-feature rule text
///
/// Returns the raw key/value rule parameters for a feature, or `None` when
/// the source carries no rules for it.
pub trait RuleSource: Send + Sync {
    fn rule_params(&self, feature: &str) -> Option<HashMap<String, String>>;
}

/// Map-backed rule source for tests and hosts that assemble rules in code
#[derive(Debug, Default, Clone)]
pub struct StaticRuleSource {
    rules: HashMap<String, HashMap<String, String>>,
}

impl StaticRuleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one rule parameter for a feature (builder pattern)
    pub fn with_param(
        mut self,
        feature: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.rules
            .entry(feature.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }
}

impl RuleSource for StaticRuleSource {
    fn rule_params(&self, feature: &str) -> Option<HashMap<String, String>> {
        self.rules.get(feature).cloned()
    }
}

/// Production configuration: parsed once from a rule source
pub struct RuleConfiguration {
    configs: HashMap<String, FeatureConfig>,
}

impl RuleConfiguration {
    /// One-shot load: parses rule text for every registered feature
    ///
    /// Configuration errors are localized. A feature with missing,
    /// malformed, or partial rule text gets `valid=false`; every other
    /// feature loads independently and is unaffected.
    pub fn parse(features: &[FeatureDescriptor], source: &dyn RuleSource) -> Self {
        let mut configs = HashMap::with_capacity(features.len());

        for feature in features {
            let config = match Self::parse_feature(feature, source) {
                Ok(config) => {
                    debug!(feature = %feature.name, "parsed feature rules");
                    config
                }
                Err(err) => {
                    warn!(feature = %feature.name, %err, "invalid feature rules, feature disabled");
                    FeatureConfig::default()
                }
            };
            configs.insert(feature.name.clone(), config);
        }

        Self { configs }
    }

    fn parse_feature(
        feature: &FeatureDescriptor,
        source: &dyn RuleSource,
    ) -> Result<FeatureConfig> {
        let params = source
            .rule_params(&feature.name)
            .ok_or_else(|| crate::Error::invalid_rule(&feature.name, "no rules supplied"))?;

        let mut config = FeatureConfig {
            valid: false,
            ..Default::default()
        };
        let mut has_trigger = false;

        for (key, value) in &params {
            match key.as_str() {
                "event_used" => config.used = value.parse::<EventConfig>()?,
                "event_trigger" => {
                    config.trigger = value.parse::<EventConfig>()?;
                    has_trigger = true;
                }
                "availability" => config.availability = value.parse()?,
                _ if key.starts_with("event_") => {
                    config.event_configs.insert(value.parse::<EventConfig>()?);
                }
                // Foreign payload for other consumers of the rule source.
                _ => {}
            }
        }

        if !has_trigger {
            return Err(crate::Error::invalid_rule(
                &feature.name,
                "missing event_trigger",
            ));
        }

        config.valid = true;
        Ok(config)
    }
}

impl Configuration for RuleConfiguration {
    fn feature_config(&self, feature: &str) -> FeatureConfig {
        self.configs.get(feature).cloned().unwrap_or_default()
    }
}

/// In-process variant supporting direct config injection
///
/// Used by demo mode and tests; `set_config` overwrites any existing entry.
#[derive(Default)]
pub struct EditableConfiguration {
    configs: HashMap<String, FeatureConfig>,
}

impl EditableConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_config(&mut self, feature: impl Into<String>, config: FeatureConfig) {
        self.configs.insert(feature.into(), config);
    }
}

impl Configuration for EditableConfiguration {
    fn feature_config(&self, feature: &str) -> FeatureConfig {
        self.configs.get(feature).cloned().unwrap_or_default()
    }
}
