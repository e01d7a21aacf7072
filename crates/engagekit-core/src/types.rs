//! Core data types for EngageKit
//!
//! This module defines the fundamental data structures used throughout the
//! engine: feature descriptors, count comparators, and the per-feature rule
//! configuration. These types are kept simple and focused on their single
//! responsibility.
//!
//! ## Rule text grammar
//!
//! Rules arrive as experiment-style text and are parsed with `FromStr`:
//!
//! - comparator: `any` or `<op> <count>` where op is one of
//!   `<`, `>`, `<=`, `>=`, `==`, `!=` (e.g., `>= 3`)
//! - event config: `name:opened;comparator:any;window:90;storage:360`
//!   (all four keys required, any order)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::{Error, Result};

/// An externally defined feature whose help-prompt eligibility the engine
/// decides
///
/// The host application supplies the full set of descriptors at
/// configuration-load time; the engine never discovers features dynamically
/// afterward. Keeping this an injected list (not a process-wide global)
/// keeps the engine testable with arbitrary feature sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FeatureDescriptor {
    /// Unique feature name (e.g., "new_tab_help")
    pub name: String,

    /// Human-readable description, surfaced only in diagnostics
    pub description: String,
}

impl FeatureDescriptor {
    /// Creates a new FeatureDescriptor
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Comparison operators for event-count rules
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComparatorOp {
    /// Always passes, regardless of count
    #[default]
    Any,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
}

/// A count threshold rule: `count <op> value`
///
/// The default comparator is `Any`, which always passes. This is what an
/// unspecified rule degrades to, so a feature configured with only a trigger
/// event fires on a fresh profile.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Comparator {
    pub op: ComparatorOp,
    pub value: u32,
}

impl Comparator {
    pub fn new(op: ComparatorOp, value: u32) -> Self {
        Self { op, value }
    }

    /// Convenience constructor for the always-passing comparator
    pub fn any() -> Self {
        Self::default()
    }

    /// Checks whether `count` satisfies this rule
    pub fn meets(&self, count: u32) -> bool {
        match self.op {
            ComparatorOp::Any => true,
            ComparatorOp::LessThan => count < self.value,
            ComparatorOp::GreaterThan => count > self.value,
            ComparatorOp::LessThanOrEqual => count <= self.value,
            ComparatorOp::GreaterThanOrEqual => count >= self.value,
            ComparatorOp::Equal => count == self.value,
            ComparatorOp::NotEqual => count != self.value,
        }
    }
}

impl FromStr for Comparator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("any") {
            return Ok(Self::any());
        }

        // Two-character operators must be tried before their one-character
        // prefixes.
        let ops = [
            ("<=", ComparatorOp::LessThanOrEqual),
            (">=", ComparatorOp::GreaterThanOrEqual),
            ("==", ComparatorOp::Equal),
            ("!=", ComparatorOp::NotEqual),
            ("<", ComparatorOp::LessThan),
            (">", ComparatorOp::GreaterThan),
        ];

        for (token, op) in ops {
            if let Some(rest) = s.strip_prefix(token) {
                let value = rest
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| Error::invalid_input(format!("bad comparator value in '{s}'")))?;
                return Ok(Self::new(op, value));
            }
        }

        Err(Error::invalid_input(format!("unrecognized comparator '{s}'")))
    }
}

/// Rule over a single named event: how many days of history matter
/// (`window_days`), how long counts are retained (`storage_days`), and the
/// count threshold that must hold within the window
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventConfig {
    /// Unique event key (e.g., "omnibox_used")
    pub name: String,

    /// Count rule evaluated over the window
    pub comparator: Comparator,

    /// How many days back (from the current day, inclusive) are consulted
    pub window_days: u32,

    /// How many days of buckets the store keeps for this event
    pub storage_days: u32,
}

impl EventConfig {
    pub fn new(
        name: impl Into<String>,
        comparator: Comparator,
        window_days: u32,
        storage_days: u32,
    ) -> Self {
        Self {
            name: name.into(),
            comparator,
            window_days,
            storage_days,
        }
    }
}

impl FromStr for EventConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut name = None;
        let mut comparator = None;
        let mut window = None;
        let mut storage = None;

        for part in s.split(';') {
            let (key, value) = part
                .split_once(':')
                .ok_or_else(|| Error::invalid_input(format!("missing ':' in '{part}'")))?;
            match key.trim() {
                "name" => name = Some(value.trim().to_string()),
                "comparator" => comparator = Some(value.parse::<Comparator>()?),
                "window" => {
                    window = Some(value.trim().parse::<u32>().map_err(|_| {
                        Error::invalid_input(format!("bad window value '{value}'"))
                    })?)
                }
                "storage" => {
                    storage = Some(value.trim().parse::<u32>().map_err(|_| {
                        Error::invalid_input(format!("bad storage value '{value}'"))
                    })?)
                }
                other => {
                    return Err(Error::invalid_input(format!(
                        "unknown event config key '{other}'"
                    )))
                }
            }
        }

        let name = name.ok_or_else(|| Error::invalid_input("event config missing 'name'"))?;
        if name.is_empty() {
            return Err(Error::invalid_input("event config has empty 'name'"));
        }

        Ok(Self {
            name,
            comparator: comparator
                .ok_or_else(|| Error::invalid_input("event config missing 'comparator'"))?,
            window_days: window
                .ok_or_else(|| Error::invalid_input("event config missing 'window'"))?,
            storage_days: storage
                .ok_or_else(|| Error::invalid_input("event config missing 'storage'"))?,
        })
    }
}

/// The complete rule set for one feature
///
/// `valid=false` means the feature has no usable configuration and the
/// decision engine must treat it as "never trigger". Immutable once the
/// configuration finishes loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureConfig {
    /// Whether this configuration is usable at all
    pub valid: bool,

    /// Rule over how often the feature itself has been used
    pub used: EventConfig,

    /// Rule over how often the help prompt has been shown; the trigger
    /// event name is also what gets incremented when the prompt fires
    pub trigger: EventConfig,

    /// Additional event rules, all of which must hold
    pub event_configs: BTreeSet<EventConfig>,

    /// Rule over how many days the feature has been available
    pub availability: Comparator,
}

impl FeatureConfig {
    /// A minimal valid config with only a trigger event and always-passing
    /// rules. This is what demo mode installs for every feature.
    pub fn valid_with_trigger(trigger_event: impl Into<String>) -> Self {
        Self {
            valid: true,
            trigger: EventConfig::new(trigger_event, Comparator::any(), 0, 0),
            ..Default::default()
        }
    }

    /// Adds an extra event rule (builder pattern)
    pub fn with_event_config(mut self, config: EventConfig) -> Self {
        self.event_configs.insert(config);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparator_any_always_passes() {
        let cmp = Comparator::any();
        assert!(cmp.meets(0));
        assert!(cmp.meets(u32::MAX));
    }

    #[test]
    fn test_comparator_ops() {
        assert!(Comparator::new(ComparatorOp::LessThan, 3).meets(2));
        assert!(!Comparator::new(ComparatorOp::LessThan, 3).meets(3));
        assert!(Comparator::new(ComparatorOp::GreaterThan, 3).meets(4));
        assert!(Comparator::new(ComparatorOp::LessThanOrEqual, 3).meets(3));
        assert!(Comparator::new(ComparatorOp::GreaterThanOrEqual, 3).meets(3));
        assert!(Comparator::new(ComparatorOp::Equal, 0).meets(0));
        assert!(!Comparator::new(ComparatorOp::Equal, 0).meets(1));
        assert!(Comparator::new(ComparatorOp::NotEqual, 0).meets(1));
    }

    #[test]
    fn test_comparator_parse() {
        assert_eq!("any".parse::<Comparator>().unwrap(), Comparator::any());
        assert_eq!("ANY".parse::<Comparator>().unwrap(), Comparator::any());
        assert_eq!(
            ">= 3".parse::<Comparator>().unwrap(),
            Comparator::new(ComparatorOp::GreaterThanOrEqual, 3)
        );
        assert_eq!(
            "==0".parse::<Comparator>().unwrap(),
            Comparator::new(ComparatorOp::Equal, 0)
        );
        assert_eq!(
            "!= 2".parse::<Comparator>().unwrap(),
            Comparator::new(ComparatorOp::NotEqual, 2)
        );
    }

    #[test]
    fn test_comparator_parse_rejects_garbage() {
        assert!("".parse::<Comparator>().is_err());
        assert!("sometimes".parse::<Comparator>().is_err());
        assert!(">= three".parse::<Comparator>().is_err());
        assert!("<".parse::<Comparator>().is_err());
    }

    #[test]
    fn test_event_config_parse() {
        let config: EventConfig = "name:opened;comparator:>=1;window:7;storage:90"
            .parse()
            .unwrap();
        assert_eq!(config.name, "opened");
        assert_eq!(
            config.comparator,
            Comparator::new(ComparatorOp::GreaterThanOrEqual, 1)
        );
        assert_eq!(config.window_days, 7);
        assert_eq!(config.storage_days, 90);
    }

    #[test]
    fn test_event_config_parse_any_order() {
        let config: EventConfig = "storage:360;name:opened;window:90;comparator:any"
            .parse()
            .unwrap();
        assert_eq!(config.name, "opened");
        assert_eq!(config.comparator, Comparator::any());
    }

    #[test]
    fn test_event_config_parse_rejects_missing_keys() {
        assert!("name:opened;comparator:any;window:7"
            .parse::<EventConfig>()
            .is_err());
        assert!("comparator:any;window:7;storage:90"
            .parse::<EventConfig>()
            .is_err());
        assert!("name:opened;comparator:any;window:7;storage:90;extra:1"
            .parse::<EventConfig>()
            .is_err());
        assert!("name:;comparator:any;window:7;storage:90"
            .parse::<EventConfig>()
            .is_err());
    }

    #[test]
    fn test_feature_config_default_is_invalid() {
        let config = FeatureConfig::default();
        assert!(!config.valid);
    }

    #[test]
    fn test_valid_with_trigger() {
        let config = FeatureConfig::valid_with_trigger("f1_trigger");
        assert!(config.valid);
        assert_eq!(config.trigger.name, "f1_trigger");
        assert!(config.used.comparator.meets(0));
        assert!(config.availability.meets(0));
        assert!(config.event_configs.is_empty());
    }
}
