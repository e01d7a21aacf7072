//! # EngageKit Core Library
//!
//! Foundation crate for EngageKit, the in-product feature-engagement
//! decision engine. It contains the data model and configuration machinery
//! shared by every engine variant.
//!
//! ## Architecture Principle: KISS (Keep It Simple, Stupid)
//!
//! This crate intentionally has minimal dependencies and focuses on defining
//! clean interfaces rather than complex implementations. The goal is to make
//! it easy to:
//! - Understand the core concepts
//! - Swap the rule source and configuration variant per build mode
//! - Test components in isolation
//!
//! ## Key Components
//!
//! - **Types**: Feature descriptors, comparators and per-feature rule
//!   configuration (`FeatureConfig`, `EventConfig`)
//! - **Event**: Day-bucketed usage counters with windowed queries
//! - **Configuration**: The trait all configuration variants implement,
//!   plus the rule-text parser
//! - **TimeProvider**: The engine's notion of "current day"
//! - **Errors**: Strongly-typed error handling
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use engagekit_core::{Configuration, RuleConfiguration, StaticRuleSource};
//!
//! let configuration = RuleConfiguration::parse(&features, &rule_source);
//! let config = configuration.feature_config("new_tab_help");
//! if config.valid {
//!     // feed it to a condition validator
//! }
//! ```

pub use config::{Configuration, EditableConfiguration, RuleConfiguration, RuleSource, StaticRuleSource};
pub use error::{Error, Result};
pub use event::Event;
pub use time::{FixedTimeProvider, SystemTimeProvider, TimeProvider};
pub use types::{Comparator, ComparatorOp, EventConfig, FeatureConfig, FeatureDescriptor};

mod config;
mod error;
mod event;
mod time;
mod types;

// Prelude module - commonly used imports
pub mod prelude {
    pub use crate::config::{Configuration, RuleSource};
    pub use crate::error::{Error, Result};
    pub use crate::event::Event;
    pub use crate::time::TimeProvider;
    pub use crate::types::{Comparator, EventConfig, FeatureConfig, FeatureDescriptor};
}
