//! Day-bucketed event records
//!
//! Usage history is stored per event name as a sorted map of day -> count.
//! The map keeps at most one bucket per day, which makes windowed queries a
//! range sum and pruning a retain over bucket ages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Usage history for a single named event
///
/// Invariants: buckets are sorted by day (BTreeMap), at most one bucket per
/// day, counts are non-negative. Created on first increment of a
/// never-seen name; buckets older than the configured retention window are
/// pruned when the store is loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Unique event key
    pub name: String,

    /// day -> count, sorted by day
    pub buckets: BTreeMap<u32, u32>,
}

impl Event {
    /// Creates an empty record for `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buckets: BTreeMap::new(),
        }
    }

    /// Increments the bucket for `day`, creating it if absent
    pub fn record(&mut self, day: u32) {
        *self.buckets.entry(day).or_insert(0) += 1;
    }

    /// Sums counts within the window ending at `current_day` (inclusive)
    ///
    /// A window of N days covers days `current_day - N + 1 ..= current_day`;
    /// a window of 0 covers nothing.
    pub fn count_in_window(&self, current_day: u32, window_days: u32) -> u32 {
        if window_days == 0 {
            return 0;
        }
        let lower = current_day.saturating_sub(window_days - 1);
        self.buckets
            .range(lower..=current_day)
            .map(|(_, count)| count)
            .sum()
    }

    /// Total count across all retained buckets
    pub fn total_count(&self) -> u32 {
        self.buckets.values().sum()
    }

    /// Drops buckets the predicate rejects; `keep` receives the bucket day
    pub fn prune(&mut self, mut keep: impl FnMut(u32) -> bool) {
        self.buckets.retain(|day, _| keep(*day));
    }

    /// True once every bucket has been pruned away
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
