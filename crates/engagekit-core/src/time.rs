//! Current-day providers
//!
//! The engine buckets all usage history by an integer epoch-day value. The
//! `TimeProvider` trait is the single seam through which "now" enters the
//! engine, so tests and demo builds can swap in a controllable clock.

use std::sync::atomic::{AtomicU32, Ordering};

/// Supplies the current day as a monotonically non-decreasing integer
/// epoch-day value
pub trait TimeProvider: Send + Sync {
    fn current_day(&self) -> u32;
}

/// Production provider: whole days since the Unix epoch, UTC
#[derive(Debug, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn current_day(&self) -> u32 {
        let secs = chrono::Utc::now().timestamp();
        // Pre-epoch clocks clamp to day zero rather than going negative.
        (secs.max(0) / 86_400) as u32
    }
}

/// Test/demo provider with a settable day
///
/// Setting the day backwards is clamped: the reported day never decreases,
/// matching the monotonic contract of the trait.
#[derive(Debug, Default)]
pub struct FixedTimeProvider {
    day: AtomicU32,
}

impl FixedTimeProvider {
    pub fn new(day: u32) -> Self {
        Self {
            day: AtomicU32::new(day),
        }
    }

    /// Advances the current day; lower values are ignored
    pub fn set_day(&self, day: u32) {
        self.day.fetch_max(day, Ordering::SeqCst);
    }
}

impl TimeProvider for FixedTimeProvider {
    fn current_day(&self) -> u32 {
        self.day.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_provider_is_sane() {
        let provider = SystemTimeProvider;
        // 2020-01-01 is day 18262; any correct clock is past that.
        assert!(provider.current_day() > 18_262);
    }

    #[test]
    fn test_fixed_provider_set_day() {
        let provider = FixedTimeProvider::new(100);
        assert_eq!(provider.current_day(), 100);

        provider.set_day(105);
        assert_eq!(provider.current_day(), 105);
    }

    #[test]
    fn test_fixed_provider_never_goes_backwards() {
        let provider = FixedTimeProvider::new(100);
        provider.set_day(90);
        assert_eq!(provider.current_day(), 100);
    }
}
