//! Search configuration for the reachability planner.

use std::time::Duration as StdDuration;

use chrono::Duration;

use crate::domain::TransferWindow;

/// Configuration parameters for reachability search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Minimum wait at a transfer station (minutes).
    /// Tighter connections are rejected.
    pub min_transfer_mins: i64,

    /// Maximum wait at a transfer station (minutes).
    pub max_wait_mins: i64,

    /// Transfer limit used when a query doesn't give one.
    pub max_transfers: usize,

    /// Maximum number of new destinations each tier may introduce.
    pub per_tier_limit: usize,

    /// Tier 2 only runs when fewer destinations than this survive
    /// tiers 0 and 1.
    pub tier2_min_results: usize,

    /// Maximum number of new destinations Tier 2 may add.
    pub tier2_result_cap: usize,

    /// Maximum number of leg expansions in one Tier 2 search.
    pub tier2_max_expansions: usize,

    /// Wall-clock budget for Tier 2 before it is cancelled (milliseconds).
    pub tier2_timeout_ms: u64,
}

impl SearchConfig {
    /// Returns the transfer window built from the wait bounds.
    pub fn transfer_window(&self) -> TransferWindow {
        TransferWindow::new(self.min_transfer(), self.max_wait())
    }

    /// Returns the minimum transfer time as a Duration.
    pub fn min_transfer(&self) -> Duration {
        Duration::minutes(self.min_transfer_mins)
    }

    /// Returns the maximum wait as a Duration.
    pub fn max_wait(&self) -> Duration {
        Duration::minutes(self.max_wait_mins)
    }

    /// Returns the Tier 2 budget as a std Duration, for timers.
    pub fn tier2_timeout(&self) -> StdDuration {
        StdDuration::from_millis(self.tier2_timeout_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_transfer_mins: 5,
            max_wait_mins: 120, // 2 hours
            max_transfers: 1,
            per_tier_limit: 500,
            tier2_min_results: 10,
            tier2_result_cap: 50,
            tier2_max_expansions: 200_000,
            tier2_timeout_ms: 2_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScheduleTime;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.min_transfer_mins, 5);
        assert_eq!(config.max_wait_mins, 120);
        assert_eq!(config.max_transfers, 1);
        assert_eq!(config.per_tier_limit, 500);
        assert_eq!(config.tier2_min_results, 10);
        assert_eq!(config.tier2_result_cap, 50);
        assert_eq!(config.tier2_max_expansions, 200_000);
        assert_eq!(config.tier2_timeout_ms, 2_000);
    }

    #[test]
    fn duration_methods() {
        let config = SearchConfig::default();

        assert_eq!(config.min_transfer(), Duration::minutes(5));
        assert_eq!(config.max_wait(), Duration::minutes(120));
        assert_eq!(config.tier2_timeout(), StdDuration::from_secs(2));
    }

    #[test]
    fn custom_transfer_window() {
        let config = SearchConfig {
            min_transfer_mins: 3,
            max_wait_mins: 30,
            ..SearchConfig::default()
        };
        let window = config.transfer_window();
        let arrive = ScheduleTime::from_hm(10, 0);

        assert!(window.accepts(arrive, ScheduleTime::from_hm(10, 3)));
        assert!(!window.accepts(arrive, ScheduleTime::from_hm(10, 31)));
    }
}
