//! Session memoization of Tier 0 and Tier 1 results.
//!
//! Callers typically re-query one origin with varying ceilings and filters.
//! The expensive part, enumerating direct and one-transfer itineraries, only
//! depends on the key below, so it is computed once per key. The dataset is
//! immutable for the life of the process, so entries are never stale and
//! nothing expires.

use std::sync::Arc;

use chrono::NaiveDate;
use moka::sync::Cache as MokaCache;

use super::reach::TierResults;
use crate::domain::{StopIdx, TimeWindow};

/// What Tier 0/1 output depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoKey {
    /// Station-level origin
    pub origin: StopIdx,
    pub date: NaiveDate,
    pub window: TimeWindow,
    pub per_tier_limit: usize,
    /// Transfer limit capped at 1
    pub transfers: usize,
}

/// Shared cache of merged Tier 0/1 results.
pub struct TierMemo {
    entries: MokaCache<MemoKey, Arc<TierResults>>,
}

impl TierMemo {
    /// An unbounded memo.
    pub fn new() -> Self {
        Self {
            entries: MokaCache::builder().build(),
        }
    }

    /// Returns the cached results for `key`, computing them with `compute`
    /// on a miss. Concurrent misses on one key run `compute` once.
    pub fn get_or_compute(
        &self,
        key: MemoKey,
        compute: impl FnOnce() -> TierResults,
    ) -> Arc<TierResults> {
        self.entries.get_with(key, || Arc::new(compute()))
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for TierMemo {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TierMemo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierMemo")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, hm};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(origin: u32) -> MemoKey {
        MemoKey {
            origin: StopIdx(origin),
            date: date(),
            window: TimeWindow::new(hm(8, 0), hm(8, 30)).unwrap(),
            per_tier_limit: 500,
            transfers: 1,
        }
    }

    #[test]
    fn computes_once_per_key() {
        let memo = TierMemo::new();
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            TierResults::new()
        };

        memo.get_or_compute(key(1), compute);
        memo.get_or_compute(key(1), compute);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        memo.get_or_compute(key(2), compute);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.entry_count(), 2);
    }

    #[test]
    fn window_is_part_of_key() {
        let memo = TierMemo::new();
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            TierResults::new()
        };
        memo.get_or_compute(key(1), compute);

        let mut other = key(1);
        other.window = TimeWindow::new(hm(9, 0), hm(9, 30)).unwrap();
        memo.get_or_compute(other, compute);
        memo.get_or_compute(key(1), compute);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.entry_count(), 2);
    }

    #[test]
    fn invalidate_all_clears() {
        let memo = TierMemo::new();
        memo.get_or_compute(key(1), TierResults::new);
        memo.invalidate_all();
        assert_eq!(memo.entry_count(), 0);
    }
}
