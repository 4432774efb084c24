//! Tiered reachability search.
//!
//! Finds, for every station reachable from an origin within a departure
//! window, the single shortest itinerary using at most two transfers:
//!
//! - Tier 0 takes direct legs leaving the origin inside the window.
//! - Tier 1 joins each of those legs with onward legs in the transfer window.
//! - Tier 2 adds a third leg, and only runs when too few destinations remain
//!   after the lower tiers. Its cost grows combinatorially, so it runs under
//!   an expansion budget and a cancellation token.
//!
//! Tiers are merged per destination keeping the shorter itinerary. Each tier
//! may only introduce a limited number of destinations, but a destination it
//! leaves out still counts as found: a later tier can never bring it back
//! with a slower itinerary. The result is post-filtered by the origin's
//! locality, the caller's duration ceiling and the departure window.

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use super::cancel::CancellationToken;
use super::config::SearchConfig;
use super::connections::ConnectionIndex;
use super::locality::{LocalityGrouping, NoLocalityGrouping};
use super::memo::{MemoKey, TierMemo};
use super::rank::{compare_itineraries, compare_legs};
use super::transfer::{CandidateKey, TransferCandidate, TransferGenerator};
use crate::domain::{
    DirectConnection, Itinerary, ScheduleTime, StopIdx, TimeWindow, TransferWindow,
};
use crate::schedule::{ActiveTrips, ScheduleStore};

/// Best itinerary per destination station.
pub type ReachMap = HashMap<StopIdx, Itinerary>;

/// Most transfers a search may ask for.
pub const MAX_TRANSFERS: usize = 2;

/// Error from reachability search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}

/// Request for reachability search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachRequest {
    /// Origin stop. A point is searched from its enclosing area.
    pub origin: StopIdx,

    /// Departures from the origin must fall in this window.
    pub window: TimeWindow,

    /// Service date.
    pub date: NaiveDate,

    /// At most [`MAX_TRANSFERS`].
    pub max_transfers: usize,

    /// Maximum number of new destinations each tier may introduce.
    pub per_tier_limit: usize,

    /// Destinations whose best itinerary takes longer are dropped.
    pub max_duration: Option<Duration>,
}

impl ReachRequest {
    /// A request with the transfer and tier limits taken from `config`.
    pub fn new(origin: StopIdx, window: TimeWindow, date: NaiveDate, config: &SearchConfig) -> Self {
        Self {
            origin,
            window,
            date,
            max_transfers: config.max_transfers,
            per_tier_limit: config.per_tier_limit,
            max_duration: None,
        }
    }

    pub fn with_max_transfers(mut self, max_transfers: usize) -> Self {
        self.max_transfers = max_transfers;
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }

    pub fn with_per_tier_limit(mut self, per_tier_limit: usize) -> Self {
        self.per_tier_limit = per_tier_limit;
        self
    }

    /// Validate the search request.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_transfers > MAX_TRANSFERS {
            return Err(SearchError::InvalidRequest(format!(
                "at most {MAX_TRANSFERS} transfers are supported, got {}",
                self.max_transfers
            )));
        }

        if self.max_duration.is_some_and(|d| d < Duration::zero()) {
            return Err(SearchError::InvalidRequest(
                "maximum duration must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Reachability search over one schedule store.
pub struct Reachability<'a> {
    store: &'a ScheduleStore,
    index: &'a ConnectionIndex,
    config: &'a SearchConfig,
    locality: &'a dyn LocalityGrouping,
    memo: Option<&'a TierMemo>,
}

impl<'a> Reachability<'a> {
    /// Create a search without locality grouping or memoization.
    pub fn new(store: &'a ScheduleStore, index: &'a ConnectionIndex, config: &'a SearchConfig) -> Self {
        Self {
            store,
            index,
            config,
            locality: &NoLocalityGrouping,
            memo: None,
        }
    }

    pub fn with_locality(mut self, locality: &'a dyn LocalityGrouping) -> Self {
        self.locality = locality;
        self
    }

    /// Reuse Tier 0/1 results across calls through `memo`.
    pub fn with_memo(mut self, memo: &'a TierMemo) -> Self {
        self.memo = Some(memo);
        self
    }

    /// Best itinerary to every reachable destination.
    ///
    /// An origin with nothing reachable yields an empty map, not an error.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidRequest` if the request asks for more
    /// than two transfers or a negative ceiling.
    pub fn find_reachable(
        &self,
        request: &ReachRequest,
        cancel: &CancellationToken,
    ) -> Result<ReachMap, SearchError> {
        request.validate()?;

        let origin = self.store.station_of(request.origin);
        let transfer_window = self.config.transfer_window();
        let active_cell = OnceCell::new();
        let active = || active_cell.get_or_init(|| self.store.active_trips(request.date));

        let key = MemoKey {
            origin,
            date: request.date,
            window: request.window,
            per_tier_limit: request.per_tier_limit,
            transfers: request.max_transfers.min(1),
        };
        let compute = || self.lower_tiers(&key, &transfer_window, active());
        let lower = match self.memo {
            Some(memo) => memo.get_or_compute(key, compute),
            None => Arc::new(compute()),
        };

        let mut reach = lower.emitted();
        self.post_filter(&mut reach, origin, request);

        if request.max_transfers >= 2 && reach.len() < self.config.tier2_min_results {
            let mut third = self.tier_two(origin, request, &transfer_window, active(), cancel);
            self.post_filter(&mut third, origin, request);

            let cap = self.config.tier2_result_cap.min(request.per_tier_limit);
            let mut merged = TierResults::clone(&lower);
            let added = merged.merge(third, cap);
            reach = merged.emitted();
            self.post_filter(&mut reach, origin, request);
            debug!(origin = %origin, added, "tier 2 merged");
        }

        debug!(
            origin = %origin,
            date = %request.date,
            destinations = reach.len(),
            "reachability search complete"
        );
        Ok(reach)
    }

    /// Tiers 0 and 1, merged, before any post-filter.
    fn lower_tiers(&self, key: &MemoKey, transfer_window: &TransferWindow, active: &ActiveTrips) -> TierResults {
        let mut reach = TierResults::new();

        let direct = self.tier_zero(key.origin, &key.window, active);
        let direct_count = reach.merge(direct, key.per_tier_limit);

        let mut one_count = 0;
        if key.transfers >= 1 {
            let one = self.tier_one(key.origin, &key.window, transfer_window, active);
            one_count = reach.merge(one, key.per_tier_limit);
        }

        debug!(
            origin = %key.origin,
            tier0 = direct_count,
            tier1 = one_count,
            found = reach.found(),
            "lower tiers computed"
        );
        reach
    }

    /// Legs leaving the origin inside the window on active trips.
    fn first_legs<'s>(
        &'s self,
        origin: StopIdx,
        window: &TimeWindow,
        active: &'s ActiveTrips,
    ) -> impl Iterator<Item = DirectConnection> + 's {
        self.index
            .connections_from(self.store, origin, window.start(), window.end())
            .filter(move |leg| active.contains(leg.trip))
    }

    fn tier_zero(&self, origin: StopIdx, window: &TimeWindow, active: &ActiveTrips) -> ReachMap {
        let mut best = ReachMap::new();
        for leg in self.first_legs(origin, window, active) {
            offer(&mut best, origin, &[leg], &TransferWindow::default());
        }
        best
    }

    fn tier_one(
        &self,
        origin: StopIdx,
        window: &TimeWindow,
        transfer_window: &TransferWindow,
        active: &ActiveTrips,
    ) -> ReachMap {
        let generator = TransferGenerator::new(self.store, self.index, *transfer_window, active);

        let mut by_key: HashMap<CandidateKey, TransferCandidate> = HashMap::new();
        for first in self.first_legs(origin, window, active) {
            for candidate in generator.candidates(first) {
                if candidate.second.to == origin {
                    continue;
                }
                match by_key.entry(candidate.key()) {
                    Entry::Occupied(mut e) => {
                        let current = e.get();
                        if compare_legs(
                            &[candidate.first, candidate.second],
                            &[current.first, current.second],
                        ) == Ordering::Less
                        {
                            e.insert(candidate);
                        }
                    }
                    Entry::Vacant(e) => {
                        e.insert(candidate);
                    }
                }
            }
        }

        let mut best = ReachMap::new();
        for candidate in by_key.into_values() {
            offer(&mut best, origin, &[candidate.first, candidate.second], transfer_window);
        }
        best
    }

    fn tier_two(
        &self,
        origin: StopIdx,
        request: &ReachRequest,
        transfer_window: &TransferWindow,
        active: &ActiveTrips,
        cancel: &CancellationToken,
    ) -> ReachMap {
        let generator = TransferGenerator::new(self.store, self.index, *transfer_window, active);
        let mut search = TierTwo {
            generator: &generator,
            origin,
            ceiling: request.max_duration,
            budget: self.config.tier2_max_expansions,
            expansions: 0,
            cancel,
            stopped: None,
            best: ReachMap::new(),
        };

        let mut legs = Vec::with_capacity(Itinerary::MAX_LEGS);
        for first in self.first_legs(origin, &request.window, active) {
            if search.stopped.is_some() {
                break;
            }
            if search.exceeds_ceiling(first.depart, first.arrive) {
                continue;
            }
            legs.push(first);
            search.extend(&mut legs);
            legs.pop();
        }

        if let Some(reason) = search.stopped {
            warn!(
                origin = %origin,
                expansions = search.expansions,
                found = search.best.len(),
                reason,
                "tier 2 stopped early"
            );
        } else {
            debug!(
                origin = %origin,
                expansions = search.expansions,
                found = search.best.len(),
                "tier 2 complete"
            );
        }
        search.best
    }

    /// Drops the origin, its locality, destinations over the ceiling and
    /// itineraries departing outside the window.
    fn post_filter(&self, reach: &mut ReachMap, origin: StopIdx, request: &ReachRequest) {
        let origin_name = &self.store.stop(origin).name;
        reach.retain(|destination, itinerary| {
            *destination != origin
                && request.window.contains(itinerary.departure())
                && request
                    .max_duration
                    .is_none_or(|ceiling| itinerary.duration() <= ceiling)
                && !self
                    .locality
                    .same_locality(origin_name, &self.store.stop(*destination).name)
        });
    }
}

/// Depth-first search over three-leg chains.
struct TierTwo<'g, 'a> {
    generator: &'g TransferGenerator<'a>,
    origin: StopIdx,
    ceiling: Option<Duration>,
    budget: usize,
    expansions: usize,
    cancel: &'g CancellationToken,
    stopped: Option<&'static str>,
    best: ReachMap,
}

impl TierTwo<'_, '_> {
    fn exceeds_ceiling(&self, depart: ScheduleTime, arrive: ScheduleTime) -> bool {
        self.ceiling
            .is_some_and(|ceiling| arrive.signed_duration_since(depart) > ceiling)
    }

    fn extend(&mut self, legs: &mut Vec<DirectConnection>) {
        if legs.len() == Itinerary::MAX_LEGS {
            offer(&mut self.best, self.origin, legs, self.generator.window());
            return;
        }
        let (Some(first), Some(last)) = (legs.first().copied(), legs.last().copied()) else {
            return;
        };

        let generator = self.generator;
        for next in generator.onward(last) {
            self.expansions += 1;
            if self.expansions > self.budget {
                self.stopped = Some("expansion budget exhausted");
                return;
            }
            if self.cancel.is_cancelled() {
                self.stopped = Some("cancelled");
                return;
            }
            if self.exceeds_ceiling(first.depart, next.arrive) {
                continue;
            }

            legs.push(next);
            self.extend(legs);
            legs.pop();
            if self.stopped.is_some() {
                return;
            }
        }
    }
}

/// Records `legs` as the itinerary to its destination if it beats the
/// current best. Chains ending at the origin are ignored.
fn offer(best: &mut ReachMap, origin: StopIdx, legs: &[DirectConnection], window: &TransferWindow) {
    let Some(last) = legs.last() else {
        return;
    };
    if last.to == origin {
        return;
    }

    let build = || Itinerary::new(legs.to_vec(), window).ok();
    match best.entry(last.to) {
        Entry::Occupied(mut e) => {
            if compare_legs(legs, e.get().legs()) == Ordering::Less {
                if let Some(itinerary) = build() {
                    e.insert(itinerary);
                }
            }
        }
        Entry::Vacant(e) => {
            if let Some(itinerary) = build() {
                e.insert(itinerary);
            }
        }
    }
}

/// Best itineraries found by the tiers merged so far.
///
/// Every destination any tier reached keeps its best itinerary here, even
/// when the per-tier limit keeps it out of the result. Only destinations
/// admitted by the tier that first found them are emitted.
#[derive(Debug, Clone, Default)]
pub struct TierResults {
    best: ReachMap,
    emitted: HashSet<StopIdx>,
}

impl TierResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a tier.
    ///
    /// Known destinations take the tier's itinerary when it is better,
    /// whether or not they are emitted. Of the destinations this tier finds
    /// first, at most `limit` are emitted, best first. Returns how many were
    /// emitted.
    pub fn merge(&mut self, tier: ReachMap, limit: usize) -> usize {
        let mut fresh = Vec::new();
        for (destination, itinerary) in tier {
            match self.best.get_mut(&destination) {
                Some(existing) => {
                    if compare_itineraries(&itinerary, existing) == Ordering::Less {
                        *existing = itinerary;
                    }
                }
                None => fresh.push((destination, itinerary)),
            }
        }

        fresh.sort_by(|(a_stop, a), (b_stop, b)| compare_itineraries(a, b).then_with(|| a_stop.cmp(b_stop)));
        let added = fresh.len().min(limit);
        for (rank, (destination, itinerary)) in fresh.into_iter().enumerate() {
            if rank < limit {
                self.emitted.insert(destination);
            }
            self.best.insert(destination, itinerary);
        }
        added
    }

    /// The emitted destinations with their best itineraries.
    pub fn emitted(&self) -> ReachMap {
        self.emitted
            .iter()
            .filter_map(|destination| Some((*destination, self.best.get(destination)?.clone())))
            .collect()
    }

    /// Number of destinations reached, emitted or not.
    pub fn found(&self) -> usize {
        self.best.len()
    }
}

#[cfg(test)]
#[path = "reach_tests.rs"]
mod tests;
