//! Query facade over the schedule store, planner and station resolver.
//!
//! Takes queries in the shape callers speak (external station ids, ISO
//! dates, `HH:MM` windows) and returns ranked destinations with names and
//! formatted times.

use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::domain::{DirectConnection, Itinerary, StopIdx, TimeError, TimeWindow};
use crate::planner::{
    CancellationToken, ConnectionIndex, LeadingPlaceName, LocalityGrouping, ReachRequest,
    Reachability, SearchConfig, SearchError, TierMemo, rank_reachable,
};
use crate::schedule::{LoadError, ScheduleStore, load_dir};
use crate::stations::{ResolverConfig, StationResolver};

/// Error from a malformed query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error(transparent)]
    InvalidTime(#[from] TimeError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// A destination search as callers phrase it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// External id of the origin station (numeric code or name)
    pub origin: String,

    /// Service date, `YYYY-MM-DD`
    pub date: String,

    /// Window start, `HH:MM`
    pub start: String,

    /// Window end, `HH:MM`
    pub end: String,

    pub max_duration_mins: Option<u32>,

    /// Defaults to the configured limit
    pub max_transfers: Option<usize>,
}

/// Result of a search.
///
/// An unknown origin and an origin with nowhere to go are distinct answers,
/// and neither is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    OriginNotFound,
    NoDestinations,
    Destinations(Vec<DestinationResult>),
}

/// The best way to one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationResult {
    pub stop_id: String,
    pub name: String,
    pub duration_mins: i64,
    pub departure: String,
    pub arrival: String,
    pub transfer_count: usize,
    /// Names of the stations changed at, in travel order
    pub transfer_stations: Vec<String>,
    pub legs: Vec<LegSummary>,
}

/// One ride of an itinerary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegSummary {
    pub trip_id: String,
    pub route: String,
    pub from_id: String,
    pub from_name: String,
    pub departure: String,
    pub to_id: String,
    pub to_name: String,
    pub arrival: String,
}

/// Everything needed to answer queries over one loaded dataset.
///
/// Cheap to share behind an `Arc`: the store and index are immutable, and
/// the memo and resolver caches take concurrent writes.
pub struct Engine {
    store: Arc<ScheduleStore>,
    index: ConnectionIndex,
    resolver: StationResolver,
    memo: TierMemo,
    config: SearchConfig,
    locality: Box<dyn LocalityGrouping>,
}

impl Engine {
    pub fn new(store: ScheduleStore, config: SearchConfig) -> Self {
        Self::with_resolver_config(store, config, ResolverConfig::default())
    }

    pub fn with_resolver_config(
        store: ScheduleStore,
        config: SearchConfig,
        resolver_config: ResolverConfig,
    ) -> Self {
        let store = Arc::new(store);
        let index = ConnectionIndex::build(&store);
        let resolver = StationResolver::new(Arc::clone(&store), resolver_config);

        info!(
            stops = store.stop_count(),
            trips = store.trip_count(),
            "engine ready"
        );

        Self {
            store,
            index,
            resolver,
            memo: TierMemo::new(),
            config,
            locality: Box::new(LeadingPlaceName),
        }
    }

    /// Loads a dataset directory and builds an engine over it.
    pub fn load(dir: impl AsRef<Path>, config: SearchConfig) -> Result<Self, LoadError> {
        Ok(Self::new(load_dir(dir)?, config))
    }

    /// Replaces the locality grouping used to drop nearby destinations.
    pub fn with_locality(mut self, locality: Box<dyn LocalityGrouping>) -> Self {
        self.locality = locality;
        self.memo.invalidate_all();
        self
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn resolver(&self) -> &StationResolver {
        &self.resolver
    }

    pub fn memo(&self) -> &TierMemo {
        &self.memo
    }

    /// Resolves an external id to a station.
    pub fn resolve(&self, external_id: &str) -> Option<StopIdx> {
        self.resolver.resolve(external_id)
    }

    /// Resolves many external ids in parallel, in input order.
    pub fn resolve_many<S: AsRef<str> + Sync>(&self, external_ids: &[S]) -> Vec<Option<StopIdx>> {
        self.resolver.resolve_many(external_ids)
    }

    /// Runs a destination search.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if the date or times don't parse, the window is
    /// inverted, or the transfer limit is above two.
    pub fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, QueryError> {
        let date = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d")
            .map_err(|_| QueryError::InvalidDate(query.date.clone()))?;
        let window = TimeWindow::parse_hhmm(&query.start, &query.end)?;

        let Some(origin) = self.resolver.resolve(&query.origin) else {
            debug!(origin = %query.origin, "origin not found");
            return Ok(SearchOutcome::OriginNotFound);
        };

        let mut request = ReachRequest::new(origin, window, date, &self.config);
        if let Some(max_transfers) = query.max_transfers {
            request = request.with_max_transfers(max_transfers);
        }
        if let Some(mins) = query.max_duration_mins {
            request = request.with_max_duration(Duration::minutes(i64::from(mins)));
        }

        let reach = Reachability::new(&self.store, &self.index, &self.config)
            .with_locality(self.locality.as_ref())
            .with_memo(&self.memo)
            .find_reachable(&request, cancel)?;

        if reach.is_empty() {
            return Ok(SearchOutcome::NoDestinations);
        }

        let results = rank_reachable(&self.store, reach)
            .into_iter()
            .map(|(destination, itinerary)| self.describe(destination, &itinerary))
            .collect();
        Ok(SearchOutcome::Destinations(results))
    }

    fn describe(&self, destination: StopIdx, itinerary: &Itinerary) -> DestinationResult {
        let stop = self.store.stop(destination);
        DestinationResult {
            stop_id: stop.id.to_string(),
            name: stop.name.clone(),
            duration_mins: itinerary.duration().num_minutes(),
            departure: itinerary.departure().to_string(),
            arrival: itinerary.arrival().to_string(),
            transfer_count: itinerary.transfer_count(),
            transfer_stations: itinerary
                .transfer_stops()
                .map(|idx| self.station_name(idx).to_string())
                .collect(),
            legs: itinerary.legs().iter().map(|leg| self.summarize(leg)).collect(),
        }
    }

    fn summarize(&self, leg: &DirectConnection) -> LegSummary {
        let trip = self.store.trip(leg.trip);
        let from = self.store.stop(self.store.station_of(leg.from));
        let to = self.store.stop(self.store.station_of(leg.to));
        LegSummary {
            trip_id: trip.id.to_string(),
            route: self.store.route(trip.route).short_name.clone(),
            from_id: from.id.to_string(),
            from_name: from.name.clone(),
            departure: leg.depart.to_string(),
            to_id: to.id.to_string(),
            to_name: to.name.clone(),
            arrival: leg.arrive.to_string(),
        }
    }

    fn station_name(&self, idx: StopIdx) -> &str {
        &self.store.stop(self.store.station_of(idx)).name
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("stops", &self.store.stop_count())
            .field("trips", &self.store.trip_count())
            .field("config", &self.config)
            .finish()
    }
}
