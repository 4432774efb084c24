//! Direct-connection index.
//!
//! Every ordered pair of visits on one trip is a possible leg. Rather than
//! materializing all n(n-1)/2 pairs per trip, the index stores one entry per
//! boarding opportunity, sorted by departure time per station, and expands
//! alighting points lazily from the store's per-trip stop times.

use rayon::prelude::*;

use crate::domain::{DirectConnection, ScheduleTime, StopIdx, TripIdx};
use crate::schedule::ScheduleStore;

/// A trip leaving a station: the visit at `position` in the trip's stop times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Departure {
    pub time: ScheduleTime,
    pub trip: TripIdx,
    pub position: u32,
}

/// Departures per station, sorted by time.
///
/// Keyed at station level: a visit at a point inside an area is filed
/// under the area. A trip's last visit is not a boarding opportunity and is
/// left out.
#[derive(Debug)]
pub struct ConnectionIndex {
    by_station: Vec<Vec<Departure>>,
}

impl ConnectionIndex {
    pub fn build(store: &ScheduleStore) -> Self {
        let boardings: Vec<(StopIdx, Departure)> = store
            .trip_indices()
            .collect::<Vec<_>>()
            .into_par_iter()
            .flat_map_iter(|trip| {
                let visits = store.stop_times_of(trip);
                let boardable = visits.len().saturating_sub(1);
                visits[..boardable]
                    .iter()
                    .enumerate()
                    .map(move |(position, visit)| {
                        (
                            store.station_of(visit.stop),
                            Departure {
                                time: visit.departure,
                                trip,
                                position: position as u32,
                            },
                        )
                    })
            })
            .collect();

        let mut by_station = vec![Vec::new(); store.stop_count()];
        for (station, departure) in boardings {
            by_station[station.as_usize()].push(departure);
        }
        by_station.par_iter_mut().for_each(|deps| deps.sort_unstable());

        Self { by_station }
    }

    /// Departures from `station` with `lo <= time <= hi`, in time order.
    pub fn departures_between(&self, station: StopIdx, lo: ScheduleTime, hi: ScheduleTime) -> &[Departure] {
        let Some(deps) = self.by_station.get(station.as_usize()) else {
            return &[];
        };
        let start = deps.partition_point(|d| d.time < lo);
        let end = deps.partition_point(|d| d.time <= hi);
        if start >= end { &[] } else { &deps[start..end] }
    }

    /// All legs boarding at `station` between `lo` and `hi`, streamed.
    ///
    /// Legs that come back to the boarding station are skipped.
    pub fn connections_from<'a>(
        &'a self,
        store: &'a ScheduleStore,
        station: StopIdx,
        lo: ScheduleTime,
        hi: ScheduleTime,
    ) -> impl Iterator<Item = DirectConnection> + 'a {
        self.departures_between(station, lo, hi)
            .iter()
            .flat_map(move |dep| connections_after(store, station, *dep))
    }
}

/// Legs from one boarding: every later visit of the same trip.
pub fn connections_after(
    store: &ScheduleStore,
    from: StopIdx,
    departure: Departure,
) -> impl Iterator<Item = DirectConnection> + '_ {
    let visits = store.stop_times_of(departure.trip);
    visits
        .get(departure.position as usize + 1..)
        .unwrap_or_default()
        .iter()
        .map(move |visit| DirectConnection {
            trip: departure.trip,
            from,
            depart: departure.time,
            to: store.station_of(visit.stop),
            arrive: visit.arrival,
        })
        .filter(move |leg| leg.to != from)
}

/// Every ordered pair of visits on one trip, streamed.
///
/// Produces exactly n(n-1)/2 legs for a trip with n visits, including pairs
/// whose endpoints share a station.
pub fn trip_connections(store: &ScheduleStore, trip: TripIdx) -> impl Iterator<Item = DirectConnection> + '_ {
    let visits = store.stop_times_of(trip);
    visits.iter().enumerate().flat_map(move |(i, board)| {
        let from = store.station_of(board.stop);
        visits[i + 1..].iter().map(move |alight| DirectConnection {
            trip,
            from,
            depart: board.departure,
            to: store.station_of(alight.stop),
            arrive: alight.arrival,
        })
    })
}
