//! The schedule store.
//!
//! Stops, routes, trips, stop times and calendar exceptions are loaded once
//! per dataset release and never mutated afterwards. The store is shared
//! between concurrent queries behind an `Arc` without locking.

mod builder;
mod calendar;
mod error;
pub mod loader;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

pub use builder::{
    ExceptionRecord, RouteRecord, ScheduleBuilder, StopRecord, StopTimeRecord, TripRecord,
};
pub use calendar::{ActiveTrips, CalendarValidator};
pub use error::{IntegrityViolation, LoadError};
pub use loader::{DatasetFiles, load_dir, load_dir_with};

use crate::domain::{Route, RouteIdx, ServiceIdx, Stop, StopIdx, StopTime, Trip, TripIdx};

/// Immutable, indexed schedule data.
///
/// Built by [`ScheduleBuilder::build`], which guarantees every index stored
/// here is in bounds. Accessors taking an index therefore panic only when
/// given an index from a different store.
#[derive(Debug)]
pub struct ScheduleStore {
    stops: Box<[Stop]>,
    stop_lookup: HashMap<Arc<str>, StopIdx>,
    station_of: Vec<StopIdx>,
    children: Vec<Vec<StopIdx>>,
    routes: Box<[Route]>,
    trips: Box<[Trip]>,
    trip_lookup: HashMap<Arc<str>, TripIdx>,
    /// All stop times, grouped by trip in visit order
    stop_times: Box<[StopTime]>,
    /// `stop_times[trip_offsets[t]..trip_offsets[t + 1]]` are trip `t`'s visits
    trip_offsets: Box<[u32]>,
    service_lookup: HashMap<Arc<str>, ServiceIdx>,
    calendar: CalendarValidator,
}

impl ScheduleStore {
    pub fn stop(&self, idx: StopIdx) -> &Stop {
        &self.stops[idx.as_usize()]
    }

    pub fn stops(&self) -> impl ExactSizeIterator<Item = (StopIdx, &Stop)> + '_ {
        self.stops
            .iter()
            .enumerate()
            .map(|(i, stop)| (StopIdx(i as u32), stop))
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn stop_by_id(&self, id: &str) -> Option<StopIdx> {
        self.stop_lookup.get(id).copied()
    }

    /// The station a stop belongs to: its parent area, or itself.
    pub fn station_of(&self, idx: StopIdx) -> StopIdx {
        self.station_of[idx.as_usize()]
    }

    /// Points grouped under an area. Empty for points.
    pub fn children_of(&self, idx: StopIdx) -> &[StopIdx] {
        &self.children[idx.as_usize()]
    }

    pub fn route(&self, idx: RouteIdx) -> &Route {
        &self.routes[idx.as_usize()]
    }

    pub fn trip(&self, idx: TripIdx) -> &Trip {
        &self.trips[idx.as_usize()]
    }

    pub fn trip_by_id(&self, id: &str) -> Option<TripIdx> {
        self.trip_lookup.get(id).copied()
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn trip_indices(&self) -> impl ExactSizeIterator<Item = TripIdx> + use<> {
        (0..self.trips.len() as u32).map(TripIdx)
    }

    /// A trip's visits, in sequence order.
    pub fn stop_times_of(&self, trip: TripIdx) -> &[StopTime] {
        let start = self.trip_offsets[trip.as_usize()] as usize;
        let end = self.trip_offsets[trip.as_usize() + 1] as usize;
        &self.stop_times[start..end]
    }

    pub fn stop_time_count(&self) -> usize {
        self.stop_times.len()
    }

    pub fn calendar(&self) -> &CalendarValidator {
        &self.calendar
    }

    /// Whether a service runs on `date`. Unknown services never run.
    pub fn is_service_active(&self, service_id: &str, date: NaiveDate) -> bool {
        self.service_lookup
            .get(service_id)
            .is_some_and(|idx| self.calendar.is_active(*idx, date))
    }

    pub fn is_trip_active(&self, trip: TripIdx, date: NaiveDate) -> bool {
        self.calendar.is_active(self.trip(trip).service, date)
    }

    /// Evaluates the calendar once for every trip on `date`.
    pub fn active_trips(&self, date: NaiveDate) -> ActiveTrips {
        let flags = self
            .trip_indices()
            .map(|trip| self.is_trip_active(trip, date))
            .collect();
        ActiveTrips::new(flags)
    }
}
