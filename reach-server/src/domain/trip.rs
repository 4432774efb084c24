//! Routes, trips and their stop visits.

use std::sync::Arc;

use super::{RouteIdx, ScheduleTime, ServiceIdx, StopIdx, TripIdx};

/// Transport mode of a route, from the GTFS `route_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMode {
    Tram,
    Subway,
    Rail,
    Bus,
    Ferry,
    Other(i32),
}

impl RouteMode {
    /// Maps a basic or extended GTFS route type to a mode.
    ///
    /// ```
    /// use reach_server::domain::RouteMode;
    ///
    /// assert_eq!(RouteMode::from_route_type(2), RouteMode::Rail);
    /// assert_eq!(RouteMode::from_route_type(102), RouteMode::Rail);
    /// assert_eq!(RouteMode::from_route_type(42), RouteMode::Other(42));
    /// ```
    pub fn from_route_type(route_type: i32) -> Self {
        match route_type {
            0 | 900..=999 => RouteMode::Tram,
            1 | 400..=499 => RouteMode::Subway,
            2 | 100..=199 => RouteMode::Rail,
            3 | 700..=799 => RouteMode::Bus,
            4 | 1000..=1099 => RouteMode::Ferry,
            other => RouteMode::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: Arc<str>,
    pub short_name: String,
    pub long_name: String,
    pub mode: RouteMode,
}

/// One scheduled vehicle run.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: Arc<str>,
    pub route: RouteIdx,
    pub service: ServiceIdx,
    pub headsign: String,
}

/// A timed visit of a trip at a stop.
///
/// Within a trip, `sequence` is strictly increasing and
/// `arrival <= departure` holds for every visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTime {
    pub trip: TripIdx,
    pub stop: StopIdx,
    pub arrival: ScheduleTime,
    pub departure: ScheduleTime,
    pub sequence: u32,
}
