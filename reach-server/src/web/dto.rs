//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::Stop;
use crate::engine::{DestinationResult, LegSummary, SearchQuery};

/// Query parameters of a destination search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// External origin id (numeric code or station name)
    pub origin: String,

    /// Service date, `YYYY-MM-DD`
    pub date: String,

    /// Window start, `HH:MM`
    pub start: String,

    /// Window end, `HH:MM`
    pub end: String,

    /// Optional ceiling on total journey time, in minutes
    pub max_duration: Option<u32>,

    /// At most 2
    pub max_transfers: Option<usize>,
}

impl SearchParams {
    pub fn into_query(self) -> SearchQuery {
        SearchQuery {
            origin: self.origin,
            date: self.date,
            start: self.start,
            end: self.end,
            max_duration_mins: self.max_duration,
            max_transfers: self.max_transfers,
        }
    }
}

/// Response for a destination search.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Dataset id of the resolved origin station
    pub origin: String,

    /// Destinations, best first
    pub destinations: Vec<DestinationDto>,
}

/// A reachable destination.
#[derive(Debug, Serialize)]
pub struct DestinationDto {
    pub stop_id: String,
    pub name: String,
    pub duration_mins: i64,
    pub departure: String,
    pub arrival: String,
    pub transfer_count: usize,

    /// First station changed at, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_station: Option<String>,

    pub transfer_stations: Vec<String>,
    pub legs: Vec<LegDto>,
}

/// One ride of an itinerary.
#[derive(Debug, Serialize)]
pub struct LegDto {
    pub trip_id: String,
    pub route: String,
    pub from: StationRef,
    pub departure: String,
    pub to: StationRef,
    pub arrival: String,
}

/// A station as shown in responses.
#[derive(Debug, Serialize)]
pub struct StationRef {
    pub id: String,
    pub name: String,
}

/// Response for a station lookup.
#[derive(Debug, Serialize)]
pub struct StationResponse {
    /// The id as given
    pub external_id: String,

    pub stop_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl DestinationDto {
    pub fn from_result(result: &DestinationResult) -> Self {
        Self {
            stop_id: result.stop_id.clone(),
            name: result.name.clone(),
            duration_mins: result.duration_mins,
            departure: result.departure.clone(),
            arrival: result.arrival.clone(),
            transfer_count: result.transfer_count,
            transfer_station: result.transfer_stations.first().cloned(),
            transfer_stations: result.transfer_stations.clone(),
            legs: result.legs.iter().map(LegDto::from_summary).collect(),
        }
    }
}

impl LegDto {
    pub fn from_summary(leg: &LegSummary) -> Self {
        Self {
            trip_id: leg.trip_id.clone(),
            route: leg.route.clone(),
            from: StationRef {
                id: leg.from_id.clone(),
                name: leg.from_name.clone(),
            },
            departure: leg.departure.clone(),
            to: StationRef {
                id: leg.to_id.clone(),
                name: leg.to_name.clone(),
            },
            arrival: leg.arrival.clone(),
        }
    }
}

impl StationResponse {
    pub fn from_stop(external_id: &str, stop: &Stop) -> Self {
        Self {
            external_id: external_id.to_string(),
            stop_id: stop.id.to_string(),
            name: stop.name.clone(),
            lat: stop.lat,
            lon: stop.lon,
        }
    }
}
