//! Dataset loader.
//!
//! Reads GTFS-style tables from a directory and feeds them to a
//! [`ScheduleBuilder`]. Columns not listed on the record types are ignored,
//! and so is any recurring `calendar.txt`: only `calendar_dates.txt`
//! decides whether a service runs.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{
    ExceptionRecord, LoadError, RouteRecord, ScheduleBuilder, ScheduleStore, StopRecord,
    StopTimeRecord, TripRecord,
};
use crate::domain::{ExceptionType, RouteMode, ScheduleTime};

/// File names of the tables in a dataset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFiles {
    pub stops: &'static str,
    pub routes: &'static str,
    pub trips: &'static str,
    pub stop_times: &'static str,
    pub calendar_dates: &'static str,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        Self {
            stops: "stops.txt",
            routes: "routes.txt",
            trips: "trips.txt",
            stop_times: "stop_times.txt",
            calendar_dates: "calendar_dates.txt",
        }
    }
}

#[derive(Debug, Deserialize)]
struct StopRow {
    stop_id: String,
    #[serde(default)]
    stop_name: String,
    #[serde(default)]
    stop_lat: Option<f64>,
    #[serde(default)]
    stop_lon: Option<f64>,
    #[serde(default)]
    location_type: Option<u8>,
    #[serde(default)]
    parent_station: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RouteRow {
    route_id: String,
    #[serde(default)]
    route_short_name: String,
    #[serde(default)]
    route_long_name: String,
    route_type: i32,
}

#[derive(Debug, Deserialize)]
struct TripRow {
    route_id: String,
    service_id: String,
    trip_id: String,
    #[serde(default)]
    trip_headsign: String,
}

#[derive(Debug, Deserialize)]
struct StopTimeRow {
    trip_id: String,
    arrival_time: String,
    departure_time: String,
    stop_id: String,
    stop_sequence: u32,
}

#[derive(Debug, Deserialize)]
struct CalendarDateRow {
    service_id: String,
    date: String,
    exception_type: u8,
}

/// Loads a dataset using the default file names.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<ScheduleStore, LoadError> {
    load_dir_with(dir, &DatasetFiles::default())
}

/// Loads a dataset directory and validates it into a store.
///
/// # Errors
///
/// Fails on a missing or unreadable table, a row that does not decode, and
/// any integrity violation the builder detects.
pub fn load_dir_with(dir: impl AsRef<Path>, files: &DatasetFiles) -> Result<ScheduleStore, LoadError> {
    let dir = dir.as_ref();
    let mut builder = ScheduleBuilder::new();

    let mut count = 0;
    parse_csv(dir, files.stops, |_, row: StopRow| {
        builder.add_stop(StopRecord {
            id: row.stop_id,
            name: row.stop_name,
            lat: row.stop_lat.unwrap_or_default(),
            lon: row.stop_lon.unwrap_or_default(),
            parent: row.parent_station.filter(|p| !p.is_empty()),
            is_station: row.location_type == Some(1),
        });
        count += 1;
        Ok(())
    })?;
    debug!(count, "read stops");

    count = 0;
    parse_csv(dir, files.routes, |_, row: RouteRow| {
        builder.add_route(RouteRecord {
            id: row.route_id,
            short_name: row.route_short_name,
            long_name: row.route_long_name,
            mode: RouteMode::from_route_type(row.route_type),
        });
        count += 1;
        Ok(())
    })?;
    debug!(count, "read routes");

    count = 0;
    parse_csv(dir, files.trips, |_, row: TripRow| {
        builder.add_trip(TripRecord {
            id: row.trip_id,
            route_id: row.route_id,
            service_id: row.service_id,
            headsign: row.trip_headsign,
        });
        count += 1;
        Ok(())
    })?;
    debug!(count, "read trips");

    count = 0;
    let file = files.stop_times;
    parse_csv(dir, file, |row_no, row: StopTimeRow| {
        let parse = |value: String| {
            ScheduleTime::parse_hms(&value).map_err(|_| LoadError::InvalidTime {
                file,
                row: row_no,
                value,
            })
        };
        builder.add_stop_time(StopTimeRecord {
            arrival: parse(row.arrival_time)?,
            departure: parse(row.departure_time)?,
            trip_id: row.trip_id,
            stop_id: row.stop_id,
            sequence: row.stop_sequence,
        });
        count += 1;
        Ok(())
    })?;
    debug!(count, "read stop times");

    count = 0;
    let file = files.calendar_dates;
    parse_csv(dir, file, |row_no, row: CalendarDateRow| {
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y%m%d").map_err(|_| {
            LoadError::InvalidDate {
                file,
                row: row_no,
                value: row.date.clone(),
            }
        })?;
        let kind = ExceptionType::from_gtfs(row.exception_type).ok_or(
            LoadError::InvalidExceptionType {
                file,
                row: row_no,
                value: row.exception_type,
            },
        )?;
        builder.add_exception(ExceptionRecord {
            service_id: row.service_id,
            date,
            kind,
        });
        count += 1;
        Ok(())
    })?;
    debug!(count, "read calendar exceptions");

    let store = builder.build()?;
    info!(
        dir = %dir.display(),
        stops = store.stop_count(),
        trips = store.trip_count(),
        stop_times = store.stop_time_count(),
        exceptions = store.calendar().exception_count(),
        "schedule loaded"
    );
    Ok(store)
}

/// Streams the rows of one table into `f`, with 1-based data row numbers.
fn parse_csv<T, F>(dir: &Path, file: &'static str, mut f: F) -> Result<(), LoadError>
where
    T: DeserializeOwned,
    F: FnMut(usize, T) -> Result<(), LoadError>,
{
    let path: PathBuf = dir.join(file);
    if !path.is_file() {
        return Err(LoadError::MissingFile(path));
    }
    let reader = File::open(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    for (i, result) in rdr.deserialize().enumerate() {
        let row: T = result.map_err(|source| LoadError::Csv { file, source })?;
        f(i + 1, row)?;
    }
    Ok(())
}
