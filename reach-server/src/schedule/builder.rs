//! Assembly of the schedule store from raw rows.
//!
//! Rows arrive with string identifiers in any table order. `build` resolves
//! every reference to a dense index and rejects malformed data, so the store
//! it returns can be indexed without further checks.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use super::{CalendarValidator, IntegrityViolation, ScheduleStore};
use crate::domain::{
    ExceptionType, Route, RouteIdx, RouteMode, ScheduleTime, ServiceException, ServiceIdx, Stop,
    StopIdx, StopKind, StopTime, Trip, TripIdx,
};

#[derive(Debug, Clone, PartialEq)]
pub struct StopRecord {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub parent: Option<String>,
    /// Marks the stop as an area even if nothing references it.
    pub is_station: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRecord {
    pub id: String,
    pub short_name: String,
    pub long_name: String,
    pub mode: RouteMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub id: String,
    pub route_id: String,
    pub service_id: String,
    pub headsign: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopTimeRecord {
    pub trip_id: String,
    pub stop_id: String,
    pub arrival: ScheduleTime,
    pub departure: ScheduleTime,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionRecord {
    pub service_id: String,
    pub date: NaiveDate,
    pub kind: ExceptionType,
}

/// Collects dataset rows and validates them into a [`ScheduleStore`].
#[derive(Debug, Default)]
pub struct ScheduleBuilder {
    stops: Vec<StopRecord>,
    routes: Vec<RouteRecord>,
    trips: Vec<TripRecord>,
    stop_times: Vec<StopTimeRecord>,
    exceptions: Vec<ExceptionRecord>,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stop(&mut self, record: StopRecord) -> &mut Self {
        self.stops.push(record);
        self
    }

    pub fn add_route(&mut self, record: RouteRecord) -> &mut Self {
        self.routes.push(record);
        self
    }

    pub fn add_trip(&mut self, record: TripRecord) -> &mut Self {
        self.trips.push(record);
        self
    }

    /// Stop times of one trip must be added in visit order.
    pub fn add_stop_time(&mut self, record: StopTimeRecord) -> &mut Self {
        self.stop_times.push(record);
        self
    }

    pub fn add_exception(&mut self, record: ExceptionRecord) -> &mut Self {
        self.exceptions.push(record);
        self
    }

    /// Validates all rows and produces the immutable store.
    ///
    /// # Errors
    ///
    /// Returns the first [`IntegrityViolation`] found: duplicate ids,
    /// references to unknown rows, parents nested more than one level,
    /// arrival after departure, a stop sequence that does not strictly
    /// increase, or a trip whose times go backwards.
    pub fn build(self) -> Result<ScheduleStore, IntegrityViolation> {
        let (stops, stop_lookup) = build_stops(self.stops)?;
        let (routes, route_lookup) = build_routes(self.routes)?;

        let mut services = ServiceInterner::default();
        let mut trips = Vec::with_capacity(self.trips.len());
        let mut trip_lookup = HashMap::with_capacity(self.trips.len());
        for record in self.trips {
            let id: Arc<str> = record.id.into();
            let route = *route_lookup.get(record.route_id.as_str()).ok_or_else(|| {
                IntegrityViolation::DanglingReference {
                    table: "trips",
                    id: id.to_string(),
                    target: "route",
                    reference: record.route_id.clone(),
                }
            })?;
            let idx = TripIdx(trips.len() as u32);
            if trip_lookup.insert(Arc::clone(&id), idx).is_some() {
                return Err(IntegrityViolation::DuplicateId {
                    table: "trips",
                    id: id.to_string(),
                });
            }
            trips.push(Trip {
                id,
                route,
                service: services.intern(&record.service_id),
                headsign: record.headsign,
            });
        }

        let (stop_times, trip_offsets) =
            build_stop_times(self.stop_times, &trips, &trip_lookup, &stop_lookup)?;

        let exceptions: Vec<ServiceException> = self
            .exceptions
            .into_iter()
            .map(|record| ServiceException {
                service: services.intern(&record.service_id),
                date: record.date,
                kind: record.kind,
            })
            .collect();

        let station_of = stops
            .iter()
            .enumerate()
            .map(|(i, stop)| stop.parent.unwrap_or(StopIdx(i as u32)))
            .collect();
        let mut children = vec![Vec::new(); stops.len()];
        for (i, stop) in stops.iter().enumerate() {
            if let Some(parent) = stop.parent {
                children[parent.as_usize()].push(StopIdx(i as u32));
            }
        }

        Ok(ScheduleStore {
            stops: stops.into_boxed_slice(),
            stop_lookup,
            station_of,
            children,
            routes: routes.into_boxed_slice(),
            trips: trips.into_boxed_slice(),
            trip_lookup,
            stop_times: stop_times.into_boxed_slice(),
            trip_offsets: trip_offsets.into_boxed_slice(),
            service_lookup: services.lookup,
            calendar: CalendarValidator::new(exceptions),
        })
    }
}

type Lookup<I> = HashMap<Arc<str>, I>;

fn build_stops(records: Vec<StopRecord>) -> Result<(Vec<Stop>, Lookup<StopIdx>), IntegrityViolation> {
    let mut lookup: Lookup<StopIdx> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if lookup.insert(record.id.as_str().into(), StopIdx(i as u32)).is_some() {
            return Err(IntegrityViolation::DuplicateId {
                table: "stops",
                id: record.id.clone(),
            });
        }
    }

    let mut parents = Vec::with_capacity(records.len());
    for record in &records {
        let parent = match record.parent.as_deref().filter(|p| !p.is_empty()) {
            None => None,
            Some(parent_id) if parent_id == record.id => {
                return Err(IntegrityViolation::SelfParent {
                    stop: record.id.clone(),
                });
            }
            Some(parent_id) => Some(*lookup.get(parent_id).ok_or_else(|| {
                IntegrityViolation::DanglingReference {
                    table: "stops",
                    id: record.id.clone(),
                    target: "parent stop",
                    reference: parent_id.to_string(),
                }
            })?),
        };
        parents.push(parent);
    }

    let mut has_children = vec![false; records.len()];
    for (record, parent) in records.iter().zip(&parents) {
        if let Some(parent) = parent {
            if parents[parent.as_usize()].is_some() {
                return Err(IntegrityViolation::NestedParent {
                    stop: record.id.clone(),
                    parent: records[parent.as_usize()].id.clone(),
                });
            }
            has_children[parent.as_usize()] = true;
        }
    }

    let stops = records
        .into_iter()
        .zip(parents)
        .zip(has_children)
        .map(|((record, parent), has_children)| Stop {
            kind: if has_children || (record.is_station && parent.is_none()) {
                StopKind::Area
            } else {
                StopKind::Point
            },
            id: record.id.into(),
            name: record.name,
            lat: record.lat,
            lon: record.lon,
            parent,
        })
        .collect();

    Ok((stops, lookup))
}

fn build_routes(records: Vec<RouteRecord>) -> Result<(Vec<Route>, Lookup<RouteIdx>), IntegrityViolation> {
    let mut routes = Vec::with_capacity(records.len());
    let mut lookup = HashMap::with_capacity(records.len());
    for record in records {
        let id: Arc<str> = record.id.into();
        if lookup
            .insert(Arc::clone(&id), RouteIdx(routes.len() as u32))
            .is_some()
        {
            return Err(IntegrityViolation::DuplicateId {
                table: "routes",
                id: id.to_string(),
            });
        }
        routes.push(Route {
            id,
            short_name: record.short_name,
            long_name: record.long_name,
            mode: record.mode,
        });
    }
    Ok((routes, lookup))
}

/// Groups stop times by trip, keeping input order within each trip, and
/// checks sequence and time monotonicity.
fn build_stop_times(
    records: Vec<StopTimeRecord>,
    trips: &[Trip],
    trip_lookup: &Lookup<TripIdx>,
    stop_lookup: &Lookup<StopIdx>,
) -> Result<(Vec<StopTime>, Vec<u32>), IntegrityViolation> {
    let mut per_trip: Vec<Vec<StopTime>> = vec![Vec::new(); trips.len()];

    for record in records {
        let trip = *trip_lookup.get(record.trip_id.as_str()).ok_or_else(|| {
            IntegrityViolation::DanglingReference {
                table: "stop_times",
                id: format!("{}#{}", record.trip_id, record.sequence),
                target: "trip",
                reference: record.trip_id.clone(),
            }
        })?;
        let stop = *stop_lookup.get(record.stop_id.as_str()).ok_or_else(|| {
            IntegrityViolation::DanglingReference {
                table: "stop_times",
                id: format!("{}#{}", record.trip_id, record.sequence),
                target: "stop",
                reference: record.stop_id.clone(),
            }
        })?;

        if record.arrival > record.departure {
            return Err(IntegrityViolation::ArrivalAfterDeparture {
                trip: record.trip_id,
                sequence: record.sequence,
            });
        }

        let visits = &mut per_trip[trip.as_usize()];
        if let Some(previous) = visits.last() {
            if record.sequence <= previous.sequence {
                return Err(IntegrityViolation::NonMonotonicSequence {
                    trip: record.trip_id,
                    previous: previous.sequence,
                    current: record.sequence,
                });
            }
            if record.arrival < previous.departure {
                return Err(IntegrityViolation::TimeGoesBackwards {
                    trip: record.trip_id,
                    sequence: record.sequence,
                });
            }
        }

        visits.push(StopTime {
            trip,
            stop,
            arrival: record.arrival,
            departure: record.departure,
            sequence: record.sequence,
        });
    }

    let total = per_trip.iter().map(Vec::len).sum();
    let mut stop_times = Vec::with_capacity(total);
    let mut offsets = Vec::with_capacity(trips.len() + 1);
    offsets.push(0);
    for visits in per_trip {
        stop_times.extend(visits);
        offsets.push(stop_times.len() as u32);
    }
    Ok((stop_times, offsets))
}

#[derive(Default)]
struct ServiceInterner {
    ids: Vec<Arc<str>>,
    lookup: Lookup<ServiceIdx>,
}

impl ServiceInterner {
    fn intern(&mut self, id: &str) -> ServiceIdx {
        if let Some(idx) = self.lookup.get(id) {
            return *idx;
        }
        let idx = ServiceIdx(self.ids.len() as u32);
        let id: Arc<str> = id.into();
        self.ids.push(Arc::clone(&id));
        self.lookup.insert(id, idx);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str, parent: Option<&str>) -> StopRecord {
        StopRecord {
            id: id.into(),
            name: id.into(),
            lat: 0.0,
            lon: 0.0,
            parent: parent.map(Into::into),
            is_station: false,
        }
    }

    fn route(id: &str) -> RouteRecord {
        RouteRecord {
            id: id.into(),
            short_name: id.into(),
            long_name: String::new(),
            mode: RouteMode::Rail,
        }
    }

    fn trip(id: &str, route: &str) -> TripRecord {
        TripRecord {
            id: id.into(),
            route_id: route.into(),
            service_id: "S".into(),
            headsign: String::new(),
        }
    }

    fn visit(trip: &str, stop: &str, arr: (u32, u32), dep: (u32, u32), seq: u32) -> StopTimeRecord {
        StopTimeRecord {
            trip_id: trip.into(),
            stop_id: stop.into(),
            arrival: ScheduleTime::from_hm(arr.0, arr.1),
            departure: ScheduleTime::from_hm(dep.0, dep.1),
            sequence: seq,
        }
    }

    fn base() -> ScheduleBuilder {
        let mut builder = ScheduleBuilder::new();
        builder
            .add_stop(stop("A", None))
            .add_stop(stop("A1", Some("A")))
            .add_stop(stop("B", None))
            .add_route(route("R"))
            .add_trip(trip("T", "R"));
        builder
    }

    #[test]
    fn builds_hierarchy() {
        let mut builder = base();
        builder
            .add_stop_time(visit("T", "A1", (8, 0), (8, 0), 1))
            .add_stop_time(visit("T", "B", (9, 0), (9, 0), 2));
        let store = builder.build().unwrap();

        let a = store.stop_by_id("A").unwrap();
        let a1 = store.stop_by_id("A1").unwrap();
        assert_eq!(store.stop(a).kind, StopKind::Area);
        assert_eq!(store.stop(a1).kind, StopKind::Point);
        assert_eq!(store.station_of(a1), a);
        assert_eq!(store.children_of(a), &[a1]);
        assert_eq!(store.stop_times_of(store.trip_by_id("T").unwrap()).len(), 2);
    }

    #[test]
    fn rejects_duplicate_stop() {
        let mut builder = base();
        builder.add_stop(stop("A", None));
        assert!(matches!(
            builder.build(),
            Err(IntegrityViolation::DuplicateId { table: "stops", .. })
        ));
    }

    #[test]
    fn rejects_dangling_route() {
        let mut builder = base();
        builder.add_trip(trip("T2", "missing"));
        assert!(matches!(
            builder.build(),
            Err(IntegrityViolation::DanglingReference { target: "route", .. })
        ));
    }

    #[test]
    fn rejects_nested_parent() {
        let mut builder = base();
        builder.add_stop(stop("A1x", Some("A1")));
        assert!(matches!(
            builder.build(),
            Err(IntegrityViolation::NestedParent { .. })
        ));
    }

    #[test]
    fn rejects_non_monotonic_sequence() {
        let mut builder = base();
        builder
            .add_stop_time(visit("T", "A1", (8, 0), (8, 0), 2))
            .add_stop_time(visit("T", "B", (9, 0), (9, 0), 2));
        assert_eq!(
            builder.build().unwrap_err(),
            IntegrityViolation::NonMonotonicSequence {
                trip: "T".into(),
                previous: 2,
                current: 2,
            }
        );
    }

    #[test]
    fn rejects_arrival_after_departure() {
        let mut builder = base();
        builder.add_stop_time(visit("T", "A1", (8, 5), (8, 0), 1));
        assert!(matches!(
            builder.build(),
            Err(IntegrityViolation::ArrivalAfterDeparture { sequence: 1, .. })
        ));
    }

    #[test]
    fn rejects_time_going_backwards() {
        let mut builder = base();
        builder
            .add_stop_time(visit("T", "A1", (8, 0), (8, 10), 1))
            .add_stop_time(visit("T", "B", (8, 5), (8, 5), 2));
        assert!(matches!(
            builder.build(),
            Err(IntegrityViolation::TimeGoesBackwards { sequence: 2, .. })
        ));
    }

    #[test]
    fn unknown_service_in_exceptions_is_interned() {
        let mut builder = base();
        builder.add_exception(ExceptionRecord {
            service_id: "only-in-calendar".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            kind: ExceptionType::Added,
        });
        let store = builder.build().unwrap();
        assert!(store.is_service_active("only-in-calendar", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
    }
}
