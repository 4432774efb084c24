//! Compact schedule fixtures for unit tests.

use chrono::NaiveDate;

use crate::domain::{ExceptionType, RouteMode, ScheduleTime};
use crate::schedule::{
    ExceptionRecord, RouteRecord, ScheduleBuilder, ScheduleStore, StopRecord, StopTimeRecord,
    TripRecord,
};

/// The service date fixtures are active on.
pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

pub fn hm(hour: u32, minute: u32) -> ScheduleTime {
    ScheduleTime::from_hm(hour, minute)
}

/// Builds a store from stations, points and trips given as stop lists.
///
/// Every trip runs on one shared route. Services only run on [`date`]
/// once marked with [`Fixture::active`].
pub struct Fixture {
    builder: ScheduleBuilder,
}

impl Fixture {
    pub fn new() -> Self {
        let mut builder = ScheduleBuilder::new();
        builder.add_route(RouteRecord {
            id: "R".into(),
            short_name: "TER".into(),
            long_name: String::new(),
            mode: RouteMode::Rail,
        });
        Self { builder }
    }

    /// Adds a station whose name equals its id.
    pub fn station(&mut self, id: &str) -> String {
        self.named_station(id, id)
    }

    pub fn named_station(&mut self, id: &str, name: &str) -> String {
        self.builder.add_stop(StopRecord {
            id: id.into(),
            name: name.into(),
            lat: 0.0,
            lon: 0.0,
            parent: None,
            is_station: true,
        });
        id.to_string()
    }

    /// Adds a point inside `parent`, sharing its name.
    pub fn point(&mut self, parent: &str, id: &str) -> String {
        self.builder.add_stop(StopRecord {
            id: id.into(),
            name: parent.into(),
            lat: 0.0,
            lon: 0.0,
            parent: Some(parent.into()),
            is_station: false,
        });
        id.to_string()
    }

    /// Adds a trip whose arrival and departure coincide at every stop.
    pub fn trip(&mut self, id: &str, service: &str, calls: &[(&str, ScheduleTime)]) {
        let calls: Vec<_> = calls.iter().map(|&(stop, t)| (stop, t, t)).collect();
        self.trip_dwelling(id, service, &calls);
    }

    /// Adds a trip with explicit (stop, arrival, departure) visits.
    pub fn trip_dwelling(
        &mut self,
        id: &str,
        service: &str,
        calls: &[(&str, ScheduleTime, ScheduleTime)],
    ) {
        self.builder.add_trip(TripRecord {
            id: id.into(),
            route_id: "R".into(),
            service_id: service.into(),
            headsign: String::new(),
        });
        for (seq, &(stop, arrival, departure)) in calls.iter().enumerate() {
            self.builder.add_stop_time(StopTimeRecord {
                trip_id: id.into(),
                stop_id: stop.into(),
                arrival,
                departure,
                sequence: seq as u32 + 1,
            });
        }
    }

    /// Marks `service` as running on [`date`].
    pub fn active(&mut self, service: &str) {
        self.builder.add_exception(ExceptionRecord {
            service_id: service.into(),
            date: date(),
            kind: ExceptionType::Added,
        });
    }

    pub fn build(self) -> ScheduleStore {
        self.builder.build().unwrap()
    }
}

/// The Paris → Lyon network: a direct 120-minute train and a faster
/// change at Mâcon, plus an inactive service to Dijon.
///
/// `macon_departure` sets when the onward train leaves Mâcon.
pub fn paris_lyon(macon_departure: ScheduleTime) -> ScheduleStore {
    let mut f = Fixture::new();
    f.named_station("StopArea:OCE87686006", "Paris Gare de Lyon");
    f.point("StopArea:OCE87686006", "StopPoint:OCE87686006-TGV");
    f.named_station("StopArea:OCE87725002", "Mâcon Ville");
    f.named_station("StopArea:OCE87723197", "Lyon Part Dieu");
    f.named_station("StopArea:OCE87713040", "Dijon Ville");

    f.trip(
        "T1",
        "daily",
        &[
            ("StopPoint:OCE87686006-TGV", hm(8, 5)),
            ("StopArea:OCE87723197", hm(10, 5)),
        ],
    );
    f.trip(
        "T2",
        "daily",
        &[
            ("StopArea:OCE87686006", hm(8, 10)),
            ("StopArea:OCE87725002", hm(9, 40)),
        ],
    );
    f.trip(
        "T3",
        "daily",
        &[
            ("StopArea:OCE87725002", macon_departure),
            ("StopArea:OCE87723197", hm(10, 0)),
        ],
    );
    f.trip(
        "T4",
        "sundays",
        &[
            ("StopArea:OCE87686006", hm(8, 15)),
            ("StopArea:OCE87713040", hm(9, 50)),
        ],
    );
    f.active("daily");
    f.build()
}
