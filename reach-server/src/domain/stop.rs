//! Stops and the area/point hierarchy.

use std::sync::Arc;

use super::StopIdx;

/// Whether a stop aggregates other stops or is a boarding point itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopKind {
    /// A logical station grouping one or more points.
    Area,
    /// A physical boarding location, possibly inside an area.
    Point,
}

/// A stop as held by the schedule store.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Dataset identifier (e.g. `StopArea:OCE87686006`)
    pub id: Arc<str>,
    /// Display name
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Enclosing area, if this stop is a point inside one
    pub parent: Option<StopIdx>,
    pub kind: StopKind,
}

impl Stop {
    pub fn is_area(&self) -> bool {
        self.kind == StopKind::Area
    }
}
