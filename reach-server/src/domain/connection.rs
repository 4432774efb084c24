//! Direct connections and the transfer window joining them.
//!
//! A `DirectConnection` is one leg: boarding a trip at one visit and
//! alighting at a later visit of the same trip. Endpoints are station-level
//! stops (the enclosing area when the visited stop has one), which is the
//! level transfers are made at.

use chrono::Duration;

use super::{ScheduleTime, StopIdx, TripIdx};

/// A non-transfer travel segment on a single trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirectConnection {
    pub trip: TripIdx,
    pub from: StopIdx,
    pub depart: ScheduleTime,
    pub to: StopIdx,
    pub arrive: ScheduleTime,
}

impl DirectConnection {
    /// Time spent on board.
    pub fn duration(&self) -> Duration {
        self.arrive.signed_duration_since(self.depart)
    }
}

/// Allowed wait between arriving on one leg and departing on the next.
///
/// Both bounds are inclusive.
///
/// # Examples
///
/// ```
/// use reach_server::domain::{ScheduleTime, TransferWindow};
///
/// let window = TransferWindow::default();
/// let arrive = ScheduleTime::from_hm(9, 40);
/// assert!(window.accepts(arrive, ScheduleTime::from_hm(9, 45)));
/// assert!(!window.accepts(arrive, ScheduleTime::from_hm(9, 44)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferWindow {
    min: Duration,
    max: Duration,
}

impl TransferWindow {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn from_minutes(min: i64, max: i64) -> Self {
        Self::new(Duration::minutes(min), Duration::minutes(max))
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// True if departing at `depart` after arriving at `arrive` is a valid
    /// change. Negative waits are never accepted.
    pub fn accepts(&self, arrive: ScheduleTime, depart: ScheduleTime) -> bool {
        let wait = depart.signed_duration_since(arrive);
        wait >= Duration::zero() && wait >= self.min && wait <= self.max
    }

    /// Earliest and latest onward departure for an arrival at `arrive`.
    pub fn departure_bounds(&self, arrive: ScheduleTime) -> (ScheduleTime, ScheduleTime) {
        let earliest = self.min.max(Duration::zero());
        (arrive.saturating_add(earliest), arrive.saturating_add(self.max))
    }

    /// True if `second` can follow `first`: same station, different trip,
    /// wait inside the window.
    pub fn connects(&self, first: &DirectConnection, second: &DirectConnection) -> bool {
        first.to == second.from
            && first.trip != second.trip
            && self.accepts(first.arrive, second.depart)
    }
}

impl Default for TransferWindow {
    fn default() -> Self {
        Self::from_minutes(5, 120)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// accepts() agrees with the inclusive [min, max] definition
        #[test]
        fn accepts_matches_definition(
            arrive in 0u32..100_000,
            wait in -10_000i64..20_000,
            min in 0i64..30,
            max in 30i64..240,
        ) {
            let window = TransferWindow::from_minutes(min, max);
            let a = ScheduleTime::from_seconds(arrive);
            let d = a.saturating_add(Duration::seconds(wait));
            let actual = d.signed_duration_since(a);
            let expected = actual >= Duration::minutes(min) && actual <= Duration::minutes(max);
            prop_assert_eq!(window.accepts(a, d), expected);
        }

        /// Any departure inside departure_bounds is accepted
        #[test]
        fn bounds_are_accepted(arrive in 0u32..100_000, offset in 0u32..=115 * 60) {
            let window = TransferWindow::default();
            let a = ScheduleTime::from_seconds(arrive);
            let (lo, _) = window.departure_bounds(a);
            let d = ScheduleTime::from_seconds(lo.as_seconds() + offset);
            prop_assert!(window.accepts(a, d));
        }
    }
}
