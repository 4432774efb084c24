//! Calendar validation over sparse exceptions.
//!
//! The dataset has no recurring weekly calendar. A service runs on a date
//! only if an explicit "added" exception exists for that exact date; a
//! missing row means the service does not run.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::domain::{ExceptionType, ServiceException, ServiceIdx, TripIdx};

/// Decides whether a service operates on a date.
#[derive(Debug, Default, Clone)]
pub struct CalendarValidator {
    added: HashSet<(ServiceIdx, NaiveDate)>,
    /// Rows read, including "removed" ones
    rows: usize,
}

impl CalendarValidator {
    pub fn new(exceptions: impl IntoIterator<Item = ServiceException>) -> Self {
        let mut validator = Self::default();
        for exception in exceptions {
            validator.rows += 1;
            if exception.kind == ExceptionType::Added {
                validator.added.insert((exception.service, exception.date));
            }
        }
        validator
    }

    /// True iff an "added" exception exists for this service and date.
    ///
    /// "Removed" rows carry no extra meaning: without an added row the
    /// service is already inactive.
    pub fn is_active(&self, service: ServiceIdx, date: NaiveDate) -> bool {
        self.added.contains(&(service, date))
    }

    pub fn exception_count(&self) -> usize {
        self.rows
    }
}

/// Per-trip activity flags for one date, indexed by `TripIdx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTrips {
    flags: Vec<bool>,
}

impl ActiveTrips {
    pub(crate) fn new(flags: Vec<bool>) -> Self {
        Self { flags }
    }

    /// Unknown trips are inactive.
    pub fn contains(&self, trip: TripIdx) -> bool {
        self.flags.get(trip.as_usize()).copied().unwrap_or(false)
    }

    pub fn count(&self) -> usize {
        self.flags.iter().filter(|active| **active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn exception(service: u32, d: u32, kind: ExceptionType) -> ServiceException {
        ServiceException {
            service: ServiceIdx(service),
            date: date(d),
            kind,
        }
    }

    #[test]
    fn active_only_with_added_row() {
        let validator = CalendarValidator::new([
            exception(0, 3, ExceptionType::Added),
            exception(1, 3, ExceptionType::Removed),
        ]);

        assert!(validator.is_active(ServiceIdx(0), date(3)));
        assert!(!validator.is_active(ServiceIdx(0), date(4)));
        assert!(!validator.is_active(ServiceIdx(1), date(3)));
        assert_eq!(validator.exception_count(), 2);
        assert!(!validator.is_active(ServiceIdx(2), date(3)));
    }

    #[test]
    fn repeated_queries_are_stable() {
        let validator = CalendarValidator::new([exception(0, 3, ExceptionType::Added)]);
        for _ in 0..3 {
            assert!(validator.is_active(ServiceIdx(0), date(3)));
            assert!(!validator.is_active(ServiceIdx(0), date(5)));
        }
    }

    #[test]
    fn active_trips_lookup() {
        let active = ActiveTrips::new(vec![true, false, true]);
        assert!(active.contains(TripIdx(0)));
        assert!(!active.contains(TripIdx(1)));
        assert!(!active.contains(TripIdx(9)));
        assert_eq!(active.count(), 2);
    }
}
