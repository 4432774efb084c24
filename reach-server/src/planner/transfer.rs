//! Transfer-candidate generation.
//!
//! Joins a leg arriving at a station with the legs leaving that station
//! inside the transfer window. The join runs against the departure-sorted
//! connection index, so each arrival only touches departures in its window
//! instead of every departure at the station.

use chrono::Duration;

use super::connections::ConnectionIndex;
use crate::domain::{DirectConnection, StopIdx, TransferWindow};
use crate::schedule::{ActiveTrips, ScheduleStore};

/// Identifies a two-leg candidate by where it starts, ends and changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateKey {
    pub origin: StopIdx,
    pub destination: StopIdx,
    pub transfer_stop: StopIdx,
}

/// Two legs joined at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCandidate {
    pub first: DirectConnection,
    pub second: DirectConnection,
}

impl TransferCandidate {
    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            origin: self.first.from,
            destination: self.second.to,
            transfer_stop: self.first.to,
        }
    }

    /// Wait between the legs.
    pub fn wait(&self) -> Duration {
        self.second.depart.signed_duration_since(self.first.arrive)
    }

    /// First departure to final arrival.
    pub fn duration(&self) -> Duration {
        self.second.arrive.signed_duration_since(self.first.depart)
    }
}

/// Generates onward legs valid after a given leg, for one service date.
pub struct TransferGenerator<'a> {
    store: &'a ScheduleStore,
    index: &'a ConnectionIndex,
    window: TransferWindow,
    active: &'a ActiveTrips,
}

impl<'a> TransferGenerator<'a> {
    pub fn new(
        store: &'a ScheduleStore,
        index: &'a ConnectionIndex,
        window: TransferWindow,
        active: &'a ActiveTrips,
    ) -> Self {
        Self {
            store,
            index,
            window,
            active,
        }
    }

    pub fn window(&self) -> &TransferWindow {
        &self.window
    }

    /// Legs on active trips that can follow `first`.
    ///
    /// Each returned leg departs `first.to`, is on a different trip, and
    /// leaves between `min` and `max` minutes after `first` arrives.
    pub fn onward(&self, first: DirectConnection) -> impl Iterator<Item = DirectConnection> + 'a {
        let (lo, hi) = self.window.departure_bounds(first.arrive);
        let window = self.window;
        let active = self.active;
        self.index
            .connections_from(self.store, first.to, lo, hi)
            .filter(move |second| active.contains(second.trip) && window.connects(&first, second))
    }

    /// Two-leg candidates starting with `first`.
    pub fn candidates(&self, first: DirectConnection) -> impl Iterator<Item = TransferCandidate> + 'a {
        self.onward(first)
            .map(move |second| TransferCandidate { first, second })
    }
}
