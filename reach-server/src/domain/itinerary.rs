//! Itinerary type.
//!
//! An `Itinerary` is an ordered chain of one to three direct connections
//! from an origin station to a destination station.

use chrono::Duration;

use super::{DirectConnection, DomainError, ScheduleTime, StopIdx, TransferWindow};

/// A validated chain of legs.
///
/// # Invariants
///
/// - Between 1 and [`Itinerary::MAX_LEGS`] legs
/// - `legs[i].to == legs[i + 1].from`
/// - Each wait `legs[i + 1].depart - legs[i].arrive` lies inside the transfer
///   window the itinerary was built with
/// - Consecutive legs are on different trips
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    legs: Vec<DirectConnection>,
}

impl Itinerary {
    /// Two transfers at most.
    pub const MAX_LEGS: usize = 3;

    /// A single-leg itinerary. Always valid.
    pub fn direct(leg: DirectConnection) -> Self {
        Self { legs: vec![leg] }
    }

    /// Constructs an itinerary, validating continuity and transfer waits.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there are no legs or more than three, if a leg
    /// travels backwards, if consecutive legs don't meet at one station or
    /// share a trip, or if a wait falls outside `window`.
    ///
    /// # Examples
    ///
    /// ```
    /// use reach_server::domain::{DirectConnection, Itinerary, ScheduleTime, StopIdx, TransferWindow, TripIdx};
    ///
    /// let first = DirectConnection {
    ///     trip: TripIdx(0),
    ///     from: StopIdx(0),
    ///     depart: ScheduleTime::from_hm(8, 10),
    ///     to: StopIdx(1),
    ///     arrive: ScheduleTime::from_hm(9, 40),
    /// };
    /// let second = DirectConnection {
    ///     trip: TripIdx(1),
    ///     from: StopIdx(1),
    ///     depart: ScheduleTime::from_hm(9, 50),
    ///     to: StopIdx(2),
    ///     arrive: ScheduleTime::from_hm(10, 0),
    /// };
    ///
    /// let itinerary = Itinerary::new(vec![first, second], &TransferWindow::default()).unwrap();
    /// assert_eq!(itinerary.transfer_count(), 1);
    /// assert_eq!(itinerary.duration().num_minutes(), 110);
    /// ```
    pub fn new(legs: Vec<DirectConnection>, window: &TransferWindow) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyItinerary);
        }
        if legs.len() > Self::MAX_LEGS {
            return Err(DomainError::TooManyLegs(legs.len()));
        }
        if legs.iter().any(|leg| leg.arrive < leg.depart) {
            return Err(DomainError::BackwardsLeg);
        }

        for pair in legs.windows(2) {
            let (first, second) = (&pair[0], &pair[1]);
            if first.to != second.from {
                return Err(DomainError::Disconnected(first.to, second.from));
            }
            if first.trip == second.trip {
                return Err(DomainError::SameTrip);
            }
            if !window.accepts(first.arrive, second.depart) {
                return Err(DomainError::TransferOutsideWindow {
                    stop: first.to,
                    wait_mins: second.depart.signed_duration_since(first.arrive).num_minutes(),
                });
            }
        }

        Ok(Self { legs })
    }

    pub fn legs(&self) -> &[DirectConnection] {
        &self.legs
    }

    fn first(&self) -> &DirectConnection {
        // Non-empty by construction
        &self.legs[0]
    }

    fn last(&self) -> &DirectConnection {
        &self.legs[self.legs.len() - 1]
    }

    pub fn origin(&self) -> StopIdx {
        self.first().from
    }

    pub fn destination(&self) -> StopIdx {
        self.last().to
    }

    pub fn departure(&self) -> ScheduleTime {
        self.first().depart
    }

    pub fn arrival(&self) -> ScheduleTime {
        self.last().arrive
    }

    /// Total time from first departure to final arrival, waits included.
    pub fn duration(&self) -> Duration {
        self.arrival().signed_duration_since(self.departure())
    }

    pub fn transfer_count(&self) -> usize {
        self.legs.len() - 1
    }

    /// Stations where the traveller changes, in order.
    pub fn transfer_stops(&self) -> impl Iterator<Item = StopIdx> + '_ {
        self.legs[..self.legs.len() - 1].iter().map(|leg| leg.to)
    }
}
