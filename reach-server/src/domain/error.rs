//! Domain error types.
//!
//! These errors represent itinerary construction failures in the domain
//! layer. They are distinct from load-time and API errors.

use super::StopIdx;

/// Domain-level errors for itinerary validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Itinerary has no legs
    #[error("itinerary must have at least one leg")]
    EmptyItinerary,

    /// More legs than two transfers allow
    #[error("itinerary has {0} legs, at most {max} allowed", max = super::Itinerary::MAX_LEGS)]
    TooManyLegs(usize),

    /// Consecutive legs don't meet at the same station
    #[error("leg arriving at stop {0} does not connect to leg departing stop {1}")]
    Disconnected(StopIdx, StopIdx),

    /// Wait at a transfer station is outside the transfer window
    #[error("transfer at stop {stop} waits {wait_mins} minutes, outside the transfer window")]
    TransferOutsideWindow { stop: StopIdx, wait_mins: i64 },

    /// Consecutive legs ride the same trip
    #[error("consecutive legs must be on different trips")]
    SameTrip,

    /// A leg arrives before it departs
    #[error("leg arrives before it departs")]
    BackwardsLeg,
}
