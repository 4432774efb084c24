//! Ordering of itineraries and of reachable destinations.

use std::cmp::Ordering;

use crate::domain::{DirectConnection, Itinerary, StopIdx};
use crate::schedule::ScheduleStore;

use super::reach::ReachMap;

/// Orders leg chains best-first.
///
/// Chains are ordered by:
/// 1. Total duration (shorter is better)
/// 2. Number of transfers (fewer is better)
/// 3. Departure time (earlier is better)
/// 4. The legs themselves, so the order is total
///
/// Empty chains sort last.
pub fn compare_legs(a: &[DirectConnection], b: &[DirectConnection]) -> Ordering {
    let (Some(a_first), Some(a_last), Some(b_first), Some(b_last)) =
        (a.first(), a.last(), b.first(), b.last())
    else {
        return b.len().min(1).cmp(&a.len().min(1));
    };

    let a_duration = a_last.arrive.signed_duration_since(a_first.depart);
    let b_duration = b_last.arrive.signed_duration_since(b_first.depart);

    a_duration
        .cmp(&b_duration)
        .then_with(|| a.len().cmp(&b.len()))
        .then_with(|| a_first.depart.cmp(&b_first.depart))
        .then_with(|| a.cmp(b))
}

/// Orders itineraries best-first. See [`compare_legs`].
pub fn compare_itineraries(a: &Itinerary, b: &Itinerary) -> Ordering {
    compare_legs(a.legs(), b.legs())
}

/// Flattens a reach map into a list ordered by duration, then transfer
/// count, then destination name.
pub fn rank_reachable(store: &ScheduleStore, reach: ReachMap) -> Vec<(StopIdx, Itinerary)> {
    let mut ranked: Vec<_> = reach.into_iter().collect();
    ranked.sort_by(|(a_stop, a), (b_stop, b)| {
        a.duration()
            .cmp(&b.duration())
            .then_with(|| a.transfer_count().cmp(&b.transfer_count()))
            .then_with(|| store.stop(*a_stop).name.cmp(&store.stop(*b_stop).name))
            .then_with(|| a_stop.cmp(b_stop))
    });
    ranked
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{ScheduleTime, TripIdx};
    use proptest::prelude::*;

    fn arb_leg() -> impl Strategy<Value = DirectConnection> {
        (0u32..5, 0u32..600, 1u32..300).prop_map(|(trip, dep, dur)| DirectConnection {
            trip: TripIdx(trip),
            from: StopIdx(0),
            depart: ScheduleTime::from_hm(6, 0).saturating_add(chrono::Duration::minutes(dep.into())),
            to: StopIdx(1),
            arrive: ScheduleTime::from_hm(6, 0)
                .saturating_add(chrono::Duration::minutes((dep + dur).into())),
        })
    }

    proptest! {
        /// Sorting by compare_itineraries yields non-decreasing durations
        #[test]
        fn sorted_by_duration(legs in proptest::collection::vec(arb_leg(), 0..20)) {
            let mut itineraries: Vec<_> = legs.into_iter().map(Itinerary::direct).collect();
            itineraries.sort_by(compare_itineraries);
            for pair in itineraries.windows(2) {
                prop_assert!(pair[0].duration() <= pair[1].duration());
            }
        }

        /// The comparison is antisymmetric
        #[test]
        fn antisymmetric(a in arb_leg(), b in arb_leg()) {
            let (a, b) = (Itinerary::direct(a), Itinerary::direct(b));
            prop_assert_eq!(compare_itineraries(&a, &b), compare_itineraries(&b, &a).reverse());
        }
    }
}
