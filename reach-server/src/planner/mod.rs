//! Reachability planner.
//!
//! This module answers: "leaving this station in this window, where can I
//! get to, and what is the quickest way to each place?"
//!
//! The direct-connection index enumerates legs, the transfer generator joins
//! them at stations, and the tiered search keeps the best itinerary per
//! destination.

mod cancel;
mod config;
mod connections;
mod locality;
mod memo;
mod rank;
mod reach;
mod transfer;

pub use cancel::CancellationToken;
pub use config::SearchConfig;
pub use connections::{ConnectionIndex, Departure, connections_after, trip_connections};
pub use locality::{LeadingPlaceName, LocalityGrouping, NoLocalityGrouping, fold_accents};
pub use memo::{MemoKey, TierMemo};
pub use rank::{compare_itineraries, compare_legs, rank_reachable};
pub use reach::{
    MAX_TRANSFERS, ReachMap, ReachRequest, Reachability, SearchError, TierResults,
};
pub use transfer::{CandidateKey, TransferCandidate, TransferGenerator};
