//! Station resolution.
//!
//! Maps identifiers used outside the dataset to station-level stops of the
//! schedule store, with a shared memo of every answer.

mod resolver;

pub use resolver::{ResolverConfig, StationResolver};
