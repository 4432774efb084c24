//! Domain types for the reachability engine.
//!
//! This module contains the value types the schedule store and the planner
//! share. Types that carry invariants enforce them at construction time, so
//! code that receives them can trust their validity.

mod calendar;
mod connection;
mod error;
mod index;
mod itinerary;
mod stop;
mod time;
mod trip;

pub use calendar::{ExceptionType, ServiceException};
pub use connection::{DirectConnection, TransferWindow};
pub use error::DomainError;
pub use index::{RouteIdx, ServiceIdx, StopIdx, TripIdx};
pub use itinerary::Itinerary;
pub use stop::{Stop, StopKind};
pub use time::{ScheduleTime, TimeError, TimeWindow};
pub use trip::{Route, RouteMode, StopTime, Trip};
