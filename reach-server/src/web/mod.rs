//! Web layer for the reachability engine.
//!
//! Provides HTTP endpoints for destination search and station resolution.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
