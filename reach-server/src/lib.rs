//! Schedule-based reachability engine.
//!
//! Answers: "leaving this station on this day within this window, where
//! can I get to, and what is the quickest way there with at most two
//! changes?"

pub mod domain;
pub mod engine;
pub mod planner;
pub mod schedule;
pub mod stations;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;
