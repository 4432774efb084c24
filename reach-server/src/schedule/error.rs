//! Load-time error types.

use std::path::PathBuf;

/// A malformed schedule detected while building the store.
///
/// The planner relies on monotone stop sequences and times along each trip,
/// so any of these aborts store construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityViolation {
    #[error("duplicate {table} id {id:?}")]
    DuplicateId { table: &'static str, id: String },

    #[error("{table} row {id:?} references unknown {target} {reference:?}")]
    DanglingReference {
        table: &'static str,
        id: String,
        target: &'static str,
        reference: String,
    },

    #[error("stop {stop:?} has parent {parent:?} which itself has a parent")]
    NestedParent { stop: String, parent: String },

    #[error("stop {stop:?} references itself as parent")]
    SelfParent { stop: String },

    #[error("trip {trip:?}: stop sequence {current} does not follow {previous}")]
    NonMonotonicSequence {
        trip: String,
        previous: u32,
        current: u32,
    },

    #[error("trip {trip:?} sequence {sequence}: arrival after departure")]
    ArrivalAfterDeparture { trip: String, sequence: u32 },

    #[error("trip {trip:?} sequence {sequence}: arrives before the previous departure")]
    TimeGoesBackwards { trip: String, sequence: u32 },
}

/// Errors from reading a dataset directory.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required file {0}")]
    MissingFile(PathBuf),

    #[error("{file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{file} row {row}: invalid time {value:?}")]
    InvalidTime {
        file: &'static str,
        row: usize,
        value: String,
    },

    #[error("{file} row {row}: invalid date {value:?}, expected YYYYMMDD")]
    InvalidDate {
        file: &'static str,
        row: usize,
        value: String,
    },

    #[error("{file} row {row}: unknown exception type {value}")]
    InvalidExceptionType {
        file: &'static str,
        row: usize,
        value: u8,
    },

    #[error("integrity violation: {0}")]
    Integrity(#[from] IntegrityViolation),
}
