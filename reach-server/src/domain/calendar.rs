//! Sparse service-calendar exceptions.

use chrono::NaiveDate;

use super::ServiceIdx;

/// Whether an exception adds or removes service on its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionType {
    Added,
    Removed,
}

impl ExceptionType {
    /// Decodes the GTFS `exception_type` column (1 = added, 2 = removed).
    pub fn from_gtfs(code: u8) -> Option<Self> {
        match code {
            1 => Some(ExceptionType::Added),
            2 => Some(ExceptionType::Removed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceException {
    pub service: ServiceIdx,
    pub date: NaiveDate,
    pub kind: ExceptionType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gtfs_exception_codes() {
        assert_eq!(ExceptionType::from_gtfs(1), Some(ExceptionType::Added));
        assert_eq!(ExceptionType::from_gtfs(2), Some(ExceptionType::Removed));
        assert_eq!(ExceptionType::from_gtfs(0), None);
        assert_eq!(ExceptionType::from_gtfs(3), None);
    }
}
