//! Schedule time handling.
//!
//! Timetables give times as seconds past the midnight that opens the service
//! day. Trips running after midnight keep counting past 24:00 ("25:10:00"),
//! so the times along a trip stay monotone and durations never wrap.

use chrono::Duration;
use std::fmt;

/// Error returned when parsing an invalid time string or window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of the service day, in seconds since its midnight.
///
/// # Examples
///
/// ```
/// use reach_server::domain::ScheduleTime;
///
/// let t = ScheduleTime::parse_hms("25:10:00").unwrap();
/// assert_eq!(t.to_string(), "25:10");
/// assert_eq!(ScheduleTime::parse_hhmm("08:05").unwrap().as_seconds(), 8 * 3600 + 5 * 60);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleTime(u32);

impl ScheduleTime {
    /// Midnight at the start of the service day.
    pub const MIDNIGHT: Self = Self(0);

    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    /// Builds a time from hours and minutes. Hours may exceed 23.
    pub const fn from_hm(hour: u32, minute: u32) -> Self {
        Self(hour * 3600 + minute * 60)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    /// Parse a query time in strict "HH:MM" format (00:00 to 23:59).
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Ok(Self::from_hm(hour, minute))
    }

    /// Parse a timetable time in "H:MM:SS" or "HH:MM:SS" format.
    ///
    /// Hours are not capped at 23: "24:30:00" is half past midnight of the
    /// following calendar day, still on the same service day.
    pub fn parse_hms(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected H:MM:SS format"));
        };

        if h.is_empty() || h.len() > 3 || !h.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeError::new("invalid hour digits"));
        }
        let hour: u32 = h
            .parse()
            .map_err(|_| TimeError::new("invalid hour digits"))?;

        let minute = parse_two_digits(m.as_bytes())
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        let second = parse_two_digits(sec.as_bytes())
            .ok_or_else(|| TimeError::new("invalid second digits"))?;
        if minute > 59 || second > 59 {
            return Err(TimeError::new("minutes and seconds must be 0-59"));
        }

        Ok(Self(hour * 3600 + minute * 60 + second))
    }

    /// Hours since the start of the service day (may exceed 23).
    pub fn hour(&self) -> u32 {
        self.0 / 3600
    }

    pub fn minute(&self) -> u32 {
        (self.0 % 3600) / 60
    }

    /// Returns the duration between two times.
    ///
    /// Returns a negative duration if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        Duration::seconds(i64::from(self.0) - i64::from(other.0))
    }

    /// Shift by a (possibly negative) duration, clamping at the start of the
    /// service day.
    pub fn saturating_add(&self, duration: Duration) -> Self {
        let secs = (i64::from(self.0) + duration.num_seconds()).clamp(0, i64::from(u32::MAX));
        Self(secs as u32)
    }
}

impl fmt::Debug for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScheduleTime({:02}:{:02}:{:02})",
            self.hour(),
            self.minute(),
            self.0 % 60
        )
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// An inclusive departure window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: ScheduleTime,
    end: ScheduleTime,
}

impl TimeWindow {
    /// Create a window. Fails if `end` precedes `start`.
    pub fn new(start: ScheduleTime, end: ScheduleTime) -> Result<Self, TimeError> {
        if end < start {
            return Err(TimeError::new("window end precedes its start"));
        }
        Ok(Self { start, end })
    }

    /// Parse a window from two "HH:MM" strings.
    pub fn parse_hhmm(start: &str, end: &str) -> Result<Self, TimeError> {
        Self::new(
            ScheduleTime::parse_hhmm(start)?,
            ScheduleTime::parse_hhmm(end)?,
        )
    }

    pub fn start(&self) -> ScheduleTime {
        self.start
    }

    pub fn end(&self) -> ScheduleTime {
        self.end
    }

    pub fn contains(&self, time: ScheduleTime) -> bool {
        self.start <= time && time <= self.end
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Formatting a parsed HH:MM time gives back the input
        #[test]
        fn hhmm_roundtrip(h in 0u32..24, m in 0u32..60) {
            let s = format!("{h:02}:{m:02}");
            let t = ScheduleTime::parse_hhmm(&s).unwrap();
            prop_assert_eq!(t.to_string(), s);
        }

        /// H:MM:SS parses to the expected second count, including hours past 23
        #[test]
        fn hms_seconds(h in 0u32..48, m in 0u32..60, s in 0u32..60) {
            let text = format!("{h}:{m:02}:{s:02}");
            let t = ScheduleTime::parse_hms(&text).unwrap();
            prop_assert_eq!(t.as_seconds(), h * 3600 + m * 60 + s);
        }

        /// Ordering agrees with the second count
        #[test]
        fn ordering_matches_seconds(a in 0u32..200_000, b in 0u32..200_000) {
            let (ta, tb) = (ScheduleTime::from_seconds(a), ScheduleTime::from_seconds(b));
            prop_assert_eq!(ta.cmp(&tb), a.cmp(&b));
            prop_assert_eq!(tb.signed_duration_since(ta).num_seconds(), i64::from(b) - i64::from(a));
        }
    }
}
