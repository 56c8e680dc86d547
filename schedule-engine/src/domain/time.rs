//! Passing times with day offsets.
//!
//! Schedules express passing times as a time of day plus a day offset
//! relative to the operating day of the journey, so a stop served at
//! "00:15" after a 23:50 departure carries an offset of one. This module
//! provides the value type for such times and the midnight-aware arithmetic
//! the validator needs.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::TemporalError;

/// Seconds in one calendar day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// A time of day together with the number of midnights since the
/// journey's operating day.
///
/// # Examples
///
/// ```
/// use schedule_engine::domain::DayOffsetTime;
///
/// let late = DayOffsetTime::parse("23:58", 0).unwrap();
/// let early = DayOffsetTime::parse("00:05", 1).unwrap();
/// assert!(late < early);
/// assert_eq!(late.seconds_until(early), 7 * 60);
/// assert_eq!(early.to_string(), "00:05+1");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayOffsetTime {
    time: NaiveTime,
    #[serde(default)]
    day_offset: i32,
}

impl DayOffsetTime {
    /// Create a time from its components.
    pub fn new(time: NaiveTime, day_offset: i32) -> Self {
        Self { time, day_offset }
    }

    /// Parse a time from "HH:MM" or "HH:MM:SS" with the given day offset.
    ///
    /// # Examples
    ///
    /// ```
    /// use schedule_engine::domain::DayOffsetTime;
    ///
    /// assert!(DayOffsetTime::parse("00:00", 0).is_ok());
    /// assert!(DayOffsetTime::parse("23:59:59", 0).is_ok());
    ///
    /// assert!(DayOffsetTime::parse("1430", 0).is_err());
    /// assert!(DayOffsetTime::parse("24:00", 0).is_err());
    /// assert!(DayOffsetTime::parse("12:00:60", 0).is_err());
    /// ```
    pub fn parse(s: &str, day_offset: i32) -> Result<Self, TemporalError> {
        let invalid = |reason| TemporalError::InvalidTime {
            input: s.to_string(),
            reason,
        };

        let bytes = s.as_bytes();
        if bytes.len() != 5 && bytes.len() != 8 {
            return Err(invalid("expected HH:MM or HH:MM:SS format"));
        }
        if bytes[2] != b':' || (bytes.len() == 8 && bytes[5] != b':') {
            return Err(invalid("expected colon separators"));
        }

        let hour = parse_two_digits(&bytes[0..2]).ok_or_else(|| invalid("invalid hour digits"))?;
        if hour > 23 {
            return Err(invalid("hour must be 0-23"));
        }
        let minute =
            parse_two_digits(&bytes[3..5]).ok_or_else(|| invalid("invalid minute digits"))?;
        if minute > 59 {
            return Err(invalid("minute must be 0-59"));
        }
        let second = if bytes.len() == 8 {
            let second =
                parse_two_digits(&bytes[6..8]).ok_or_else(|| invalid("invalid second digits"))?;
            if second > 59 {
                return Err(invalid("second must be 0-59"));
            }
            second
        } else {
            0
        };

        let time =
            NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| invalid("invalid time"))?;
        Ok(Self { time, day_offset })
    }

    /// Returns the time-of-day component.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Returns the number of midnights since the operating day.
    pub fn day_offset(&self) -> i32 {
        self.day_offset
    }

    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    pub fn second(&self) -> u32 {
        self.time.second()
    }

    /// Seconds since midnight, ignoring the day offset.
    pub fn seconds_of_day(&self) -> i64 {
        i64::from(self.time.num_seconds_from_midnight())
    }

    /// Seconds since midnight of the operating day.
    pub fn absolute_seconds(&self) -> i64 {
        i64::from(self.day_offset) * SECONDS_PER_DAY + self.seconds_of_day()
    }

    /// True when the time carries no seconds, as published timetables
    /// usually do.
    pub fn is_minute_resolution(&self) -> bool {
        self.time.second() == 0
    }

    /// Seconds from `self` to `later`, corrected for day offsets.
    ///
    /// Negative when `later` actually precedes `self`.
    pub fn seconds_until(&self, later: Self) -> i64 {
        later.absolute_seconds() - self.absolute_seconds()
    }
}

impl Ord for DayOffsetTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.day_offset
            .cmp(&other.day_offset)
            .then_with(|| self.time.cmp(&other.time))
    }
}

impl PartialOrd for DayOffsetTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for DayOffsetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DayOffsetTime({:02}:{:02}:{:02} +{})",
            self.hour(),
            self.minute(),
            self.second(),
            self.day_offset
        )
    }
}

impl fmt::Display for DayOffsetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())?;
        if self.second() != 0 {
            write!(f, ":{:02}", self.second())?;
        }
        if self.day_offset != 0 {
            write!(f, "{:+}", self.day_offset)?;
        }
        Ok(())
    }
}

/// A wait computed from times of day alone, wrapping at midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrappedWait {
    /// Wait in seconds, always within `0..SECONDS_PER_DAY`.
    pub seconds: i64,
    /// 1 when the wait crosses midnight, else 0.
    pub midnights_crossed: i32,
}

/// Wait between an arrival and a departure using their times of day only.
///
/// Day offsets are ignored; callers that need to know on
/// which calendar day the departure happens combine `midnights_crossed`
/// with the offsets themselves.
///
/// # Examples
///
/// ```
/// use schedule_engine::domain::{DayOffsetTime, wrapped_wait};
///
/// let arrival = DayOffsetTime::parse("23:58", 0).unwrap();
/// let departure = DayOffsetTime::parse("00:05", 1).unwrap();
/// let wait = wrapped_wait(arrival, departure);
/// assert_eq!(wait.seconds, 7 * 60);
/// assert_eq!(wait.midnights_crossed, 1);
/// ```
pub fn wrapped_wait(arrival: DayOffsetTime, departure: DayOffsetTime) -> WrappedWait {
    let raw = departure.seconds_of_day() - arrival.seconds_of_day();
    if raw < 0 {
        WrappedWait {
            seconds: raw + SECONDS_PER_DAY,
            midnights_crossed: 1,
        }
    } else {
        WrappedWait {
            seconds: raw,
            midnights_crossed: 0,
        }
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
