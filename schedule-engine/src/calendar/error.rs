//! Calendar normalization errors and warnings.

use chrono::NaiveDate;
use std::fmt;

use crate::domain::{ObjectId, TemporalError};

/// Fatal errors that abort normalization of a calendar frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// An assignment names a day type defined nowhere in the frame
    #[error("unknown day type {0}")]
    UnknownDayType(ObjectId),

    /// An assignment or operating period names an undefined operating day
    #[error("unknown operating day {0}")]
    UnknownOperatingDay(ObjectId),

    /// An assignment names an undefined operating period
    #[error("unknown operating period {0}")]
    UnknownOperatingPeriod(ObjectId),

    /// Timetable bounds could not be set consistently
    #[error("timetable {timetable}: {source}")]
    Bounds {
        timetable: ObjectId,
        #[source]
        source: TemporalError,
    },
}

/// Non-fatal findings surfaced to the caller alongside the timetables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarWarning {
    /// A timetable had no dates and no bounds, so both bounds were set to
    /// the normalization date.
    BoundsDefaultedToToday { timetable: ObjectId, today: NaiveDate },

    /// An operating period resolved to an inverted range and was skipped.
    InvertedOperatingPeriod {
        period: ObjectId,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// The service calendar's inline dates were inverted and ignored.
    InvertedServiceCalendarDates { from: NaiveDate, to: NaiveDate },
}

impl fmt::Display for CalendarWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarWarning::BoundsDefaultedToToday { timetable, today } => write!(
                f,
                "timetable {timetable} has no operating dates; bounds defaulted to {today}"
            ),
            CalendarWarning::InvertedOperatingPeriod { period, start, end } => write!(
                f,
                "operating period {period} starts {start} after it ends {end}; skipped"
            ),
            CalendarWarning::InvertedServiceCalendarDates { from, to } => write!(
                f,
                "service calendar dates {from} to {to} are inverted; ignored"
            ),
        }
    }
}
