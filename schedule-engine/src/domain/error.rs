//! Domain error types.
//!
//! These errors describe values that cannot be constructed at all, such as
//! an inverted date range. Data-quality findings about otherwise well-formed
//! values are reported as diagnostics by the validator instead.

use chrono::NaiveDate;

/// Errors raised by the temporal primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemporalError {
    /// A time-of-day string could not be parsed
    #[error("invalid time {input:?}: {reason}")]
    InvalidTime { input: String, reason: &'static str },

    /// A date range whose start lies after its end
    #[error("inverted range: {from} is after {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },

    /// Timetable bounds set out of order
    #[error("start of period {start} is after end of period {end}")]
    BoundsOutOfOrder { start: NaiveDate, end: NaiveDate },
}

/// Error returned when parsing an invalid object identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object id: {reason}")]
pub struct InvalidObjectId {
    pub(crate) reason: &'static str,
}
