//! Calendar normalization.
//!
//! Service calendars arrive as day types, day-type assignments, operating
//! days and operating periods spread over nested frames, each frame with
//! its own "valid between". This module folds them into one canonical
//! [`Timetable`](crate::domain::Timetable) per day type and then rewrites
//! explicit date lists as weekly patterns where that is lossless.

mod error;
mod frame;
mod normalizer;
mod pattern;


pub use error::{CalendarError, CalendarWarning};
pub use frame::{CalendarFrame, CalendarScope, ServiceCalendar};
pub use normalizer::{CalendarNormalizer, NormalizedCalendar};
pub use pattern::{CalendarPattern, analyze_dates, compress};
