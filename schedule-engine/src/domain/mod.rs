//! Domain types for transit schedules.
//!
//! This module contains the temporal primitives (passing times, periods,
//! validity windows), the raw calendar primitives, the canonical
//! [`Timetable`], and the network and journey model held by a
//! [`Referential`]. Value types enforce their invariants at construction
//! time, so code that receives them can trust their validity.

mod calendar;
mod error;
mod ids;
mod interchange;
mod journey;
mod network;
mod period;
mod referential;
mod time;
mod timetable;
mod transport_mode;
mod weekday;

pub use calendar::{DateSource, DayType, DayTypeAssignment, OperatingDay, OperatingPeriod, PeriodBound};
pub use error::{InvalidObjectId, TemporalError};
pub use ids::ObjectId;
pub use interchange::Interchange;
pub use journey::{
    JourneyCategory, JourneyFrequency, MissingPassingTime, Timeband, VehicleJourney,
    VehicleJourneyAtStop,
};
pub use network::{GeoPosition, JourneyPattern, Line, ScheduledStopPoint, StopArea, StopPoint, StopPossibility};
pub use period::{DateIter, Period, ValidityResolutionChain, ValidityWindow};
pub use referential::{Referential, ReferentialData};
pub use time::{DayOffsetTime, SECONDS_PER_DAY, WrappedWait, wrapped_wait};
pub use timetable::{CalendarDay, Timetable};
pub use transport_mode::{TransportMode, TransportSubMode, UnknownTransportMode, describe_mode};
pub use weekday::DayOfWeekSet;
