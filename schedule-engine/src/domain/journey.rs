//! Vehicle journeys and their passing times.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::{DayOffsetTime, ObjectId, TransportMode, TransportSubMode};

/// Error returned when a journey-at-stop has no passing time at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stop point {stop_point} has neither arrival nor departure time")]
pub struct MissingPassingTime {
    stop_point: ObjectId,
}

/// The passing of one journey at one stop point.
///
/// Both times are always present: when the source gives only one of them,
/// the other is copied from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPassingTime")]
pub struct VehicleJourneyAtStop {
    pub stop_point: ObjectId,
    pub arrival: DayOffsetTime,
    pub departure: DayOffsetTime,
}

impl VehicleJourneyAtStop {
    pub fn new(stop_point: ObjectId, arrival: DayOffsetTime, departure: DayOffsetTime) -> Self {
        Self {
            stop_point,
            arrival,
            departure,
        }
    }

    /// Build from possibly partial passing times.
    ///
    /// # Examples
    ///
    /// ```
    /// use schedule_engine::domain::{DayOffsetTime, ObjectId, VehicleJourneyAtStop};
    ///
    /// let sp = ObjectId::parse("X:StopPoint:1").unwrap();
    /// let departure = DayOffsetTime::parse("08:00", 0).unwrap();
    ///
    /// let vjas = VehicleJourneyAtStop::from_passing_times(sp.clone(), None, Some(departure)).unwrap();
    /// assert_eq!(vjas.arrival, departure);
    ///
    /// assert!(VehicleJourneyAtStop::from_passing_times(sp, None, None).is_err());
    /// ```
    pub fn from_passing_times(
        stop_point: ObjectId,
        arrival: Option<DayOffsetTime>,
        departure: Option<DayOffsetTime>,
    ) -> Result<Self, MissingPassingTime> {
        match (arrival, departure) {
            (Some(arrival), Some(departure)) => Ok(Self::new(stop_point, arrival, departure)),
            (Some(only), None) | (None, Some(only)) => Ok(Self::new(stop_point, only, only)),
            (None, None) => Err(MissingPassingTime { stop_point }),
        }
    }
}

#[derive(Deserialize)]
struct RawPassingTime {
    stop_point: ObjectId,
    #[serde(default)]
    arrival: Option<DayOffsetTime>,
    #[serde(default)]
    departure: Option<DayOffsetTime>,
}

impl TryFrom<RawPassingTime> for VehicleJourneyAtStop {
    type Error = MissingPassingTime;

    fn try_from(raw: RawPassingTime) -> Result<Self, Self::Error> {
        Self::from_passing_times(raw.stop_point, raw.arrival, raw.departure)
    }
}

/// Fixed-time or headway-based operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyCategory {
    #[default]
    Timesheet,
    Frequency,
}

/// A named time-of-day band, such as "morning peak".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeband {
    pub id: ObjectId,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// A window of repeated departures for a frequency-based journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyFrequency {
    pub first_departure: NaiveTime,
    pub last_departure: NaiveTime,
    #[serde(default)]
    pub timeband: Option<ObjectId>,
}

impl JourneyFrequency {
    pub fn new(first_departure: NaiveTime, last_departure: NaiveTime) -> Self {
        Self {
            first_departure,
            last_departure,
            timeband: None,
        }
    }

    pub fn in_timeband(mut self, timeband: ObjectId) -> Self {
        self.timeband = Some(timeband);
        self
    }
}

/// One run of a vehicle along a journey pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleJourney {
    pub id: ObjectId,
    pub journey_pattern: ObjectId,
    #[serde(default)]
    pub stops: Vec<VehicleJourneyAtStop>,
    #[serde(default)]
    pub transport_mode: Option<TransportMode>,
    #[serde(default)]
    pub transport_submode: Option<TransportSubMode>,
    #[serde(default)]
    pub category: JourneyCategory,
    #[serde(default)]
    pub frequencies: Vec<JourneyFrequency>,
    #[serde(default)]
    pub timetables: Vec<ObjectId>,
    #[serde(default)]
    pub dated_service_journeys: Vec<ObjectId>,
}

impl VehicleJourney {
    pub fn new(id: ObjectId, journey_pattern: ObjectId) -> Self {
        Self {
            id,
            journey_pattern,
            stops: Vec::new(),
            transport_mode: None,
            transport_submode: None,
            category: JourneyCategory::Timesheet,
            frequencies: Vec::new(),
            timetables: Vec::new(),
            dated_service_journeys: Vec::new(),
        }
    }

    /// Has neither a timetable nor a dated service journey.
    pub fn is_undated(&self) -> bool {
        self.timetables.is_empty() && self.dated_service_journeys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_passing_time_is_completed() {
        let json = r#"{"stop_point":"X:StopPoint:1","arrival":{"time":"10:00:00"}}"#;
        let vjas: VehicleJourneyAtStop = serde_json::from_str(json).unwrap();
        assert_eq!(vjas.arrival, vjas.departure);
    }

    #[test]
    fn missing_both_times_is_rejected() {
        let json = r#"{"stop_point":"X:StopPoint:1"}"#;
        let err = serde_json::from_str::<VehicleJourneyAtStop>(json).unwrap_err();
        assert!(err.to_string().contains("neither arrival nor departure"));
    }

    #[test]
    fn journey_defaults() {
        let json = r#"{"id":"X:ServiceJourney:1","journey_pattern":"X:JourneyPattern:1"}"#;
        let vj: VehicleJourney = serde_json::from_str(json).unwrap();
        assert_eq!(vj.category, JourneyCategory::Timesheet);
        assert!(vj.is_undated());
    }
}
