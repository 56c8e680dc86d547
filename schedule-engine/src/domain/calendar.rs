//! Raw service-calendar primitives.
//!
//! These are the building blocks exchanged between operators before
//! normalization: named weekly day types and the assignments that attach
//! dates, operating days or operating periods to them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DayOfWeekSet, ObjectId, ValidityWindow};

/// A named weekly recurrence pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayType {
    pub id: ObjectId,
    #[serde(default)]
    pub days_of_week: DayOfWeekSet,
    /// The day type's own "valid between", when it declares one.
    #[serde(default)]
    pub validity: Option<ValidityWindow>,
}

impl DayType {
    pub fn new(id: ObjectId, days_of_week: DayOfWeekSet) -> Self {
        Self {
            id,
            days_of_week,
            validity: None,
        }
    }

    pub fn with_validity(mut self, validity: ValidityWindow) -> Self {
        self.validity = Some(validity);
        self
    }
}

/// Where a day-type assignment takes its dates from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    ExplicitDate(NaiveDate),
    OperatingDayRef(ObjectId),
    OperatingPeriodRef(ObjectId),
}

fn default_included() -> bool {
    true
}

/// Attaches dates to a day type, either adding them or taking them away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTypeAssignment {
    pub day_type: ObjectId,
    #[serde(default = "default_included")]
    pub included: bool,
    pub source: DateSource,
}

impl DayTypeAssignment {
    pub fn including(day_type: ObjectId, source: DateSource) -> Self {
        Self {
            day_type,
            included: true,
            source,
        }
    }

    pub fn excluding(day_type: ObjectId, source: DateSource) -> Self {
        Self {
            day_type,
            included: false,
            source,
        }
    }
}

/// A single calendar date referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingDay {
    pub id: ObjectId,
    pub date: NaiveDate,
}

/// One end of an operating period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodBound {
    Date(NaiveDate),
    OperatingDayRef(ObjectId),
}

/// A date range referenced by id, with possibly indirect bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingPeriod {
    pub id: ObjectId,
    pub start: PeriodBound,
    pub end: PeriodBound,
}
