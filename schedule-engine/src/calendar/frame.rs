//! Calendar frame input model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    DayType, DayTypeAssignment, OperatingDay, OperatingPeriod, TemporalError, ValidityWindow,
};

/// Calendar primitives declared together in one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarScope {
    pub day_types: Vec<DayType>,
    pub day_type_assignments: Vec<DayTypeAssignment>,
    pub operating_periods: Vec<OperatingPeriod>,
    pub operating_days: Vec<OperatingDay>,
}

/// A service calendar nested inside a calendar frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCalendar {
    /// Inline start date; only used together with `to_date`.
    pub from_date: Option<NaiveDate>,
    /// Inline end date; only used together with `from_date`.
    pub to_date: Option<NaiveDate>,
    /// The service calendar's own "valid between".
    pub validity: Option<ValidityWindow>,
    #[serde(flatten)]
    pub scope: CalendarScope,
}

impl ServiceCalendar {
    /// The window given by the inline dates, when both are present.
    pub fn inline_window(&self) -> Result<Option<ValidityWindow>, TemporalError> {
        match (self.from_date, self.to_date) {
            (Some(from), Some(to)) => ValidityWindow::between(from, to).map(Some),
            _ => Ok(None),
        }
    }
}

/// A calendar frame with its enclosing validity declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarFrame {
    /// The calendar frame's own "valid between".
    pub validity: Option<ValidityWindow>,
    /// The "valid between" of the composite frame holding this frame.
    pub composite_validity: Option<ValidityWindow>,
    #[serde(flatten)]
    pub scope: CalendarScope,
    pub service_calendar: Option<ServiceCalendar>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_window_needs_both_dates() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();

        let mut calendar = ServiceCalendar {
            from_date: Some(d(1)),
            ..ServiceCalendar::default()
        };
        assert_eq!(calendar.inline_window(), Ok(None));

        calendar.to_date = Some(d(31));
        let window = calendar.inline_window().unwrap().unwrap();
        assert_eq!((window.from(), window.to()), (Some(d(1)), Some(d(31))));

        calendar.from_date = Some(d(31));
        calendar.to_date = Some(d(1));
        assert!(calendar.inline_window().is_err());
    }

    #[test]
    fn frame_from_json() {
        let json = r#"{
            "validity": {"from": "2024-01-01", "to": "2024-12-31"},
            "day_types": [{"id": "X:DayType:1", "days_of_week": ["Mon"]}],
            "service_calendar": {
                "from_date": "2024-03-01",
                "to_date": "2024-03-31",
                "day_types": [{"id": "X:DayType:2"}]
            }
        }"#;
        let frame: CalendarFrame = serde_json::from_str(json).unwrap();

        assert_eq!(frame.scope.day_types.len(), 1);
        assert!(frame.composite_validity.is_none());
        let calendar = frame.service_calendar.unwrap();
        assert_eq!(calendar.scope.day_types.len(), 1);
        assert!(calendar.scope.day_type_assignments.is_empty());
    }
}
