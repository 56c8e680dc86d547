//! Canonical operating calendars.
//!
//! A [`Timetable`] describes the dates on which a service runs as a union of
//! periods filtered by a weekly pattern, adjusted by one-off inclusions and
//! exclusions. Everything that needs concrete dates goes through
//! [`Timetable::effective_dates`].

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{DayOfWeekSet, ObjectId, Period, TemporalError};

/// A one-off addition (`included`) or removal of a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub included: bool,
}

impl CalendarDay {
    pub fn included(date: NaiveDate) -> Self {
        Self {
            date,
            included: true,
        }
    }

    pub fn excluded(date: NaiveDate) -> Self {
        Self {
            date,
            included: false,
        }
    }
}

/// A service's operating calendar.
///
/// # Examples
///
/// ```
/// use schedule_engine::domain::{CalendarDay, ObjectId, Period, Timetable};
/// use chrono::{NaiveDate, Weekday};
///
/// let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let mut timetable = Timetable::new(ObjectId::parse("X:DayType:1").unwrap());
/// timetable.add_period(Period::new(jan(1), jan(14)).unwrap());
/// timetable.add_day_type(Weekday::Mon);
/// timetable.add_calendar_day(CalendarDay::excluded(jan(8)));
/// timetable.add_calendar_day(CalendarDay::included(jan(10)));
///
/// let dates: Vec<_> = timetable.effective_dates().into_iter().collect();
/// assert_eq!(dates, vec![jan(1), jan(10)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    id: ObjectId,
    #[serde(default)]
    periods: Vec<Period>,
    #[serde(default)]
    day_types: DayOfWeekSet,
    #[serde(default)]
    calendar_days: Vec<CalendarDay>,
    #[serde(default)]
    start_of_period: Option<NaiveDate>,
    #[serde(default)]
    end_of_period: Option<NaiveDate>,
}

impl Timetable {
    /// Create an empty timetable.
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            periods: Vec::new(),
            day_types: DayOfWeekSet::EMPTY,
            calendar_days: Vec::new(),
            start_of_period: None,
            end_of_period: None,
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn day_types(&self) -> DayOfWeekSet {
        self.day_types
    }

    pub fn calendar_days(&self) -> &[CalendarDay] {
        &self.calendar_days
    }

    pub fn start_of_period(&self) -> Option<NaiveDate> {
        self.start_of_period
    }

    pub fn end_of_period(&self) -> Option<NaiveDate> {
        self.end_of_period
    }

    pub fn add_period(&mut self, period: Period) {
        self.periods.push(period);
    }

    pub fn add_day_type(&mut self, day: Weekday) {
        self.day_types.insert(day);
    }

    pub fn set_day_types(&mut self, days: DayOfWeekSet) {
        self.day_types = days;
    }

    /// Record an exception; an identical entry already present is ignored.
    pub fn add_calendar_day(&mut self, day: CalendarDay) {
        if !self.calendar_days.contains(&day) {
            self.calendar_days.push(day);
        }
    }

    pub(crate) fn clear_calendar_days(&mut self) {
        self.calendar_days.clear();
    }

    /// Set both bounds at once, rejecting `start > end`.
    pub fn set_bounds(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), TemporalError> {
        if start > end {
            return Err(TemporalError::BoundsOutOfOrder { start, end });
        }
        self.start_of_period = Some(start);
        self.end_of_period = Some(end);
        Ok(())
    }

    /// Set the first operating bound, keeping it at or before the end bound.
    pub fn set_start_of_period(&mut self, start: NaiveDate) -> Result<(), TemporalError> {
        if let Some(end) = self.end_of_period {
            if start > end {
                return Err(TemporalError::BoundsOutOfOrder { start, end });
            }
        }
        self.start_of_period = Some(start);
        Ok(())
    }

    /// Set the last operating bound, keeping it at or after the start bound.
    pub fn set_end_of_period(&mut self, end: NaiveDate) -> Result<(), TemporalError> {
        if let Some(start) = self.start_of_period {
            if start > end {
                return Err(TemporalError::BoundsOutOfOrder { start, end });
            }
        }
        self.end_of_period = Some(end);
        Ok(())
    }

    pub fn included_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.calendar_days
            .iter()
            .filter(|day| day.included)
            .map(|day| day.date)
    }

    pub fn excluded_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.calendar_days
            .iter()
            .filter(|day| !day.included)
            .map(|day| day.date)
    }

    /// True when the calendar is nothing but a list of included dates.
    pub fn is_explicit_dates_only(&self) -> bool {
        self.periods.is_empty()
            && self.day_types.is_empty()
            && !self.calendar_days.is_empty()
            && self.calendar_days.iter().all(|day| day.included)
    }

    /// The concrete operating dates, sorted.
    ///
    /// Dates generated by periods and the weekly pattern, plus included
    /// exceptions, minus excluded exceptions. An exclusion wins over an
    /// inclusion of the same date.
    pub fn effective_dates(&self) -> BTreeSet<NaiveDate> {
        let mut dates: BTreeSet<NaiveDate> = self
            .periods
            .iter()
            .flat_map(|period| period.days())
            .filter(|date| self.day_types.matches(*date))
            .collect();
        dates.extend(self.included_dates());
        for excluded in self.excluded_dates() {
            dates.remove(&excluded);
        }
        dates
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.effective_dates().contains(&date)
    }
}
