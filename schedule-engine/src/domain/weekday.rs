//! Weekly day-of-week sets.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A set of weekdays, stored as a seven-bit mask.
///
/// # Examples
///
/// ```
/// use schedule_engine::domain::DayOfWeekSet;
/// use chrono::{NaiveDate, Weekday};
///
/// let days = DayOfWeekSet::from_weekdays([Weekday::Sat, Weekday::Sun]);
/// assert_eq!(days, DayOfWeekSet::WEEKEND);
///
/// let saturday = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
/// assert!(days.matches(saturday));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct DayOfWeekSet(u8);

impl DayOfWeekSet {
    pub const EMPTY: Self = Self(0);
    pub const WEEKDAYS: Self = Self(0b001_1111);
    pub const WEEKEND: Self = Self(0b110_0000);
    pub const EVERY_DAY: Self = Self(0b111_1111);

    pub fn from_weekdays(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut set = Self::EMPTY;
        for day in days {
            set.insert(day);
        }
        set
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= bit(day);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    /// True when the date falls on one of the days in the set.
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the members, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_WEEKDAYS.into_iter().filter(|day| self.contains(*day))
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}

impl From<Vec<Weekday>> for DayOfWeekSet {
    fn from(days: Vec<Weekday>) -> Self {
        Self::from_weekdays(days)
    }
}

impl From<DayOfWeekSet> for Vec<Weekday> {
    fn from(set: DayOfWeekSet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<Weekday> for DayOfWeekSet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        Self::from_weekdays(iter)
    }
}

impl fmt::Debug for DayOfWeekSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
