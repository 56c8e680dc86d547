//! Rewriting explicit date lists as weekly patterns.
//!
//! Calendars are often exchanged as a flat list of operating dates. When
//! those dates are mostly a weekly recurrence, a single period with a
//! weekday mask plus a few exceptions says the same thing far more
//! compactly. The rewrite never changes the effective dates.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;
use tracing::trace;

use crate::domain::{CalendarDay, DayOfWeekSet, Period, Timetable};

/// A periodic description of a set of dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarPattern {
    pub period: Period,
    pub significant_days: DayOfWeekSet,
    /// Input dates the weekly pattern does not generate.
    pub additional_dates: Vec<NaiveDate>,
    /// Generated dates missing from the input.
    pub excluded_dates: Vec<NaiveDate>,
}

/// Find the weekly pattern behind a set of dates, if there is a useful one.
///
/// A weekday is significant when the input contains it at least twice and
/// on more than half of its occurrences within the spanned range. Returns
/// `None` when no weekday qualifies or when the exceptions would outnumber
/// the input dates.
///
/// # Examples
///
/// ```
/// use schedule_engine::calendar::analyze_dates;
/// use chrono::{NaiveDate, Weekday};
/// use std::collections::BTreeSet;
///
/// // Every Monday of January 2024 except the 15th
/// let dates: BTreeSet<_> = [1, 8, 22, 29]
///     .into_iter()
///     .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
///     .collect();
///
/// let pattern = analyze_dates(&dates).unwrap();
/// assert!(pattern.significant_days.contains(Weekday::Mon));
/// assert_eq!(pattern.excluded_dates, vec![NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()]);
/// ```
pub fn analyze_dates(dates: &BTreeSet<NaiveDate>) -> Option<CalendarPattern> {
    let (first, last) = (*dates.first()?, *dates.last()?);
    let period = Period::new(first, last).ok()?;

    let mut in_range = [0usize; 7];
    let mut present = [0usize; 7];
    for day in period.days() {
        in_range[index(day.weekday())] += 1;
        if dates.contains(&day) {
            present[index(day.weekday())] += 1;
        }
    }

    let significant_days: DayOfWeekSet = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .filter(|day| {
        let (seen, total) = (present[index(*day)], in_range[index(*day)]);
        seen >= 2 && seen * 2 > total
    })
    .collect();

    if significant_days.is_empty() {
        return None;
    }

    let additional_dates: Vec<NaiveDate> = dates
        .iter()
        .copied()
        .filter(|date| !significant_days.matches(*date))
        .collect();
    let excluded_dates: Vec<NaiveDate> = period
        .days()
        .filter(|date| significant_days.matches(*date) && !dates.contains(date))
        .collect();

    if additional_dates.len() + excluded_dates.len() >= dates.len() {
        return None;
    }

    Some(CalendarPattern {
        period,
        significant_days,
        additional_dates,
        excluded_dates,
    })
}

fn index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

/// Rewrite a timetable made only of included dates as a weekly pattern.
///
/// Returns whether the timetable was changed. Timetables that already use
/// periods, weekday masks or exclusions are left alone.
pub fn compress(timetable: &mut Timetable) -> bool {
    if !timetable.is_explicit_dates_only() {
        return false;
    }
    let dates: BTreeSet<NaiveDate> = timetable.included_dates().collect();
    let Some(pattern) = analyze_dates(&dates) else {
        return false;
    };

    trace!(
        timetable = %timetable.id(),
        dates = dates.len(),
        period = %pattern.period,
        additional = pattern.additional_dates.len(),
        excluded = pattern.excluded_dates.len(),
        "compressed explicit dates"
    );

    timetable.clear_calendar_days();
    timetable.add_period(pattern.period);
    timetable.set_day_types(pattern.significant_days);
    for date in pattern.additional_dates {
        timetable.add_calendar_day(CalendarDay::included(date));
    }
    for date in pattern.excluded_dates {
        timetable.add_calendar_day(CalendarDay::excluded(date));
    }
    true
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::ObjectId;
    use proptest::prelude::*;

    prop_compose! {
        fn date_set()(offsets in prop::collection::btree_set(0i64..150, 1..60)) -> BTreeSet<NaiveDate> {
            let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            offsets.into_iter().map(|o| base + chrono::Duration::days(o)).collect()
        }
    }

    prop_compose! {
        fn weekly_date_set()(
            mask in 1u8..128,
            weeks in 2i64..20,
            dropped in prop::collection::btree_set(0i64..140, 0..5),
            extra in prop::collection::btree_set(0i64..140, 0..5),
        ) -> BTreeSet<NaiveDate> {
            let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            (0..weeks * 7)
                .filter(|o| mask & (1 << (o % 7)) != 0)
                .filter(|o| !dropped.contains(o))
                .chain(extra.into_iter())
                .map(|o| base + chrono::Duration::days(o))
                .collect()
        }
    }

    fn timetable_of(dates: &BTreeSet<NaiveDate>) -> Timetable {
        let mut tt = Timetable::new(ObjectId::parse("TST:DayType:1").unwrap());
        for d in dates {
            tt.add_calendar_day(CalendarDay::included(*d));
        }
        tt
    }

    proptest! {
        #[test]
        fn compression_is_lossless(dates in date_set()) {
            let mut tt = timetable_of(&dates);
            compress(&mut tt);
            prop_assert_eq!(tt.effective_dates(), dates);
        }

        #[test]
        fn weekly_compression_is_lossless(dates in weekly_date_set()) {
            prop_assume!(!dates.is_empty());
            let mut tt = timetable_of(&dates);
            compress(&mut tt);
            prop_assert_eq!(tt.effective_dates(), dates);
        }

        #[test]
        fn compression_never_grows_exceptions(dates in weekly_date_set()) {
            prop_assume!(!dates.is_empty());
            let mut tt = timetable_of(&dates);
            if compress(&mut tt) {
                prop_assert!(tt.calendar_days().len() < dates.len());
                prop_assert_eq!(tt.periods().len(), 1);
            }
        }
    }
}
