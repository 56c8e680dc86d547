//! Converting calendar primitives into timetables.
//!
//! Every day type becomes one [`Timetable`] keyed by the day type's id.
//! Assignments then contribute dates or periods to it, constrained by the
//! validity window that applies to the day type. Timetables left without
//! bounds get them derived, and explicit-date timetables are compressed
//! into weekly patterns.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace, warn};

use super::frame::{CalendarFrame, CalendarScope};
use super::pattern::compress;
use super::{CalendarError, CalendarWarning};
use crate::domain::{
    CalendarDay, DateSource, DayType, DayTypeAssignment, ObjectId, OperatingPeriod, Period,
    PeriodBound, Timetable, ValidityResolutionChain, ValidityWindow,
};

/// The outcome of normalizing one calendar frame.
#[derive(Debug, Clone, Default)]
pub struct NormalizedCalendar {
    /// One timetable per day type, keyed by day-type id.
    pub timetables: BTreeMap<ObjectId, Timetable>,
    pub warnings: Vec<CalendarWarning>,
}

impl NormalizedCalendar {
    pub fn timetable(&self, day_type: &str) -> Option<&Timetable> {
        self.timetables.get(day_type)
    }

    pub fn into_timetables(self) -> impl Iterator<Item = Timetable> {
        self.timetables.into_values()
    }
}

/// Turns calendar frames into timetables.
///
/// # Examples
///
/// ```
/// use schedule_engine::calendar::{CalendarFrame, CalendarNormalizer};
/// use schedule_engine::domain::{DayOfWeekSet, DayType, ObjectId, ValidityWindow};
/// use chrono::{NaiveDate, Weekday};
///
/// let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let mut frame = CalendarFrame::default();
/// frame.validity = Some(ValidityWindow::between(jan(1), jan(31)).unwrap());
/// frame.scope.day_types.push(DayType::new(
///     ObjectId::parse("X:DayType:1").unwrap(),
///     DayOfWeekSet::from_weekdays([Weekday::Sat]),
/// ));
///
/// let calendar = CalendarNormalizer::new(jan(15)).normalize(&frame).unwrap();
/// let timetable = calendar.timetable("X:DayType:1").unwrap();
/// assert_eq!(timetable.start_of_period(), Some(jan(1)));
/// assert_eq!(timetable.end_of_period(), Some(jan(31)));
/// ```
#[derive(Debug, Clone)]
pub struct CalendarNormalizer {
    today: NaiveDate,
    compress_patterns: bool,
}

impl CalendarNormalizer {
    /// Create a normalizer; `today` is used for timetables that end up
    /// with no dates and no bounds at all.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            compress_patterns: true,
        }
    }

    /// Keep explicit-date timetables as they are.
    pub fn without_compression(mut self) -> Self {
        self.compress_patterns = false;
        self
    }

    /// Normalize one calendar frame.
    ///
    /// Fails when an assignment or operating period refers to a day type,
    /// operating day or operating period that the frame does not define.
    pub fn normalize(&self, frame: &CalendarFrame) -> Result<NormalizedCalendar, CalendarError> {
        let mut warnings = Vec::new();
        let lookup = FrameLookup::build(frame, &mut warnings);

        debug!(
            day_types = lookup.day_types.len(),
            assignments = lookup.assignments.len(),
            operating_periods = lookup.operating_periods.len(),
            operating_days = lookup.operating_days.len(),
            "normalizing calendar frame"
        );

        let mut timetables = BTreeMap::new();
        for (id, (day_type, window)) in &lookup.day_types {
            let timetable = seed_timetable(day_type, window)?;
            timetables.insert((*id).clone(), timetable);
        }

        for assignment in &lookup.assignments {
            let (_, window) = lookup
                .day_types
                .get(&assignment.day_type)
                .ok_or_else(|| CalendarError::UnknownDayType(assignment.day_type.clone()))?;
            let timetable = timetables
                .get_mut(&assignment.day_type)
                .ok_or_else(|| CalendarError::UnknownDayType(assignment.day_type.clone()))?;
            apply_assignment(&lookup, assignment, window, timetable, &mut warnings)?;
        }

        for timetable in timetables.values_mut() {
            self.derive_bounds(timetable, &mut warnings)?;
        }

        let compressed = if self.compress_patterns {
            timetables
                .values_mut()
                .map(compress)
                .filter(|changed| *changed)
                .count()
        } else {
            0
        };

        debug!(
            timetables = timetables.len(),
            compressed,
            warnings = warnings.len(),
            "calendar frame normalized"
        );

        Ok(NormalizedCalendar {
            timetables,
            warnings,
        })
    }

    /// Fill in missing bounds from the effective dates, the other bound,
    /// or as a last resort today's date.
    fn derive_bounds(
        &self,
        timetable: &mut Timetable,
        warnings: &mut Vec<CalendarWarning>,
    ) -> Result<(), CalendarError> {
        let (start, end) = (timetable.start_of_period(), timetable.end_of_period());
        if start.is_some() && end.is_some() {
            return Ok(());
        }

        let dates = timetable.effective_dates();
        let derived = match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => (start.unwrap_or(*first), end.unwrap_or(*last)),
            _ => match (start, end) {
                (Some(start), None) => (start, start),
                (None, Some(end)) => (end, end),
                _ => {
                    warn!(
                        timetable = %timetable.id(),
                        today = %self.today,
                        "timetable has no operating dates, defaulting bounds to today"
                    );
                    warnings.push(CalendarWarning::BoundsDefaultedToToday {
                        timetable: timetable.id().clone(),
                        today: self.today,
                    });
                    (self.today, self.today)
                }
            },
        };

        let (start, end) = derived;
        let id = timetable.id().clone();
        timetable
            .set_bounds(start, end)
            .map_err(|source| CalendarError::Bounds {
                timetable: id,
                source,
            })
    }
}

/// Everything defined in a frame and its service calendar, indexed by id.
struct FrameLookup<'a> {
    day_types: BTreeMap<&'a ObjectId, (&'a DayType, ValidityWindow)>,
    assignments: Vec<&'a DayTypeAssignment>,
    operating_periods: HashMap<&'a ObjectId, &'a OperatingPeriod>,
    operating_days: HashMap<&'a ObjectId, NaiveDate>,
}

impl<'a> FrameLookup<'a> {
    fn build(frame: &'a CalendarFrame, warnings: &mut Vec<CalendarWarning>) -> Self {
        let mut lookup = FrameLookup {
            day_types: BTreeMap::new(),
            assignments: Vec::new(),
            operating_periods: HashMap::new(),
            operating_days: HashMap::new(),
        };

        let frame_windows = [frame.validity, frame.composite_validity];
        lookup.add_scope(&frame.scope, &frame_windows);

        if let Some(calendar) = &frame.service_calendar {
            let inline = match calendar.inline_window() {
                Ok(window) => window,
                Err(_) => {
                    let (from, to) = (calendar.from_date, calendar.to_date);
                    if let (Some(from), Some(to)) = (from, to) {
                        warn!(%from, %to, "ignoring inverted service calendar dates");
                        warnings.push(CalendarWarning::InvertedServiceCalendarDates { from, to });
                    }
                    None
                }
            };
            let enclosing = [
                inline,
                calendar.validity,
                frame.validity,
                frame.composite_validity,
            ];
            lookup.add_scope(&calendar.scope, &enclosing);
        }

        lookup
    }

    /// Index one scope. Each day type resolves its window through its own
    /// validity first, then the enclosing declarations from the innermost
    /// outwards.
    fn add_scope(&mut self, scope: &'a CalendarScope, enclosing: &[Option<ValidityWindow>]) {
        for day_type in &scope.day_types {
            let window = enclosing
                .iter()
                .fold(
                    ValidityResolutionChain::new().then(day_type.validity),
                    |chain, candidate| chain.then(*candidate),
                )
                .resolve();
            trace!(day_type = %day_type.id, ?window, "resolved day type validity");
            self.day_types.insert(&day_type.id, (day_type, window));
        }
        self.assignments.extend(scope.day_type_assignments.iter());
        for period in &scope.operating_periods {
            self.operating_periods.insert(&period.id, period);
        }
        for day in &scope.operating_days {
            self.operating_days.insert(&day.id, day.date);
        }
    }

    fn operating_day(&self, id: &ObjectId) -> Result<NaiveDate, CalendarError> {
        self.operating_days
            .get(id)
            .copied()
            .ok_or_else(|| CalendarError::UnknownOperatingDay(id.clone()))
    }

    fn operating_period(&self, id: &ObjectId) -> Result<&'a OperatingPeriod, CalendarError> {
        self.operating_periods
            .get(id)
            .copied()
            .ok_or_else(|| CalendarError::UnknownOperatingPeriod(id.clone()))
    }

    fn resolve_bound(&self, bound: &PeriodBound) -> Result<NaiveDate, CalendarError> {
        match bound {
            PeriodBound::Date(date) => Ok(*date),
            PeriodBound::OperatingDayRef(id) => self.operating_day(id),
        }
    }
}

/// A timetable carrying the day type's weekdays and any bounds its
/// resolved window declares.
fn seed_timetable(day_type: &DayType, window: &ValidityWindow) -> Result<Timetable, CalendarError> {
    let mut timetable = Timetable::new(day_type.id.clone());
    timetable.set_day_types(day_type.days_of_week);

    let bounds_error = |source| CalendarError::Bounds {
        timetable: day_type.id.clone(),
        source,
    };
    if let Some(from) = window.from() {
        timetable.set_start_of_period(from).map_err(bounds_error)?;
    }
    if let Some(to) = window.to() {
        timetable.set_end_of_period(to).map_err(bounds_error)?;
    }
    Ok(timetable)
}

fn apply_assignment(
    lookup: &FrameLookup<'_>,
    assignment: &DayTypeAssignment,
    window: &ValidityWindow,
    timetable: &mut Timetable,
    warnings: &mut Vec<CalendarWarning>,
) -> Result<(), CalendarError> {
    let period_id = match &assignment.source {
        DateSource::ExplicitDate(date) => {
            add_single_date(assignment, *date, window, timetable);
            return Ok(());
        }
        DateSource::OperatingDayRef(id) => {
            add_single_date(assignment, lookup.operating_day(id)?, window, timetable);
            return Ok(());
        }
        DateSource::OperatingPeriodRef(id) => id,
    };

    let operating_period = lookup.operating_period(period_id)?;
    let start = lookup.resolve_bound(&operating_period.start)?;
    let end = lookup.resolve_bound(&operating_period.end)?;

    let Ok(period) = Period::new(start, end) else {
        warn!(
            period = %period_id,
            %start,
            %end,
            "skipping operating period that starts after it ends"
        );
        warnings.push(CalendarWarning::InvertedOperatingPeriod {
            period: period_id.clone(),
            start,
            end,
        });
        return Ok(());
    };

    match period.clip_to(window) {
        Some(clipped) if assignment.included => timetable.add_period(clipped),
        Some(clipped) => {
            for date in clipped.days() {
                timetable.add_calendar_day(CalendarDay::excluded(date));
            }
        }
        None => {
            trace!(period = %period_id, "operating period outside validity window");
        }
    }
    Ok(())
}

fn add_single_date(
    assignment: &DayTypeAssignment,
    date: NaiveDate,
    window: &ValidityWindow,
    timetable: &mut Timetable,
) {
    if window.contains(date) {
        timetable.add_calendar_day(CalendarDay {
            date,
            included: assignment.included,
        });
    } else {
        trace!(day_type = %assignment.day_type, %date, "date outside validity window");
    }
}
