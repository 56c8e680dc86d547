//! Checkpoints over frequency-based journeys.

use chrono::{NaiveTime, Timelike};
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

use crate::domain::{JourneyCategory, JourneyFrequency, ObjectId, SECONDS_PER_DAY};

use super::diagnostic::{CheckPoint, DataLocation, Diagnostic, DiagnosticReporter};
use super::session::{ResolvedJourney, ValidationSession};

/// A frequency's departure window in seconds of day.
///
/// A window whose last departure is before its first runs past midnight;
/// its end is then counted on the following day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DepartureWindow {
    start: i64,
    end: i64,
}

impl DepartureWindow {
    pub fn of(frequency: &JourneyFrequency) -> Self {
        let start = seconds(frequency.first_departure);
        let mut end = seconds(frequency.last_departure);
        if end < start {
            end += SECONDS_PER_DAY;
        }
        Self { start, end }
    }

    /// Windows sharing an instant strictly inside both. Touching windows
    /// do not overlap. A window past midnight is also compared against the
    /// other one moved a day forward or back.
    pub fn overlaps(&self, other: &Self) -> bool {
        [0, SECONDS_PER_DAY, -SECONDS_PER_DAY].into_iter().any(|shift| {
            self.start < other.end + shift && other.start + shift < self.end
        })
    }

    /// Whether a departure at `time` falls inside the window, edges included.
    pub fn covers(&self, time: NaiveTime) -> bool {
        let t = seconds(time);
        (self.start..=self.end).contains(&t)
            || (self.start..=self.end).contains(&(t + SECONDS_PER_DAY))
    }
}

impl fmt::Display for DepartureWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hm = |s: i64| ((s % SECONDS_PER_DAY) / 3600, (s % 3600) / 60);
        let ((sh, sm), (eh, em)) = (hm(self.start), hm(self.end));
        write!(f, "{sh:02}:{sm:02}-{eh:02}:{em:02}")
    }
}

fn seconds(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight())
}

impl<R> ValidationSession<'_, '_, R>
where
    R: DiagnosticReporter + ?Sized,
{
    pub(crate) fn check_frequencies(&mut self, journeys: &[ResolvedJourney<'_>]) {
        let frequency_journeys: Vec<&ResolvedJourney<'_>> = journeys
            .iter()
            .filter(|j| j.journey.category == JourneyCategory::Frequency)
            .collect();

        for journey in &frequency_journeys {
            self.check_overlapping_windows(journey);
        }
        for journey in journeys {
            self.check_timebands(journey);
        }
        self.check_timesheets_within_frequencies(journeys, &frequency_journeys);
    }

    /// One diagnostic per pair of overlapping windows.
    fn check_overlapping_windows(&mut self, journey: &ResolvedJourney<'_>) {
        let windows: Vec<DepartureWindow> = journey
            .journey
            .frequencies
            .iter()
            .map(DepartureWindow::of)
            .collect();

        for (a, b) in windows.iter().tuple_combinations() {
            if a.overlaps(b) {
                self.emit(
                    Diagnostic::new(
                        CheckPoint::FrequencyOverlap,
                        DataLocation::journey(&journey.journey.id),
                    )
                    .observed(a)
                    .reference(b),
                );
            }
        }
    }

    fn check_timebands(&mut self, journey: &ResolvedJourney<'_>) {
        let referential = self.referential;
        for frequency in &journey.journey.frequencies {
            let Some(band_id) = &frequency.timeband else {
                continue;
            };
            let Some(band) = referential.timeband(band_id.as_str()) else {
                trace!(journey = %journey.journey.id, timeband = %band_id, "unknown timeband");
                continue;
            };
            if frequency.first_departure < band.start || frequency.last_departure > band.end {
                self.emit(
                    Diagnostic::new(
                        CheckPoint::FrequencyOutsideTimeband,
                        DataLocation::journey(&journey.journey.id),
                    )
                    .observed(DepartureWindow::of(frequency))
                    .reference(format!(
                        "{}-{}",
                        band.start.format("%H:%M"),
                        band.end.format("%H:%M")
                    )),
                );
            }
        }
    }

    /// A timesheet journey sharing a pattern with frequency journeys is
    /// expected to depart inside one of their windows.
    fn check_timesheets_within_frequencies(
        &mut self,
        journeys: &[ResolvedJourney<'_>],
        frequency_journeys: &[&ResolvedJourney<'_>],
    ) {
        let mut by_pattern: HashMap<&ObjectId, Vec<&ResolvedJourney<'_>>> = HashMap::new();
        for journey in frequency_journeys.iter().copied() {
            by_pattern
                .entry(&journey.pattern.id)
                .or_default()
                .push(journey);
        }

        for journey in journeys {
            if journey.journey.category != JourneyCategory::Timesheet {
                continue;
            }
            let Some(siblings) = by_pattern.get(&journey.pattern.id) else {
                continue;
            };
            let Some(departure) = journey.stops.first().map(|s| s.at_stop.departure.time()) else {
                continue;
            };

            let covered = siblings
                .iter()
                .flat_map(|sibling| sibling.journey.frequencies.iter())
                .any(|frequency| DepartureWindow::of(frequency).covers(departure));
            if covered {
                continue;
            }

            let diagnostic = siblings.iter().fold(
                Diagnostic::new(
                    CheckPoint::TimesheetOutsideFrequency,
                    DataLocation::journey(&journey.journey.id),
                )
                .observed(departure.format("%H:%M:%S")),
                |diagnostic, sibling| diagnostic.target(DataLocation::journey(&sibling.journey.id)),
            );
            self.emit(diagnostic);
        }
    }
}
