//! Running-time consistency between journeys on the same pattern.

use itertools::Itertools;
use std::collections::HashMap;

use crate::domain::{JourneyPattern, ObjectId, TransportMode};

use super::diagnostic::{CheckPoint, DataLocation, Diagnostic, DiagnosticReporter};
use super::session::{ResolvedJourney, ValidationSession};

/// A hop between two pattern positions, for journeys of one mode.
type SegmentKey<'a> = (&'a ObjectId, TransportMode, u32, u32);

#[derive(Debug, Default, Clone, Copy)]
struct RunningTimes {
    total: i64,
    count: i64,
}

impl RunningTimes {
    fn average(&self) -> i64 {
        self.total / self.count.max(1)
    }
}

fn segments<'j, 'a>(
    journey: &'j ResolvedJourney<'a>,
) -> impl Iterator<Item = (SegmentKey<'a>, i64, &'j ResolvedJourney<'a>, usize)> + 'j {
    let pattern: &'a JourneyPattern = journey.pattern;
    let pattern = &pattern.id;
    journey
        .stops
        .iter()
        .enumerate()
        .tuple_windows()
        .map(move |((index, from), (_, to))| {
            let key = (
                pattern,
                journey.mode,
                from.stop_point.position,
                to.stop_point.position,
            );
            let running = from.at_stop.departure.seconds_until(to.at_stop.arrival);
            (key, running, journey, index)
        })
}

impl<R> ValidationSession<'_, '_, R>
where
    R: DiagnosticReporter + ?Sized,
{
    /// Compare every segment's running time with the average over all
    /// journeys of the same pattern and mode.
    pub(crate) fn check_duration_variance(&mut self, journeys: &[ResolvedJourney<'_>]) {
        let mut averages: HashMap<SegmentKey<'_>, RunningTimes> = HashMap::new();
        for (key, running, _, _) in journeys.iter().flat_map(segments) {
            let entry = averages.entry(key).or_default();
            entry.total += running;
            entry.count += 1;
        }

        for (key, running, journey, index) in journeys.iter().flat_map(segments) {
            let (from, to) = (&journey.stops[index], &journey.stops[index + 1]);
            let (Some(from_area), Some(to_area)) = (from.area, to.area) else {
                continue;
            };
            let Some(times) = averages.get(&key) else {
                continue;
            };
            let limit = self
                .config
                .mode(journey.mode)
                .inter_stop_duration_variation_max_seconds;
            let deviation = (running - times.average()).abs();
            if deviation > limit {
                self.emit(
                    Diagnostic::new(
                        CheckPoint::JourneyDurationVariance,
                        DataLocation::journey(&journey.journey.id),
                    )
                    .target(DataLocation::stop_area(from_area))
                    .target(DataLocation::stop_area(to_area))
                    .observed(deviation)
                    .reference(limit),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_uses_integer_division() {
        let times = RunningTimes {
            total: 1000,
            count: 3,
        };
        assert_eq!(times.average(), 333);
        assert_eq!(RunningTimes::default().average(), 0);
    }
}
