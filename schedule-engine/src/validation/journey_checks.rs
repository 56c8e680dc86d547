//! Checkpoints over the passing times and mode of a single journey.

use itertools::Itertools;
use tracing::trace;

use crate::domain::{StopArea, TransportMode, TransportSubMode, describe_mode};

use super::diagnostic::{CheckPoint, DataLocation, Diagnostic, DiagnosticReporter};
use super::session::{ResolvedJourney, ValidationSession};

/// Slack allowed on each side of a running time published to the minute.
const MINUTE_ROUNDING_SECONDS: i64 = 120;

/// Segments shorter than this are not speed-checked.
const MIN_SPEED_DISTANCE_M: f64 = 1.0;

fn kmh(metres: f64, seconds: i64) -> f64 {
    metres / seconds as f64 * 3.6
}

/// Whether a journey may serve a stop of the given mode.
///
/// Bus and coach serve each other's stops. A rail replacement bus stop is
/// reserved for rail replacement journeys.
pub(crate) fn modes_compatible(
    journey_mode: Option<TransportMode>,
    journey_submode: Option<TransportSubMode>,
    stop_mode: Option<TransportMode>,
    stop_submode: Option<TransportSubMode>,
) -> bool {
    let (Some(journey_mode), Some(stop_mode)) = (journey_mode, stop_mode) else {
        return true;
    };
    if journey_mode.is_road_coach_pair(stop_mode) {
        return true;
    }
    if journey_mode != stop_mode {
        return false;
    }
    let replacement_stop = stop_submode == Some(TransportSubMode::RailReplacementBus);
    let replacement_journey = journey_submode.is_none_or(|s| s == TransportSubMode::RailReplacementBus);
    !replacement_stop || replacement_journey
}

impl<R> ValidationSession<'_, '_, R>
where
    R: DiagnosticReporter + ?Sized,
{
    pub(crate) fn check_journey(&mut self, journey: &ResolvedJourney<'_>) {
        let source = DataLocation::journey(&journey.journey.id);

        self.check_stop_times(journey, &source);
        self.check_time_progression(journey, &source);
        if self.config.check_allowed_transport_modes {
            self.check_mode_allowed(journey, &source);
        }
        self.check_mode_matches_stops(journey, &source);

        // Calendars and stop positions of a standalone file live elsewhere
        if self.config.standalone {
            return;
        }
        if journey.journey.is_undated() {
            self.emit(Diagnostic::new(CheckPoint::JourneyUndated, source.clone()));
        }
        self.check_speeds(journey, &source);
    }

    /// Dwell time and arrival/departure order at each stop.
    fn check_stop_times(&mut self, journey: &ResolvedJourney<'_>, source: &DataLocation) {
        let max_dwell = self.config.inter_stop_duration_max_seconds;
        for stop in &journey.stops {
            let (arrival, departure) = (stop.at_stop.arrival, stop.at_stop.departure);

            if arrival > departure {
                let mut diagnostic =
                    Diagnostic::new(CheckPoint::JourneyArrivalAfterDeparture, source.clone())
                        .observed(arrival)
                        .reference(departure);
                if let Some(area) = stop.area {
                    diagnostic = diagnostic.target(DataLocation::stop_area(area));
                }
                self.emit(diagnostic);
            }

            let Some(area) = stop.area else { continue };
            let dwell = arrival.seconds_until(departure).abs();
            if dwell > max_dwell {
                self.emit(
                    Diagnostic::new(CheckPoint::JourneyDwell, source.clone())
                        .target(DataLocation::stop_area(area))
                        .observed(dwell)
                        .reference(max_dwell),
                );
            }
        }
    }

    /// Arrivals and departures never go backwards from one stop to the next.
    fn check_time_progression(&mut self, journey: &ResolvedJourney<'_>, source: &DataLocation) {
        for ((previous, from), (next, to)) in journey.located_stops().tuple_windows() {
            let (before, after) = (previous.at_stop, next.at_stop);
            let comparisons = [
                (after.arrival, before.arrival),
                (after.departure, before.departure),
            ];
            for (observed, reference) in comparisons {
                if observed >= reference {
                    continue;
                }
                self.emit(
                    Diagnostic::new(CheckPoint::JourneyTimesNotIncreasing, source.clone())
                        .target(DataLocation::stop_area(from))
                        .target(DataLocation::stop_area(to))
                        .observed(observed)
                        .reference(reference),
                );
            }
        }
    }

    /// Running time and speed between consecutive located stops.
    fn check_speeds(&mut self, journey: &ResolvedJourney<'_>, source: &DataLocation) {
        let parameters = self.config.mode(journey.mode).clone();

        for ((previous, from), (next, to)) in journey.located_stops().tuple_windows() {
            let segment = |checkpoint| {
                Diagnostic::new(checkpoint, source.clone())
                    .target(DataLocation::stop_area(from))
                    .target(DataLocation::stop_area(to))
            };
            let (departure, arrival) = (previous.at_stop.departure, next.at_stop.arrival);
            let running = departure.seconds_until(arrival);
            if running < 0 {
                self.emit(
                    segment(CheckPoint::JourneyNegativeRunningTime)
                        .observed(running)
                        .reference(0),
                );
                continue;
            }

            let Some(distance) = self.distances.between(from, to) else {
                trace!(from = %from.id, to = %to.id, "no positions, skipping speed check");
                continue;
            };
            if distance < MIN_SPEED_DISTANCE_M {
                continue;
            }
            if running == 0 {
                self.emit(
                    segment(CheckPoint::JourneyZeroRunningTime)
                        .observed(format!("{distance:.0}"))
                        .reference(0),
                );
                continue;
            }

            let slack = if departure.is_minute_resolution() && arrival.is_minute_resolution() {
                MINUTE_ROUNDING_SECONDS
            } else {
                0
            };
            let fastest = kmh(distance, (running - slack).max(1));
            let slowest = kmh(distance, running + slack);

            if fastest < f64::from(parameters.speed_min_kmh) {
                self.emit(
                    segment(CheckPoint::JourneyTooSlow)
                        .observed(format!("{fastest:.0}"))
                        .reference(parameters.speed_min_kmh),
                );
            } else if slowest > f64::from(parameters.speed_max_kmh) {
                self.emit(
                    segment(CheckPoint::JourneyTooFast)
                        .observed(format!("{slowest:.0}"))
                        .reference(parameters.speed_max_kmh),
                );
            } else if slowest > f64::from(parameters.speed_warning_kmh) {
                self.emit(
                    segment(CheckPoint::JourneyFast)
                        .observed(format!("{slowest:.0}"))
                        .reference(parameters.speed_warning_kmh),
                );
            }
        }
    }

    /// Only the journey's own declared mode is checked; an inherited line
    /// mode is the line's responsibility.
    fn check_mode_allowed(&mut self, journey: &ResolvedJourney<'_>, source: &DataLocation) {
        let Some(mode) = journey.journey.transport_mode else {
            return;
        };
        if !self.config.mode(mode).allowed {
            self.emit(
                Diagnostic::new(CheckPoint::TransportModeNotAllowed, source.clone()).observed(mode),
            );
        }
    }

    /// Every stop on the journey's pattern serves a compatible mode.
    fn check_mode_matches_stops(&mut self, journey: &ResolvedJourney<'_>, source: &DataLocation) {
        let referential = self.referential;
        let journey_mode = describe_mode(Some(journey.mode), journey.submode);

        let areas: Vec<&StopArea> = journey
            .pattern
            .stop_points
            .iter()
            .filter_map(|id| referential.stop_point(id.as_str()))
            .filter_map(|sp| referential.stop_area_of(sp.scheduled_stop_point.as_str()))
            .collect();

        for area in areas {
            let bearing = referential.mode_bearing_area(area);
            let compatible = modes_compatible(
                Some(journey.mode),
                journey.submode,
                bearing.transport_mode,
                bearing.transport_submode,
            );
            if !compatible {
                self.emit(
                    Diagnostic::new(CheckPoint::TransportModeMismatch, source.clone())
                        .target(DataLocation::stop_area(area))
                        .observed(&journey_mode)
                        .reference(describe_mode(bearing.transport_mode, bearing.transport_submode)),
                );
            }
        }
    }
}
