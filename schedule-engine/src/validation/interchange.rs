//! Interchange checkpoints.
//!
//! An interchange names a feeder journey arriving at one scheduled stop
//! point and a consumer journey leaving from another. The checks make sure
//! both ends exist, are close enough, are actually served, and that the
//! connection can happen on at least one day.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

use crate::domain::{
    Interchange, ObjectId, StopPossibility, VehicleJourney, VehicleJourneyAtStop, wrapped_wait,
};

use super::diagnostic::{CheckPoint, DataLocation, Diagnostic, DiagnosticReporter, ObjectKind};
use super::session::ValidationSession;

/// Where a journey calls at an interchange's scheduled stop point.
#[derive(Debug, Clone, Copy)]
enum StopVisit<'a> {
    None,
    Once(&'a VehicleJourneyAtStop),
    Ambiguous,
}

impl<R> ValidationSession<'_, '_, R>
where
    R: DiagnosticReporter + ?Sized,
{
    pub(crate) fn check_interchanges(&mut self) {
        let referential = self.referential;
        let interchanges = referential.interchanges();
        self.check_duplicates(interchanges);
        for interchange in interchanges {
            self.check_references(interchange);
            self.check_distance(interchange);
            self.check_feasibility(interchange);
        }
    }

    /// The first interchange with a given connection is the source, each
    /// later one a target.
    fn check_duplicates(&mut self, interchanges: &[Interchange]) {
        let mut seen: HashMap<_, &Interchange> = HashMap::new();
        for interchange in interchanges {
            match seen.entry(interchange.connection_key()) {
                Entry::Occupied(first) => {
                    let first = *first.get();
                    self.emit(
                        Diagnostic::new(
                            CheckPoint::InterchangeDuplicate,
                            DataLocation::interchange(&first.id),
                        )
                        .target(DataLocation::interchange(&interchange.id)),
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(interchange);
                }
            }
        }
    }

    /// Both ends resolve. Consumers in another codespace may live in a
    /// referential this run cannot see, so they are not reported.
    fn check_references(&mut self, interchange: &Interchange) {
        let referential = self.referential;
        let codespace = interchange.id.codespace();
        let local = |id: &ObjectId| id.is_in_codespace(codespace);
        let unresolved = |checkpoint, id: &ObjectId| {
            Diagnostic::new(checkpoint, DataLocation::interchange(&interchange.id)).observed(id)
        };

        if referential
            .scheduled_stop_point(interchange.feeder_stop_point.as_str())
            .is_none()
        {
            self.emit(unresolved(
                CheckPoint::InterchangeFeederStopUnknown,
                &interchange.feeder_stop_point,
            ));
        }
        if referential
            .vehicle_journey(interchange.feeder_journey.as_str())
            .is_none()
        {
            self.emit(unresolved(
                CheckPoint::InterchangeFeederJourneyUnknown,
                &interchange.feeder_journey,
            ));
        }
        if referential
            .scheduled_stop_point(interchange.consumer_stop_point.as_str())
            .is_none()
            && local(&interchange.consumer_stop_point)
        {
            self.emit(unresolved(
                CheckPoint::InterchangeConsumerStopUnknown,
                &interchange.consumer_stop_point,
            ));
        }
        if referential
            .vehicle_journey(interchange.consumer_journey.as_str())
            .is_none()
            && local(&interchange.consumer_journey)
        {
            self.emit(unresolved(
                CheckPoint::InterchangeConsumerJourneyUnknown,
                &interchange.consumer_journey,
            ));
        }
    }

    fn check_distance(&mut self, interchange: &Interchange) {
        let warn = self.config.interchange_max_distance_m;
        if warn == 0 {
            return;
        }
        let referential = self.referential;
        let (Some(from), Some(to)) = (
            referential.stop_area_of(interchange.feeder_stop_point.as_str()),
            referential.stop_area_of(interchange.consumer_stop_point.as_str()),
        ) else {
            return;
        };
        let Some(distance) = self.distances.between(from, to) else {
            return;
        };

        let (warn, error) = (f64::from(warn), 3.0 * f64::from(warn));
        let (checkpoint, limit) = if distance > error {
            (CheckPoint::InterchangeTooFar, error)
        } else if distance > warn {
            (CheckPoint::InterchangeFar, warn)
        } else {
            return;
        };
        self.emit(
            Diagnostic::new(checkpoint, DataLocation::interchange(&interchange.id))
                .target(DataLocation::stop_area(from))
                .target(DataLocation::stop_area(to))
                .observed(format!("{distance:.0}"))
                .reference(limit),
        );
    }

    /// Stop visits, wait time, shared operating day and boarding rules.
    fn check_feasibility(&mut self, interchange: &Interchange) {
        let referential = self.referential;
        let feeder = referential.vehicle_journey(interchange.feeder_journey.as_str());
        let consumer = referential.vehicle_journey(interchange.consumer_journey.as_str());

        let feeder_visit = self.visit(feeder, &interchange.feeder_stop_point);
        let consumer_visit = self.visit(consumer, &interchange.consumer_stop_point);
        let (feeder_stop, consumer_stop) = match (feeder_visit, consumer_visit) {
            (StopVisit::Ambiguous, _) | (_, StopVisit::Ambiguous) => {
                debug!(
                    interchange = %interchange.id,
                    "journey visits the interchange stop more than once, skipping"
                );
                return;
            }
            (StopVisit::Once(f), StopVisit::Once(c)) => (Some(f), Some(c)),
            (StopVisit::Once(f), StopVisit::None) => (Some(f), None),
            (StopVisit::None, StopVisit::Once(c)) => (None, Some(c)),
            (StopVisit::None, StopVisit::None) => (None, None),
        };

        let source = DataLocation::interchange(&interchange.id);
        if let (Some(journey), None) = (feeder, feeder_stop) {
            self.emit(
                Diagnostic::new(CheckPoint::InterchangeFeederStopNotServed, source.clone())
                    .target(DataLocation::new(
                        ObjectKind::ScheduledStopPoint,
                        &interchange.feeder_stop_point,
                    ))
                    .target(DataLocation::journey(&journey.id)),
            );
        }
        if let (Some(journey), None) = (consumer, consumer_stop) {
            self.emit(
                Diagnostic::new(CheckPoint::InterchangeConsumerStopNotServed, source.clone())
                    .target(DataLocation::new(
                        ObjectKind::ScheduledStopPoint,
                        &interchange.consumer_stop_point,
                    ))
                    .target(DataLocation::journey(&journey.id)),
            );
        }

        if let (Some(feeder), Some(consumer), Some(arrival), Some(departure)) =
            (feeder, consumer, feeder_stop, consumer_stop)
        {
            self.check_wait(interchange, (feeder, arrival), (consumer, departure));
        }

        let forbidden = |at_stop: Option<&VehicleJourneyAtStop>, alighting: bool| {
            let stop_point = referential.stop_point(at_stop?.stop_point.as_str())?;
            let possibility = if alighting {
                stop_point.for_alighting
            } else {
                stop_point.for_boarding
            };
            (possibility == StopPossibility::Forbidden).then_some(stop_point)
        };
        if let Some(stop_point) = forbidden(feeder_stop, true) {
            self.emit(
                Diagnostic::new(CheckPoint::InterchangeFeederAlightingForbidden, source.clone())
                    .target(DataLocation::new(ObjectKind::StopPoint, &stop_point.id)),
            );
        }
        if let Some(stop_point) = forbidden(consumer_stop, false) {
            self.emit(
                Diagnostic::new(CheckPoint::InterchangeConsumerBoardingForbidden, source)
                    .target(DataLocation::new(ObjectKind::StopPoint, &stop_point.id)),
            );
        }
    }

    /// Wait from feeder arrival to consumer departure, and whether the two
    /// journeys run on days that let the connection happen.
    fn check_wait(
        &mut self,
        interchange: &Interchange,
        feeder: (&VehicleJourney, &VehicleJourneyAtStop),
        consumer: (&VehicleJourney, &VehicleJourneyAtStop),
    ) {
        let ((feeder, arrival), (consumer, departure)) = (feeder, consumer);
        let wait = wrapped_wait(arrival.arrival, departure.departure);
        let day_shift = departure.departure.day_offset()
            - arrival.arrival.day_offset()
            - wait.midnights_crossed;

        let feeder_dates = self.referential.active_dates(feeder);
        let shared_day = self
            .referential
            .active_dates(consumer)
            .into_iter()
            .filter_map(|date| date.checked_add_signed(chrono::Duration::days(day_shift.into())))
            .any(|date| feeder_dates.contains(&date));

        let source = DataLocation::interchange(&interchange.id);
        if !shared_day {
            self.emit(
                Diagnostic::new(CheckPoint::InterchangeNoCommonDay, source)
                    .target(DataLocation::journey(&feeder.id))
                    .target(DataLocation::journey(&consumer.id)),
            );
            return;
        }

        let warn = self.config.interchange_max_wait_seconds;
        if warn <= 0 {
            return;
        }
        let (checkpoint, limit) = if wait.seconds > 3 * warn {
            (CheckPoint::InterchangeWaitTooLong, 3 * warn)
        } else if wait.seconds > warn {
            (CheckPoint::InterchangeWaitLong, warn)
        } else {
            return;
        };
        self.emit(
            Diagnostic::new(checkpoint, source)
                .observed(wait.seconds)
                .reference(limit),
        );
    }

    /// The journey's passing at a scheduled stop point.
    fn visit<'v>(
        &self,
        journey: Option<&'v VehicleJourney>,
        scheduled_stop_point: &ObjectId,
    ) -> StopVisit<'v> {
        let Some(journey) = journey else {
            return StopVisit::None;
        };
        let mut matches = journey.stops.iter().filter(|at_stop| {
            self.referential
                .stop_point(at_stop.stop_point.as_str())
                .is_some_and(|sp| &sp.scheduled_stop_point == scheduled_stop_point)
        });
        match (matches.next(), matches.next()) {
            (None, _) => StopVisit::None,
            (Some(at_stop), None) => StopVisit::Once(at_stop),
            (Some(_), Some(_)) => StopVisit::Ambiguous,
        }
    }
}
