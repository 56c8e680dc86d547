//! The validator entry point and per-run state.

use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::{
    JourneyPattern, Referential, StopArea, StopPoint, TransportMode, TransportSubMode,
    VehicleJourney, VehicleJourneyAtStop,
};

use super::config::ValidationConfig;
use super::diagnostic::{CheckPoint, Diagnostic, DiagnosticReporter, Severity};
use super::distance::DistanceCache;
use super::error::ValidationError;

/// Counts from one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub journeys: usize,
    pub interchanges: usize,
    pub infos: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl ValidationSummary {
    pub fn diagnostics(&self) -> usize {
        self.infos + self.warnings + self.errors
    }
}

/// Runs every checkpoint over a referential.
///
/// The validator itself holds only configuration; each call to
/// [`validate`](Self::validate) gets fresh per-run state.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Check every journey and interchange, pushing findings to `reporter`.
    ///
    /// Fails without running any checkpoint when a journey refers to a
    /// stop point or journey pattern the referential does not contain.
    pub fn validate<R>(
        &self,
        referential: &Referential,
        reporter: &mut R,
    ) -> Result<ValidationSummary, ValidationError>
    where
        R: DiagnosticReporter + ?Sized,
    {
        ValidationSession::new(&self.config, referential, reporter).run()
    }
}

/// One stop of a journey with its references looked up.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedStop<'a> {
    pub at_stop: &'a VehicleJourneyAtStop,
    pub stop_point: &'a StopPoint,
    pub area: Option<&'a StopArea>,
}

/// A journey with its pattern, stops and effective mode looked up.
///
/// Stops are ordered by their position in the journey pattern.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedJourney<'a> {
    pub journey: &'a VehicleJourney,
    pub pattern: &'a JourneyPattern,
    pub stops: Vec<ResolvedStop<'a>>,
    pub mode: TransportMode,
    pub submode: Option<TransportSubMode>,
}

impl<'a> ResolvedJourney<'a> {
    /// Stops located in a known stop area, paired with that area.
    pub fn located_stops(&self) -> impl Iterator<Item = (&ResolvedStop<'a>, &'a StopArea)> + '_ {
        self.stops
            .iter()
            .filter_map(|stop| stop.area.map(|area| (stop, area)))
    }
}

/// State for one validation run.
pub(crate) struct ValidationSession<'a, 'r, R: ?Sized> {
    pub config: &'a ValidationConfig,
    pub referential: &'a Referential,
    pub distances: DistanceCache,
    reporter: &'r mut R,
    emitted: BTreeMap<CheckPoint, usize>,
}

impl<'a, 'r, R> ValidationSession<'a, 'r, R>
where
    R: DiagnosticReporter + ?Sized,
{
    pub fn new(config: &'a ValidationConfig, referential: &'a Referential, reporter: &'r mut R) -> Self {
        Self {
            config,
            referential,
            distances: DistanceCache::new(),
            reporter,
            emitted: BTreeMap::new(),
        }
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        *self.emitted.entry(diagnostic.checkpoint).or_default() += 1;
        self.reporter.record(diagnostic);
    }

    pub fn run(mut self) -> Result<ValidationSummary, ValidationError> {
        let referential = self.referential;
        let journeys = referential
            .vehicle_journeys()
            .iter()
            .map(|journey| self.resolve(journey))
            .collect::<Result<Vec<_>, _>>()?;
        let interchanges = referential.interchanges();
        let check_interchanges = !self.config.standalone && !interchanges.is_empty();

        self.prepare(!journeys.is_empty(), check_interchanges);

        for journey in &journeys {
            self.check_journey(journey);
        }
        self.check_frequencies(&journeys);
        self.check_duration_variance(&journeys);
        if check_interchanges {
            self.check_interchanges();
        }

        let mut summary = ValidationSummary {
            journeys: journeys.len(),
            interchanges: interchanges.len(),
            ..ValidationSummary::default()
        };
        for (checkpoint, count) in &self.emitted {
            match checkpoint.severity() {
                Severity::Info => summary.infos += count,
                Severity::Warning => summary.warnings += count,
                Severity::Error => summary.errors += count,
            }
            debug!(checkpoint = %checkpoint, count, "checkpoint findings");
        }
        debug!(
            journeys = summary.journeys,
            interchanges = summary.interchanges,
            distances = self.distances.len(),
            errors = summary.errors,
            warnings = summary.warnings,
            "validation finished"
        );
        Ok(summary)
    }

    fn prepare(&mut self, has_journeys: bool, check_interchanges: bool) {
        let standalone = self.config.standalone;
        if has_journeys {
            for checkpoint in CheckPoint::VEHICLE_JOURNEY {
                let applies = match checkpoint {
                    CheckPoint::JourneyNegativeRunningTime
                    | CheckPoint::JourneyZeroRunningTime
                    | CheckPoint::JourneyTooSlow
                    | CheckPoint::JourneyFast
                    | CheckPoint::JourneyTooFast
                    | CheckPoint::JourneyUndated => !standalone,
                    CheckPoint::TransportModeNotAllowed => {
                        self.config.check_allowed_transport_modes
                    }
                    _ => true,
                };
                if applies {
                    self.reporter.prepare(checkpoint);
                }
            }
        }
        if check_interchanges {
            for checkpoint in CheckPoint::INTERCHANGE {
                self.reporter.prepare(checkpoint);
            }
        }
    }

    fn resolve(&self, journey: &'a VehicleJourney) -> Result<ResolvedJourney<'a>, ValidationError> {
        let referential = self.referential;
        let pattern = referential
            .journey_pattern(journey.journey_pattern.as_str())
            .ok_or_else(|| ValidationError::UnknownJourneyPattern {
                journey: journey.id.clone(),
                pattern: journey.journey_pattern.clone(),
            })?;

        let mut stops = journey
            .stops
            .iter()
            .map(|at_stop| {
                let stop_point = referential
                    .stop_point(at_stop.stop_point.as_str())
                    .ok_or_else(|| ValidationError::UnknownStopPoint {
                        journey: journey.id.clone(),
                        stop_point: at_stop.stop_point.clone(),
                    })?;
                let area = referential.stop_area_of(stop_point.scheduled_stop_point.as_str());
                Ok(ResolvedStop {
                    at_stop,
                    stop_point,
                    area,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        stops.sort_by_key(|stop| stop.stop_point.position);

        Ok(ResolvedJourney {
            journey,
            pattern,
            stops,
            mode: referential.journey_mode(journey),
            submode: referential.journey_submode(journey),
        })
    }
}
