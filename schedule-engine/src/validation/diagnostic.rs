//! Checkpoints, diagnostics and the reporters that collect them.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::domain::ObjectId;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One independent validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckPoint {
    /// Dwell at a stop longer than allowed.
    JourneyDwell,
    /// Negative running time between two stops.
    JourneyNegativeRunningTime,
    /// Zero running time over a non-zero distance.
    JourneyZeroRunningTime,
    /// Running speed below the mode's minimum.
    JourneyTooSlow,
    /// Running speed above the mode's warning speed.
    JourneyFast,
    /// Running speed above the mode's maximum.
    JourneyTooFast,
    /// Segment duration far from the average on the same pattern.
    JourneyDurationVariance,
    /// Journey without timetable or dated journey.
    JourneyUndated,
    /// Arrival after departure at one stop.
    JourneyArrivalAfterDeparture,
    /// Passing times going backwards along the journey.
    JourneyTimesNotIncreasing,
    /// Two frequency windows of one journey overlap.
    FrequencyOverlap,
    /// A frequency window extends beyond its timeband.
    FrequencyOutsideTimeband,
    /// A timesheet journey departs outside every frequency window.
    TimesheetOutsideFrequency,
    /// Journey mode is not allowed.
    TransportModeNotAllowed,
    /// Journey mode does not match a stop it serves.
    TransportModeMismatch,

    InterchangeFeederStopUnknown,
    InterchangeFeederJourneyUnknown,
    InterchangeConsumerStopUnknown,
    InterchangeConsumerJourneyUnknown,
    InterchangeDuplicate,
    InterchangeConsumerStopNotServed,
    InterchangeFeederStopNotServed,
    InterchangeTooFar,
    InterchangeFar,
    InterchangeWaitTooLong,
    InterchangeWaitLong,
    InterchangeFeederAlightingForbidden,
    InterchangeConsumerBoardingForbidden,
    InterchangeNoCommonDay,
}

impl CheckPoint {
    pub const VEHICLE_JOURNEY: [CheckPoint; 15] = [
        CheckPoint::JourneyDwell,
        CheckPoint::JourneyNegativeRunningTime,
        CheckPoint::JourneyZeroRunningTime,
        CheckPoint::JourneyTooSlow,
        CheckPoint::JourneyFast,
        CheckPoint::JourneyTooFast,
        CheckPoint::JourneyDurationVariance,
        CheckPoint::JourneyUndated,
        CheckPoint::JourneyArrivalAfterDeparture,
        CheckPoint::JourneyTimesNotIncreasing,
        CheckPoint::FrequencyOverlap,
        CheckPoint::FrequencyOutsideTimeband,
        CheckPoint::TimesheetOutsideFrequency,
        CheckPoint::TransportModeNotAllowed,
        CheckPoint::TransportModeMismatch,
    ];

    pub const INTERCHANGE: [CheckPoint; 14] = [
        CheckPoint::InterchangeFeederStopUnknown,
        CheckPoint::InterchangeFeederJourneyUnknown,
        CheckPoint::InterchangeConsumerStopUnknown,
        CheckPoint::InterchangeConsumerJourneyUnknown,
        CheckPoint::InterchangeDuplicate,
        CheckPoint::InterchangeConsumerStopNotServed,
        CheckPoint::InterchangeFeederStopNotServed,
        CheckPoint::InterchangeTooFar,
        CheckPoint::InterchangeFar,
        CheckPoint::InterchangeWaitTooLong,
        CheckPoint::InterchangeWaitLong,
        CheckPoint::InterchangeFeederAlightingForbidden,
        CheckPoint::InterchangeConsumerBoardingForbidden,
        CheckPoint::InterchangeNoCommonDay,
    ];

    /// The published checkpoint code.
    pub fn code(&self) -> &'static str {
        match self {
            CheckPoint::JourneyDwell => "3-VehicleJourney-1",
            CheckPoint::JourneyNegativeRunningTime => "3-VehicleJourney-2-1",
            CheckPoint::JourneyTooSlow => "3-VehicleJourney-2-2",
            CheckPoint::JourneyFast => "3-VehicleJourney-2-3",
            CheckPoint::JourneyZeroRunningTime => "3-VehicleJourney-2-4",
            CheckPoint::JourneyTooFast => "3-VehicleJourney-2-5",
            CheckPoint::JourneyDurationVariance => "3-VehicleJourney-3",
            CheckPoint::JourneyUndated => "3-VehicleJourney-4",
            CheckPoint::JourneyArrivalAfterDeparture => "3-VehicleJourney-5-1",
            CheckPoint::JourneyTimesNotIncreasing => "3-VehicleJourney-5-2",
            CheckPoint::FrequencyOverlap => "3-VehicleJourney-6",
            CheckPoint::FrequencyOutsideTimeband => "3-VehicleJourney-7",
            CheckPoint::TimesheetOutsideFrequency => "3-VehicleJourney-8",
            CheckPoint::TransportModeNotAllowed => "4-VehicleJourney-2",
            CheckPoint::TransportModeMismatch => "4-VehicleJourney-3",
            CheckPoint::InterchangeFeederStopUnknown => "3-Interchange-1",
            CheckPoint::InterchangeFeederJourneyUnknown => "3-Interchange-2",
            CheckPoint::InterchangeConsumerStopUnknown => "3-Interchange-3",
            CheckPoint::InterchangeConsumerJourneyUnknown => "3-Interchange-4",
            CheckPoint::InterchangeDuplicate => "3-Interchange-5",
            CheckPoint::InterchangeConsumerStopNotServed => "3-Interchange-6-1",
            CheckPoint::InterchangeFeederStopNotServed => "3-Interchange-6-2",
            CheckPoint::InterchangeTooFar => "3-Interchange-7-1",
            CheckPoint::InterchangeFar => "3-Interchange-7-2",
            CheckPoint::InterchangeWaitTooLong => "3-Interchange-8-1",
            CheckPoint::InterchangeWaitLong => "3-Interchange-8-2",
            CheckPoint::InterchangeFeederAlightingForbidden => "3-Interchange-9-1",
            CheckPoint::InterchangeConsumerBoardingForbidden => "3-Interchange-9-2",
            CheckPoint::InterchangeNoCommonDay => "3-Interchange-10",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CheckPoint::JourneyZeroRunningTime => Severity::Info,

            CheckPoint::JourneyNegativeRunningTime
            | CheckPoint::JourneyTooFast
            | CheckPoint::JourneyArrivalAfterDeparture
            | CheckPoint::JourneyTimesNotIncreasing
            | CheckPoint::TransportModeNotAllowed
            | CheckPoint::TransportModeMismatch
            | CheckPoint::InterchangeFeederStopUnknown
            | CheckPoint::InterchangeFeederJourneyUnknown
            | CheckPoint::InterchangeConsumerStopUnknown
            | CheckPoint::InterchangeConsumerJourneyUnknown
            | CheckPoint::InterchangeConsumerStopNotServed
            | CheckPoint::InterchangeFeederStopNotServed
            | CheckPoint::InterchangeTooFar
            | CheckPoint::InterchangeWaitTooLong => Severity::Error,

            CheckPoint::JourneyDwell
            | CheckPoint::JourneyTooSlow
            | CheckPoint::JourneyFast
            | CheckPoint::JourneyDurationVariance
            | CheckPoint::JourneyUndated
            | CheckPoint::FrequencyOverlap
            | CheckPoint::FrequencyOutsideTimeband
            | CheckPoint::TimesheetOutsideFrequency
            | CheckPoint::InterchangeDuplicate
            | CheckPoint::InterchangeFar
            | CheckPoint::InterchangeWaitLong
            | CheckPoint::InterchangeFeederAlightingForbidden
            | CheckPoint::InterchangeConsumerBoardingForbidden
            | CheckPoint::InterchangeNoCommonDay => Severity::Warning,
        }
    }
}

impl fmt::Display for CheckPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for CheckPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// The kind of object a diagnostic points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    VehicleJourney,
    StopArea,
    ScheduledStopPoint,
    StopPoint,
    Interchange,
}

/// A reference to the object a finding concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataLocation {
    pub kind: ObjectKind,
    pub id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DataLocation {
    pub fn new(kind: ObjectKind, id: &ObjectId) -> Self {
        Self {
            kind,
            id: id.clone(),
            name: None,
        }
    }

    pub fn journey(id: &ObjectId) -> Self {
        Self::new(ObjectKind::VehicleJourney, id)
    }

    pub fn interchange(id: &ObjectId) -> Self {
        Self::new(ObjectKind::Interchange, id)
    }

    pub fn stop_area(area: &crate::domain::StopArea) -> Self {
        Self {
            name: area.name.clone(),
            ..Self::new(ObjectKind::StopArea, &area.id)
        }
    }
}

/// One finding of one checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub checkpoint: CheckPoint,
    pub severity: Severity,
    pub source: DataLocation,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<DataLocation>,
    /// The offending value, such as a computed speed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
    /// The limit the value was compared with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Diagnostic {
    pub fn new(checkpoint: CheckPoint, source: DataLocation) -> Self {
        Self {
            checkpoint,
            severity: checkpoint.severity(),
            source,
            targets: Vec::new(),
            observed: None,
            reference: None,
        }
    }

    pub fn target(mut self, target: DataLocation) -> Self {
        self.targets.push(target);
        self
    }

    pub fn observed(mut self, value: impl ToString) -> Self {
        self.observed = Some(value.to_string());
        self
    }

    pub fn reference(mut self, value: impl ToString) -> Self {
        self.reference = Some(value.to_string());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.severity, self.checkpoint, self.source.id)?;
        for target in &self.targets {
            write!(f, " -> {}", target.id)?;
        }
        match (&self.observed, &self.reference) {
            (Some(observed), Some(reference)) => write!(f, " ({observed} vs {reference})"),
            (Some(observed), None) => write!(f, " ({observed})"),
            (None, Some(reference)) => write!(f, " (limit {reference})"),
            (None, None) => Ok(()),
        }
    }
}

/// Receives diagnostics from a validation run.
pub trait DiagnosticReporter {
    /// Called once per checkpoint that applies to the dataset, before any
    /// of its diagnostics.
    fn prepare(&mut self, _checkpoint: CheckPoint) {}

    fn record(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticReporter for Vec<Diagnostic> {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Outcome of one checkpoint over a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckPointStatus {
    /// The checkpoint did not apply.
    Uncheck,
    Ok,
    Warning,
    Error,
}

impl fmt::Display for CheckPointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            CheckPointStatus::Uncheck => "uncheck",
            CheckPointStatus::Ok => "ok",
            CheckPointStatus::Warning => "warning",
            CheckPointStatus::Error => "error",
        })
    }
}

/// A reporter that keeps every diagnostic and derives checkpoint status.
///
/// # Examples
///
/// ```
/// use schedule_engine::domain::ObjectId;
/// use schedule_engine::validation::{
///     CheckPoint, CheckPointStatus, DataLocation, Diagnostic, DiagnosticReporter, ValidationReport,
/// };
///
/// let mut report = ValidationReport::new();
/// report.prepare(CheckPoint::JourneyUndated);
/// report.prepare(CheckPoint::JourneyTooFast);
///
/// let vj = ObjectId::parse("X:ServiceJourney:1").unwrap();
/// report.record(Diagnostic::new(CheckPoint::JourneyTooFast, DataLocation::journey(&vj)));
///
/// assert_eq!(report.status(CheckPoint::JourneyUndated), CheckPointStatus::Ok);
/// assert_eq!(report.status(CheckPoint::JourneyTooFast), CheckPointStatus::Error);
/// assert_eq!(report.status(CheckPoint::InterchangeDuplicate), CheckPointStatus::Uncheck);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    prepared: BTreeSet<CheckPoint>,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn for_checkpoint(&self, checkpoint: CheckPoint) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.checkpoint == checkpoint)
    }

    pub fn count(&self, checkpoint: CheckPoint) -> usize {
        self.for_checkpoint(checkpoint).count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// The worst severity recorded for a checkpoint, or `Ok`/`Uncheck`
    /// depending on whether it was prepared.
    pub fn status(&self, checkpoint: CheckPoint) -> CheckPointStatus {
        let worst = self.for_checkpoint(checkpoint).map(|d| d.severity).max();
        match worst {
            Some(Severity::Error) => CheckPointStatus::Error,
            Some(Severity::Warning) => CheckPointStatus::Warning,
            Some(Severity::Info) => CheckPointStatus::Ok,
            None if self.prepared.contains(&checkpoint) => CheckPointStatus::Ok,
            None => CheckPointStatus::Uncheck,
        }
    }

    /// Status of every known checkpoint, keyed by code.
    pub fn summary(&self) -> BTreeMap<&'static str, CheckPointStatus> {
        CheckPoint::VEHICLE_JOURNEY
            .iter()
            .chain(CheckPoint::INTERCHANGE.iter())
            .map(|cp| (cp.code(), self.status(*cp)))
            .collect()
    }
}

impl DiagnosticReporter for ValidationReport {
    fn prepare(&mut self, checkpoint: CheckPoint) {
        self.prepared.insert(checkpoint);
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        self.prepared.insert(diagnostic.checkpoint);
        self.diagnostics.push(diagnostic);
    }
}
