//! The in-memory referential: every object a validation run can look at.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::{
    Interchange, JourneyPattern, Line, ObjectId, ScheduledStopPoint, StopArea, StopPoint,
    Timeband, Timetable, TransportMode, TransportSubMode, VehicleJourney,
};

/// Store of network, journey and calendar objects for one codespace.
///
/// Vehicle journeys and interchanges keep their insertion order so that
/// diagnostics come out in a stable order.
#[derive(Debug, Clone, Default)]
pub struct Referential {
    codespace: String,
    stop_areas: HashMap<ObjectId, StopArea>,
    scheduled_stop_points: HashMap<ObjectId, ScheduledStopPoint>,
    stop_points: HashMap<ObjectId, StopPoint>,
    journey_patterns: HashMap<ObjectId, JourneyPattern>,
    lines: HashMap<ObjectId, Line>,
    timebands: HashMap<ObjectId, Timeband>,
    vehicle_journeys: Vec<VehicleJourney>,
    journey_index: HashMap<ObjectId, usize>,
    interchanges: Vec<Interchange>,
    timetables: BTreeMap<ObjectId, Timetable>,
}

impl Referential {
    /// Create an empty referential owning the given codespace.
    pub fn new(codespace: impl Into<String>) -> Self {
        Self {
            codespace: codespace.into(),
            ..Self::default()
        }
    }

    /// The codespace (id prefix) of objects this referential owns.
    pub fn codespace(&self) -> &str {
        &self.codespace
    }

    pub fn add_stop_area(&mut self, area: StopArea) {
        self.stop_areas.insert(area.id.clone(), area);
    }

    pub fn add_scheduled_stop_point(&mut self, ssp: ScheduledStopPoint) {
        self.scheduled_stop_points.insert(ssp.id.clone(), ssp);
    }

    pub fn add_stop_point(&mut self, sp: StopPoint) {
        self.stop_points.insert(sp.id.clone(), sp);
    }

    pub fn add_journey_pattern(&mut self, pattern: JourneyPattern) {
        self.journey_patterns.insert(pattern.id.clone(), pattern);
    }

    pub fn add_line(&mut self, line: Line) {
        self.lines.insert(line.id.clone(), line);
    }

    pub fn add_timeband(&mut self, timeband: Timeband) {
        self.timebands.insert(timeband.id.clone(), timeband);
    }

    /// Add a journey, replacing any earlier journey with the same id in place.
    pub fn add_vehicle_journey(&mut self, journey: VehicleJourney) {
        match self.journey_index.get(&journey.id) {
            Some(&index) => self.vehicle_journeys[index] = journey,
            None => {
                self.journey_index
                    .insert(journey.id.clone(), self.vehicle_journeys.len());
                self.vehicle_journeys.push(journey);
            }
        }
    }

    pub fn add_interchange(&mut self, interchange: Interchange) {
        self.interchanges.push(interchange);
    }

    /// Merge normalized timetables into the shared collection, replacing
    /// timetables with the same id.
    pub fn attach_timetables(&mut self, timetables: impl IntoIterator<Item = Timetable>) {
        for timetable in timetables {
            self.timetables.insert(timetable.id().clone(), timetable);
        }
    }

    pub fn stop_area(&self, id: &str) -> Option<&StopArea> {
        self.stop_areas.get(id)
    }

    pub fn scheduled_stop_point(&self, id: &str) -> Option<&ScheduledStopPoint> {
        self.scheduled_stop_points.get(id)
    }

    pub fn stop_point(&self, id: &str) -> Option<&StopPoint> {
        self.stop_points.get(id)
    }

    pub fn journey_pattern(&self, id: &str) -> Option<&JourneyPattern> {
        self.journey_patterns.get(id)
    }

    pub fn line(&self, id: &str) -> Option<&Line> {
        self.lines.get(id)
    }

    pub fn timeband(&self, id: &str) -> Option<&Timeband> {
        self.timebands.get(id)
    }

    pub fn timetable(&self, id: &str) -> Option<&Timetable> {
        self.timetables.get(id)
    }

    pub fn vehicle_journey(&self, id: &str) -> Option<&VehicleJourney> {
        self.journey_index
            .get(id)
            .map(|&index| &self.vehicle_journeys[index])
    }

    pub fn vehicle_journeys(&self) -> &[VehicleJourney] {
        &self.vehicle_journeys
    }

    pub fn interchanges(&self) -> &[Interchange] {
        &self.interchanges
    }

    pub fn timetables(&self) -> impl Iterator<Item = &Timetable> {
        self.timetables.values()
    }

    /// The stop area a scheduled stop point is located in, if known.
    pub fn stop_area_of(&self, scheduled_stop_point: &str) -> Option<&StopArea> {
        let ssp = self.scheduled_stop_point(scheduled_stop_point)?;
        self.stop_area(ssp.stop_area.as_ref()?.as_str())
    }

    /// The closest stop area, starting at `area` and walking up its
    /// parents, that declares a transport mode.
    ///
    /// Returns the last area visited when none declares one.
    pub fn mode_bearing_area<'a>(&'a self, area: &'a StopArea) -> &'a StopArea {
        let mut current = area;
        let mut visited = HashSet::new();
        while current.transport_mode.is_none() && visited.insert(&current.id) {
            match current.parent.as_ref().and_then(|p| self.stop_area(p.as_str())) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// The journey's transport mode, falling back to its line's and then
    /// to [`TransportMode::Other`].
    pub fn journey_mode(&self, journey: &VehicleJourney) -> TransportMode {
        journey
            .transport_mode
            .or_else(|| self.line_of(journey).and_then(|line| line.transport_mode))
            .unwrap_or(TransportMode::Other)
    }

    /// The journey's submode, falling back to its line's.
    pub fn journey_submode(&self, journey: &VehicleJourney) -> Option<TransportSubMode> {
        journey
            .transport_submode
            .or_else(|| self.line_of(journey).and_then(|line| line.transport_submode))
    }

    fn line_of(&self, journey: &VehicleJourney) -> Option<&Line> {
        let pattern = self.journey_pattern(journey.journey_pattern.as_str())?;
        self.line(pattern.line.as_str())
    }

    /// Every date on which the journey operates, from its timetables.
    ///
    /// Timetable ids that are not in the shared collection contribute no
    /// dates.
    pub fn active_dates(&self, journey: &VehicleJourney) -> BTreeSet<NaiveDate> {
        journey
            .timetables
            .iter()
            .filter_map(|id| self.timetable(id.as_str()))
            .flat_map(|timetable| timetable.effective_dates())
            .collect()
    }
}

/// Serialized form of a [`Referential`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReferentialData {
    pub codespace: String,
    pub stop_areas: Vec<StopArea>,
    pub scheduled_stop_points: Vec<ScheduledStopPoint>,
    pub stop_points: Vec<StopPoint>,
    pub journey_patterns: Vec<JourneyPattern>,
    pub lines: Vec<Line>,
    pub timebands: Vec<Timeband>,
    pub vehicle_journeys: Vec<VehicleJourney>,
    pub interchanges: Vec<Interchange>,
    pub timetables: Vec<Timetable>,
}

impl From<ReferentialData> for Referential {
    fn from(data: ReferentialData) -> Self {
        let mut referential = Referential::new(data.codespace);
        data.stop_areas
            .into_iter()
            .for_each(|a| referential.add_stop_area(a));
        data.scheduled_stop_points
            .into_iter()
            .for_each(|s| referential.add_scheduled_stop_point(s));
        data.stop_points
            .into_iter()
            .for_each(|s| referential.add_stop_point(s));
        data.journey_patterns
            .into_iter()
            .for_each(|p| referential.add_journey_pattern(p));
        data.lines.into_iter().for_each(|l| referential.add_line(l));
        data.timebands
            .into_iter()
            .for_each(|t| referential.add_timeband(t));
        data.vehicle_journeys
            .into_iter()
            .for_each(|vj| referential.add_vehicle_journey(vj));
        data.interchanges
            .into_iter()
            .for_each(|ic| referential.add_interchange(ic));
        referential.attach_timetables(data.timetables);
        referential
    }
}
