//! Small networks for validator tests.
//!
//! Stop `n` is a quay `TST:Quay:n` served through `TST:SSP:n` and
//! `TST:StopPoint:n` (pattern position `n`). Quays sit on the 10°E meridian,
//! so latitude differences translate directly into distance: 0.09° is
//! roughly 10 km.

use chrono::NaiveDate;

use crate::domain::{
    CalendarDay, DayOffsetTime, DayOfWeekSet, JourneyPattern, Line, ObjectId, Period, Referential,
    ScheduledStopPoint, StopArea, StopPoint, Timetable, TransportMode, VehicleJourney,
    VehicleJourneyAtStop,
};

pub(super) const WEEKDAYS: &str = "TST:DayType:weekdays";

pub(super) fn id(s: &str) -> ObjectId {
    ObjectId::parse(s).unwrap()
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// "HH:MM" with an optional "+N" day offset suffix.
pub(super) fn time(s: &str) -> DayOffsetTime {
    match s.split_once('+') {
        Some((hhmm, offset)) => DayOffsetTime::parse(hhmm, offset.parse().unwrap()).unwrap(),
        None => DayOffsetTime::parse(s, 0).unwrap(),
    }
}

/// A referential with one bus line and a weekday timetable for January 2024.
pub(super) fn network() -> Referential {
    let mut r = Referential::new("TST");
    r.add_line(Line {
        id: id("TST:Line:1"),
        name: Some("1".to_string()),
        transport_mode: Some(TransportMode::Bus),
        transport_submode: None,
    });

    let mut weekdays = Timetable::new(id(WEEKDAYS));
    weekdays.add_period(Period::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap());
    weekdays.set_day_types(DayOfWeekSet::WEEKDAYS);
    r.attach_timetables([weekdays]);
    r
}

/// A timetable running on exactly one date.
pub(super) fn single_day(r: &mut Referential, name: &str, on: NaiveDate) {
    let mut timetable = Timetable::new(id(name));
    timetable.add_calendar_day(CalendarDay::included(on));
    r.attach_timetables([timetable]);
}

pub(super) fn stop(r: &mut Referential, n: u32, latitude: f64) {
    r.add_stop_area(StopArea::new(id(&format!("TST:Quay:{n}"))).at(10.0, latitude));
    r.add_scheduled_stop_point(ScheduledStopPoint {
        id: id(&format!("TST:SSP:{n}")),
        stop_area: Some(id(&format!("TST:Quay:{n}"))),
    });
    r.add_stop_point(StopPoint::new(
        id(&format!("TST:StopPoint:{n}")),
        id(&format!("TST:SSP:{n}")),
        n,
    ));
}

pub(super) fn pattern(r: &mut Referential, name: &str, stops: &[u32]) {
    r.add_journey_pattern(JourneyPattern {
        id: id(name),
        line: id("TST:Line:1"),
        stop_points: stops
            .iter()
            .map(|n| id(&format!("TST:StopPoint:{n}")))
            .collect(),
    });
}

/// A weekday journey passing the given stops at (stop, arrival, departure).
pub(super) fn journey(name: &str, pattern: &str, passes: &[(u32, &str, &str)]) -> VehicleJourney {
    let mut vj = VehicleJourney::new(id(name), id(pattern));
    vj.timetables = vec![id(WEEKDAYS)];
    vj.stops = passes
        .iter()
        .map(|(n, arrival, departure)| {
            VehicleJourneyAtStop::new(
                id(&format!("TST:StopPoint:{n}")),
                time(arrival),
                time(departure),
            )
        })
        .collect();
    vj
}
