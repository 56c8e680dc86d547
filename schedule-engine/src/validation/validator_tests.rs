//! Scenario tests for the vehicle-journey checkpoints.

use super::fixtures::{id, journey, network, pattern, stop};
use super::*;
use crate::domain::{
    JourneyCategory, JourneyFrequency, Referential, StopArea, Timeband, TransportMode,
    TransportSubMode,
};
use chrono::NaiveTime;

fn run(r: &Referential, config: ValidationConfig) -> ValidationReport {
    let mut report = ValidationReport::new();
    Validator::new(config).validate(r, &mut report).unwrap();
    report
}

fn bus_limits(min: u32, warning: u32, max: u32) -> ValidationConfig {
    ValidationConfig::default().with_mode(TransportMode::Bus, ModeParameters::new(min, warning, max))
}

/// Two quays 10 km apart on pattern `TST:JP:1`.
fn ten_km() -> Referential {
    let mut r = network();
    stop(&mut r, 1, 60.0);
    stop(&mut r, 2, 60.09);
    pattern(&mut r, "TST:JP:1", &[1, 2]);
    r
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn ten_km_in_eight_minutes_is_within_67() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:08", "08:08")],
    ));

    let report = run(&r, bus_limits(5, 67, 67));

    assert!(report.diagnostics().is_empty(), "{:?}", report.diagnostics());
    assert_eq!(report.status(CheckPoint::JourneyTooFast), CheckPointStatus::Ok);
}

#[test]
fn ten_km_in_eight_minutes_exceeds_50() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:08", "08:08")],
    ));

    let report = run(&r, bus_limits(5, 50, 50));

    let too_fast: Vec<_> = report.for_checkpoint(CheckPoint::JourneyTooFast).collect();
    assert_eq!(too_fast.len(), 1);
    assert_eq!(too_fast[0].source.id, id("TST:VJ:1"));
    assert_eq!(too_fast[0].observed.as_deref(), Some("60"));
    assert_eq!(too_fast[0].reference.as_deref(), Some("50"));
    assert_eq!(too_fast[0].targets.len(), 2);
    assert_eq!(report.count(CheckPoint::JourneyFast), 0);
}

#[test]
fn above_warning_below_max_is_a_warning() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:08", "08:08")],
    ));

    let report = run(&r, bus_limits(5, 55, 100));

    assert_eq!(report.count(CheckPoint::JourneyFast), 1);
    assert_eq!(report.count(CheckPoint::JourneyTooFast), 0);
    assert_eq!(report.status(CheckPoint::JourneyFast), CheckPointStatus::Warning);
}

#[test]
fn second_resolution_gets_no_slack() {
    let mut r = ten_km();
    // 10 km in exactly 8 minutes, published to the second: 75 km/h
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00:01", "08:00:01"), (2, "08:08:01", "08:08:01")],
    ));

    let report = run(&r, bus_limits(5, 67, 67));

    assert_eq!(report.count(CheckPoint::JourneyTooFast), 1);
}

#[test]
fn crawling_journey_is_too_slow() {
    let mut r = network();
    stop(&mut r, 1, 60.0);
    stop(&mut r, 2, 60.009);
    pattern(&mut r, "TST:JP:1", &[1, 2]);
    // 1 km in an hour
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "09:00", "09:00")],
    ));

    let report = run(&r, bus_limits(5, 80, 100));

    let slow: Vec<_> = report.for_checkpoint(CheckPoint::JourneyTooSlow).collect();
    assert_eq!(slow.len(), 1);
    assert_eq!(slow[0].reference.as_deref(), Some("5"));
}

#[test]
fn running_backwards_is_an_error() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:10", "08:10"), (2, "08:05", "08:05")],
    ));

    let report = run(&r, ValidationConfig::default());

    assert_eq!(report.count(CheckPoint::JourneyNegativeRunningTime), 1);
    // Arrival and departure both go backwards
    let backwards: Vec<_> = report
        .for_checkpoint(CheckPoint::JourneyTimesNotIncreasing)
        .collect();
    assert_eq!(backwards.len(), 2);
    assert_eq!(backwards[0].observed.as_deref(), Some("08:05"));
    assert_eq!(backwards[0].reference.as_deref(), Some("08:10"));
    assert!(report.has_errors());
}

#[test]
fn only_departure_going_backwards_is_reported_once() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:30"), (2, "08:25", "08:25")],
    ));

    let report = run(&r, ValidationConfig::default());

    assert_eq!(report.count(CheckPoint::JourneyTimesNotIncreasing), 1);
}

#[test]
fn zero_running_time_over_distance_is_info() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:00", "08:00")],
    ));

    let report = run(&r, ValidationConfig::default());

    assert_eq!(report.count(CheckPoint::JourneyZeroRunningTime), 1);
    assert_eq!(report.count(CheckPoint::JourneyTooFast), 0);
    assert!(!report.has_errors());
}

#[test]
fn running_past_midnight_uses_day_offsets() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "23:55", "23:55"), (2, "00:03+1", "00:03+1")],
    ));

    let report = run(&r, bus_limits(5, 67, 67));

    assert!(report.diagnostics().is_empty(), "{:?}", report.diagnostics());
}

#[test]
fn stops_are_ordered_by_pattern_position() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(2, "08:08", "08:08"), (1, "08:00", "08:00")],
    ));

    let report = run(&r, ValidationConfig::default());

    assert_eq!(report.count(CheckPoint::JourneyNegativeRunningTime), 0);
    assert_eq!(report.count(CheckPoint::JourneyTimesNotIncreasing), 0);
}

#[test]
fn long_dwell_is_reported_at_the_stop() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:10"), (2, "08:30", "08:30")],
    ));

    let report = run(&r, ValidationConfig::default());

    let dwell: Vec<_> = report.for_checkpoint(CheckPoint::JourneyDwell).collect();
    assert_eq!(dwell.len(), 1);
    assert_eq!(dwell[0].targets[0].id, id("TST:Quay:1"));
    assert_eq!(dwell[0].observed.as_deref(), Some("600"));
    assert_eq!(dwell[0].reference.as_deref(), Some("300"));
}

#[test]
fn arrival_after_departure_at_one_stop() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:20", "08:18")],
    ));

    let report = run(&r, ValidationConfig::default());

    let inverted: Vec<_> = report
        .for_checkpoint(CheckPoint::JourneyArrivalAfterDeparture)
        .collect();
    assert_eq!(inverted.len(), 1);
    assert_eq!(inverted[0].targets[0].id, id("TST:Quay:2"));
}

#[test]
fn journey_without_calendar_is_undated() {
    let mut r = ten_km();
    let mut vj = journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:20", "08:20")],
    );
    vj.timetables.clear();
    r.add_vehicle_journey(vj);

    let report = run(&r, ValidationConfig::default());

    assert_eq!(report.count(CheckPoint::JourneyUndated), 1);
}

#[test]
fn dated_service_journey_counts_as_dated() {
    let mut r = ten_km();
    let mut vj = journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:20", "08:20")],
    );
    vj.timetables.clear();
    vj.dated_service_journeys.push(id("TST:DatedServiceJourney:1"));
    r.add_vehicle_journey(vj);

    let report = run(&r, ValidationConfig::default());

    assert_eq!(report.count(CheckPoint::JourneyUndated), 0);
}

#[test]
fn outlier_running_time_on_shared_pattern() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:08", "08:08")],
    ));
    r.add_vehicle_journey(journey(
        "TST:VJ:2",
        "TST:JP:1",
        &[(1, "09:00", "09:00"), (2, "09:08", "09:08")],
    ));
    r.add_vehicle_journey(journey(
        "TST:VJ:3",
        "TST:JP:1",
        &[(1, "10:00", "10:00"), (2, "10:30", "10:30")],
    ));

    let report = run(&r, ValidationConfig::default());

    // average 920 s: deviations 440, 440 and 880 against a 600 s limit
    let outliers: Vec<_> = report
        .for_checkpoint(CheckPoint::JourneyDurationVariance)
        .collect();
    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].source.id, id("TST:VJ:3"));
    assert_eq!(outliers[0].observed.as_deref(), Some("880"));
}

#[test]
fn overlapping_frequency_windows() {
    let mut r = ten_km();
    let mut vj = journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:08", "08:08")],
    );
    vj.category = JourneyCategory::Frequency;
    vj.frequencies = vec![
        JourneyFrequency::new(hm(8, 0), hm(9, 0)),
        JourneyFrequency::new(hm(8, 30), hm(9, 30)),
    ];
    r.add_vehicle_journey(vj);

    let report = run(&r, ValidationConfig::default());

    assert_eq!(report.count(CheckPoint::FrequencyOverlap), 1);
}

#[test]
fn adjacent_frequency_windows_do_not_overlap() {
    let mut r = ten_km();
    let mut vj = journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:08", "08:08")],
    );
    vj.category = JourneyCategory::Frequency;
    vj.frequencies = vec![
        JourneyFrequency::new(hm(8, 0), hm(9, 0)),
        JourneyFrequency::new(hm(9, 0), hm(10, 0)),
    ];
    r.add_vehicle_journey(vj);

    let report = run(&r, ValidationConfig::default());

    assert_eq!(report.count(CheckPoint::FrequencyOverlap), 0);
    assert_eq!(report.status(CheckPoint::FrequencyOverlap), CheckPointStatus::Ok);
}

#[test]
fn frequency_window_past_midnight_overlaps_early_window() {
    let mut r = ten_km();
    let mut vj = journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "23:00", "23:00"), (2, "23:08", "23:08")],
    );
    vj.category = JourneyCategory::Frequency;
    vj.frequencies = vec![
        JourneyFrequency::new(hm(23, 0), hm(1, 0)),
        JourneyFrequency::new(hm(0, 15), hm(0, 45)),
    ];
    r.add_vehicle_journey(vj);

    let report = run(&r, ValidationConfig::default());

    let overlaps: Vec<_> = report.for_checkpoint(CheckPoint::FrequencyOverlap).collect();
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].observed.as_deref(), Some("23:00-01:00"));
    assert_eq!(overlaps[0].reference.as_deref(), Some("00:15-00:45"));
}

#[test]
fn frequency_outside_its_timeband() {
    let mut r = ten_km();
    r.add_timeband(Timeband {
        id: id("TST:Timeband:peak"),
        start: hm(7, 0),
        end: hm(9, 0),
    });
    let mut vj = journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:08", "08:08")],
    );
    vj.category = JourneyCategory::Frequency;
    vj.frequencies = vec![
        JourneyFrequency::new(hm(8, 0), hm(9, 30)).in_timeband(id("TST:Timeband:peak")),
        JourneyFrequency::new(hm(7, 30), hm(8, 30)).in_timeband(id("TST:Timeband:peak")),
    ];
    r.add_vehicle_journey(vj);

    let report = run(&r, ValidationConfig::default());

    let outside: Vec<_> = report
        .for_checkpoint(CheckPoint::FrequencyOutsideTimeband)
        .collect();
    assert_eq!(outside.len(), 1);
    assert_eq!(outside[0].observed.as_deref(), Some("08:00-09:30"));
    assert_eq!(outside[0].reference.as_deref(), Some("07:00-09:00"));
}

#[test]
fn timesheet_departure_outside_frequency_windows() {
    let mut r = ten_km();
    let mut frequency = journey(
        "TST:VJ:F",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:08", "08:08")],
    );
    frequency.category = JourneyCategory::Frequency;
    frequency.frequencies = vec![JourneyFrequency::new(hm(8, 0), hm(9, 0))];
    r.add_vehicle_journey(frequency);
    r.add_vehicle_journey(journey(
        "TST:VJ:inside",
        "TST:JP:1",
        &[(1, "08:30", "08:30"), (2, "08:38", "08:38")],
    ));
    r.add_vehicle_journey(journey(
        "TST:VJ:outside",
        "TST:JP:1",
        &[(1, "10:00", "10:00"), (2, "10:08", "10:08")],
    ));

    let report = run(&r, ValidationConfig::default());

    let outside: Vec<_> = report
        .for_checkpoint(CheckPoint::TimesheetOutsideFrequency)
        .collect();
    assert_eq!(outside.len(), 1);
    assert_eq!(outside[0].source.id, id("TST:VJ:outside"));
    assert_eq!(outside[0].targets[0].id, id("TST:VJ:F"));
}

#[test]
fn bus_journey_at_rail_station() {
    let mut r = ten_km();
    r.add_stop_area(
        StopArea::new(id("TST:StopPlace:2")).with_mode(TransportMode::Rail, None),
    );
    r.add_stop_area(
        StopArea::new(id("TST:Quay:2"))
            .at(10.0, 60.09)
            .with_parent(id("TST:StopPlace:2")),
    );
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:20", "08:20")],
    ));

    let report = run(&r, ValidationConfig::default());

    let mismatches: Vec<_> = report
        .for_checkpoint(CheckPoint::TransportModeMismatch)
        .collect();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].targets[0].id, id("TST:Quay:2"));
    assert_eq!(mismatches[0].observed.as_deref(), Some("bus"));
    assert_eq!(mismatches[0].reference.as_deref(), Some("rail"));
}

#[test]
fn bus_journey_at_coach_station() {
    let mut r = ten_km();
    r.add_stop_area(
        StopArea::new(id("TST:Quay:2"))
            .at(10.0, 60.09)
            .with_mode(TransportMode::Coach, None),
    );
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:20", "08:20")],
    ));

    let report = run(&r, ValidationConfig::default());

    assert_eq!(report.count(CheckPoint::TransportModeMismatch), 0);
}

#[test]
fn local_bus_at_rail_replacement_stop() {
    let mut r = ten_km();
    r.add_stop_area(
        StopArea::new(id("TST:Quay:2"))
            .at(10.0, 60.09)
            .with_mode(TransportMode::Bus, Some(TransportSubMode::RailReplacementBus)),
    );
    let mut vj = journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:20", "08:20")],
    );
    vj.transport_submode = Some(TransportSubMode::LocalBus);
    r.add_vehicle_journey(vj);

    let report = run(&r, ValidationConfig::default());

    let mismatches: Vec<_> = report
        .for_checkpoint(CheckPoint::TransportModeMismatch)
        .collect();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].observed.as_deref(), Some("bus/localBus"));
    assert_eq!(
        mismatches[0].reference.as_deref(),
        Some("bus/railReplacementBus")
    );
}

#[test]
fn disallowed_mode_only_checked_on_request() {
    let mut r = ten_km();
    let mut vj = journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:20", "08:20")],
    );
    vj.transport_mode = Some(TransportMode::Bus);
    r.add_vehicle_journey(vj);

    let no_buses = ModeParameters {
        allowed: false,
        ..ModeParameters::default()
    };
    let mut config = ValidationConfig::default().with_mode(TransportMode::Bus, no_buses);

    let report = run(&r, config.clone());
    assert_eq!(report.count(CheckPoint::TransportModeNotAllowed), 0);
    assert_eq!(
        report.status(CheckPoint::TransportModeNotAllowed),
        CheckPointStatus::Uncheck
    );

    config.check_allowed_transport_modes = true;
    let report = run(&r, config);
    assert_eq!(report.count(CheckPoint::TransportModeNotAllowed), 1);
}

#[test]
fn line_mode_is_not_checked_against_whitelist() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:20", "08:20")],
    ));

    let mut config = ValidationConfig::default().with_mode(
        TransportMode::Bus,
        ModeParameters {
            allowed: false,
            ..ModeParameters::default()
        },
    );
    config.check_allowed_transport_modes = true;

    let report = run(&r, config);
    assert_eq!(report.count(CheckPoint::TransportModeNotAllowed), 0);
}

#[test]
fn standalone_skips_network_checks() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:10"), (2, "08:18", "08:18")],
    ));

    let mut config = bus_limits(5, 50, 50);
    config.standalone = true;
    let report = run(&r, config);

    assert_eq!(report.count(CheckPoint::JourneyTooFast), 0);
    assert_eq!(report.status(CheckPoint::JourneyTooFast), CheckPointStatus::Uncheck);
    assert_eq!(report.count(CheckPoint::JourneyDwell), 1);
}

#[test]
fn standalone_keeps_mode_checks_and_skips_calendar() {
    let mut r = ten_km();
    r.add_stop_area(
        StopArea::new(id("TST:StopPlace:2")).with_mode(TransportMode::Rail, None),
    );
    r.add_stop_area(
        StopArea::new(id("TST:Quay:2"))
            .at(10.0, 60.09)
            .with_parent(id("TST:StopPlace:2")),
    );
    let mut vj = journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:20", "08:20")],
    );
    vj.timetables.clear();
    r.add_vehicle_journey(vj);

    let config = ValidationConfig {
        standalone: true,
        ..ValidationConfig::default()
    };
    let report = run(&r, config);

    assert_eq!(report.count(CheckPoint::JourneyUndated), 0);
    assert_eq!(
        report.status(CheckPoint::JourneyUndated),
        CheckPointStatus::Uncheck
    );
    assert_eq!(report.count(CheckPoint::TransportModeMismatch), 1);
    assert_eq!(
        report.status(CheckPoint::TransportModeMismatch),
        CheckPointStatus::Error
    );
}

#[test]
fn unknown_stop_point_aborts_the_run() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (99, "08:20", "08:20")],
    ));

    let mut report = ValidationReport::new();
    let err = Validator::default()
        .validate(&r, &mut report)
        .unwrap_err();

    assert_eq!(
        err,
        ValidationError::UnknownStopPoint {
            journey: id("TST:VJ:1"),
            stop_point: id("TST:StopPoint:99"),
        }
    );
    assert!(report.diagnostics().is_empty());
}

#[test]
fn unknown_journey_pattern_aborts_the_run() {
    let mut r = ten_km();
    r.add_vehicle_journey(journey("TST:VJ:1", "TST:JP:404", &[]));

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let err = Validator::default()
        .validate(&r, &mut diagnostics)
        .unwrap_err();

    assert!(matches!(err, ValidationError::UnknownJourneyPattern { .. }));
    assert_eq!(
        err.to_string(),
        "journey TST:VJ:1 follows unknown journey pattern TST:JP:404"
    );
}

#[test]
fn summary_counts_by_severity() {
    let mut r = ten_km();
    let mut vj = journey(
        "TST:VJ:1",
        "TST:JP:1",
        &[(1, "08:00", "08:00"), (2, "08:08", "08:08")],
    );
    vj.timetables.clear();
    r.add_vehicle_journey(vj);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let summary = Validator::new(bus_limits(5, 50, 50))
        .validate(&r, &mut diagnostics)
        .unwrap();

    assert_eq!(summary.journeys, 1);
    assert_eq!(summary.interchanges, 0);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.diagnostics(), diagnostics.len());
}

#[test]
fn empty_referential_checks_nothing() {
    let report = run(&network(), ValidationConfig::default());

    assert!(report.diagnostics().is_empty());
    assert!(
        report
            .summary()
            .values()
            .all(|status| *status == CheckPointStatus::Uncheck)
    );
}
