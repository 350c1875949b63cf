//! Rectification against the embedded analytic ephemeris.

use chrono::{DateTime, Duration, TimeZone, Utc};
use natal_chart::{Chart, ErrorKind, PatternKind};
use natal_core::{AnalyticEphemeris, InstrumentedEphemeris, QueryStats};
use natal_frames::{Position, angular_separation};
use natal_search::{
    ChartAngle, EventKind, LifeEvent, RecognizedPattern, RectificationConfig, RectificationError,
    RectificationMethod, RectificationRequest, TimeWindow, rectify, rectify_multiple_events,
    rectify_patterns, rectify_single_event,
};

fn birth() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1985, 3, 14, 9, 30, 0).unwrap()
}

fn chart() -> Chart {
    Chart::new(birth(), Position::geographic(48.8566, 2.3522).unwrap()).unwrap()
}

fn events() -> Vec<LifeEvent> {
    vec![
        LifeEvent::new(Utc.with_ymd_and_hms(2009, 7, 4, 14, 0, 0).unwrap(), EventKind::Marriage),
        LifeEvent::new(Utc.with_ymd_and_hms(2012, 2, 20, 8, 0, 0).unwrap(), EventKind::ChildBirth),
        LifeEvent::new(Utc.with_ymd_and_hms(2016, 10, 1, 0, 0, 0).unwrap(), EventKind::CareerChange)
            .with_description("new job"),
    ]
}

fn narrow() -> TimeWindow {
    TimeWindow::around(birth(), Duration::hours(2)).unwrap()
}

fn request(method: RectificationMethod) -> RectificationRequest {
    RectificationRequest::events(chart(), events(), method).with_window(narrow())
}

#[test]
fn result_is_within_window_and_bounded() {
    let eph = AnalyticEphemeris::default();
    let result = rectify_multiple_events(&eph, &request(RectificationMethod::EventBased)).unwrap();
    assert!(narrow().contains(&result.rectified_time));
    assert!((0.0..=1.0).contains(&result.confidence));
    assert!(result.complete);
    assert_eq!(result.candidates_total, 121);
    assert_eq!(result.candidates_evaluated, 121);
    assert_eq!(result.event_matches.len(), 3);
    assert!(result.pattern_matches.is_empty());

    let sum: f64 = result.confidence_factors.iter().map(|f| f.contribution).sum();
    assert!((sum - result.confidence).abs() < 1e-12);
    let contributions: f64 = result.event_matches.iter().map(|m| m.contribution).sum();
    assert!((contributions - result.score).abs() < 1e-12);
    for m in &result.event_matches {
        let names: Vec<_> = m.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["angle_transit", "solar_arc", "house_activation"]);
    }
}

#[test]
fn repeat_runs_are_identical() {
    let eph = AnalyticEphemeris::default();
    for &method in RectificationMethod::all() {
        let a = rectify(&eph, &request(method)).unwrap();
        let b = rectify(&eph, &request(method)).unwrap();
        assert_eq!(a, b, "{method}");
    }
}

#[test]
fn methods_are_distinct_strategies() {
    let eph = AnalyticEphemeris::default();
    let results: Vec<_> = RectificationMethod::all()
        .iter()
        .map(|&m| rectify(&eph, &request(m)).unwrap())
        .collect();
    let times: Vec<_> = results.iter().map(|r| r.rectified_time).collect();
    assert!(
        times[0] != times[1] || times[1] != times[2],
        "all methods agreed on {}",
        times[0]
    );
    assert_eq!(results[2].event_matches[0].signals[0].name, "harmonic_resonance");
}

#[test]
fn weights_shift_the_score() {
    let eph = AnalyticEphemeris::default();
    let even = rectify(&eph, &request(RectificationMethod::EventBased)).unwrap();
    let weighted = rectify(
        &eph,
        &request(RectificationMethod::EventBased).with_weights(vec![5.0, 0.0, 1.0]),
    )
    .unwrap();
    assert_eq!(weighted.event_matches[1].contribution, 0.0);
    assert_eq!(weighted.event_matches[0].weight, 5.0);
    assert!(even.event_matches.iter().all(|m| m.weight == 1.0));
}

#[test]
fn single_event_uses_default_window() {
    let eph = AnalyticEphemeris::default();
    let config = RectificationConfig {
        step_minutes: 10.0,
        ..RectificationConfig::default()
    };
    let result = rectify_single_event(&eph, &chart(), events()[0].clone(), RectificationMethod::Harmonic, &config).unwrap();
    assert_eq!(result.window, TimeWindow::around(birth(), Duration::hours(12)).unwrap());
    assert_eq!(result.candidates_total, 145);
    assert_eq!(result.step_minutes, 10.0);
}

#[test]
fn pattern_evidence_pulls_an_angle_onto_the_points() {
    let eph = AnalyticEphemeris::default();
    let pattern = RecognizedPattern::new(PatternKind::TSquare, vec![200.0], 1.0);
    let req = RectificationRequest::patterns(chart(), vec![pattern], RectificationMethod::PatternBased)
        .with_config(RectificationConfig {
            step_minutes: 4.0,
            ..RectificationConfig::default()
        });
    let result = rectify_patterns(&eph, &req).unwrap();
    let m = &result.pattern_matches[0];
    let alignment = m.signals.iter().find(|s| s.name == "alignment").unwrap();
    assert!(alignment.value > 0.4, "alignment = {}", alignment.value);

    let angles = natal_chart::ChartFrame::at(&eph, &result.rectified_time, chart().location())
        .unwrap()
        .angles();
    let closest = ChartAngle::ALL
        .iter()
        .map(|a| angular_separation(200.0, a.longitude(&angles)))
        .fold(f64::INFINITY, f64::min);
    assert!(closest < 5.0, "closest angle {closest}° away");
}

fn assert_no_lookups(stats: QueryStats) {
    assert_eq!(stats.body_queries, 0);
    assert_eq!(stats.orientation_queries, 0);
}

#[test]
fn empty_events_fail_before_any_lookup() {
    let eph = InstrumentedEphemeris::new(AnalyticEphemeris::default());
    let req = RectificationRequest::events(chart(), Vec::new(), RectificationMethod::EventBased);
    let err = rectify_multiple_events(&eph, &req).unwrap_err();
    assert_eq!(err, RectificationError::EmptyEvidence);
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_no_lookups(eph.stats());
}

#[test]
fn request_errors_fail_before_any_lookup() {
    let eph = InstrumentedEphemeris::new(AnalyticEphemeris::default());
    let inverted = TimeWindow::new(birth(), birth() - Duration::hours(1));
    let pattern = RecognizedPattern::new(PatternKind::GrandTrine, vec![0.0, 120.0, 240.0], 0.9);
    let cases = vec![
        request(RectificationMethod::EventBased).with_window(inverted),
        request(RectificationMethod::EventBased).with_window(TimeWindow::new(birth(), birth())),
        request(RectificationMethod::EventBased).with_weights(vec![1.0]),
        request(RectificationMethod::Harmonic).with_weights(vec![0.0, 0.0, 0.0]),
        RectificationRequest::patterns(chart(), vec![pattern], RectificationMethod::EventBased),
        request(RectificationMethod::EventBased).with_window(TimeWindow::new(
            Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2010, 1, 2, 0, 0, 0).unwrap(),
        )),
        request(RectificationMethod::EventBased).with_config(RectificationConfig {
            step_minutes: -1.0,
            ..RectificationConfig::default()
        }),
        request(RectificationMethod::EventBased).with_config(RectificationConfig {
            window_half_width_hours: 1e10,
            ..RectificationConfig::default()
        }),
        request(RectificationMethod::EventBased)
            .with_window(TimeWindow::around(birth(), Duration::days(30)).unwrap())
            .with_config(RectificationConfig {
                step_minutes: 1.0,
                ..RectificationConfig::default()
            }),
    ];
    for req in cases {
        let err = rectify(&eph, &req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{err}");
    }
    assert_no_lookups(eph.stats());
}

#[test]
fn unknown_type_names_are_validation() {
    let err = LifeEvent::parse("2010-01-01T00:00:00Z", None, "PROMOTION_PARTY", "").unwrap_err();
    assert_eq!(err, RectificationError::UnknownEventType("PROMOTION_PARTY".into()));
    let err = RecognizedPattern::parse("MYSTIC_RECTANGLE", vec![1.0], 1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn wrong_entry_point_is_rejected() {
    let eph = AnalyticEphemeris::default();
    let err = rectify_patterns(&eph, &request(RectificationMethod::PatternBased)).unwrap_err();
    assert!(matches!(err, RectificationError::WrongEvidence { .. }));
}

#[test]
fn zero_budget_evaluates_nothing() {
    let eph = AnalyticEphemeris::default();
    let req = request(RectificationMethod::EventBased).with_config(RectificationConfig {
        time_budget_ms: Some(0),
        ..RectificationConfig::default()
    });
    let err = rectify(&eph, &req).unwrap_err();
    assert_eq!(err, RectificationError::DeadlineExceeded { budget_ms: 0 });
    assert_eq!(err.kind(), ErrorKind::Computation);
}

#[test]
fn result_serializes() {
    let eph = AnalyticEphemeris::default();
    let req = request(RectificationMethod::Harmonic).with_window(TimeWindow::around(birth(), Duration::minutes(20)).unwrap());
    let result = rectify(&eph, &req).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["method"], "HARMONIC");
    assert_eq!(json["confidence_factors"].as_array().unwrap().len(), 3);
    assert_eq!(json["event_matches"][0]["type"], "MARRIAGE");
    assert!(json.get("pattern_matches").is_none());
}
