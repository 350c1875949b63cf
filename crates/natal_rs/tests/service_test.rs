//! End-to-end requests through the service facade.

use std::sync::Arc;
use std::thread;

use natal_core::InstrumentedEphemeris;
use natal_rs::*;

fn service() -> ChartService {
    ChartService::from_config(NatalConfig::default()).unwrap()
}

fn greenwich() -> ChartRequest {
    ChartRequest::new("2000-01-01T12:00:00Z", 51.4779, 0.0)
}

#[test]
fn chart_at_greenwich_noon() {
    let data = service().calculate_chart(&greenwich()).unwrap();
    assert!((data.angles.ascendant - 24.29).abs() < 0.1);
    assert!((data.angles.mc - 279.61).abs() < 0.1);
    assert_eq!(data.houses.cusps.len(), 12);
    assert!(data.houses.cusps.iter().all(|c| c.coordinate_system() == CoordinateSystem::Ecliptic));
    assert!(data.aspects.iter().all(|a| (0.0..=1.0).contains(&a.aspect.strength)));
}

#[test]
fn local_time_with_zone() {
    let mut local = ChartRequest::new("2000-01-01T13:00:00", 51.4779, 0.0);
    local.timezone = Some("+01:00".into());
    let a = service().calculate_chart(&local).unwrap();
    let b = service().calculate_chart(&greenwich()).unwrap();
    assert_eq!(a.moment, b.moment);
    assert_eq!(a.angles, b.angles);
}

#[test]
fn requested_house_system_is_used() {
    let mut req = greenwich();
    req.house_system = Some("EQUAL".into());
    let houses = service().calculate_houses(&req).unwrap();
    assert_eq!(houses.applied, HouseSystem::Equal);
    for i in 1..=12u8 {
        let next = if i == 12 { 1 } else { i + 1 };
        let arc = (houses.cusp(next) - houses.cusp(i)).rem_euclid(360.0);
        assert!((arc - 30.0).abs() < 1e-9);
    }
}

#[test]
fn polar_request_falls_back_to_equal() {
    let req = ChartRequest::new("2000-06-21T12:00:00Z", 78.22, 15.65);
    let data = service().calculate_chart(&req).unwrap();
    assert_eq!(data.houses.requested, HouseSystem::Placidus);
    assert_eq!(data.houses.applied, HouseSystem::Equal);
}

#[test]
fn invalid_request_never_reaches_ephemeris() {
    let eph = Arc::new(InstrumentedEphemeris::new(AnalyticEphemeris::default()));
    let svc = ChartService::new(eph.clone(), NatalConfig::default()).unwrap();
    let mut bad = greenwich();
    bad.latitude = -95.0;
    assert_eq!(svc.calculate_chart(&bad).unwrap_err().kind(), ErrorKind::Validation);
    let zoneless = ChartRequest::new("2000-01-01 12:00:00", 10.0, 10.0);
    assert_eq!(svc.calculate_chart(&zoneless).unwrap_err().kind(), ErrorKind::Validation);
    assert_eq!(eph.stats().body_queries, 0);
    assert_eq!(eph.stats().orientation_queries, 0);
}

#[test]
fn synastry_and_transits() {
    let svc = service();
    let other = ChartRequest::new("1995-04-10T18:20:00-05:00", 40.71, -74.0);
    let syn = svc.synastry(&greenwich(), &other).unwrap();
    assert!(!syn.aspects.is_empty());
    assert!(syn.aspects.iter().all(|a| syn.first.body(&a.first).is_some() || a.first == "Ascendant" || a.first == "Midheaven"));

    let tr = svc
        .transits(&TransitRequest {
            natal: greenwich(),
            timestamp: "2024-04-08T18:00:00Z".into(),
            timezone: None,
        })
        .unwrap();
    assert!(tr.aspects.iter().all(|a| Body::ALL.iter().any(|b| b.name() == a.first)));
}

#[test]
fn rectification_from_json() {
    let input = RectificationInput::from_json(
        r#"{
            "chart": {"timestamp": "1985-03-14T10:30:00", "timezone": "+01:00", "latitude": 48.8566, "longitude": 2.3522},
            "events": [
                {"date": "2009-07-04T16:00:00", "type": "MARRIAGE", "description": "wedding"},
                {"date": "2016-10-01T02:00:00", "type": "CAREER_CHANGE"}
            ],
            "window": {"start": "1985-03-14T09:30:00", "end": "1985-03-14T11:30:00"},
            "method": "HARMONIC"
        }"#,
    )
    .unwrap();
    let svc = service();
    let a = svc.rectify(&input).unwrap();
    let b = svc.rectify(&input).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.method, RectificationMethod::Harmonic);
    assert_eq!(a.event_matches.len(), 2);
    assert!((0.0..=1.0).contains(&a.confidence));
    assert_eq!(a.candidates_total, 61);
}

#[test]
fn rectification_rejects_unknown_event_type() {
    let eph = Arc::new(InstrumentedEphemeris::new(AnalyticEphemeris::default()));
    let svc = ChartService::new(eph.clone(), NatalConfig::default()).unwrap();
    let input = RectificationInput::from_json(
        r#"{
            "chart": {"timestamp": "1985-03-14T10:30:00+01:00", "latitude": 48.8566, "longitude": 2.3522},
            "events": [{"date": "2009-07-04T16:00:00+02:00", "type": "LOTTERY_WIN"}]
        }"#,
    )
    .unwrap();
    let err = svc.rectify(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(eph.stats().body_queries, 0);
}

#[test]
fn concurrent_requests_share_one_service() {
    let svc = service();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let svc = svc.clone();
            thread::spawn(move || {
                let req = ChartRequest::new(format!("2000-01-0{}T12:00:00Z", i + 1), 51.4779, 0.0);
                svc.calculate_chart(&req)
            })
        })
        .collect();
    let charts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    assert_eq!(charts[0], svc.calculate_chart(&greenwich()).unwrap());
    assert!(charts.windows(2).all(|w| w[0].moment < w[1].moment));
}

#[test]
fn results_serialize_to_json() {
    let data = service().calculate_chart(&greenwich()).unwrap();
    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["houses"]["applied"], "PLACIDUS");
    assert_eq!(json["houses"]["cusps"].as_array().unwrap().len(), 12);
}
