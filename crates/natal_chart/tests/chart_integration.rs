//! End-to-end chart computation against the embedded analytic ephemeris.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use natal_chart::{
    AspectEngine, BodySelection, CelestialBody, Chart, HouseConfig, HouseSystem, NodeMode,
    compute_chart, compute_houses, transits,
};
use natal_core::{AnalyticEphemeris, Ephemeris, InstrumentedEphemeris};
use natal_frames::Position;

fn greenwich_noon() -> Chart {
    let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
    Chart::new(dt, Position::geographic(51.4779, 0.0).unwrap()).unwrap()
}

#[test]
fn greenwich_j2000_angles() {
    let data = compute_chart(&AnalyticEphemeris::default(), &greenwich_noon()).unwrap();
    assert!((data.angles.ascendant - 24.29).abs() < 0.1, "asc = {}", data.angles.ascendant);
    assert!((data.angles.mc - 279.61).abs() < 0.1, "mc = {}", data.angles.mc);
    // Shortly before local apparent noon the Sun sits just east of the MC.
    assert_eq!(data.house_of_body("Sun"), Some(10));
}

#[test]
fn all_systems_at_greenwich() {
    let eph = AnalyticEphemeris::default();
    let chart = greenwich_noon();
    for &system in HouseSystem::all() {
        let h = compute_houses(&eph, &chart.moment(), chart.location(), &HouseConfig::with_system(system)).unwrap();
        assert_eq!(h.applied, system);
        if system.is_quadrant() {
            assert!((h.cusp(10) - h.mc).abs() < 1e-9, "{system}");
        }
    }
}

#[test]
fn tromso_placidus_falls_back() {
    let eph = AnalyticEphemeris::default();
    let chart = Chart::new(greenwich_noon().moment(), Position::geographic(69.65, 18.96).unwrap()).unwrap();
    let data = compute_chart(&eph, &chart).unwrap();
    assert_eq!(data.houses.requested, HouseSystem::Placidus);
    assert_eq!(data.houses.applied, HouseSystem::Equal);
}

#[test]
fn bodies_nodes_stars_and_asteroids() {
    let ceres = CelestialBody::asteroid("Ceres", Position::ecliptic(12.0, -3.0).unwrap(), Some(0.25), 4.6).unwrap();
    let chart = greenwich_noon()
        .with_bodies(BodySelection {
            nodes: Some(NodeMode::True),
            fixed_stars: vec!["Regulus".into(), "spica".into()],
            ..BodySelection::default()
        })
        .with_extra_body(ceres);
    let data = compute_chart(&AnalyticEphemeris::default(), &chart).unwrap();
    assert_eq!(data.bodies.len(), 10 + 2 + 2 + 1);
    let regulus = data.body("Regulus").unwrap();
    assert!((regulus.longitude() - 149.83).abs() < 0.02);
    assert!(data.body("Ceres").is_some());
    let moon = data.body("Moon").unwrap();
    assert!(!moon.retrograde);
}

#[test]
fn transits_one_year_later() {
    let eph = AnalyticEphemeris::default();
    let natal = compute_chart(&eph, &greenwich_noon()).unwrap();
    let later = natal.moment + chrono::Duration::days(365);
    let hits = transits(&eph, &natal, &later, &AspectEngine::default()).unwrap();
    // The Sun returns to its own place after a year.
    let solar_return = hits
        .iter()
        .find(|a| a.first == "Sun" && a.second == "Sun")
        .unwrap();
    assert!(solar_return.aspect.orb < 1.0);
}

#[test]
fn parallel_charts_share_one_ephemeris() {
    let eph: Arc<dyn Ephemeris> = Arc::new(AnalyticEphemeris::default());
    let base = greenwich_noon();
    let handles: Vec<_> = (0..4)
        .map(|h| {
            let eph = Arc::clone(&eph);
            let chart = base.at(base.moment() + chrono::Duration::hours(h));
            std::thread::spawn(move || compute_chart(eph.as_ref(), &chart))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    let again = compute_chart(eph.as_ref(), &base.at(base.moment() + chrono::Duration::hours(2))).unwrap();
    assert_eq!(results[2], again);
}

#[test]
fn invalid_house_config_makes_no_lookups() {
    let eph = InstrumentedEphemeris::new(AnalyticEphemeris::default());
    let chart = greenwich_noon().with_houses(HouseConfig {
        max_iterations: 0,
        ..HouseConfig::default()
    });
    assert!(compute_chart(&eph, &chart).is_err());
    assert_eq!(eph.stats().body_queries, 0);
    assert_eq!(eph.stats().orientation_queries, 0);
}
