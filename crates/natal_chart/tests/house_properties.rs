//! Property tests for house ordering and the aspect engine.

use proptest::prelude::*;

use natal_chart::{AspectEngine, HouseConfig, HouseSystem, houses_from_lst};
use natal_frames::{Position, arc_forward};

const EPS: f64 = 23.4392911;

fn quadrant_system() -> impl Strategy<Value = HouseSystem> {
    prop_oneof![
        Just(HouseSystem::Placidus),
        Just(HouseSystem::Koch),
        Just(HouseSystem::Regiomontanus),
        Just(HouseSystem::Porphyry),
    ]
}

fn any_system() -> impl Strategy<Value = HouseSystem> {
    prop_oneof![
        quadrant_system(),
        Just(HouseSystem::Equal),
        Just(HouseSystem::WholeSign),
    ]
}

fn circular_total(lons: &[f64; 12]) -> f64 {
    (0..12).map(|i| arc_forward(lons[i], lons[(i + 1) % 12])).sum()
}

proptest! {
    #[test]
    fn quadrant_houses_ordered_outside_polar_circles(
        system in quadrant_system(),
        lst in 0.0f64..360.0,
        lat in -60.0f64..60.0,
    ) {
        let h = houses_from_lst(lst, lat, EPS, &HouseConfig::with_system(system)).unwrap();
        prop_assert_eq!(h.applied, system);
        let lons = h.longitudes();
        prop_assert!((circular_total(&lons) - 360.0).abs() < 1e-6);
        for (i, c) in h.cusps.iter().enumerate() {
            prop_assert!((0.0..360.0).contains(&c.longitude()), "cusp {} = {}", i + 1, c.longitude());
            prop_assert_eq!(c.coordinate_system(), natal_frames::CoordinateSystem::Ecliptic);
        }
    }

    #[test]
    fn every_latitude_yields_ordered_houses(
        system in any_system(),
        lst in 0.0f64..360.0,
        lat in -90.0f64..=90.0,
    ) {
        let h = houses_from_lst(lst, lat, EPS, &HouseConfig::with_system(system)).unwrap();
        prop_assert!((circular_total(&h.longitudes()) - 360.0).abs() < 1e-6);
        prop_assert!(h.applied == system || h.applied == HouseSystem::Equal);
    }

    #[test]
    fn every_longitude_has_a_house(lst in 0.0f64..360.0, lat in -50.0f64..50.0, lon in 0.0f64..360.0) {
        let h = houses_from_lst(lst, lat, EPS, &HouseConfig::default()).unwrap();
        let n = h.house_of(lon);
        prop_assert!((1..=12).contains(&n));
    }

    #[test]
    fn aspect_detection_is_symmetric(a in 0.0f64..360.0, b in 0.0f64..360.0) {
        let engine = AspectEngine::default();
        let pa = Position::ecliptic(a, 0.0).unwrap();
        let pb = Position::ecliptic(b, 0.0).unwrap();
        let ab = engine.detect(&pa, &pb);
        let ba = engine.detect(&pb, &pa);
        prop_assert_eq!(ab.map(|x| x.kind), ba.map(|x| x.kind));
        if let (Some(x), Some(y)) = (ab, ba) {
            prop_assert!((x.orb - y.orb).abs() < 1e-9);
            prop_assert!((0.0..=1.0).contains(&x.strength));
        }
    }
}
