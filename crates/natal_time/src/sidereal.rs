//! Greenwich Mean Sidereal Time and Earth Rotation Angle.
//!
//! All functions take UT1 Julian Days. Charts are cast from civil UTC,
//! which is used as UT1 directly: |UT1 − UTC| stays below 0.9 s, about
//! 0.004° of sidereal rotation.
//!
//! Sources:
//! - ERA: IERS Conventions 2010, Eq. 5.15. Public domain.
//! - GMST polynomial: Capitaine et al. 2003, Table 2. Public domain.

use chrono::{DateTime, Utc};

use crate::julian::{JulianDay, datetime_to_julian_day};

/// Arcseconds per degree.
const ARCSEC_PER_DEG: f64 = 3600.0;

/// Earth Rotation Angle at a given UT1 Julian Day, in degrees [0, 360).
///
/// θ = 2π × (0.7790572732640 + 1.00273781191135448 × Du)
/// where Du = JD_UT1 − 2451545.0.
///
/// The integer part of Du contributes whole turns only, so it is dropped
/// before multiplying to keep the fractional day at full precision.
pub fn earth_rotation_angle_deg(jd_ut1: JulianDay) -> f64 {
    let du = jd_ut1.days_since_j2000();
    let turns = jd_ut1.fraction() + 0.779_057_273_264_0 + 0.002_737_811_911_354_48 * du;
    (turns.rem_euclid(1.0) * 360.0).rem_euclid(360.0)
}

/// Greenwich Mean Sidereal Time at a given UT1 Julian Day, in degrees [0, 360).
///
/// GMST = ERA + polynomial(T), where T = Julian centuries of UT1 from J2000.0.
///
/// Polynomial (arcseconds):
///   0.014506 + 4612.156534·T + 1.3915817·T² − 0.00000044·T³
///   − 0.000029956·T⁴ − 0.0000000368·T⁵
pub fn gmst_deg(jd_ut1: JulianDay) -> f64 {
    let era = earth_rotation_angle_deg(jd_ut1);
    let t = jd_ut1.centuries_since_j2000();
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let poly_arcsec = 0.014506 + 4612.156534 * t + 1.3915817 * t2
        - 0.00000044 * t3
        - 0.000029956 * t4
        - 0.0000000368 * t5;

    (era + poly_arcsec / ARCSEC_PER_DEG).rem_euclid(360.0)
}

/// Local Sidereal Time from GMST and observer east longitude, in degrees [0, 360).
pub fn local_sidereal_time_deg(gmst: f64, longitude_east_deg: f64) -> f64 {
    (gmst + longitude_east_deg).rem_euclid(360.0)
}

/// GMST in degrees for a UTC instant.
pub fn calculate_gmst(dt: &DateTime<Utc>) -> f64 {
    gmst_deg(datetime_to_julian_day(dt))
}

/// LST in degrees for a UTC instant and east longitude in degrees.
///
/// `calculate_lst(dt, 0.0) == calculate_gmst(dt)`.
pub fn calculate_lst(dt: &DateTime<Utc>, longitude_east_deg: f64) -> f64 {
    local_sidereal_time_deg(calculate_gmst(dt), longitude_east_deg)
}

/// Convert sidereal degrees to hours.
pub fn degrees_to_hours(deg: f64) -> f64 {
    deg / 15.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jd(v: f64) -> JulianDay {
        JulianDay::from_f64(v).unwrap()
    }

    #[test]
    fn era_at_j2000_noon() {
        // At J2000.0 (JD 2451545.0), ERA ≈ 280.46°
        let theta = earth_rotation_angle_deg(JulianDay::J2000);
        assert!(
            (theta - 280.46).abs() < 0.1,
            "ERA at J2000 = {theta}°, expected ~280.46°"
        );
    }

    #[test]
    fn gmst_j2000_midnight() {
        // At 2000-Jan-01 0h UT1, GMST ≈ 6h 39m 51.170s ≈ 99.963°
        let g = gmst_deg(jd(2_451_544.5));
        assert!(
            (g - 99.964).abs() < 0.01,
            "GMST at J2000 midnight = {g}°, expected ~99.964°"
        );
    }

    #[test]
    fn gmst_advances_about_a_degree_per_day() {
        let g1 = gmst_deg(jd(2_451_545.0));
        let g2 = gmst_deg(jd(2_451_546.0));
        let step = (g2 - g1).rem_euclid(360.0);
        assert!((step - 0.9856).abs() < 0.001, "daily GMST step = {step}°");
    }

    #[test]
    fn lst_at_greenwich_equals_gmst() {
        let dt = Utc.with_ymd_and_hms(1990, 5, 17, 4, 12, 9).unwrap();
        assert_eq!(calculate_lst(&dt, 0.0), calculate_gmst(&dt));
    }

    #[test]
    fn mirrored_longitudes_differ_by_twelve_hours() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let diff = (calculate_lst(&dt, 90.0) - calculate_lst(&dt, -90.0)).rem_euclid(360.0);
        assert!((degrees_to_hours(diff) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn gmst_range() {
        for &v in &[2_451_545.0, 2_451_544.5, 2_460_000.5, 2_440_000.5] {
            let g = gmst_deg(jd(v));
            assert!((0.0..360.0).contains(&g), "GMST out of range: {g}");
        }
    }
}
