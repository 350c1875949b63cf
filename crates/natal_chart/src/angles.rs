//! Ascendant, Midheaven and the sidereal frame of a chart.
//!
//! Sources: Meeus, "Astronomical Algorithms" (2nd ed), Chapters 12-13;
//! standard spherical astronomy (Montenbruck & Pfleger).
//!
//! Angles use θ for local apparent sidereal time (RAMC), φ for geographic
//! latitude and ε for the true obliquity of the ecliptic, all in degrees.

use chrono::{DateTime, Utc};
use natal_core::Ephemeris;
use natal_frames::{CoordinateSystem, Nutation, Position, normalize_360};
use natal_time::{JulianDay, calculate_lst, datetime_to_julian_day, jd_tt};
use serde::{Deserialize, Serialize};

use crate::error::ChartError;

/// True obliquity of the ecliptic at `jd_tt`, from the injected ephemeris.
pub fn calculate_obliquity(eph: &dyn Ephemeris, jd_tt: JulianDay) -> Result<f64, ChartError> {
    Ok(eph.obliquity(jd_tt)?)
}

/// Nutation `(Δψ, Δε)` in degrees at `jd_tt`, from the injected ephemeris.
pub fn calculate_nutation(eph: &dyn Ephemeris, jd_tt: JulianDay) -> Result<(f64, f64), ChartError> {
    let n = eph.nutation(jd_tt)?;
    Ok((n.longitude_deg, n.obliquity_deg))
}

/// Ecliptic longitude of the Ascendant in degrees [0, 360).
///
/// `Asc = atan2(cos θ, −(sin θ cos ε + tan φ sin ε))`
///
/// At |φ| ≥ 90 the horizon coincides with the equator and the formula has
/// no solution; the local sidereal time is returned unchanged.
pub fn ascendant_deg(lst_deg: f64, latitude_deg: f64, obliquity_deg: f64) -> f64 {
    if latitude_deg.abs() >= 90.0 {
        return normalize_360(lst_deg);
    }
    let theta = lst_deg.to_radians();
    let phi = latitude_deg.to_radians();
    let eps = obliquity_deg.to_radians();
    let asc = f64::atan2(
        theta.cos(),
        -(theta.sin() * eps.cos() + phi.tan() * eps.sin()),
    );
    normalize_360(asc.to_degrees())
}

/// Ecliptic longitude of the Midheaven in degrees [0, 360).
///
/// `MC = atan2(sin θ, cos θ cos ε)`
pub fn mc_deg(lst_deg: f64, obliquity_deg: f64) -> f64 {
    let theta = lst_deg.to_radians();
    let eps = obliquity_deg.to_radians();
    normalize_360(f64::atan2(theta.sin(), theta.cos() * eps.cos()).to_degrees())
}

/// The four chart angles plus the inputs they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartAngles {
    pub ascendant: f64,
    pub mc: f64,
    pub descendant: f64,
    pub ic: f64,
    /// Right ascension of the MC (= local apparent sidereal time).
    pub ramc: f64,
    pub obliquity: f64,
}

impl ChartAngles {
    pub fn from_lst(lst_deg: f64, latitude_deg: f64, obliquity_deg: f64) -> Self {
        let ascendant = ascendant_deg(lst_deg, latitude_deg, obliquity_deg);
        let mc = mc_deg(lst_deg, obliquity_deg);
        Self {
            ascendant,
            mc,
            descendant: normalize_360(ascendant + 180.0),
            ic: normalize_360(mc + 180.0),
            ramc: normalize_360(lst_deg),
            obliquity: obliquity_deg,
        }
    }
}

/// Everything about "when and where" a chart needs before any body lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub jd_ut: JulianDay,
    pub jd_tt: JulianDay,
    /// Local apparent sidereal time in degrees.
    pub lst_deg: f64,
    pub obliquity_deg: f64,
    pub nutation: Nutation,
    pub latitude_deg: f64,
}

impl ChartFrame {
    /// Resolve the sidereal frame for `moment` at a geographic `location`.
    ///
    /// Mean LST from the Earth Rotation Angle is corrected by the equation
    /// of the equinoxes `Δψ cos ε` so it matches the true obliquity.
    pub fn at(
        eph: &dyn Ephemeris,
        moment: &DateTime<Utc>,
        location: &Position,
    ) -> Result<Self, ChartError> {
        require_geographic(location)?;
        let jd_ut = datetime_to_julian_day(moment);
        let jd_tt = jd_tt(moment);
        let nutation = eph.nutation(jd_tt)?;
        let obliquity_deg = eph.obliquity(jd_tt)?;
        let eq_equinoxes = nutation.longitude_deg * obliquity_deg.to_radians().cos();
        let lst_deg = normalize_360(calculate_lst(moment, location.longitude()) + eq_equinoxes);
        Ok(Self {
            jd_ut,
            jd_tt,
            lst_deg,
            obliquity_deg,
            nutation,
            latitude_deg: location.latitude(),
        })
    }

    pub fn angles(&self) -> ChartAngles {
        ChartAngles::from_lst(self.lst_deg, self.latitude_deg, self.obliquity_deg)
    }
}

/// Locations must be GEOGRAPHIC; anything else is a caller mistake.
pub fn require_geographic(location: &Position) -> Result<(), ChartError> {
    if location.coordinate_system() != CoordinateSystem::Geographic {
        return Err(ChartError::Validation(format!(
            "location must be GEOGRAPHIC, got {}",
            location.coordinate_system().name()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use natal_core::{AnalyticEphemeris, TableEphemeris};

    const EPS: f64 = 23.4392911;

    #[test]
    fn equator_at_ramc_zero_rises_cancer() {
        let asc = ascendant_deg(0.0, 0.0, EPS);
        assert!((asc - 90.0).abs() < 1e-9, "asc = {asc}");
        assert!(mc_deg(0.0, EPS).abs() < 1e-9);
    }

    #[test]
    fn mc_follows_ramc_at_cardinal_points() {
        for ramc in [90.0, 180.0, 270.0] {
            let mc = mc_deg(ramc, EPS);
            assert!((mc - ramc).abs() < 1e-9, "ramc {ramc} -> mc {mc}");
        }
    }

    #[test]
    fn ascendant_leads_mc_by_less_than_a_half_circle() {
        for lat in [-60.0, -30.0, 0.0, 30.0, 51.5, 60.0] {
            for step in 0..24 {
                let lst = step as f64 * 15.0;
                let a = ChartAngles::from_lst(lst, lat, EPS);
                let arc = natal_frames::arc_forward(a.mc, a.ascendant);
                assert!(arc > 0.0 && arc < 180.0, "lat {lat} lst {lst}: arc {arc}");
            }
        }
    }

    #[test]
    fn polar_ascendant_is_lst() {
        assert_eq!(ascendant_deg(123.4, 90.0, EPS), 123.4);
        assert_eq!(ascendant_deg(-10.0, -90.0, EPS), 350.0);
    }

    #[test]
    fn ascendant_point_lies_on_eastern_horizon() {
        let (lst, lat) = (200.0, 40.0);
        let asc = ascendant_deg(lst, lat, EPS);
        let p = Position::ecliptic(asc, 0.0).unwrap();
        let h = p.to_equatorial(EPS).unwrap().to_horizontal(lst, lat).unwrap();
        assert!(h.latitude().abs() < 1e-8, "altitude = {}", h.latitude());
        assert!(h.longitude() < 180.0, "azimuth = {}", h.longitude());
    }

    #[test]
    fn frame_rejects_non_geographic_location() {
        let eph = TableEphemeris::new(JulianDay::J2000);
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let loc = Position::ecliptic(10.0, 10.0).unwrap();
        let err = ChartFrame::at(&eph, &dt, &loc).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn frame_uses_apparent_sidereal_time() {
        let eph = AnalyticEphemeris::default();
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let loc = Position::geographic(0.0, 0.0).unwrap();
        let frame = ChartFrame::at(&eph, &dt, &loc).unwrap();
        let mean = calculate_lst(&dt, 0.0);
        let diff = natal_frames::normalize_pm180(frame.lst_deg - mean);
        // Equation of the equinoxes is about -0.9 s of time at J2000.
        assert!(diff.abs() < 0.01 && diff < 0.0, "diff = {diff}");
        assert!((frame.obliquity_deg - 23.4377).abs() < 1e-3);
    }
}
