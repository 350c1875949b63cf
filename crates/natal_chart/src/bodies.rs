//! Chart bodies: planets, lunar nodes, fixed stars and asteroids.

use natal_core::{Body, Ephemeris};
use natal_frames::{CoordinateSystem, Position, normalize_pm180, precess_longitude_from_j2000};
use natal_time::JulianDay;
use serde::{Deserialize, Serialize};

use crate::aspect_types::ChartPoint;
use crate::error::ChartError;
use crate::nodes::{NodeKind, NodeMode, lunar_node_deg};

/// Half-width of the central difference used for node and star speeds.
const SPEED_STEP_DAYS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Planet(Body),
    LunarNode { node: NodeKind, mode: NodeMode },
    FixedStar { magnitude: f64 },
    Asteroid { orbital_period_years: f64 },
}

/// A body placed in a chart, in geocentric apparent ecliptic coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    pub name: String,
    pub kind: BodyKind,
    pub position: Position,
    /// Longitude rate in degrees per day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    pub retrograde: bool,
}

impl CelestialBody {
    pub fn new(name: impl Into<String>, kind: BodyKind, position: Position, speed: Option<f64>) -> Self {
        Self {
            name: name.into(),
            kind,
            position,
            speed,
            retrograde: speed.is_some_and(|s| s < 0.0),
        }
    }

    /// Planet state from the ephemeris.
    pub fn planet(eph: &dyn Ephemeris, body: Body, jd_tt: JulianDay) -> Result<Self, ChartError> {
        let state = eph.body_state(body, jd_tt)?;
        let position = Position::new(
            state.longitude_deg,
            state.latitude_deg,
            Some(state.distance_au),
            CoordinateSystem::Ecliptic,
        )?;
        Ok(Self::new(body.name(), BodyKind::Planet(body), position, Some(state.longitude_speed)))
    }

    /// Lunar node at `jd_tt`, shifted by `dpsi_deg` to the true equinox.
    pub fn lunar_node(node: NodeKind, mode: NodeMode, jd_tt: JulianDay, dpsi_deg: f64) -> Result<Self, ChartError> {
        let at = |days: f64| {
            let t = (jd_tt.days_since_j2000() + days) / natal_time::DAYS_PER_CENTURY;
            lunar_node_deg(node, mode, t)
        };
        let speed = normalize_pm180(at(SPEED_STEP_DAYS) - at(-SPEED_STEP_DAYS)) / (2.0 * SPEED_STEP_DAYS);
        let position = Position::ecliptic(at(0.0) + dpsi_deg, 0.0)?;
        Ok(Self::new(node.name(), BodyKind::LunarNode { node, mode }, position, Some(speed)))
    }

    /// Catalogue star carried from J2000 to the equinox of date.
    pub fn fixed_star(star: &FixedStar, jd_tt: JulianDay, dpsi_deg: f64) -> Result<Self, ChartError> {
        let t = jd_tt.centuries_since_j2000();
        let lon = precess_longitude_from_j2000(star.longitude_j2000, t) + dpsi_deg;
        let position = Position::ecliptic(lon, star.latitude_j2000)?;
        // General precession, about 50.3″ per year.
        let speed = natal_frames::general_precession_longitude_deg(1.0) / natal_time::DAYS_PER_CENTURY;
        Ok(Self::new(
            star.name,
            BodyKind::FixedStar {
                magnitude: star.magnitude,
            },
            position,
            Some(speed),
        ))
    }

    /// Caller-supplied minor body.
    pub fn asteroid(
        name: impl Into<String>,
        position: Position,
        speed: Option<f64>,
        orbital_period_years: f64,
    ) -> Result<Self, ChartError> {
        if position.coordinate_system() != CoordinateSystem::Ecliptic {
            return Err(ChartError::Validation("asteroid position must be ECLIPTIC".into()));
        }
        if !(orbital_period_years.is_finite() && orbital_period_years > 0.0) {
            return Err(ChartError::Validation(format!(
                "orbital period {orbital_period_years} must be positive"
            )));
        }
        if speed.is_some_and(|s| !s.is_finite()) {
            return Err(ChartError::Validation("asteroid speed must be finite".into()));
        }
        Ok(Self::new(
            name,
            BodyKind::Asteroid { orbital_period_years },
            position,
            speed,
        ))
    }

    pub fn longitude(&self) -> f64 {
        self.position.longitude()
    }

    pub fn to_point(&self) -> ChartPoint {
        ChartPoint::new(self.name.clone(), self.position, self.speed)
    }
}

/// A catalogue star in J2000 ecliptic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStar {
    pub name: &'static str,
    pub longitude_j2000: f64,
    pub latitude_j2000: f64,
    pub magnitude: f64,
}

/// Bright stars most often used in chart work.
pub const FIXED_STARS: [FixedStar; 7] = [
    FixedStar { name: "Algol", longitude_j2000: 56.167, latitude_j2000: 22.430, magnitude: 2.12 },
    FixedStar { name: "Aldebaran", longitude_j2000: 69.789, latitude_j2000: -5.467, magnitude: 0.85 },
    FixedStar { name: "Sirius", longitude_j2000: 104.083, latitude_j2000: -39.605, magnitude: -1.46 },
    FixedStar { name: "Regulus", longitude_j2000: 149.829, latitude_j2000: 0.465, magnitude: 1.35 },
    FixedStar { name: "Spica", longitude_j2000: 203.841, latitude_j2000: -2.054, magnitude: 0.97 },
    FixedStar { name: "Antares", longitude_j2000: 249.757, latitude_j2000: -4.569, magnitude: 1.06 },
    FixedStar { name: "Fomalhaut", longitude_j2000: 333.869, latitude_j2000: -21.134, magnitude: 1.16 },
];

/// Case-insensitive catalogue lookup.
pub fn find_fixed_star(name: &str) -> Result<&'static FixedStar, ChartError> {
    FIXED_STARS
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| ChartError::Validation(format!("unknown fixed star: {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use natal_core::{LinearMotion, TableEphemeris};

    #[test]
    fn retrograde_flag_follows_speed() {
        let eph = TableEphemeris::new(JulianDay::J2000)
            .with_body(Body::Mercury, LinearMotion::new(10.0, -0.3));
        let merc = CelestialBody::planet(&eph, Body::Mercury, JulianDay::J2000).unwrap();
        assert!(merc.retrograde);
        assert_eq!(merc.name, "Mercury");
        assert!((merc.longitude() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn mean_node_moves_backwards() {
        let node = CelestialBody::lunar_node(NodeKind::North, NodeMode::Mean, JulianDay::J2000, 0.0).unwrap();
        let speed = node.speed.unwrap();
        assert!((speed + 0.05295).abs() < 1e-4, "speed = {speed}");
        assert!(node.retrograde);
    }

    #[test]
    fn regulus_crossed_into_virgo_around_2012() {
        let star = find_fixed_star("regulus").unwrap();
        let jd = JulianDay::from_f64(natal_time::calendar_to_jd(2012, 1, 1.0)).unwrap();
        let lon = CelestialBody::fixed_star(star, jd, 0.0).unwrap().longitude();
        assert!((lon - 150.0).abs() < 0.05, "Regulus = {lon}");
    }

    #[test]
    fn unknown_star_is_validation() {
        assert_eq!(find_fixed_star("Vega").unwrap_err().kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn asteroid_requires_positive_period() {
        let pos = Position::ecliptic(10.0, 1.0).unwrap();
        assert!(CelestialBody::asteroid("Ceres", pos, Some(0.2), 4.6).is_ok());
        assert!(CelestialBody::asteroid("Ceres", pos, Some(0.2), 0.0).is_err());
        let geo = Position::geographic(10.0, 1.0).unwrap();
        assert!(CelestialBody::asteroid("Ceres", geo, None, 4.6).is_err());
    }
}
