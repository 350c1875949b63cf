//! Fixed linear-motion ephemeris for deterministic tests and fixtures.

use std::collections::BTreeMap;

use natal_frames::{Nutation, OBLIQUITY_J2000_DEG, normalize_360};
use natal_time::JulianDay;
use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::ephemeris::{BodyState, Ephemeris};
use crate::error::EphemerisError;

/// Uniform motion along the ecliptic from a reference epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearMotion {
    /// Longitude at the table epoch, degrees.
    pub longitude_deg: f64,
    /// Degrees per day.
    pub speed_deg_per_day: f64,
    #[serde(default)]
    pub latitude_deg: f64,
    #[serde(default = "default_distance")]
    pub distance_au: f64,
}

fn default_distance() -> f64 {
    1.0
}

impl LinearMotion {
    pub fn new(longitude_deg: f64, speed_deg_per_day: f64) -> Self {
        Self {
            longitude_deg,
            speed_deg_per_day,
            latitude_deg: 0.0,
            distance_au: 1.0,
        }
    }
}

/// An ephemeris that moves each listed body uniformly from `epoch`.
///
/// Obliquity and nutation are constants, so every query is exact and
/// reproducible. Bodies not in the table are `UnsupportedBody`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEphemeris {
    epoch: JulianDay,
    bodies: BTreeMap<Body, LinearMotion>,
    obliquity_deg: f64,
    nutation: Nutation,
}

impl TableEphemeris {
    pub fn new(epoch: JulianDay) -> Self {
        Self {
            epoch,
            bodies: BTreeMap::new(),
            obliquity_deg: OBLIQUITY_J2000_DEG,
            nutation: Nutation::default(),
        }
    }

    /// Builder-style body insertion.
    pub fn with_body(mut self, body: Body, motion: LinearMotion) -> Self {
        self.bodies.insert(body, motion);
        self
    }

    pub fn with_obliquity(mut self, obliquity_deg: f64) -> Self {
        self.obliquity_deg = obliquity_deg;
        self
    }

    pub fn with_nutation(mut self, nutation: Nutation) -> Self {
        self.nutation = nutation;
        self
    }

    pub fn bodies(&self) -> impl Iterator<Item = Body> + '_ {
        self.bodies.keys().copied()
    }
}

impl Ephemeris for TableEphemeris {
    fn name(&self) -> &str {
        "table"
    }

    fn body_state(&self, body: Body, jd_tt: JulianDay) -> Result<BodyState, EphemerisError> {
        let motion = self
            .bodies
            .get(&body)
            .ok_or(EphemerisError::UnsupportedBody(body))?;
        let days = jd_tt.days_since_j2000() - self.epoch.days_since_j2000();
        Ok(BodyState {
            longitude_deg: normalize_360(motion.longitude_deg + motion.speed_deg_per_day * days),
            latitude_deg: motion.latitude_deg,
            distance_au: motion.distance_au,
            longitude_speed: motion.speed_deg_per_day,
        })
    }

    fn nutation(&self, _jd_tt: JulianDay) -> Result<Nutation, EphemerisError> {
        Ok(self.nutation)
    }

    fn obliquity(&self, _jd_tt: JulianDay) -> Result<f64, EphemerisError> {
        Ok(self.obliquity_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_linearly() {
        let eph = TableEphemeris::new(JulianDay::J2000)
            .with_body(Body::Sun, LinearMotion::new(359.0, 1.0));
        let s = eph
            .body_state(Body::Sun, JulianDay::J2000.add_seconds(2.0 * 86_400.0))
            .unwrap();
        assert!((s.longitude_deg - 1.0).abs() < 1e-9);
        assert_eq!(s.longitude_speed, 1.0);
    }

    #[test]
    fn missing_body() {
        let eph = TableEphemeris::new(JulianDay::J2000);
        assert_eq!(
            eph.body_state(Body::Moon, JulianDay::J2000),
            Err(EphemerisError::UnsupportedBody(Body::Moon))
        );
    }

    #[test]
    fn constant_orientation() {
        let eph = TableEphemeris::new(JulianDay::J2000).with_obliquity(23.5);
        let later = JulianDay::J2000.add_seconds(1.0e8);
        assert_eq!(eph.obliquity(later).unwrap(), 23.5);
        assert_eq!(eph.nutation(later).unwrap(), Nutation::default());
    }
}
