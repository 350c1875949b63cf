//! Types for house computation.

use std::fmt;
use std::str::FromStr;

use natal_core::Body;
use natal_frames::{Position, arc_forward};
use serde::{Deserialize, Serialize};

use crate::error::ChartError;

/// Supported house systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HouseSystem {
    /// Time trisection of each body's diurnal and nocturnal semi-arcs.
    #[default]
    Placidus,
    /// Birthplace system: trisected semi-arc of the MC degree.
    Koch,
    /// Equal division of the celestial equator, projected through the horizon poles.
    Regiomontanus,
    /// Ecliptic trisection of each Asc-MC quadrant.
    Porphyry,
    /// 30° houses from the starting point.
    Equal,
    /// Each sign is a house; house 1 is the sign holding the starting point.
    WholeSign,
}

pub const ALL_HOUSE_SYSTEMS: [HouseSystem; 6] = [
    HouseSystem::Placidus,
    HouseSystem::Koch,
    HouseSystem::Regiomontanus,
    HouseSystem::Porphyry,
    HouseSystem::Equal,
    HouseSystem::WholeSign,
];

impl HouseSystem {
    pub const fn all() -> &'static [HouseSystem] {
        &ALL_HOUSE_SYSTEMS
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Placidus => "PLACIDUS",
            Self::Koch => "KOCH",
            Self::Regiomontanus => "REGIOMONTANUS",
            Self::Porphyry => "PORPHYRY",
            Self::Equal => "EQUAL",
            Self::WholeSign => "WHOLE_SIGN",
        }
    }

    /// Quadrant systems anchor cusps 1 and 10 on the Ascendant and MC and
    /// depend on latitude; they are the ones that can degenerate.
    pub const fn is_quadrant(self) -> bool {
        matches!(
            self,
            Self::Placidus | Self::Koch | Self::Regiomontanus | Self::Porphyry
        )
    }
}

impl fmt::Display for HouseSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HouseSystem {
    type Err = ChartError;

    /// Case-insensitive; `_`, `-` and spaces are ignored ("whole-sign").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        ALL_HOUSE_SYSTEMS
            .iter()
            .copied()
            .find(|sys| sys.name().replace('_', "") == key)
            .ok_or_else(|| ChartError::Validation(format!("unknown house system: {s}")))
    }
}

/// Where Equal and Whole-Sign houses begin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseStartingPoint {
    #[default]
    Ascendant,
    /// A body's ecliptic longitude, e.g. the Sun for solar houses.
    BodyLongitude(Body),
    /// A fixed ecliptic degree.
    CustomDeg(f64),
}

/// House computation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HouseConfig {
    pub system: HouseSystem,
    /// Only consulted by Equal and Whole-Sign.
    pub starting_point: HouseStartingPoint,
    /// Iteration budget for Placidus cusps.
    pub max_iterations: u32,
    /// Placidus convergence threshold in degrees of right ascension.
    pub tolerance_deg: f64,
}

impl Default for HouseConfig {
    fn default() -> Self {
        Self {
            system: HouseSystem::Placidus,
            starting_point: HouseStartingPoint::Ascendant,
            max_iterations: 100,
            tolerance_deg: 1e-10,
        }
    }
}

impl HouseConfig {
    pub fn with_system(system: HouseSystem) -> Self {
        Self {
            system,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if self.max_iterations == 0 {
            return Err(ChartError::InvalidConfig("max_iterations must be > 0"));
        }
        if !(self.tolerance_deg.is_finite() && self.tolerance_deg > 0.0) {
            return Err(ChartError::InvalidConfig("tolerance_deg must be positive"));
        }
        if let HouseStartingPoint::CustomDeg(d) = self.starting_point {
            if !d.is_finite() {
                return Err(ChartError::InvalidConfig("custom starting degree must be finite"));
            }
        }
        Ok(())
    }
}

/// Twelve house cusps on the ecliptic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseSet {
    /// System the caller asked for.
    pub requested: HouseSystem,
    /// System actually used. Differs from `requested` only when a
    /// quadrant system degenerated and Equal houses were substituted.
    pub applied: HouseSystem,
    /// Cusps 1..=12 in increasing circular order.
    pub cusps: [Position; 12],
    pub ascendant: f64,
    pub mc: f64,
}

impl HouseSet {
    /// Longitude of cusp `number` (1-based). Out-of-range numbers wrap.
    pub fn cusp(&self, number: u8) -> f64 {
        let idx = (usize::from(number).max(1) - 1) % 12;
        self.cusps[idx].longitude()
    }

    pub fn longitudes(&self) -> [f64; 12] {
        self.cusps.map(|c| c.longitude())
    }

    pub fn fell_back(&self) -> bool {
        self.requested != self.applied
    }

    /// House (1..=12) containing an ecliptic longitude.
    pub fn house_of(&self, longitude_deg: f64) -> u8 {
        house_of(longitude_deg, self)
    }
}

/// House (1..=12) containing an ecliptic longitude.
///
/// A cusp belongs to the house it opens.
pub fn house_of(longitude_deg: f64, houses: &HouseSet) -> u8 {
    let lons = houses.longitudes();
    for i in 0..12 {
        let width = arc_forward(lons[i], lons[(i + 1) % 12]);
        if arc_forward(lons[i], longitude_deg) < width {
            return i as u8 + 1;
        }
    }
    // Unreachable for ordered cusps; the last house closes the circle.
    12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_house_system_names() {
        assert_eq!("placidus".parse::<HouseSystem>().unwrap(), HouseSystem::Placidus);
        assert_eq!("WHOLE_SIGN".parse::<HouseSystem>().unwrap(), HouseSystem::WholeSign);
        assert_eq!("whole-sign".parse::<HouseSystem>().unwrap(), HouseSystem::WholeSign);
        assert_eq!("Regiomontanus".parse::<HouseSystem>().unwrap(), HouseSystem::Regiomontanus);
    }

    #[test]
    fn unknown_house_system_is_validation() {
        let err = "Topocentric".parse::<HouseSystem>().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(HouseConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_iterations_rejected() {
        let cfg = HouseConfig {
            max_iterations: 0,
            ..HouseConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn house_config_deserializes_with_defaults() {
        let cfg: HouseConfig = serde_json::from_str(r#"{"system":"KOCH"}"#).unwrap();
        assert_eq!(cfg.system, HouseSystem::Koch);
        assert_eq!(cfg.max_iterations, 100);
        let cfg: HouseConfig =
            serde_json::from_str(r#"{"system":"EQUAL","starting_point":{"body_longitude":"sun"}}"#)
                .unwrap();
        assert_eq!(cfg.starting_point, HouseStartingPoint::BodyLongitude(Body::Sun));
    }

    #[test]
    fn quadrant_flags() {
        let quadrant: Vec<_> = HouseSystem::all()
            .iter()
            .filter(|s| s.is_quadrant())
            .collect();
        assert_eq!(quadrant.len(), 4);
        assert!(!HouseSystem::WholeSign.is_quadrant());
    }
}
