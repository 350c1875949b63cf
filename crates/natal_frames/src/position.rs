//! Immutable celestial/terrestrial coordinate value.
//!
//! A [`Position`] always holds a longitude in [0, 360), a latitude in
//! [-90, 90] and an optional non-negative distance. The meaning of the two
//! angles depends on the [`CoordinateSystem`]:
//!
//! | system     | longitude            | latitude    |
//! |------------|----------------------|-------------|
//! | Ecliptic   | ecliptic longitude λ | latitude β  |
//! | Equatorial | right ascension α    | declination δ |
//! | Geographic | east longitude       | latitude φ  |
//! | Horizontal | azimuth (N → E)      | altitude    |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::angle::{normalize_360, normalize_pm180};
use crate::error::FrameError;
use crate::spherical::{SphericalCoords, cartesian_to_spherical, rotate_x, spherical_to_cartesian};

/// Reference frame a [`Position`] is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoordinateSystem {
    Ecliptic,
    Equatorial,
    Geographic,
    Horizontal,
}

impl CoordinateSystem {
    pub const ALL: [Self; 4] = [
        Self::Ecliptic,
        Self::Equatorial,
        Self::Geographic,
        Self::Horizontal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ecliptic => "ECLIPTIC",
            Self::Equatorial => "EQUATORIAL",
            Self::Geographic => "GEOGRAPHIC",
            Self::Horizontal => "HORIZONTAL",
        }
    }
}

impl FromStr for CoordinateSystem {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FrameError::UnknownCoordinateSystem(s.to_string()))
    }
}

/// Parameters needed to move between celestial frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Obliquity of the ecliptic in degrees (ecliptic ⇄ equatorial).
    pub obliquity_deg: f64,
    /// Local sidereal time in degrees (equatorial ⇄ horizontal).
    pub lst_deg: f64,
    /// Observer geographic latitude in degrees (equatorial ⇄ horizontal).
    pub observer_latitude_deg: f64,
}

/// An immutable, validated coordinate pair with optional distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPosition", into = "RawPosition")]
pub struct Position {
    longitude: f64,
    latitude: f64,
    distance: Option<f64>,
    system: CoordinateSystem,
}

/// Unvalidated wire shape of a [`Position`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawPosition {
    longitude: f64,
    latitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distance: Option<f64>,
    coordinate_system: CoordinateSystem,
}

impl TryFrom<RawPosition> for Position {
    type Error = FrameError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.longitude, raw.latitude, raw.distance, raw.coordinate_system)
    }
}

impl From<Position> for RawPosition {
    fn from(p: Position) -> Self {
        Self {
            longitude: p.longitude,
            latitude: p.latitude,
            distance: p.distance,
            coordinate_system: p.system,
        }
    }
}

impl Position {
    /// Validate and normalize.
    ///
    /// Longitude wraps into [0, 360); latitude outside [-90, 90], a negative
    /// distance, or any non-finite value is rejected.
    pub fn new(
        longitude: f64,
        latitude: f64,
        distance: Option<f64>,
        system: CoordinateSystem,
    ) -> Result<Self, FrameError> {
        if !longitude.is_finite() {
            return Err(FrameError::NonFinite { field: "longitude" });
        }
        if !latitude.is_finite() {
            return Err(FrameError::NonFinite { field: "latitude" });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(FrameError::InvalidLatitude(latitude));
        }
        if let Some(d) = distance {
            if !d.is_finite() {
                return Err(FrameError::NonFinite { field: "distance" });
            }
            if d < 0.0 {
                return Err(FrameError::InvalidDistance(d));
            }
        }
        Ok(Self {
            longitude: normalize_360(longitude),
            latitude,
            distance,
            system,
        })
    }

    /// Ecliptic position without distance.
    pub fn ecliptic(longitude: f64, latitude: f64) -> Result<Self, FrameError> {
        Self::new(longitude, latitude, None, CoordinateSystem::Ecliptic)
    }

    /// Geographic location. Argument order follows the usual lat/lon convention.
    pub fn geographic(latitude: f64, longitude: f64) -> Result<Self, FrameError> {
        Self::new(longitude, latitude, None, CoordinateSystem::Geographic)
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Longitude in (-180, 180], handy for east/west geographic display.
    pub fn signed_longitude(&self) -> f64 {
        normalize_pm180(self.longitude)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.system
    }

    /// Copy with a different longitude (normalized).
    pub fn with_longitude(&self, longitude: f64) -> Result<Self, FrameError> {
        Self::new(longitude, self.latitude, self.distance, self.system)
    }

    /// Copy with a different latitude (validated).
    pub fn with_latitude(&self, latitude: f64) -> Result<Self, FrameError> {
        Self::new(self.longitude, latitude, self.distance, self.system)
    }

    /// Copy with a different distance (validated).
    pub fn with_distance(&self, distance: Option<f64>) -> Result<Self, FrameError> {
        Self::new(self.longitude, self.latitude, distance, self.system)
    }

    /// Copy advanced along the longitude axis by `delta` degrees.
    pub fn rotated_by(&self, delta: f64) -> Self {
        Self {
            longitude: normalize_360(self.longitude + delta),
            ..*self
        }
    }

    /// Ecliptic → equatorial (RA/Dec) for a given obliquity.
    pub fn to_equatorial(&self, obliquity_deg: f64) -> Result<Self, FrameError> {
        match self.system {
            CoordinateSystem::Equatorial => Ok(*self),
            CoordinateSystem::Ecliptic => self.rotate(obliquity_deg, CoordinateSystem::Equatorial),
            from => Err(FrameError::UnsupportedConversion {
                from,
                to: CoordinateSystem::Equatorial,
            }),
        }
    }

    /// Equatorial (RA/Dec) → ecliptic for a given obliquity.
    pub fn to_ecliptic(&self, obliquity_deg: f64) -> Result<Self, FrameError> {
        match self.system {
            CoordinateSystem::Ecliptic => Ok(*self),
            CoordinateSystem::Equatorial => self.rotate(-obliquity_deg, CoordinateSystem::Ecliptic),
            from => Err(FrameError::UnsupportedConversion {
                from,
                to: CoordinateSystem::Ecliptic,
            }),
        }
    }

    /// Equatorial → horizontal (azimuth from north through east, altitude).
    pub fn to_horizontal(&self, lst_deg: f64, observer_lat_deg: f64) -> Result<Self, FrameError> {
        if self.system != CoordinateSystem::Equatorial {
            return Err(FrameError::UnsupportedConversion {
                from: self.system,
                to: CoordinateSystem::Horizontal,
            });
        }
        let h = (lst_deg - self.longitude).to_radians();
        let dec = self.latitude.to_radians();
        let phi = observer_lat_deg.to_radians();

        let sin_alt = phi.sin() * dec.sin() + phi.cos() * dec.cos() * h.cos();
        let alt = sin_alt.clamp(-1.0, 1.0).asin();
        let az = (-dec.cos() * h.sin()).atan2(dec.sin() * phi.cos() - dec.cos() * h.cos() * phi.sin());

        Self::new(
            az.to_degrees(),
            alt.to_degrees(),
            self.distance,
            CoordinateSystem::Horizontal,
        )
    }

    /// Horizontal → equatorial.
    pub fn from_horizontal(&self, lst_deg: f64, observer_lat_deg: f64) -> Result<Self, FrameError> {
        if self.system != CoordinateSystem::Horizontal {
            return Err(FrameError::UnsupportedConversion {
                from: self.system,
                to: CoordinateSystem::Equatorial,
            });
        }
        let az = self.longitude.to_radians();
        let alt = self.latitude.to_radians();
        let phi = observer_lat_deg.to_radians();

        let sin_dec = phi.sin() * alt.sin() + phi.cos() * alt.cos() * az.cos();
        let dec = sin_dec.clamp(-1.0, 1.0).asin();
        let h = (-az.sin() * alt.cos()).atan2(alt.sin() * phi.cos() - alt.cos() * az.cos() * phi.sin());

        Self::new(
            lst_deg - h.to_degrees(),
            dec.to_degrees(),
            self.distance,
            CoordinateSystem::Equatorial,
        )
    }

    /// Convert to any celestial system, chaining through equatorial when needed.
    ///
    /// Geographic positions do not convert to or from anything else.
    pub fn convert_to(&self, target: CoordinateSystem, ctx: &FrameContext) -> Result<Self, FrameError> {
        use CoordinateSystem::*;

        if self.system == target {
            return Ok(*self);
        }
        let unsupported = FrameError::UnsupportedConversion {
            from: self.system,
            to: target,
        };
        let equatorial = match self.system {
            Geographic => return Err(unsupported),
            Ecliptic => self.to_equatorial(ctx.obliquity_deg)?,
            Equatorial => *self,
            Horizontal => self.from_horizontal(ctx.lst_deg, ctx.observer_latitude_deg)?,
        };
        match target {
            Geographic => Err(unsupported),
            Equatorial => Ok(equatorial),
            Ecliptic => equatorial.to_ecliptic(ctx.obliquity_deg),
            Horizontal => equatorial.to_horizontal(ctx.lst_deg, ctx.observer_latitude_deg),
        }
    }

    /// Rotate about the equinox axis (x) by `angle_deg`.
    fn rotate(&self, angle_deg: f64, system: CoordinateSystem) -> Result<Self, FrameError> {
        let unit = spherical_to_cartesian(&SphericalCoords {
            lon_deg: self.longitude,
            lat_deg: self.latitude,
            distance: 1.0,
        });
        let s = cartesian_to_spherical(&rotate_x(&unit, angle_deg.to_radians()));
        Self::new(s.lon_deg, s.lat_deg.clamp(-90.0, 90.0), self.distance, system)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.6}°, {:+.6}°)",
            self.system.name(),
            self.longitude,
            self.latitude
        )?;
        if let Some(d) = self.distance {
            write!(f, " r={d:.6}")?;
        }
        Ok(())
    }
}
