//! Cartesian ↔ spherical conversion and axis rotation.

use std::f64::consts::TAU;

/// Spherical coordinates: longitude, latitude, distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCoords {
    /// Longitude in degrees, range [0, 360).
    /// Measured in the x-y plane from +x toward +y.
    pub lon_deg: f64,
    /// Latitude in degrees, range [-90, 90].
    pub lat_deg: f64,
    /// Distance from origin, same unit as the Cartesian input.
    pub distance: f64,
}

/// Convert Cartesian `[x, y, z]` to spherical coordinates.
pub fn cartesian_to_spherical(xyz: &[f64; 3]) -> SphericalCoords {
    let [x, y, z] = *xyz;
    let r = (x * x + y * y + z * z).sqrt();

    if r == 0.0 {
        return SphericalCoords {
            lon_deg: 0.0,
            lat_deg: 0.0,
            distance: 0.0,
        };
    }

    let lon = y.atan2(x).rem_euclid(TAU);
    let lat = (z / r).clamp(-1.0, 1.0).asin();

    SphericalCoords {
        lon_deg: lon.to_degrees() % 360.0,
        lat_deg: lat.to_degrees(),
        distance: r,
    }
}

/// Convert spherical coordinates back to Cartesian `[x, y, z]`.
pub fn spherical_to_cartesian(s: &SphericalCoords) -> [f64; 3] {
    let lon_rad = s.lon_deg.to_radians();
    let lat_rad = s.lat_deg.to_radians();
    let cos_lat = lat_rad.cos();
    [
        s.distance * cos_lat * lon_rad.cos(),
        s.distance * cos_lat * lon_rad.sin(),
        s.distance * lat_rad.sin(),
    ]
}

/// Rotate a vector by `angle_rad` about the +x axis (right-handed).
///
/// With `angle_rad` = ε this takes ecliptic vectors to the equatorial frame.
pub fn rotate_x(v: &[f64; 3], angle_rad: f64) -> [f64; 3] {
    let (s, c) = angle_rad.sin_cos();
    [v[0], c * v[1] - s * v[2], s * v[1] + c * v[2]]
}

/// Rotate a vector by `angle_rad` about the +z axis (right-handed).
pub fn rotate_z(v: &[f64; 3], angle_rad: f64) -> [f64; 3] {
    let (s, c) = angle_rad.sin_cos();
    [c * v[0] - s * v[1], s * v[0] + c * v[1], v[2]]
}
