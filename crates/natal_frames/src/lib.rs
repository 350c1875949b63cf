//! Coordinate model and Earth-orientation helpers.
//!
//! Provides the immutable [`Position`] value, the single shared angle
//! normalization routine, and the obliquity / nutation / precession models
//! the chart engine and the embedded ephemeris build on.

pub mod angle;
pub mod error;
pub mod nutation;
pub mod obliquity;
pub mod position;
pub mod precession;
pub mod spherical;

pub use angle::{angular_separation, arc_forward, normalize_360, normalize_pm180};
pub use error::FrameError;
pub use nutation::{Nutation, fundamental_arguments, nutation_iau2000b};
pub use obliquity::{
    OBLIQUITY_J2000_DEG, mean_obliquity_arcsec, mean_obliquity_deg, true_obliquity_deg,
};
pub use position::{CoordinateSystem, FrameContext, Position};
pub use precession::{
    general_precession_longitude_arcsec, general_precession_longitude_deg,
    precess_longitude_from_j2000,
};
pub use spherical::{
    SphericalCoords, cartesian_to_spherical, rotate_x, rotate_z, spherical_to_cartesian,
};
