//! Time-scale support for chart casting.
//!
//! This crate provides:
//! - a two-part [`JulianDay`] with exact `DateTime<Utc>` round trips
//! - Greenwich and local sidereal time
//! - ΔT (TT − UT1) with a documented extrapolation policy
//! - UTC ⇄ TAI ⇄ TT conversion over an embedded or LSK-loaded leap table
//! - timezone normalization that refuses zone-less timestamps

pub mod delta_t;
pub mod error;
pub mod julian;
pub mod lsk;
pub mod scales;
pub mod sidereal;
pub mod zone;

use chrono::{DateTime, Utc};

pub use delta_t::{calculate_delta_t, delta_t_for_year, delta_t_seconds};
pub use error::TimeError;
pub use julian::{
    DAYS_PER_CENTURY, J2000_JD, JulianDay, SECONDS_PER_DAY, calendar_to_jd,
    datetime_to_julian_day, decimal_year, jd_to_calendar, julian_day_to_datetime,
};
pub use scales::{LeapSecond, LeapSecondTable, TimeSystem, convert, convert_named};
pub use sidereal::{
    calculate_gmst, calculate_lst, earth_rotation_angle_deg, gmst_deg, local_sidereal_time_deg,
};
pub use zone::{localize, parse_offset, parse_timestamp, parse_with_zone};

/// Julian Day on the TT scale for a UTC instant, via ΔT.
///
/// This is the argument ephemerides and precession/nutation models expect.
pub fn jd_tt(dt: &DateTime<Utc>) -> JulianDay {
    julian::shifted_julian_day(dt, calculate_delta_t(dt))
}
