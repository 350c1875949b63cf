//! IAU 2006 general precession in ecliptic longitude.
//!
//! Used to carry J2000 catalogue longitudes (fixed stars, mean elements)
//! to the equinox of date.
//!
//! Source: Capitaine, Wallace & Chapront 2003, A&A 412, 567-586 (Table 1).
//! Public domain (IAU standard).

use crate::angle::normalize_360;

/// General precession p_A in arcseconds.
///
/// `t` = Julian centuries of TT since J2000.0. Positive for dates after
/// J2000: tropical longitudes of fixed objects increase.
pub fn general_precession_longitude_arcsec(t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;
    5028.796195 * t + 1.1054348 * t2 + 0.00007964 * t3 - 0.000023857 * t4 - 0.0000000383 * t5
}

/// General precession p_A in degrees.
pub fn general_precession_longitude_deg(t: f64) -> f64 {
    general_precession_longitude_arcsec(t) / 3600.0
}

/// Carry a J2000 ecliptic longitude to the mean equinox of date.
///
/// First-order: latitude changes from the ecliptic's own motion
/// (< 0.5″/yr) are ignored.
pub fn precess_longitude_from_j2000(lon_j2000_deg: f64, t: f64) -> f64 {
    normalize_360(lon_j2000_deg + general_precession_longitude_deg(t))
}
