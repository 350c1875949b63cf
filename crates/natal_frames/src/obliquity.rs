//! Obliquity of the ecliptic.
//!
//! Mean obliquity: IAU 2006 (Hilton et al. 2006), as tabulated in
//! IERS Conventions 2010, Eq. 5.40. Public domain (IAU standard).

/// Mean obliquity at J2000.0 in arcseconds.
pub const OBLIQUITY_J2000_ARCSEC: f64 = 84_381.406;

/// Mean obliquity at J2000.0 in degrees.
pub const OBLIQUITY_J2000_DEG: f64 = OBLIQUITY_J2000_ARCSEC / 3600.0;

/// IAU 2006 mean obliquity in arcseconds.
///
/// `t` = Julian centuries of TT since J2000.0.
///
/// ε_A = 84381.406″ − 46.836769″T − 0.0001831″T² + 0.00200340″T³
///       − 0.000000576″T⁴ − 0.0000000434″T⁵
pub fn mean_obliquity_arcsec(t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;
    OBLIQUITY_J2000_ARCSEC - 46.836769 * t - 0.0001831 * t2 + 0.00200340 * t3
        - 0.000000576 * t4
        - 0.0000000434 * t5
}

/// IAU 2006 mean obliquity in degrees.
pub fn mean_obliquity_deg(t: f64) -> f64 {
    mean_obliquity_arcsec(t) / 3600.0
}

/// True obliquity ε = ε_A + Δε, with Δε in arcseconds.
pub fn true_obliquity_deg(t: f64, deps_arcsec: f64) -> f64 {
    (mean_obliquity_arcsec(t) + deps_arcsec) / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_at_j2000() {
        assert!((mean_obliquity_deg(0.0) - 23.439_279_444).abs() < 1e-8);
    }

    #[test]
    fn decreasing_over_the_present_era() {
        assert!(mean_obliquity_deg(0.25) < mean_obliquity_deg(0.0));
        // ~47″ per century
        let drop = (mean_obliquity_arcsec(0.0) - mean_obliquity_arcsec(1.0)).abs();
        assert!((drop - 46.8).abs() < 0.1);
    }

    #[test]
    fn true_obliquity_adds_nutation() {
        let t = 0.24;
        assert!((true_obliquity_deg(t, 3.6) - mean_obliquity_deg(t) - 0.001).abs() < 1e-12);
    }
}
