//! Angle normalization shared by every crate in the workspace.

/// Normalize an angle to [0, 360).
///
/// This is the one normalization routine all longitude-like outputs go
/// through. `rem_euclid` can return exactly 360.0 for tiny negative inputs,
/// which is folded back to 0.
pub fn normalize_360(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    if r >= 360.0 { 0.0 } else { r }
}

/// Normalize an angle to (-180, 180].
pub fn normalize_pm180(deg: f64) -> f64 {
    let r = normalize_360(deg);
    if r > 180.0 { r - 360.0 } else { r }
}

/// Shortest angular distance between two longitudes, in [0, 180].
pub fn angular_separation(a: f64, b: f64) -> f64 {
    normalize_pm180(b - a).abs()
}

/// Forward (counter-clockwise) arc from `from` to `to`, in [0, 360).
pub fn arc_forward(from: f64, to: f64) -> f64 {
    normalize_360(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_into_range() {
        assert_eq!(normalize_360(370.0), 10.0);
        assert_eq!(normalize_360(-10.0), 350.0);
        assert_eq!(normalize_360(720.0), 0.0);
        assert!((0.0..360.0).contains(&normalize_360(-1e-300)));
    }

    #[test]
    fn signed_range() {
        assert_eq!(normalize_pm180(190.0), -170.0);
        assert_eq!(normalize_pm180(180.0), 180.0);
        assert_eq!(normalize_pm180(-180.0), 180.0);
    }

    #[test]
    fn separation_across_zero() {
        assert!((angular_separation(350.0, 10.0) - 20.0).abs() < 1e-12);
        assert!((angular_separation(10.0, 350.0) - 20.0).abs() < 1e-12);
        assert!((angular_separation(0.0, 180.0) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn forward_arc() {
        assert!((arc_forward(350.0, 20.0) - 30.0).abs() < 1e-12);
        assert!((arc_forward(20.0, 350.0) - 330.0).abs() < 1e-12);
    }
}
