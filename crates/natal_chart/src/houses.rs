//! House cusp computation for six house systems.
//!
//! Quadrant systems take cusps 1 and 10 from the Ascendant and MC and
//! derive 11, 12, 2 and 3; the remaining cusps are the opposite points.
//! Equal and Whole-Sign houses step 30° from a starting point.
//!
//! Sources: Meeus, "Astronomical Algorithms" (2nd ed), Ch. 13;
//! Holden, "A History of Horoscopic Astrology"; standard spherical
//! astronomy for semi-arcs and poles of houses.
//!
//! Near the poles quadrant systems stop being well defined: ecliptic
//! points become circumpolar once |φ| > 90° − ε, iterations stall, and
//! cusps can fall out of order. In every such case the result is Equal
//! houses from the Ascendant, tagged in [`HouseSet::applied`] and logged
//! at `warn`. It is never an error.

use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use natal_core::Ephemeris;
use natal_frames::{Position, arc_forward, normalize_360, normalize_pm180};

use crate::angles::{ChartAngles, ChartFrame, ascendant_deg};
use crate::error::ChartError;
use crate::house_types::{HouseConfig, HouseSet, HouseStartingPoint, HouseSystem};

/// Why a quadrant system was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Degeneracy {
    Circumpolar,
    NoConvergence,
    OutOfOrder,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circumpolar => f.write_str("circumpolar ecliptic"),
            Self::NoConvergence => f.write_str("cusp iteration did not converge"),
            Self::OutOfOrder => f.write_str("cusps out of order"),
        }
    }
}

/// Compute houses for a moment and geographic location.
///
/// Obliquity and nutation come from `eph`; a body starting point is
/// looked up there as well.
pub fn compute_houses(
    eph: &dyn Ephemeris,
    moment: &DateTime<Utc>,
    location: &Position,
    config: &HouseConfig,
) -> Result<HouseSet, ChartError> {
    config.validate()?;
    let frame = ChartFrame::at(eph, moment, location)?;
    houses_for_frame(eph, &frame, config)
}

/// Compute houses for an already-resolved [`ChartFrame`].
pub fn houses_for_frame(
    eph: &dyn Ephemeris,
    frame: &ChartFrame,
    config: &HouseConfig,
) -> Result<HouseSet, ChartError> {
    let angles = frame.angles();
    let start = match config.starting_point {
        HouseStartingPoint::Ascendant => angles.ascendant,
        HouseStartingPoint::CustomDeg(d) => normalize_360(d),
        HouseStartingPoint::BodyLongitude(body) => eph.body_state(body, frame.jd_tt)?.longitude_deg,
    };
    build(&angles, frame.latitude_deg, config, start)
}

/// Compute houses from local sidereal time, latitude and obliquity alone.
///
/// A body starting point needs an ephemeris and is rejected here; use
/// [`compute_houses`] or [`houses_for_frame`] for solar houses.
pub fn houses_from_lst(
    lst_deg: f64,
    latitude_deg: f64,
    obliquity_deg: f64,
    config: &HouseConfig,
) -> Result<HouseSet, ChartError> {
    config.validate()?;
    if !lst_deg.is_finite() || !obliquity_deg.is_finite() {
        return Err(ChartError::Validation(
            "sidereal time and obliquity must be finite".into(),
        ));
    }
    if !(-90.0..=90.0).contains(&latitude_deg) {
        return Err(ChartError::Validation(format!(
            "latitude {latitude_deg}° is outside [-90, 90]"
        )));
    }
    let angles = ChartAngles::from_lst(lst_deg, latitude_deg, obliquity_deg);
    let start = match config.starting_point {
        HouseStartingPoint::Ascendant => angles.ascendant,
        HouseStartingPoint::CustomDeg(d) => normalize_360(d),
        HouseStartingPoint::BodyLongitude(body) => {
            return Err(ChartError::Validation(format!(
                "starting point {body} needs an ephemeris"
            )));
        }
    };
    build(&angles, latitude_deg, config, start)
}

fn build(
    angles: &ChartAngles,
    latitude_deg: f64,
    config: &HouseConfig,
    start: f64,
) -> Result<HouseSet, ChartError> {
    let requested = config.system;
    let raw = match requested {
        HouseSystem::Equal => Ok(equal_cusps(start)),
        HouseSystem::WholeSign => Ok(equal_cusps((normalize_360(start) / 30.0).floor() * 30.0)),
        HouseSystem::Placidus => {
            placidus(angles, latitude_deg, config).map(|mid| quadrant_cusps(angles, mid))
        }
        HouseSystem::Koch => koch(angles, latitude_deg).map(|mid| quadrant_cusps(angles, mid)),
        HouseSystem::Regiomontanus => {
            regiomontanus(angles, latitude_deg).map(|mid| quadrant_cusps(angles, mid))
        }
        HouseSystem::Porphyry => porphyry(angles).map(|mid| quadrant_cusps(angles, mid)),
    }
    .and_then(check_order);

    let (applied, longitudes) = match raw {
        Ok(lons) => (requested, lons),
        Err(reason) => {
            warn!(
                "{requested} houses degenerate at latitude {latitude_deg:.4}° ({reason}); using EQUAL from the Ascendant"
            );
            (HouseSystem::Equal, equal_cusps(angles.ascendant))
        }
    };
    debug!(
        "houses: requested {requested}, applied {applied}, asc {:.6}°, mc {:.6}°",
        angles.ascendant, angles.mc
    );

    let first = Position::ecliptic(longitudes[0], 0.0)?;
    let mut cusps = [first; 12];
    for (slot, &lon) in cusps.iter_mut().zip(longitudes.iter()).skip(1) {
        *slot = Position::ecliptic(lon, 0.0)?;
    }
    Ok(HouseSet {
        requested,
        applied,
        cusps,
        ascendant: angles.ascendant,
        mc: angles.mc,
    })
}

fn equal_cusps(start: f64) -> [f64; 12] {
    std::array::from_fn(|i| normalize_360(start + 30.0 * i as f64))
}

/// Place intermediate cusps `[11, 12, 2, 3]` and fill in the opposites.
fn quadrant_cusps(angles: &ChartAngles, mid: [f64; 4]) -> [f64; 12] {
    let [c11, c12, c2, c3] = mid.map(normalize_360);
    let mut cusps = [0.0; 12];
    cusps[0] = angles.ascendant;
    cusps[1] = c2;
    cusps[2] = c3;
    cusps[9] = angles.mc;
    cusps[10] = c11;
    cusps[11] = c12;
    for i in [0, 1, 2, 9, 10, 11] {
        cusps[(i + 6) % 12] = normalize_360(cusps[i] + 180.0);
    }
    cusps
}

/// Cusps must run once around the circle with every house non-empty.
fn check_order(cusps: [f64; 12]) -> Result<[f64; 12], Degeneracy> {
    if cusps.iter().any(|c| !c.is_finite()) {
        return Err(Degeneracy::OutOfOrder);
    }
    let mut total = 0.0;
    for i in 0..12 {
        let arc = arc_forward(cusps[i], cusps[(i + 1) % 12]);
        if arc <= 1e-9 {
            return Err(Degeneracy::OutOfOrder);
        }
        total += arc;
    }
    if (total - 360.0).abs() > 1e-6 {
        return Err(Degeneracy::OutOfOrder);
    }
    Ok(cusps)
}

fn is_circumpolar(angles: &ChartAngles, latitude_deg: f64) -> bool {
    latitude_deg.abs() > 90.0 - angles.obliquity || latitude_deg.abs() >= 90.0
}

/// Ecliptic longitude of the point with right ascension `alpha` (radians).
fn ecliptic_from_ra(alpha: f64, eps: f64) -> f64 {
    normalize_360(f64::atan2(alpha.sin(), alpha.cos() * eps.cos()).to_degrees())
}

/// Placidus cusps 11, 12, 2, 3.
///
/// A cusp is the ecliptic point whose right ascension α satisfies
/// `α = θ + a + b·SA(δ(α))`, with `SA = acos(−tan φ tan δ)` the diurnal
/// semi-arc and `tan δ = tan ε sin α`:
/// - 11: a = 0,   b = 1/3
/// - 12: a = 0,   b = 2/3
/// - 2:  a = 60°, b = 2/3
/// - 3:  a = 120°, b = 1/3
///
/// Solved by Newton's method on `f(α) = θ + a + b·SA − α`.
fn placidus(angles: &ChartAngles, latitude_deg: f64, config: &HouseConfig) -> Result<[f64; 4], Degeneracy> {
    if is_circumpolar(angles, latitude_deg) {
        return Err(Degeneracy::Circumpolar);
    }
    let theta = angles.ramc.to_radians();
    let phi = latitude_deg.to_radians();
    let eps = angles.obliquity.to_radians();
    let tol = config.tolerance_deg.to_radians();

    let solve = |offset_deg: f64, fraction: f64| -> Result<f64, Degeneracy> {
        let base = theta + offset_deg.to_radians();
        let mut alpha = base + fraction * std::f64::consts::FRAC_PI_2;
        for _ in 0..config.max_iterations {
            let u = eps.tan() * alpha.sin();
            let delta = u.atan();
            let x = -phi.tan() * delta.tan();
            if x.abs() >= 1.0 {
                return Err(Degeneracy::Circumpolar);
            }
            let semi_arc = x.acos();
            let f = normalize_pm180((base + fraction * semi_arc - alpha).to_degrees()).to_radians();
            let d_sa_d_delta = phi.tan() / (delta.cos().powi(2) * (1.0 - x * x).sqrt());
            let d_delta_d_alpha = eps.tan() * alpha.cos() / (1.0 + u * u);
            let slope = fraction * d_sa_d_delta * d_delta_d_alpha - 1.0;
            if slope.abs() < 1e-12 {
                return Err(Degeneracy::NoConvergence);
            }
            let step = f / slope;
            alpha -= step;
            if step.abs() < tol {
                return Ok(ecliptic_from_ra(alpha, eps));
            }
        }
        Err(Degeneracy::NoConvergence)
    };

    Ok([
        solve(0.0, 1.0 / 3.0)?,
        solve(0.0, 2.0 / 3.0)?,
        solve(60.0, 2.0 / 3.0)?,
        solve(120.0, 1.0 / 3.0)?,
    ])
}

/// Koch cusps 11, 12, 2, 3.
///
/// The MC degree's ascensional difference `AD = asin(tan φ tan δ_MC)`
/// gives its diurnal semi-arc `DSA = 90° + AD`. Cusps are the Ascendants
/// for sidereal times `θ − 2·DSA/3`, `θ − DSA/3`, `θ + DSA/3`, `θ + 2·DSA/3`.
fn koch(angles: &ChartAngles, latitude_deg: f64) -> Result<[f64; 4], Degeneracy> {
    if is_circumpolar(angles, latitude_deg) {
        return Err(Degeneracy::Circumpolar);
    }
    let eps = angles.obliquity.to_radians();
    let phi = latitude_deg.to_radians();
    let dec_mc = (eps.sin() * angles.mc.to_radians().sin()).asin();
    let x = phi.tan() * dec_mc.tan();
    if x.abs() > 1.0 {
        return Err(Degeneracy::Circumpolar);
    }
    let dsa = 90.0 + x.asin().to_degrees();
    let asc_at = |offset: f64| ascendant_deg(angles.ramc + offset, latitude_deg, angles.obliquity);
    Ok([
        asc_at(-2.0 * dsa / 3.0),
        asc_at(-dsa / 3.0),
        asc_at(dsa / 3.0),
        asc_at(2.0 * dsa / 3.0),
    ])
}

/// Regiomontanus cusps 11, 12, 2, 3.
///
/// The prime vertical meets the equator at hour positions H = 30°, 60°,
/// 120°, 150° east of the meridian. Each house circle has pole height
/// `tan φ_H = tan φ · sin H`; its cusp is the Ascendant for sidereal time
/// `θ + H − 90°` at that pole height.
fn regiomontanus(angles: &ChartAngles, latitude_deg: f64) -> Result<[f64; 4], Degeneracy> {
    if latitude_deg.abs() >= 90.0 {
        return Err(Degeneracy::Circumpolar);
    }
    let tan_phi = latitude_deg.to_radians().tan();
    let cusp = |h: f64| {
        let pole = (tan_phi * h.to_radians().sin()).atan().to_degrees();
        ascendant_deg(angles.ramc + h - 90.0, pole, angles.obliquity)
    };
    Ok([cusp(30.0), cusp(60.0), cusp(120.0), cusp(150.0)])
}

/// Porphyry cusps 11, 12, 2, 3: each quadrant trisected along the ecliptic.
fn porphyry(angles: &ChartAngles) -> Result<[f64; 4], Degeneracy> {
    let upper = arc_forward(angles.mc, angles.ascendant);
    if upper <= 0.0 || upper >= 180.0 {
        return Err(Degeneracy::OutOfOrder);
    }
    let lower = 180.0 - upper;
    Ok([
        angles.mc + upper / 3.0,
        angles.mc + 2.0 * upper / 3.0,
        angles.ascendant + lower / 3.0,
        angles.ascendant + 2.0 * lower / 3.0,
    ])
}
