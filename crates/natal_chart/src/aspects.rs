//! Pairwise aspect detection with orbs, strength, and applying/separating.
//!
//! Orb is the distance of the shorter-arc separation from the aspect's
//! exact angle; strength falls linearly from 1 at exactness to 0 at the
//! maximum orb. Detection is symmetric in its two arguments.

use natal_frames::{Position, angular_separation, normalize_pm180};

use crate::aspect_types::{
    Aspect, AspectConfig, AspectKind, AspectMotion, ChartAspect, ChartPoint,
};
use crate::error::ChartError;

/// Orbs below this are reported as [`AspectMotion::Exact`].
pub const EXACT_ORB_DEG: f64 = 1e-9;

/// `|angle − separation|` for a shorter-arc separation in [0, 180].
pub fn aspect_orb(separation: f64, kind: AspectKind) -> f64 {
    (kind.angle() - separation).abs()
}

/// `1 − orb / max_orb`, clamped to [0, 1].
pub fn aspect_strength(orb: f64, max_orb: f64) -> f64 {
    if max_orb <= 0.0 {
        return if orb < EXACT_ORB_DEG { 1.0 } else { 0.0 };
    }
    (1.0 - orb / max_orb).clamp(0.0, 1.0)
}

/// Applying or separating from the two longitudes and their daily motion.
///
/// With `d = normalize_pm180(λ₂ − λ₁)` and `s = |d|`, the separation
/// changes at `ds/dt = sign(d)·(v₂ − v₁)`. The aspect is applying when
/// `(s − angle)·ds/dt < 0`, i.e. the orb is shrinking.
pub fn aspect_motion(
    lon1: f64,
    speed1: f64,
    lon2: f64,
    speed2: f64,
    kind: AspectKind,
) -> AspectMotion {
    let d = normalize_pm180(lon2 - lon1);
    let s = d.abs();
    let offset = s - kind.angle();
    if offset.abs() < EXACT_ORB_DEG {
        return AspectMotion::Exact;
    }
    let rate = d.signum() * (speed2 - speed1);
    if offset * rate < 0.0 {
        AspectMotion::Applying
    } else {
        AspectMotion::Separating
    }
}

/// Aspect detection under one [`AspectConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct AspectEngine {
    config: AspectConfig,
}

impl Default for AspectEngine {
    fn default() -> Self {
        Self {
            config: AspectConfig::default(),
        }
    }
}

impl AspectEngine {
    pub fn new(config: AspectConfig) -> Result<Self, ChartError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AspectConfig {
        &self.config
    }

    /// Tightest configured aspect between two positions, if any.
    pub fn detect(&self, a: &Position, b: &Position) -> Option<Aspect> {
        self.detect_all(a, b).into_iter().next()
    }

    /// Every configured aspect within orb, ascending by orb.
    pub fn detect_all(&self, a: &Position, b: &Position) -> Vec<Aspect> {
        self.matches(a, None, b, None)
    }

    /// Tightest configured aspect between two points, with motion when
    /// both speeds are known.
    pub fn detect_points(&self, a: &ChartPoint, b: &ChartPoint) -> Option<Aspect> {
        self.matches(&a.position, a.speed, &b.position, b.speed)
            .into_iter()
            .next()
    }

    /// One specific aspect, using its configured orb even when the kind is
    /// not in the enabled list. Pattern detection relies on this.
    pub fn detect_kind(&self, kind: AspectKind, a: &ChartPoint, b: &ChartPoint) -> Option<Aspect> {
        self.evaluate(kind, &a.position, a.speed, &b.position, b.speed)
    }

    /// Aspects among every unordered pair of `points`, in index order.
    pub fn detect_between(&self, points: &[ChartPoint]) -> Vec<ChartAspect> {
        let mut out = Vec::new();
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                if let Some(aspect) = self.detect_points(a, b) {
                    out.push(ChartAspect {
                        first: a.label.clone(),
                        second: b.label.clone(),
                        aspect,
                    });
                }
            }
        }
        out
    }

    /// Aspects from every point of `left` to every point of `right`, as
    /// between two charts in synastry or transits to a natal chart.
    pub fn detect_cross(&self, left: &[ChartPoint], right: &[ChartPoint]) -> Vec<ChartAspect> {
        let mut out = Vec::new();
        for a in left {
            for b in right {
                if let Some(aspect) = self.detect_points(a, b) {
                    out.push(ChartAspect {
                        first: a.label.clone(),
                        second: b.label.clone(),
                        aspect,
                    });
                }
            }
        }
        out
    }

    fn matches(
        &self,
        a: &Position,
        va: Option<f64>,
        b: &Position,
        vb: Option<f64>,
    ) -> Vec<Aspect> {
        let mut found: Vec<Aspect> = self
            .config
            .kinds
            .iter()
            .filter_map(|&kind| self.evaluate(kind, a, va, b, vb))
            .collect();
        found.sort_by(|x, y| x.orb.total_cmp(&y.orb).then(x.kind.cmp(&y.kind)));
        found.dedup_by_key(|x| x.kind);
        found
    }

    fn evaluate(
        &self,
        kind: AspectKind,
        a: &Position,
        va: Option<f64>,
        b: &Position,
        vb: Option<f64>,
    ) -> Option<Aspect> {
        let separation = angular_separation(a.longitude(), b.longitude());
        let orb = aspect_orb(separation, kind);
        let max_orb = self.config.max_orb(kind);
        if orb > max_orb {
            return None;
        }
        let motion = match (va, vb) {
            (Some(v1), Some(v2)) => Some(aspect_motion(a.longitude(), v1, b.longitude(), v2, kind)),
            _ => None,
        };
        Some(Aspect {
            kind,
            first: *a,
            second: *b,
            first_speed: va,
            second_speed: vb,
            separation,
            orb,
            strength: aspect_strength(orb, max_orb),
            motion,
        })
    }
}
