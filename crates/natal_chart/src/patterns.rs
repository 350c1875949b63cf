//! Multi-body aspect configurations.
//!
//! - T-Square: an opposition whose ends both square a third point (the apex).
//! - Grand Trine: three points in mutual trine.
//! - Grand Cross: two oppositions in mutual square.
//! - Yod: two points in sextile, both quincunx a third (the apex).
//!
//! Orbs come from the engine's configuration for each kind, whether or not
//! that kind is enabled for pairwise detection. Results are ordered by
//! pattern kind and then by member indices.

use std::fmt;
use std::str::FromStr;

use natal_frames::Position;
use serde::{Deserialize, Serialize};

use crate::aspect_types::{Aspect, AspectKind, ChartPoint};
use crate::aspects::AspectEngine;
use crate::error::ChartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    TSquare,
    GrandTrine,
    GrandCross,
    Yod,
}

pub const ALL_PATTERN_KINDS: [PatternKind; 4] = [
    PatternKind::TSquare,
    PatternKind::GrandTrine,
    PatternKind::GrandCross,
    PatternKind::Yod,
];

impl PatternKind {
    pub const fn all() -> &'static [PatternKind] {
        &ALL_PATTERN_KINDS
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::TSquare => "T_SQUARE",
            Self::GrandTrine => "GRAND_TRINE",
            Self::GrandCross => "GRAND_CROSS",
            Self::Yod => "YOD",
        }
    }

    /// Number of participating points.
    pub const fn size(self) -> usize {
        match self {
            Self::GrandCross => 4,
            _ => 3,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PatternKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        ALL_PATTERN_KINDS
            .iter()
            .copied()
            .find(|k| k.name().replace('_', "") == key)
            .ok_or_else(|| ChartError::Validation(format!("unknown pattern type: {s}")))
    }
}

/// A recognised configuration among chart points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectPattern {
    pub kind: PatternKind,
    /// Indices into the searched point list. For T-Square and Yod the
    /// apex is last.
    pub members: Vec<usize>,
    pub labels: Vec<String>,
    pub positions: Vec<Position>,
    pub aspects: Vec<Aspect>,
    /// Mean strength of the participating aspects.
    pub strength: f64,
}

impl AspectPattern {
    fn new(kind: PatternKind, members: Vec<usize>, points: &[ChartPoint], aspects: Vec<Aspect>) -> Self {
        let strength = if aspects.is_empty() {
            0.0
        } else {
            aspects.iter().map(|a| a.strength).sum::<f64>() / aspects.len() as f64
        };
        Self {
            kind,
            labels: members.iter().map(|&i| points[i].label.clone()).collect(),
            positions: members.iter().map(|&i| points[i].position).collect(),
            members,
            aspects,
            strength,
        }
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Find every T-Square, Grand Trine, Grand Cross and Yod among `points`.
pub fn detect_patterns(engine: &AspectEngine, points: &[ChartPoint]) -> Vec<AspectPattern> {
    let n = points.len();
    let link = |kind: AspectKind, i: usize, j: usize| engine.detect_kind(kind, &points[i], &points[j]);
    let mut out = Vec::new();

    for i in 0..n {
        for j in i + 1..n {
            let Some(opp) = link(AspectKind::Opposition, i, j) else {
                continue;
            };
            for k in (0..n).filter(|&k| k != i && k != j) {
                if let (Some(a), Some(b)) = (link(AspectKind::Square, i, k), link(AspectKind::Square, j, k)) {
                    out.push(AspectPattern::new(PatternKind::TSquare, vec![i, j, k], points, vec![opp, a, b]));
                }
            }
        }
    }

    for i in 0..n {
        for j in i + 1..n {
            let Some(ij) = link(AspectKind::Trine, i, j) else {
                continue;
            };
            for k in j + 1..n {
                if let (Some(jk), Some(ik)) = (link(AspectKind::Trine, j, k), link(AspectKind::Trine, i, k)) {
                    out.push(AspectPattern::new(PatternKind::GrandTrine, vec![i, j, k], points, vec![ij, jk, ik]));
                }
            }
        }
    }

    let oppositions: Vec<(usize, usize, Aspect)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .filter_map(|(i, j)| link(AspectKind::Opposition, i, j).map(|a| (i, j, a)))
        .collect();
    for (x, &(i, j, opp1)) in oppositions.iter().enumerate() {
        for &(k, l, opp2) in &oppositions[x + 1..] {
            if k == i || k == j || l == i || l == j {
                continue;
            }
            let squares = [(i, k), (i, l), (j, k), (j, l)].map(|(p, q)| link(AspectKind::Square, p, q));
            if let [Some(s1), Some(s2), Some(s3), Some(s4)] = squares {
                out.push(AspectPattern::new(
                    PatternKind::GrandCross,
                    vec![i, j, k, l],
                    points,
                    vec![opp1, opp2, s1, s2, s3, s4],
                ));
            }
        }
    }

    for i in 0..n {
        for j in i + 1..n {
            let Some(sextile) = link(AspectKind::Sextile, i, j) else {
                continue;
            };
            for k in (0..n).filter(|&k| k != i && k != j) {
                if let (Some(a), Some(b)) = (link(AspectKind::Quincunx, i, k), link(AspectKind::Quincunx, j, k)) {
                    out.push(AspectPattern::new(PatternKind::Yod, vec![i, j, k], points, vec![sextile, a, b]));
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(lons: &[f64]) -> Vec<ChartPoint> {
        lons.iter()
            .enumerate()
            .map(|(i, &l)| ChartPoint::new(format!("P{i}"), Position::ecliptic(l, 0.0).unwrap(), None))
            .collect()
    }

    #[test]
    fn t_square_with_apex_last() {
        let engine = AspectEngine::default();
        let found = detect_patterns(&engine, &pts(&[10.0, 190.0, 100.0]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::TSquare);
        assert_eq!(found[0].members, vec![0, 1, 2]);
        assert!((found[0].strength - 1.0).abs() < 1e-12);
    }

    #[test]
    fn grand_trine_strength_is_mean() {
        let engine = AspectEngine::default();
        let found = detect_patterns(&engine, &pts(&[0.0, 120.0, 244.0]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::GrandTrine);
        // Orbs 0, 4, 4 of a possible 8.
        let expected = (1.0 + 0.5 + 0.5) / 3.0;
        assert!((found[0].strength - expected).abs() < 1e-9, "{}", found[0].strength);
    }

    #[test]
    fn grand_cross_contains_four_t_squares() {
        let engine = AspectEngine::default();
        let found = detect_patterns(&engine, &pts(&[0.0, 90.0, 180.0, 270.0]));
        let crosses: Vec<_> = found.iter().filter(|p| p.kind == PatternKind::GrandCross).collect();
        let t_squares = found.iter().filter(|p| p.kind == PatternKind::TSquare).count();
        assert_eq!(crosses.len(), 1);
        assert_eq!(crosses[0].members, vec![0, 2, 1, 3]);
        assert_eq!(crosses[0].aspects.len(), 6);
        assert_eq!(t_squares, 4);
    }

    #[test]
    fn yod_found_even_when_quincunx_disabled() {
        let engine = AspectEngine::default();
        let found = detect_patterns(&engine, &pts(&[0.0, 60.0, 210.0]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::Yod);
        assert_eq!(found[0].members, vec![0, 1, 2]);
    }

    #[test]
    fn no_patterns_in_scattered_points() {
        let engine = AspectEngine::default();
        assert!(detect_patterns(&engine, &pts(&[0.0, 37.0, 151.0, 263.0])).is_empty());
    }

    #[test]
    fn pattern_names_parse() {
        assert_eq!("t-square".parse::<PatternKind>().unwrap(), PatternKind::TSquare);
        assert_eq!("GRAND_TRINE".parse::<PatternKind>().unwrap(), PatternKind::GrandTrine);
        assert!("kite".parse::<PatternKind>().is_err());
    }
}
