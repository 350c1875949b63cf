//! Lunar node longitudes.
//!
//! Mean node: the fifth Delaunay argument Ω (IERS Conventions 2010,
//! Table 5.2e). True node: Ω plus the five largest periodic terms from
//! Meeus, "Astronomical Algorithms" (2nd ed), Chapter 47. Both are
//! referred to the mean equinox of date; add Δψ for apparent positions.

use natal_frames::{fundamental_arguments, normalize_360};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Ascending node.
    North,
    /// Descending node, always North + 180°.
    South,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeMode {
    #[default]
    Mean,
    True,
}

impl NodeKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "North Node",
            Self::South => "South Node",
        }
    }
}

/// Mean ascending node in degrees [0, 360), `t` in Julian centuries TT.
pub fn mean_node_deg(t: f64) -> f64 {
    normalize_360(fundamental_arguments(t)[4].to_degrees())
}

/// True ascending node in degrees [0, 360).
///
/// `Ω − 1.4979 sin 2(D−F) − 0.1500 sin M + 0.1226 sin 2D
///  + 0.1176 sin 2F − 0.0801 sin 2(M′−F)`
pub fn true_node_deg(t: f64) -> f64 {
    let [l, lp, f, d, om] = fundamental_arguments(t);
    let correction = -1.4979 * (2.0 * (d - f)).sin() - 0.1500 * lp.sin()
        + 0.1226 * (2.0 * d).sin()
        + 0.1176 * (2.0 * f).sin()
        - 0.0801 * (2.0 * (l - f)).sin();
    normalize_360(om.to_degrees() + correction)
}

pub fn lunar_node_deg(node: NodeKind, mode: NodeMode, t: f64) -> f64 {
    let north = match mode {
        NodeMode::Mean => mean_node_deg(t),
        NodeMode::True => true_node_deg(t),
    };
    match node {
        NodeKind::North => north,
        NodeKind::South => normalize_360(north + 180.0),
    }
}
