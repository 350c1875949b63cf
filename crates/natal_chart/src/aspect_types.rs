//! Types for aspect detection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use natal_frames::Position;
use serde::{Deserialize, Serialize};

use crate::error::ChartError;

/// Angular relationships recognised between two ecliptic longitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AspectKind {
    Conjunction,
    SemiSextile,
    SemiSquare,
    Sextile,
    Quintile,
    Square,
    Trine,
    Sesquiquadrate,
    Quincunx,
    Opposition,
}

pub const ALL_ASPECT_KINDS: [AspectKind; 10] = [
    AspectKind::Conjunction,
    AspectKind::SemiSextile,
    AspectKind::SemiSquare,
    AspectKind::Sextile,
    AspectKind::Quintile,
    AspectKind::Square,
    AspectKind::Trine,
    AspectKind::Sesquiquadrate,
    AspectKind::Quincunx,
    AspectKind::Opposition,
];

/// The five Ptolemaic aspects.
pub const MAJOR_ASPECTS: [AspectKind; 5] = [
    AspectKind::Conjunction,
    AspectKind::Sextile,
    AspectKind::Square,
    AspectKind::Trine,
    AspectKind::Opposition,
];

impl AspectKind {
    pub const fn all() -> &'static [AspectKind] {
        &ALL_ASPECT_KINDS
    }

    /// Exact separation in degrees.
    pub const fn angle(self) -> f64 {
        match self {
            Self::Conjunction => 0.0,
            Self::SemiSextile => 30.0,
            Self::SemiSquare => 45.0,
            Self::Sextile => 60.0,
            Self::Quintile => 72.0,
            Self::Square => 90.0,
            Self::Trine => 120.0,
            Self::Sesquiquadrate => 135.0,
            Self::Quincunx => 150.0,
            Self::Opposition => 180.0,
        }
    }

    /// Default maximum orb in degrees.
    pub const fn default_orb(self) -> f64 {
        match self {
            Self::Conjunction | Self::Opposition | Self::Trine | Self::Square => 8.0,
            Self::Sextile => 6.0,
            Self::Quincunx => 3.0,
            Self::SemiSextile | Self::SemiSquare | Self::Quintile | Self::Sesquiquadrate => 2.0,
        }
    }

    pub const fn is_major(self) -> bool {
        matches!(
            self,
            Self::Conjunction | Self::Sextile | Self::Square | Self::Trine | Self::Opposition
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Conjunction => "CONJUNCTION",
            Self::SemiSextile => "SEMI_SEXTILE",
            Self::SemiSquare => "SEMI_SQUARE",
            Self::Sextile => "SEXTILE",
            Self::Quintile => "QUINTILE",
            Self::Square => "SQUARE",
            Self::Trine => "TRINE",
            Self::Sesquiquadrate => "SESQUIQUADRATE",
            Self::Quincunx => "QUINCUNX",
            Self::Opposition => "OPPOSITION",
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AspectKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        if key == "INCONJUNCT" {
            return Ok(Self::Quincunx);
        }
        ALL_ASPECT_KINDS
            .iter()
            .copied()
            .find(|k| k.name().replace('_', "") == key)
            .ok_or_else(|| ChartError::Validation(format!("unknown aspect type: {s}")))
    }
}

/// Which aspects to look for and how wide the orbs are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AspectConfig {
    pub kinds: Vec<AspectKind>,
    /// Scales every orb, including overrides.
    pub orb_multiplier: f64,
    /// Replaces the default orb of a kind.
    pub orb_overrides: BTreeMap<AspectKind, f64>,
}

impl Default for AspectConfig {
    fn default() -> Self {
        Self {
            kinds: MAJOR_ASPECTS.to_vec(),
            orb_multiplier: 1.0,
            orb_overrides: BTreeMap::new(),
        }
    }
}

impl AspectConfig {
    pub fn all_kinds() -> Self {
        Self {
            kinds: ALL_ASPECT_KINDS.to_vec(),
            ..Self::default()
        }
    }

    /// Maximum orb allowed for `kind`, whether or not it is enabled.
    pub fn max_orb(&self, kind: AspectKind) -> f64 {
        let base = self
            .orb_overrides
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_orb());
        base * self.orb_multiplier
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if self.kinds.is_empty() {
            return Err(ChartError::InvalidConfig("at least one aspect kind is required"));
        }
        if !(self.orb_multiplier.is_finite() && self.orb_multiplier > 0.0) {
            return Err(ChartError::InvalidConfig("orb_multiplier must be positive"));
        }
        if self
            .orb_overrides
            .values()
            .any(|orb| !(orb.is_finite() && *orb >= 0.0 && *orb < 30.0))
        {
            return Err(ChartError::InvalidConfig("orb overrides must lie in [0, 30)"));
        }
        Ok(())
    }
}

/// Whether the separation is moving toward or away from exactness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AspectMotion {
    Applying,
    Separating,
    Exact,
}

/// A detected aspect between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub kind: AspectKind,
    pub first: Position,
    pub second: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_speed: Option<f64>,
    /// Shorter arc between the two longitudes, [0, 180].
    pub separation: f64,
    /// `|angle − separation|`.
    pub orb: f64,
    /// `1 − orb / max_orb`, clamped to [0, 1].
    pub strength: f64,
    /// `None` when either speed is unknown.
    pub motion: Option<AspectMotion>,
}

/// A labelled longitude taking part in aspect and pattern searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, position: Position, speed: Option<f64>) -> Self {
        Self {
            label: label.into(),
            position,
            speed,
        }
    }
}

/// An aspect between two labelled points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartAspect {
    pub first: String,
    pub second: String,
    pub aspect: Aspect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_names_round_trip_through_from_str() {
        for kind in AspectKind::all() {
            assert_eq!(kind.name().parse::<AspectKind>().unwrap(), *kind);
        }
        assert_eq!("semi-sextile".parse::<AspectKind>().unwrap(), AspectKind::SemiSextile);
        assert_eq!("inconjunct".parse::<AspectKind>().unwrap(), AspectKind::Quincunx);
    }

    #[test]
    fn unknown_aspect_is_validation() {
        let err = "septile".parse::<AspectKind>().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn orb_overrides_and_multiplier() {
        let mut cfg = AspectConfig {
            orb_multiplier: 0.5,
            ..AspectConfig::default()
        };
        assert_eq!(cfg.max_orb(AspectKind::Trine), 4.0);
        cfg.orb_overrides.insert(AspectKind::Trine, 6.0);
        assert_eq!(cfg.max_orb(AspectKind::Trine), 3.0);
        assert_eq!(cfg.max_orb(AspectKind::Quincunx), 1.5);
    }

    #[test]
    fn empty_kind_list_rejected() {
        let cfg = AspectConfig {
            kinds: vec![],
            ..AspectConfig::default()
        };
        assert_eq!(cfg.validate().unwrap_err().kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn config_deserializes_override_map() {
        let cfg: AspectConfig =
            serde_json::from_str(r#"{"kinds":["TRINE","SQUARE"],"orb_overrides":{"TRINE":5.0}}"#)
                .unwrap();
        assert_eq!(cfg.kinds, vec![AspectKind::Trine, AspectKind::Square]);
        assert_eq!(cfg.max_orb(AspectKind::Trine), 5.0);
        assert_eq!(cfg.orb_multiplier, 1.0);
    }
}
