//! One TOML file for every tunable in the engine.
//!
//! ```toml
//! [ephemeris]
//! apply_nutation = true
//!
//! [houses]
//! system = "KOCH"
//!
//! [aspects]
//! kinds = ["CONJUNCTION", "OPPOSITION", "TRINE", "SQUARE", "SEXTILE", "QUINCUNX"]
//! orb_multiplier = 0.75
//!
//! [aspects.orb_overrides]
//! TRINE = 6.0
//!
//! [bodies]
//! nodes = "true"
//! fixed_stars = ["Regulus", "Spica"]
//!
//! [rectification]
//! step_minutes = 1.0
//! time_budget_ms = 5000
//! ```
//!
//! Every section and field is optional; missing values take their
//! defaults. Unknown fields are rejected so typos surface early.

pub mod error;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use natal_chart::{AspectConfig, BodySelection, Chart, ChartError, HouseConfig};
use natal_core::{AnalyticEphemeris, EphemerisConfig};
use natal_frames::Position;
use natal_search::RectificationConfig;
use serde::{Deserialize, Serialize};

pub use error::ConfigError;

/// File name looked for by [`NatalConfig::load_default`].
pub const CONFIG_FILE_NAME: &str = "natal.toml";
/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "NATAL_CONFIG";

/// Settings for every crate in the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NatalConfig {
    pub ephemeris: EphemerisConfig,
    pub houses: HouseConfig,
    pub aspects: AspectConfig,
    pub bodies: BodySelection,
    pub rectification: RectificationConfig,
}

impl NatalConfig {
    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: NatalConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Locations tried by [`NatalConfig::load_default`], in order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(explicit) = env::var_os(CONFIG_ENV_VAR) {
            paths.push(PathBuf::from(explicit));
        }
        paths.push(PathBuf::from(CONFIG_FILE_NAME));
        paths.push(Path::new("config").join(CONFIG_FILE_NAME));
        paths.push(Path::new("..").join(CONFIG_FILE_NAME));
        paths
    }

    /// First existing file among `paths`.
    pub fn find_in(paths: &[PathBuf]) -> Option<&Path> {
        paths.iter().map(PathBuf::as_path).find(|p| p.is_file())
    }

    /// Load the first config file found on the search path, or defaults
    /// when there is none.
    pub fn load_default() -> Result<Self, ConfigError> {
        let paths = Self::search_paths();
        match Self::find_in(&paths) {
            Some(path) => Self::from_file(path),
            None => {
                debug!("no {CONFIG_FILE_NAME} found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ephemeris
            .validate()
            .map_err(|e| ConfigError::invalid("ephemeris", e))?;
        self.houses
            .validate()
            .map_err(|e| ConfigError::invalid("houses", e))?;
        self.aspects
            .validate()
            .map_err(|e| ConfigError::invalid("aspects", e))?;
        self.bodies
            .validate()
            .map_err(|e| ConfigError::invalid("bodies", e))?;
        self.rectification
            .validate()
            .map_err(|e| ConfigError::invalid("rectification", e))?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// The embedded ephemeris with these settings.
    pub fn analytic_ephemeris(&self) -> Result<AnalyticEphemeris, ConfigError> {
        AnalyticEphemeris::new(self.ephemeris.clone()).map_err(|e| ConfigError::invalid("ephemeris", e))
    }

    /// A chart carrying these house, aspect and body settings.
    pub fn chart(&self, moment: DateTime<Utc>, location: Position) -> Result<Chart, ChartError> {
        Ok(Chart::new(moment, location)?
            .with_houses(self.houses.clone())
            .with_aspects(self.aspects.clone())
            .with_bodies(self.bodies.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use natal_chart::{AspectKind, HouseStartingPoint, HouseSystem, NodeMode};
    use natal_core::Body;

    #[test]
    fn empty_text_is_default() {
        assert_eq!(NatalConfig::from_toml_str("").unwrap(), NatalConfig::default());
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = NatalConfig::from_toml_str(
            r#"
            [houses]
            system = "WHOLE_SIGN"
            starting_point = { body_longitude = "sun" }

            [aspects]
            kinds = ["TRINE", "SQUARE"]
            orb_multiplier = 0.5

            [aspects.orb_overrides]
            TRINE = 4.0

            [bodies]
            nodes = "true"
            fixed_stars = ["Spica"]

            [rectification]
            step_minutes = 5.0
            time_budget_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(cfg.houses.system, HouseSystem::WholeSign);
        assert_eq!(cfg.houses.starting_point, HouseStartingPoint::BodyLongitude(Body::Sun));
        assert_eq!(cfg.aspects.kinds, vec![AspectKind::Trine, AspectKind::Square]);
        assert_eq!(cfg.aspects.max_orb(AspectKind::Trine), 2.0);
        assert_eq!(cfg.bodies.nodes, Some(NodeMode::True));
        assert_eq!(cfg.rectification.step_minutes, 5.0);
        assert_eq!(cfg.rectification.time_budget_ms, Some(250));
        assert_eq!(cfg.ephemeris, EphemerisConfig::default());
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = NatalConfig::from_toml_str("[houses]\nsytem = \"KOCH\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert_eq!(err.kind(), natal_chart::ErrorKind::Validation);
    }

    #[test]
    fn unknown_house_system_rejected() {
        assert!(NatalConfig::from_toml_str("[houses]\nsystem = \"TOPOCENTRIC\"\n").is_err());
    }

    #[test]
    fn invalid_values_name_their_section() {
        let err = NatalConfig::from_toml_str("[rectification]\nstep_minutes = 0.0\n").unwrap_err();
        match err {
            ConfigError::Invalid { section, .. } => assert_eq!(section, "rectification"),
            other => panic!("unexpected {other:?}"),
        }
        let err = NatalConfig::from_toml_str("[bodies]\nfixed_stars = [\"Vega\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { section: "bodies", .. }));
    }

    #[test]
    fn toml_round_trip() {
        let mut cfg = NatalConfig::default();
        cfg.houses.system = HouseSystem::Regiomontanus;
        cfg.aspects.orb_overrides.insert(AspectKind::Sextile, 4.5);
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(NatalConfig::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn chart_carries_settings() {
        let mut cfg = NatalConfig::default();
        cfg.houses.system = HouseSystem::Porphyry;
        let moment = chrono::TimeZone::with_ymd_and_hms(&Utc, 2001, 9, 9, 1, 46, 40).unwrap();
        let chart = cfg.chart(moment, Position::geographic(40.0, -74.0).unwrap()).unwrap();
        assert_eq!(chart.house_config().system, HouseSystem::Porphyry);
        assert!(cfg.chart(moment, Position::ecliptic(0.0, 0.0).unwrap()).is_err());
    }
}
