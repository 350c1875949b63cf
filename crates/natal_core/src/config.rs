//! Configuration for the embedded analytic ephemeris.

use serde::{Deserialize, Serialize};

use crate::error::EphemerisError;

/// Settings for [`crate::AnalyticEphemeris`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EphemerisConfig {
    /// Earliest accepted epoch (JD TT). Defaults to 1800-01-01.
    pub min_jd_tt: f64,
    /// Latest accepted epoch (JD TT). Defaults to 2200-01-01.
    pub max_jd_tt: f64,
    /// Half-width in days of the central difference used for speeds.
    pub speed_step_days: f64,
    /// Add nutation in longitude (apparent rather than mean positions).
    pub apply_nutation: bool,
    /// Newton iteration cap for Kepler's equation.
    pub kepler_max_iterations: u32,
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            min_jd_tt: 2_378_496.5,
            max_jd_tt: 2_524_593.5,
            speed_step_days: 0.5,
            apply_nutation: true,
            kepler_max_iterations: 30,
        }
    }
}

impl EphemerisConfig {
    pub fn validate(&self) -> Result<(), EphemerisError> {
        if !self.min_jd_tt.is_finite() || !self.max_jd_tt.is_finite() {
            return Err(EphemerisError::InvalidConfig("epoch bounds must be finite"));
        }
        if self.min_jd_tt >= self.max_jd_tt {
            return Err(EphemerisError::InvalidConfig(
                "min_jd_tt must be before max_jd_tt",
            ));
        }
        if !(self.speed_step_days > 0.0 && self.speed_step_days <= 5.0) {
            return Err(EphemerisError::InvalidConfig(
                "speed_step_days must be in (0, 5]",
            ));
        }
        if self.kepler_max_iterations == 0 {
            return Err(EphemerisError::InvalidConfig(
                "kepler_max_iterations must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(EphemerisConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_range_rejected() {
        let cfg = EphemerisConfig {
            min_jd_tt: 2_460_000.5,
            max_jd_tt: 2_450_000.5,
            ..EphemerisConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_step_rejected() {
        let cfg = EphemerisConfig {
            speed_step_days: 0.0,
            ..EphemerisConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
