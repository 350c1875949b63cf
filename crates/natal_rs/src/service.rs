//! The chart service: one ephemeris handle plus configuration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use natal_chart::{
    AspectEngine, ChartAspect, ChartData, HouseSet, compute_chart, compute_houses, synastry,
    transits,
};
use natal_config::NatalConfig;
use natal_core::Ephemeris;
use natal_search::{RectificationResult, rectify};
use serde::{Deserialize, Serialize};

use crate::error::NatalError;
use crate::request::{ChartRequest, RectificationInput, TransitRequest};

/// Cross-aspects between two charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynastryResult {
    pub first: ChartData,
    pub second: ChartData,
    /// `first` labels come from the first chart.
    pub aspects: Vec<ChartAspect>,
}

/// Transits to a natal chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitResult {
    pub natal: ChartData,
    pub moment: DateTime<Utc>,
    /// `first` is the transiting planet.
    pub aspects: Vec<ChartAspect>,
}

/// Stateless request handler.
///
/// Cloning is cheap and clones share the ephemeris, so one service can
/// be handed to any number of worker threads.
#[derive(Clone)]
pub struct ChartService {
    ephemeris: Arc<dyn Ephemeris>,
    config: NatalConfig,
}

impl std::fmt::Debug for ChartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartService")
            .field("ephemeris", &self.ephemeris.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ChartService {
    pub fn new(ephemeris: Arc<dyn Ephemeris>, config: NatalConfig) -> Result<Self, NatalError> {
        config.validate()?;
        Ok(Self { ephemeris, config })
    }

    /// The embedded analytic ephemeris configured from `config`.
    pub fn from_config(config: NatalConfig) -> Result<Self, NatalError> {
        let eph = config.analytic_ephemeris()?;
        Self::new(Arc::new(eph), config)
    }

    pub fn config(&self) -> &NatalConfig {
        &self.config
    }

    pub fn ephemeris(&self) -> &dyn Ephemeris {
        self.ephemeris.as_ref()
    }

    pub fn calculate_chart(&self, request: &ChartRequest) -> Result<ChartData, NatalError> {
        let chart = request.to_chart(&self.config)?;
        Ok(compute_chart(self.ephemeris(), &chart)?)
    }

    pub fn calculate_houses(&self, request: &ChartRequest) -> Result<HouseSet, NatalError> {
        let moment = request.moment()?;
        let location = request.location()?;
        let houses = request.house_config(&self.config.houses)?;
        Ok(compute_houses(self.ephemeris(), &moment, &location, &houses)?)
    }

    pub fn synastry(&self, first: &ChartRequest, second: &ChartRequest) -> Result<SynastryResult, NatalError> {
        let a = first.to_chart(&self.config)?;
        let b = second.to_chart(&self.config)?;
        let engine = AspectEngine::new(a.aspect_config().clone())?;
        let first = compute_chart(self.ephemeris(), &a)?;
        let second = compute_chart(self.ephemeris(), &b)?;
        let aspects = synastry(&first, &second, &engine)?;
        Ok(SynastryResult {
            first,
            second,
            aspects,
        })
    }

    pub fn transits(&self, request: &TransitRequest) -> Result<TransitResult, NatalError> {
        let chart = request.natal.to_chart(&self.config)?;
        let moment = request.moment()?;
        let engine = AspectEngine::new(chart.aspect_config().clone())?;
        let natal = compute_chart(self.ephemeris(), &chart)?;
        let aspects = transits(self.ephemeris(), &natal, &moment, &engine)?;
        debug!("{} transit aspects at {}", aspects.len(), moment);
        Ok(TransitResult {
            natal,
            moment,
            aspects,
        })
    }

    pub fn rectify(&self, input: &RectificationInput) -> Result<RectificationResult, NatalError> {
        let request = input.to_request(&self.config)?;
        Ok(rectify(self.ephemeris(), &request)?)
    }
}
