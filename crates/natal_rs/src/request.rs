//! String-shaped requests as they arrive from outside, and their
//! conversion into typed engine inputs.
//!
//! Conversion does all parsing and range checking, so a request that
//! converts cleanly only fails later for computational reasons.

use chrono::{DateTime, Utc};
use natal_chart::{AspectConfig, AspectKind, Chart, HouseConfig, HouseSystem};
use natal_config::NatalConfig;
use natal_frames::Position;
use natal_search::{
    LifeEvent, RecognizedPattern, RectificationMethod, RectificationRequest, TimeWindow,
};
use natal_time::parse_with_zone;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::NatalError;

fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, NatalError> {
    serde_json::from_str(json).map_err(|e| NatalError::Validation(e.to_string()))
}

/// Birth or event data for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartRequest {
    /// RFC 3339 with offset, or a local wall-clock time plus `timezone`.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_system: Option<String>,
    /// Aspect names; the configured set when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orb_multiplier: Option<f64>,
}

impl ChartRequest {
    pub fn new(timestamp: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            timezone: None,
            latitude,
            longitude,
            house_system: None,
            aspects: None,
            orb_multiplier: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, NatalError> {
        from_json(json)
    }

    pub fn moment(&self) -> Result<DateTime<Utc>, NatalError> {
        Ok(parse_with_zone(&self.timestamp, self.timezone.as_deref())?)
    }

    pub fn location(&self) -> Result<Position, NatalError> {
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(NatalError::Validation(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(Position::geographic(self.latitude, self.longitude)?)
    }

    /// House settings: the configured ones with the requested system.
    pub fn house_config(&self, defaults: &HouseConfig) -> Result<HouseConfig, NatalError> {
        let mut houses = defaults.clone();
        if let Some(name) = &self.house_system {
            houses.system = name.parse::<HouseSystem>()?;
        }
        Ok(houses)
    }

    pub fn aspect_config(&self, defaults: &AspectConfig) -> Result<AspectConfig, NatalError> {
        let mut aspects = defaults.clone();
        if let Some(names) = &self.aspects {
            aspects.kinds = names
                .iter()
                .map(|n| n.parse::<AspectKind>())
                .collect::<Result<_, _>>()?;
        }
        if let Some(m) = self.orb_multiplier {
            aspects.orb_multiplier = m;
        }
        aspects.validate()?;
        Ok(aspects)
    }

    /// A fully validated chart with `config` filling the gaps.
    pub fn to_chart(&self, config: &NatalConfig) -> Result<Chart, NatalError> {
        let moment = self.moment()?;
        let location = self.location()?;
        let houses = self.house_config(&config.houses)?;
        let aspects = self.aspect_config(&config.aspects)?;
        Ok(config
            .chart(moment, location)?
            .with_houses(houses)
            .with_aspects(aspects))
    }
}

/// A life event as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventInput {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

/// A recognized pattern as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub points: Vec<f64>,
    #[serde(default = "full_strength")]
    pub strength: f64,
}

fn full_strength() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowInput {
    pub start: String,
    pub end: String,
}

/// A rectification request as submitted.
///
/// Exactly one of `events` and `patterns` should be non-empty. Event
/// dates and window bounds without an offset use the chart's `timezone`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RectificationInput {
    pub chart: ChartRequest,
    #[serde(default)]
    pub events: Vec<EventInput>,
    #[serde(default)]
    pub patterns: Vec<PatternInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowInput>,
    /// EVENT_BASED for events and PATTERN_BASED for patterns when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl RectificationInput {
    pub fn from_json(json: &str) -> Result<Self, NatalError> {
        from_json(json)
    }

    pub fn to_request(&self, config: &NatalConfig) -> Result<RectificationRequest, NatalError> {
        if !self.events.is_empty() && !self.patterns.is_empty() {
            return Err(NatalError::Validation(
                "supply either events or patterns, not both".into(),
            ));
        }
        let chart = self.chart.to_chart(config)?;
        let tz = self.chart.timezone.as_deref();
        let method = match &self.method {
            Some(name) => name.parse::<RectificationMethod>()?,
            None if self.patterns.is_empty() => RectificationMethod::EventBased,
            None => RectificationMethod::PatternBased,
        };

        let mut request = if self.patterns.is_empty() {
            let events = self
                .events
                .iter()
                .map(|e| LifeEvent::parse(&e.date, tz, &e.kind, &e.description))
                .collect::<Result<Vec<_>, _>>()?;
            RectificationRequest::events(chart, events, method)
        } else {
            let patterns = self
                .patterns
                .iter()
                .map(|p| RecognizedPattern::parse(&p.kind, p.points.clone(), p.strength))
                .collect::<Result<Vec<_>, _>>()?;
            RectificationRequest::patterns(chart, patterns, method)
        }
        .with_config(config.rectification);

        if let Some(weights) = &self.weights {
            request = request.with_weights(weights.clone());
        }
        if let Some(w) = &self.window {
            request = request.with_window(TimeWindow::new(
                parse_with_zone(&w.start, tz)?,
                parse_with_zone(&w.end, tz)?,
            ));
        }
        Ok(request)
    }
}

/// Transits to a natal chart at a given moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitRequest {
    pub natal: ChartRequest,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl TransitRequest {
    pub fn moment(&self) -> Result<DateTime<Utc>, NatalError> {
        Ok(parse_with_zone(&self.timestamp, self.timezone.as_deref())?)
    }
}
