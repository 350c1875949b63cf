//! Types for birth-time rectification.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use natal_chart::{Chart, ChartAngles, PatternKind};
use natal_core::Body;
use serde::{Deserialize, Serialize};

use crate::error::RectificationError;

fn normalized_key(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_ascii_uppercase()
}

// ---------------------------------------------------------------------------
// Angles
// ---------------------------------------------------------------------------

/// One of the four chart angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChartAngle {
    Ascendant,
    Midheaven,
    Descendant,
    ImumCoeli,
}

impl ChartAngle {
    pub const ALL: [Self; 4] = [
        Self::Ascendant,
        Self::Midheaven,
        Self::Descendant,
        Self::ImumCoeli,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ascendant => "Ascendant",
            Self::Midheaven => "Midheaven",
            Self::Descendant => "Descendant",
            Self::ImumCoeli => "Imum Coeli",
        }
    }

    pub fn longitude(self, angles: &ChartAngles) -> f64 {
        match self {
            Self::Ascendant => angles.ascendant,
            Self::Midheaven => angles.mc,
            Self::Descendant => angles.descendant,
            Self::ImumCoeli => angles.ic,
        }
    }
}

// ---------------------------------------------------------------------------
// Life events
// ---------------------------------------------------------------------------

/// Category of a life event used as rectification evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Marriage,
    Divorce,
    ChildBirth,
    CareerChange,
    Relocation,
    Accident,
    Illness,
    DeathOfParent,
    Education,
    Inheritance,
}

pub const ALL_EVENT_KINDS: [EventKind; 10] = [
    EventKind::Marriage,
    EventKind::Divorce,
    EventKind::ChildBirth,
    EventKind::CareerChange,
    EventKind::Relocation,
    EventKind::Accident,
    EventKind::Illness,
    EventKind::DeathOfParent,
    EventKind::Education,
    EventKind::Inheritance,
];

impl EventKind {
    pub const fn all() -> &'static [EventKind] {
        &ALL_EVENT_KINDS
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Marriage => "MARRIAGE",
            Self::Divorce => "DIVORCE",
            Self::ChildBirth => "CHILD_BIRTH",
            Self::CareerChange => "CAREER_CHANGE",
            Self::Relocation => "RELOCATION",
            Self::Accident => "ACCIDENT",
            Self::Illness => "ILLNESS",
            Self::DeathOfParent => "DEATH_OF_PARENT",
            Self::Education => "EDUCATION",
            Self::Inheritance => "INHERITANCE",
        }
    }

    /// Houses whose activation marks this kind of event, strongest first.
    pub const fn significator_houses(self) -> &'static [u8] {
        match self {
            Self::Marriage => &[7, 5],
            Self::Divorce => &[7, 8],
            Self::ChildBirth => &[5],
            Self::CareerChange => &[10, 6],
            Self::Relocation => &[4, 9],
            Self::Accident => &[8, 1, 12],
            Self::Illness => &[6, 12],
            Self::DeathOfParent => &[4, 10, 8],
            Self::Education => &[9, 3],
            Self::Inheritance => &[8, 2],
        }
    }

    /// Planets traditionally associated with this kind of event.
    pub const fn significator_bodies(self) -> &'static [Body] {
        match self {
            Self::Marriage => &[Body::Venus, Body::Jupiter, Body::Moon],
            Self::Divorce => &[Body::Uranus, Body::Saturn, Body::Mars],
            Self::ChildBirth => &[Body::Jupiter, Body::Moon, Body::Venus],
            Self::CareerChange => &[Body::Saturn, Body::Jupiter, Body::Sun],
            Self::Relocation => &[Body::Uranus, Body::Moon, Body::Jupiter],
            Self::Accident => &[Body::Mars, Body::Uranus],
            Self::Illness => &[Body::Saturn, Body::Neptune, Body::Mars],
            Self::DeathOfParent => &[Body::Saturn, Body::Pluto],
            Self::Education => &[Body::Jupiter, Body::Mercury],
            Self::Inheritance => &[Body::Pluto, Body::Jupiter, Body::Venus],
        }
    }

    /// Angles a transit or direction should touch.
    pub const fn target_angles(self) -> &'static [ChartAngle] {
        match self {
            Self::Marriage | Self::Divorce => &[ChartAngle::Descendant, ChartAngle::Ascendant],
            Self::ChildBirth => &[ChartAngle::Ascendant, ChartAngle::ImumCoeli],
            Self::CareerChange | Self::Education => &[ChartAngle::Midheaven],
            Self::Relocation => &[ChartAngle::ImumCoeli, ChartAngle::Ascendant],
            Self::Accident | Self::Illness => &[ChartAngle::Ascendant],
            Self::DeathOfParent => &[ChartAngle::ImumCoeli, ChartAngle::Midheaven],
            Self::Inheritance => &[ChartAngle::Ascendant, ChartAngle::Midheaven],
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = RectificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalized_key(s);
        ALL_EVENT_KINDS
            .iter()
            .copied()
            .find(|k| normalized_key(k.name()) == key)
            .ok_or_else(|| RectificationError::UnknownEventType(s.to_string()))
    }
}

/// A dated life event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeEvent {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub description: String,
}

impl LifeEvent {
    pub fn new(date: DateTime<Utc>, kind: EventKind) -> Self {
        Self {
            date,
            kind,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Build from request strings. The timestamp must carry a zone, either
    /// inline or through `tz`.
    pub fn parse(
        date: &str,
        tz: Option<&str>,
        kind: &str,
        description: &str,
    ) -> Result<Self, RectificationError> {
        let kind = kind.parse()?;
        let date = natal_time::parse_with_zone(date, tz)?;
        Ok(Self::new(date, kind).with_description(description))
    }
}

// ---------------------------------------------------------------------------
// Recognized patterns
// ---------------------------------------------------------------------------

/// A geometric configuration the native is believed to have.
///
/// `points` are the ecliptic longitudes in degrees that make up the
/// configuration; `strength` in [0, 1] is how certain the observer is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedPattern {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub points: Vec<f64>,
    pub strength: f64,
}

impl RecognizedPattern {
    pub fn new(kind: PatternKind, points: Vec<f64>, strength: f64) -> Self {
        Self {
            kind,
            points,
            strength,
        }
    }

    pub fn parse(kind: &str, points: Vec<f64>, strength: f64) -> Result<Self, RectificationError> {
        let kind = kind
            .parse::<PatternKind>()
            .map_err(|_| RectificationError::UnknownPatternType(kind.to_string()))?;
        Ok(Self::new(kind, points, strength))
    }

    pub(crate) fn validate(&self, index: usize) -> Result<(), RectificationError> {
        let invalid = |reason| RectificationError::InvalidPattern { index, reason };
        if self.points.is_empty() {
            return Err(invalid("pattern has no points"));
        }
        if self.points.iter().any(|p| !p.is_finite()) {
            return Err(invalid("pattern points must be finite"));
        }
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(invalid("strength must be in [0, 1]"));
        }
        Ok(())
    }
}

/// The observations a rectification is fitted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    Events(Vec<LifeEvent>),
    Patterns(Vec<RecognizedPattern>),
}

impl Evidence {
    pub fn len(&self) -> usize {
        match self {
            Self::Events(v) => v.len(),
            Self::Patterns(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Events(_) => "event",
            Self::Patterns(_) => "pattern",
        }
    }
}

// ---------------------------------------------------------------------------
// Method, window, config
// ---------------------------------------------------------------------------

/// Scoring strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RectificationMethod {
    /// Transits to the angles, solar-arc directions and house activation.
    #[default]
    EventBased,
    /// Aspect patterns that tie the evidence to the candidate angles.
    PatternBased,
    /// Harmonic resonance between the evidence and the candidate angles.
    Harmonic,
}

pub const ALL_METHODS: [RectificationMethod; 3] = [
    RectificationMethod::EventBased,
    RectificationMethod::PatternBased,
    RectificationMethod::Harmonic,
];

impl RectificationMethod {
    pub const fn all() -> &'static [RectificationMethod] {
        &ALL_METHODS
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::EventBased => "EVENT_BASED",
            Self::PatternBased => "PATTERN_BASED",
            Self::Harmonic => "HARMONIC",
        }
    }
}

impl fmt::Display for RectificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RectificationMethod {
    type Err = RectificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalized_key(s);
        ALL_METHODS
            .iter()
            .copied()
            .find(|m| normalized_key(m.name()) == key)
            .ok_or_else(|| RectificationError::UnknownMethod(s.to_string()))
    }
}

/// Closed interval of candidate birth times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// `center ± half_width`, or an error when either end is not a
    /// representable instant.
    pub fn around(center: DateTime<Utc>, half_width: Duration) -> Result<Self, RectificationError> {
        let out_of_range = || RectificationError::WindowOutOfRange { center, half_width };
        Ok(Self {
            start: center.checked_sub_signed(half_width).ok_or_else(out_of_range)?,
            end: center.checked_add_signed(half_width).ok_or_else(out_of_range)?,
        })
    }

    pub fn contains(&self, t: &DateTime<Utc>) -> bool {
        self.start <= *t && *t <= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Upper bound on [`RectificationConfig::window_half_width_hours`].
pub const MAX_WINDOW_HALF_WIDTH_HOURS: f64 = 72.0;

/// Search resolution and limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RectificationConfig {
    /// Spacing of candidate times in minutes (default 2).
    pub step_minutes: f64,
    /// Half-width of the default window around the chart time, in hours.
    pub window_half_width_hours: f64,
    /// Refuse windows that would need more candidates than this.
    pub max_candidates: usize,
    /// Stop scoring new candidates once this much wall time has passed.
    pub time_budget_ms: Option<u64>,
}

impl Default for RectificationConfig {
    fn default() -> Self {
        Self {
            step_minutes: 2.0,
            window_half_width_hours: 12.0,
            max_candidates: 20_000,
            time_budget_ms: None,
        }
    }
}

impl RectificationConfig {
    pub fn validate(&self) -> Result<(), RectificationError> {
        if !(self.step_minutes.is_finite() && self.step_minutes > 0.0) {
            return Err(RectificationError::InvalidConfig("step_minutes must be positive"));
        }
        if self.step_minutes > 1440.0 {
            return Err(RectificationError::InvalidConfig("step_minutes must not exceed one day"));
        }
        if !(self.window_half_width_hours.is_finite() && self.window_half_width_hours > 0.0) {
            return Err(RectificationError::InvalidConfig(
                "window_half_width_hours must be positive",
            ));
        }
        if self.window_half_width_hours > MAX_WINDOW_HALF_WIDTH_HOURS {
            return Err(RectificationError::InvalidConfig(
                "window_half_width_hours must not exceed 72",
            ));
        }
        if self.max_candidates == 0 {
            return Err(RectificationError::InvalidConfig("max_candidates must be at least 1"));
        }
        Ok(())
    }

    pub(crate) fn step(&self) -> Duration {
        Duration::milliseconds((self.step_minutes * 60_000.0).round() as i64)
    }

    /// Only meaningful after [`RectificationConfig::validate`] has bounded
    /// the half-width.
    pub(crate) fn default_window(&self, center: DateTime<Utc>) -> Result<TimeWindow, RectificationError> {
        let half = Duration::milliseconds((self.window_half_width_hours * 3_600_000.0).round() as i64);
        TimeWindow::around(center, half)
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Everything a rectification run needs besides the ephemeris.
#[derive(Debug, Clone, PartialEq)]
pub struct RectificationRequest {
    /// The chart with the uncertain time; its place and settings are kept.
    pub chart: Chart,
    pub evidence: Evidence,
    /// One weight per evidence item; 1.0 each when absent.
    pub weights: Option<Vec<f64>>,
    /// Defaults to the chart time ± `config.window_half_width_hours`.
    pub window: Option<TimeWindow>,
    pub method: RectificationMethod,
    pub config: RectificationConfig,
}

impl RectificationRequest {
    pub fn events(chart: Chart, events: Vec<LifeEvent>, method: RectificationMethod) -> Self {
        Self::new(chart, Evidence::Events(events), method)
    }

    pub fn patterns(chart: Chart, patterns: Vec<RecognizedPattern>, method: RectificationMethod) -> Self {
        Self::new(chart, Evidence::Patterns(patterns), method)
    }

    fn new(chart: Chart, evidence: Evidence, method: RectificationMethod) -> Self {
        Self {
            chart,
            evidence,
            weights: None,
            window: None,
            method,
            config: RectificationConfig::default(),
        }
    }

    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_config(mut self, config: RectificationConfig) -> Self {
        self.config = config;
        self
    }

    /// The window that will be searched.
    pub fn effective_window(&self) -> Result<TimeWindow, RectificationError> {
        match self.window {
            Some(window) => Ok(window),
            None => self.config.default_window(self.chart.moment()),
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// One named input to a match strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSignal {
    pub name: String,
    /// In [0, 1].
    pub value: f64,
    /// Share of the match strength this signal carries.
    pub weight: f64,
}

/// How well one event fits the rectified time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMatch {
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub date: DateTime<Utc>,
    pub weight: f64,
    /// Match strength in [0, 1].
    pub strength: f64,
    /// `weight × strength / Σ weights`; these sum to the score.
    pub contribution: f64,
    pub signals: Vec<MatchSignal>,
}

/// How well one recognized pattern fits the rectified time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub weight: f64,
    pub strength: f64,
    pub contribution: f64,
    pub signals: Vec<MatchSignal>,
}

/// One term of the confidence sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactor {
    pub name: String,
    pub value: f64,
    pub weight: f64,
    /// `value × weight`.
    pub contribution: f64,
}

/// Outcome of a rectification run. Computed fresh, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectificationResult {
    pub rectified_time: DateTime<Utc>,
    /// In [0, 1]; the sum of the factor contributions.
    pub confidence: f64,
    pub method: RectificationMethod,
    /// Weighted mean match strength at the rectified time.
    pub score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_matches: Vec<EventMatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pattern_matches: Vec<PatternMatch>,
    pub confidence_factors: Vec<ConfidenceFactor>,
    pub window: TimeWindow,
    pub step_minutes: f64,
    pub candidates_total: usize,
    pub candidates_evaluated: usize,
    /// False when a time budget cut the scan short.
    pub complete: bool,
}

impl RectificationResult {
    pub fn factor(&self, name: &str) -> Option<&ConfidenceFactor> {
        self.confidence_factors.iter().find(|f| f.name == name)
    }
}
