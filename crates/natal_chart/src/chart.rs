//! The chart aggregate and its computed snapshot.
//!
//! A [`Chart`] is an input bundle: moment, place and settings. Nothing is
//! computed until [`compute_chart`] runs it against an ephemeris, which
//! returns an immutable [`ChartData`].

use chrono::{DateTime, Utc};
use log::debug;
use natal_core::{Body, Ephemeris};
use natal_frames::Position;
use natal_time::{datetime_to_julian_day, jd_tt};
use serde::{Deserialize, Serialize};

use crate::angles::{ChartAngles, ChartFrame, require_geographic};
use crate::aspect_types::{AspectConfig, ChartAspect, ChartPoint};
use crate::aspects::AspectEngine;
use crate::bodies::{CelestialBody, find_fixed_star};
use crate::error::ChartError;
use crate::house_types::{HouseConfig, HouseSet};
use crate::houses::houses_for_frame;
use crate::nodes::{NodeKind, NodeMode};
use crate::patterns::{AspectPattern, detect_patterns};

pub const ASCENDANT_LABEL: &str = "Ascendant";
pub const MIDHEAVEN_LABEL: &str = "Midheaven";

/// Which bodies a chart carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BodySelection {
    pub planets: Vec<Body>,
    /// Include both lunar nodes in this mode.
    pub nodes: Option<NodeMode>,
    /// Names from the embedded catalogue.
    pub fixed_stars: Vec<String>,
    /// Treat the Ascendant and Midheaven as aspect points.
    pub include_angles: bool,
}

impl Default for BodySelection {
    fn default() -> Self {
        Self {
            planets: Body::ALL.to_vec(),
            nodes: Some(NodeMode::Mean),
            fixed_stars: Vec::new(),
            include_angles: true,
        }
    }
}

impl BodySelection {
    pub fn validate(&self) -> Result<(), ChartError> {
        for name in &self.fixed_stars {
            find_fixed_star(name)?;
        }
        Ok(())
    }
}

/// Birth or event data plus chart settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    moment: DateTime<Utc>,
    location: Position,
    houses: HouseConfig,
    aspects: AspectConfig,
    bodies: BodySelection,
    extra_bodies: Vec<CelestialBody>,
}

impl Chart {
    /// `location` must be GEOGRAPHIC.
    pub fn new(moment: DateTime<Utc>, location: Position) -> Result<Self, ChartError> {
        require_geographic(&location)?;
        Ok(Self {
            moment,
            location,
            houses: HouseConfig::default(),
            aspects: AspectConfig::default(),
            bodies: BodySelection::default(),
            extra_bodies: Vec::new(),
        })
    }

    pub fn with_houses(mut self, houses: HouseConfig) -> Self {
        self.houses = houses;
        self
    }

    pub fn with_aspects(mut self, aspects: AspectConfig) -> Self {
        self.aspects = aspects;
        self
    }

    pub fn with_bodies(mut self, bodies: BodySelection) -> Self {
        self.bodies = bodies;
        self
    }

    /// Add a caller-supplied body such as an asteroid.
    pub fn with_extra_body(mut self, body: CelestialBody) -> Self {
        self.extra_bodies.push(body);
        self
    }

    /// Same place and settings at another moment.
    pub fn at(&self, moment: DateTime<Utc>) -> Self {
        Self {
            moment,
            ..self.clone()
        }
    }

    pub fn moment(&self) -> DateTime<Utc> {
        self.moment
    }

    pub fn location(&self) -> &Position {
        &self.location
    }

    pub fn house_config(&self) -> &HouseConfig {
        &self.houses
    }

    pub fn aspect_config(&self) -> &AspectConfig {
        &self.aspects
    }

    pub fn body_selection(&self) -> &BodySelection {
        &self.bodies
    }

    pub fn compute(&self, eph: &dyn Ephemeris) -> Result<ChartData, ChartError> {
        compute_chart(eph, self)
    }
}

/// Everything computed for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub moment: DateTime<Utc>,
    pub jd_ut: f64,
    pub jd_tt: f64,
    pub angles: ChartAngles,
    pub houses: HouseSet,
    pub bodies: Vec<CelestialBody>,
    pub aspects: Vec<ChartAspect>,
    pub patterns: Vec<AspectPattern>,
}

impl ChartData {
    pub fn body(&self, name: &str) -> Option<&CelestialBody> {
        self.bodies.iter().find(|b| b.name == name)
    }

    pub fn house_of_body(&self, name: &str) -> Option<u8> {
        self.body(name).map(|b| self.houses.house_of(b.longitude()))
    }

    /// Bodies as aspect points.
    pub fn body_points(&self) -> Vec<ChartPoint> {
        self.bodies.iter().map(CelestialBody::to_point).collect()
    }

    /// Ascendant and Midheaven as aspect points, without speeds.
    pub fn angle_points(&self) -> Result<Vec<ChartPoint>, ChartError> {
        Ok(vec![
            ChartPoint::new(ASCENDANT_LABEL, Position::ecliptic(self.angles.ascendant, 0.0)?, None),
            ChartPoint::new(MIDHEAVEN_LABEL, Position::ecliptic(self.angles.mc, 0.0)?, None),
        ])
    }

    /// Bodies followed by the two angles.
    pub fn all_points(&self) -> Result<Vec<ChartPoint>, ChartError> {
        let mut points = self.body_points();
        points.extend(self.angle_points()?);
        Ok(points)
    }
}

/// Compute bodies, angles, houses, aspects and patterns for `chart`.
pub fn compute_chart(eph: &dyn Ephemeris, chart: &Chart) -> Result<ChartData, ChartError> {
    chart.houses.validate()?;
    chart.bodies.validate()?;
    let engine = AspectEngine::new(chart.aspects.clone())?;

    let frame = ChartFrame::at(eph, &chart.moment, &chart.location)?;
    let angles = frame.angles();
    let houses = houses_for_frame(eph, &frame, &chart.houses)?;

    let mut bodies = Vec::with_capacity(chart.bodies.planets.len() + 2 + chart.extra_bodies.len());
    for &body in &chart.bodies.planets {
        bodies.push(CelestialBody::planet(eph, body, frame.jd_tt)?);
    }
    if let Some(mode) = chart.bodies.nodes {
        for node in [NodeKind::North, NodeKind::South] {
            bodies.push(CelestialBody::lunar_node(
                node,
                mode,
                frame.jd_tt,
                frame.nutation.longitude_deg,
            )?);
        }
    }
    for name in &chart.bodies.fixed_stars {
        let star = find_fixed_star(name)?;
        bodies.push(CelestialBody::fixed_star(star, frame.jd_tt, frame.nutation.longitude_deg)?);
    }
    bodies.extend(chart.extra_bodies.iter().cloned());

    let mut data = ChartData {
        moment: chart.moment,
        jd_ut: frame.jd_ut.to_f64(),
        jd_tt: frame.jd_tt.to_f64(),
        angles,
        houses,
        bodies,
        aspects: Vec::new(),
        patterns: Vec::new(),
    };
    let points = if chart.bodies.include_angles {
        data.all_points()?
    } else {
        data.body_points()
    };
    data.aspects = engine.detect_between(&points);
    data.patterns = detect_patterns(&engine, &points);

    debug!(
        "chart {} via {}: {} bodies, {} houses applied, {} aspects, {} patterns",
        chart.moment,
        eph.name(),
        data.bodies.len(),
        data.houses.applied,
        data.aspects.len(),
        data.patterns.len()
    );
    Ok(data)
}

/// Cross-aspects between two charts, bodies and angles included.
pub fn synastry(a: &ChartData, b: &ChartData, engine: &AspectEngine) -> Result<Vec<ChartAspect>, ChartError> {
    Ok(engine.detect_cross(&a.all_points()?, &b.all_points()?))
}

/// Aspects from the planets at `moment` to a natal chart's bodies and angles.
///
/// The transiting point is always `first`.
pub fn transits(
    eph: &dyn Ephemeris,
    natal: &ChartData,
    moment: &DateTime<Utc>,
    engine: &AspectEngine,
) -> Result<Vec<ChartAspect>, ChartError> {
    let jd = jd_tt(moment);
    let transiting = Body::ALL
        .iter()
        .map(|&body| CelestialBody::planet(eph, body, jd).map(|b| b.to_point()))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        "transits at {} (JD UT {:.5}) against natal {}",
        moment,
        datetime_to_julian_day(moment).to_f64(),
        natal.moment
    );
    Ok(engine.detect_cross(&transiting, &natal.all_points()?))
}
