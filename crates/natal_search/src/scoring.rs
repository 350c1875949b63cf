//! Match strengths for each rectification method.
//!
//! Every function here is pure: the sky at each event and the chart state
//! at each candidate are resolved beforehand, so scoring never touches
//! the ephemeris and runs unchanged on any worker thread.
//!
//! | Method        | Events                                          | Patterns                          |
//! |---------------|-------------------------------------------------|-----------------------------------|
//! | EVENT_BASED   | 0.4 angle transit + 0.4 solar arc + 0.2 houses  | rejected                          |
//! | PATTERN_BASED | max(angle pattern, 0.5 × angle aspect)          | s × (0.7 alignment + 0.3 presence)|
//! | HARMONIC      | best harmonic resonance, significators × Asc/MC | s × mean resonance of points      |

use chrono::{DateTime, Utc};
use natal_chart::{
    ASCENDANT_LABEL, AspectEngine, AspectKind, AspectPattern, CelestialBody, ChartAngles,
    ChartPoint, HouseSet, MIDHEAVEN_LABEL, aspect_orb, aspect_strength, detect_patterns,
};
use natal_core::Body;
use natal_frames::{Position, angular_separation, normalize_360};

use crate::rectify_types::{ChartAngle, LifeEvent, RecognizedPattern};

/// Naibod rate: the Sun's mean daily motion, applied as one degree of arc
/// per year of life.
pub const NAIBOD_DEG_PER_YEAR: f64 = 0.985_647_33;
/// Orb for transits over the angles.
pub const TRANSIT_ORB_DEG: f64 = 3.0;
/// Orb for directed angles to natal significators.
pub const DIRECTION_ORB_DEG: f64 = 1.0;
/// Orb for pattern points conjoining a candidate angle.
pub const ALIGNMENT_ORB_DEG: f64 = 8.0;
/// Harmonics summed by the resonance function, each weighted `1/h`.
pub const HARMONICS: [u32; 7] = [1, 2, 3, 4, 6, 8, 12];

const HARD_ASPECTS: [AspectKind; 3] = [AspectKind::Conjunction, AspectKind::Opposition, AspectKind::Square];
const DAYS_PER_YEAR: f64 = 365.25;

/// A named component of a match strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Signal {
    pub name: &'static str,
    pub value: f64,
    pub weight: f64,
}

/// Strength of one evidence item at one candidate.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Match {
    pub strength: f64,
    pub signals: Vec<Signal>,
}

impl Match {
    /// Weighted sum of the signals.
    fn blend(signals: Vec<Signal>) -> Self {
        let strength = signals.iter().map(|s| s.value * s.weight).sum::<f64>();
        Self {
            strength: strength.clamp(0.0, 1.0),
            signals,
        }
    }

    /// Best single weighted signal.
    fn strongest(signals: Vec<Signal>) -> Self {
        let strength = signals.iter().map(|s| s.value * s.weight).fold(0.0, f64::max);
        Self {
            strength: strength.clamp(0.0, 1.0),
            signals,
        }
    }
}

/// Planets at the moment of one event. Independent of the candidate.
#[derive(Debug, Clone)]
pub(crate) struct EventSky {
    pub event: LifeEvent,
    pub bodies: Vec<CelestialBody>,
}

impl EventSky {
    fn longitude(&self, body: Body) -> Option<f64> {
        self.bodies
            .iter()
            .find(|b| b.name == body.name())
            .map(CelestialBody::longitude)
    }

    fn significator_longitudes(&self) -> impl Iterator<Item = f64> + '_ {
        self.event
            .kind
            .significator_bodies()
            .iter()
            .filter_map(|&b| self.longitude(b))
    }
}

/// Chart state at one candidate birth time.
#[derive(Debug, Clone)]
pub(crate) struct CandidateSky {
    pub time: DateTime<Utc>,
    pub angles: ChartAngles,
    pub houses: HouseSet,
    pub natal: Vec<CelestialBody>,
    /// Natal patterns; only filled when pattern evidence needs them.
    pub patterns: Vec<AspectPattern>,
}

impl CandidateSky {
    fn natal_longitude(&self, body: Body) -> Option<f64> {
        self.natal
            .iter()
            .find(|b| b.name == body.name())
            .map(CelestialBody::longitude)
    }

    /// Ascendant and Midheaven as aspect points.
    pub fn angle_points(&self) -> Vec<ChartPoint> {
        [(ASCENDANT_LABEL, self.angles.ascendant), (MIDHEAVEN_LABEL, self.angles.mc)]
            .into_iter()
            .filter_map(|(label, lon)| Position::ecliptic(lon, 0.0).ok().map(|p| ChartPoint::new(label, p, None)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Strongest conjunction, opposition or square between two longitudes.
pub fn hard_aspect_strength(a: f64, b: f64, max_orb: f64) -> f64 {
    let separation = angular_separation(a, b);
    HARD_ASPECTS
        .iter()
        .map(|&k| aspect_strength(aspect_orb(separation, k), max_orb))
        .fold(0.0, f64::max)
}

/// `Σ w_h (1 + cos hΔ)/2 / Σ w_h` over [`HARMONICS`] with `w_h = 1/h`.
///
/// 1 when the two longitudes coincide; every harmonic in the set divides
/// 12, so 0° and 30° multiples score highest and irregular separations
/// lowest.
pub fn harmonic_resonance(a: f64, b: f64) -> f64 {
    let delta = (b - a).to_radians();
    let (num, den) = HARMONICS.iter().fold((0.0, 0.0), |(num, den), &h| {
        let h = f64::from(h);
        let w = 1.0 / h;
        (num + w * (1.0 + (h * delta).cos()) / 2.0, den + w)
    });
    num / den
}

/// Years from `birth` to `event`, never negative.
pub fn age_years(birth: &DateTime<Utc>, event: &DateTime<Utc>) -> f64 {
    let days = (*event - *birth).num_milliseconds() as f64 / 86_400_000.0;
    (days / DAYS_PER_YEAR).max(0.0)
}

/// Solar arc in degrees by the Naibod rate.
pub fn solar_arc_deg(age_years: f64) -> f64 {
    NAIBOD_DEG_PER_YEAR * age_years
}

// ---------------------------------------------------------------------------
// Event evidence
// ---------------------------------------------------------------------------

pub(crate) fn event_based(sky: &EventSky, candidate: &CandidateSky) -> Match {
    let kind = sky.event.kind;

    let angle_transit = kind
        .target_angles()
        .iter()
        .flat_map(|&angle| {
            let target = angle.longitude(&candidate.angles);
            sky.significator_longitudes()
                .map(move |lon| hard_aspect_strength(lon, target, TRANSIT_ORB_DEG))
        })
        .fold(0.0, f64::max);

    let arc = solar_arc_deg(age_years(&candidate.time, &sky.event.date));
    let solar_arc = [candidate.angles.ascendant, candidate.angles.mc]
        .into_iter()
        .flat_map(|angle| {
            let directed = normalize_360(angle + arc);
            kind.significator_bodies()
                .iter()
                .filter_map(|&b| candidate.natal_longitude(b))
                .map(move |natal| hard_aspect_strength(directed, natal, DIRECTION_ORB_DEG))
        })
        .fold(0.0, f64::max);

    let houses = kind.significator_houses();
    let lons: Vec<f64> = sky.significator_longitudes().collect();
    let activation = if lons.is_empty() {
        0.0
    } else {
        let hits = lons
            .iter()
            .filter(|&&lon| houses.contains(&candidate.houses.house_of(lon)))
            .count();
        hits as f64 / lons.len() as f64
    };

    Match::blend(vec![
        Signal { name: "angle_transit", value: angle_transit, weight: 0.4 },
        Signal { name: "solar_arc", value: solar_arc, weight: 0.4 },
        Signal { name: "house_activation", value: activation, weight: 0.2 },
    ])
}

pub(crate) fn pattern_based_event(engine: &AspectEngine, sky: &EventSky, candidate: &CandidateSky) -> Match {
    let mut points: Vec<ChartPoint> = sky.bodies.iter().map(CelestialBody::to_point).collect();
    let transit_count = points.len();
    points.extend(candidate.angle_points());

    let angle_pattern = detect_patterns(engine, &points)
        .iter()
        .filter(|p| p.members.iter().any(|&i| i >= transit_count))
        .map(|p| p.strength)
        .fold(0.0, f64::max);

    let angle_aspect = points[..transit_count]
        .iter()
        .flat_map(|t| points[transit_count..].iter().map(move |a| (t, a)))
        .filter_map(|(t, a)| engine.detect_points(t, a))
        .map(|a| a.strength)
        .fold(0.0, f64::max);

    Match::strongest(vec![
        Signal { name: "angle_pattern", value: angle_pattern, weight: 1.0 },
        Signal { name: "angle_aspect", value: angle_aspect, weight: 0.5 },
    ])
}

pub(crate) fn harmonic_event(sky: &EventSky, candidate: &CandidateSky) -> Match {
    let resonance = [candidate.angles.ascendant, candidate.angles.mc]
        .into_iter()
        .flat_map(|angle| sky.significator_longitudes().map(move |lon| harmonic_resonance(lon, angle)))
        .fold(0.0, f64::max);
    Match::blend(vec![Signal { name: "harmonic_resonance", value: resonance, weight: 1.0 }])
}

// ---------------------------------------------------------------------------
// Pattern evidence
// ---------------------------------------------------------------------------

pub(crate) fn pattern_based_pattern(pattern: &RecognizedPattern, candidate: &CandidateSky) -> Match {
    let alignment = pattern
        .points
        .iter()
        .map(|&p| {
            ChartAngle::ALL
                .iter()
                .map(|a| aspect_strength(angular_separation(p, a.longitude(&candidate.angles)), ALIGNMENT_ORB_DEG))
                .fold(0.0, f64::max)
        })
        .sum::<f64>()
        / pattern.points.len() as f64;

    let presence = candidate
        .patterns
        .iter()
        .filter(|p| p.kind == pattern.kind)
        .filter(|p| p.contains_label(ASCENDANT_LABEL) || p.contains_label(MIDHEAVEN_LABEL))
        .map(|p| p.strength)
        .fold(0.0, f64::max);

    let mut m = Match::blend(vec![
        Signal { name: "alignment", value: alignment, weight: 0.7 },
        Signal { name: "presence", value: presence, weight: 0.3 },
    ]);
    m.strength *= pattern.strength;
    m
}

pub(crate) fn harmonic_pattern(pattern: &RecognizedPattern, candidate: &CandidateSky) -> Match {
    let resonance = pattern
        .points
        .iter()
        .map(|&p| {
            harmonic_resonance(p, candidate.angles.ascendant).max(harmonic_resonance(p, candidate.angles.mc))
        })
        .sum::<f64>()
        / pattern.points.len() as f64;
    let mut m = Match::blend(vec![Signal { name: "harmonic_resonance", value: resonance, weight: 1.0 }]);
    m.strength *= pattern.strength;
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rectify_types::EventKind;
    use chrono::TimeZone;
    use natal_chart::{HouseConfig, HouseSystem, PatternKind, houses_from_lst};

    fn candidate(lst: f64) -> CandidateSky {
        let houses = houses_from_lst(lst, 0.0, 23.44, &HouseConfig::with_system(HouseSystem::Equal)).unwrap();
        CandidateSky {
            time: Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap(),
            angles: ChartAngles::from_lst(lst, 0.0, 23.44),
            houses,
            natal: Vec::new(),
            patterns: Vec::new(),
        }
    }

    fn body(b: Body, lon: f64) -> CelestialBody {
        CelestialBody::new(
            b.name(),
            natal_chart::BodyKind::Planet(b),
            Position::ecliptic(lon, 0.0).unwrap(),
            Some(0.1),
        )
    }

    #[test]
    fn resonance_bounds() {
        assert!((harmonic_resonance(10.0, 10.0) - 1.0).abs() < 1e-12);
        for d in [0.0, 17.0, 45.0, 90.0, 137.5, 180.0] {
            let r = harmonic_resonance(0.0, d);
            assert!((0.0..=1.0).contains(&r), "{d}: {r}");
        }
        assert!(harmonic_resonance(0.0, 90.0) > harmonic_resonance(0.0, 17.0));
    }

    #[test]
    fn hard_aspect_strength_picks_best() {
        assert!((hard_aspect_strength(0.0, 91.0, 2.0) - 0.5).abs() < 1e-12);
        assert_eq!(hard_aspect_strength(0.0, 60.0, 3.0), 0.0);
        assert_eq!(hard_aspect_strength(359.0, 179.0, 1.0), 1.0);
    }

    #[test]
    fn age_and_arc() {
        let birth = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let age = age_years(&birth, &later);
        assert!((age - 30.0).abs() < 0.01);
        assert!((solar_arc_deg(age) - 29.57).abs() < 0.02);
        assert_eq!(age_years(&later, &birth), 0.0);
    }

    #[test]
    fn marriage_transit_over_descendant() {
        let cand = candidate(0.0);
        let desc = cand.angles.descendant;
        let sky = EventSky {
            event: LifeEvent::new(Utc.with_ymd_and_hms(2015, 6, 1, 0, 0, 0).unwrap(), EventKind::Marriage),
            bodies: vec![body(Body::Venus, desc), body(Body::Jupiter, desc + 10.0), body(Body::Moon, desc + 200.0)],
        };
        let m = event_based(&sky, &cand);
        assert_eq!(m.signals[0].name, "angle_transit");
        assert!((m.signals[0].value - 1.0).abs() < 1e-9);
        // Jupiter ten degrees past the Descendant is inside the 7th.
        assert!(m.signals[2].value > 0.0);
        assert!(m.strength >= 0.4 && m.strength <= 1.0);
    }

    #[test]
    fn pattern_alignment_peaks_on_angle() {
        let cand = candidate(45.0);
        let on_asc = RecognizedPattern::new(PatternKind::TSquare, vec![cand.angles.ascendant], 1.0);
        let off = RecognizedPattern::new(PatternKind::TSquare, vec![cand.angles.ascendant + 20.0], 1.0);
        let m_on = pattern_based_pattern(&on_asc, &cand);
        let m_off = pattern_based_pattern(&off, &cand);
        assert!((m_on.strength - 0.7).abs() < 1e-9, "{}", m_on.strength);
        assert!(m_off.strength < m_on.strength);
        let half = RecognizedPattern { strength: 0.5, ..on_asc };
        assert!((pattern_based_pattern(&half, &cand).strength - 0.35).abs() < 1e-9);
    }

    #[test]
    fn harmonic_pattern_is_scaled_by_strength() {
        let cand = candidate(10.0);
        let p = RecognizedPattern::new(PatternKind::GrandTrine, vec![cand.angles.mc], 0.25);
        let m = harmonic_pattern(&p, &cand);
        assert!((m.strength - 0.25).abs() < 1e-9);
    }
}
