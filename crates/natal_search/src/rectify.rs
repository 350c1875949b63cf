//! Rectification search.
//!
//! A request is validated in full before the ephemeris is touched. The
//! sky at each event is resolved once; then every candidate time in the
//! window is turned into angles, houses and natal positions and scored
//! against each evidence item. Candidates are independent, so they are
//! scored on the rayon pool and reduced sequentially: the highest score
//! wins and ties go to the earliest candidate.
//!
//! Confidence is `0.5·peak + 0.3·distinctness + 0.2·coverage`:
//! - peak: the winning score, the weighted mean match strength
//! - distinctness: how far the peak stands above the best candidate more
//!   than [`RIVAL_SEPARATION_MINUTES`] away, relative to the peak
//! - coverage: weighted share of evidence items matched at ≥ 0.5

use std::time::{Duration as WallDuration, Instant};

use chrono::{DateTime, Duration, Utc};
use log::{debug, trace, warn};
use natal_chart::{
    AspectEngine, CelestialBody, Chart, ChartFrame, ChartPoint, detect_patterns, houses_for_frame,
};
use natal_core::{Body, Ephemeris};
use natal_time::jd_tt;
use rayon::prelude::*;

use crate::error::RectificationError;
use crate::rectify_types::{
    ConfidenceFactor, EventMatch, Evidence, LifeEvent, MatchSignal, PatternMatch,
    RectificationConfig, RectificationMethod, RectificationRequest, RectificationResult, TimeWindow,
};
use crate::scoring::{
    CandidateSky, EventSky, Match, Signal, event_based, harmonic_event, harmonic_pattern,
    pattern_based_event, pattern_based_pattern,
};

/// Candidates closer than this to the winner are not counted as rivals.
pub const RIVAL_SEPARATION_MINUTES: i64 = 30;
/// Match strength at which an evidence item counts as covered.
pub const COVERAGE_THRESHOLD: f64 = 0.5;

const PEAK_WEIGHT: f64 = 0.5;
const DISTINCTNESS_WEIGHT: f64 = 0.3;
const COVERAGE_WEIGHT: f64 = 0.2;

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Rectify from a single life event.
pub fn rectify_single_event(
    eph: &dyn Ephemeris,
    chart: &Chart,
    event: LifeEvent,
    method: RectificationMethod,
    config: &RectificationConfig,
) -> Result<RectificationResult, RectificationError> {
    let request = RectificationRequest::events(chart.clone(), vec![event], method).with_config(*config);
    rectify(eph, &request)
}

/// Rectify from several weighted life events.
pub fn rectify_multiple_events(
    eph: &dyn Ephemeris,
    request: &RectificationRequest,
) -> Result<RectificationResult, RectificationError> {
    if let Evidence::Patterns(_) = request.evidence {
        return Err(RectificationError::WrongEvidence {
            expected: "event",
            found: "pattern",
        });
    }
    rectify(eph, request)
}

/// Rectify from recognized geometric patterns.
pub fn rectify_patterns(
    eph: &dyn Ephemeris,
    request: &RectificationRequest,
) -> Result<RectificationResult, RectificationError> {
    if let Evidence::Events(_) = request.evidence {
        return Err(RectificationError::WrongEvidence {
            expected: "pattern",
            found: "event",
        });
    }
    rectify(eph, request)
}

/// Rectify from whatever evidence the request carries.
pub fn rectify(
    eph: &dyn Ephemeris,
    request: &RectificationRequest,
) -> Result<RectificationResult, RectificationError> {
    let plan = Plan::new(request)?;
    debug!(
        "rectify {} with {} {} item(s) over {} .. {}: {} candidates at {} min",
        request.method,
        request.evidence.len(),
        request.evidence.label(),
        plan.window.start,
        plan.window.end,
        plan.candidates.len(),
        request.config.step_minutes
    );

    let skies = match &request.evidence {
        Evidence::Events(events) => events
            .iter()
            .map(|e| event_sky(eph, e))
            .collect::<Result<Vec<_>, _>>()?,
        Evidence::Patterns(_) => Vec::new(),
    };

    let started = Instant::now();
    let deadline = request
        .config
        .time_budget_ms
        .map(|ms| started + WallDuration::from_millis(ms));

    let scored: Vec<Option<Scored>> = plan
        .candidates
        .par_iter()
        .enumerate()
        .map(|(index, &time)| {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(None);
            }
            let scored = score_candidate(eph, request, &plan, &skies, index, time)?;
            trace!("candidate {} {}: score {:.6}", index, time, scored.score);
            Ok(Some(scored))
        })
        .collect::<Result<_, RectificationError>>()?;

    let evaluated: Vec<&Scored> = scored.iter().flatten().collect();
    let complete = evaluated.len() == plan.candidates.len();
    if !complete {
        warn!(
            "rectification time budget exhausted after {} of {} candidates",
            evaluated.len(),
            plan.candidates.len()
        );
    }

    let best = pick_best(&evaluated).ok_or(RectificationError::DeadlineExceeded {
        budget_ms: request.config.time_budget_ms.unwrap_or(0),
    })?;

    let result = build_result(request, &plan, &evaluated, best, complete);
    debug!(
        "rectified to {} (score {:.4}, confidence {:.4}, {} of {} candidates)",
        result.rectified_time,
        result.score,
        result.confidence,
        result.candidates_evaluated,
        result.candidates_total
    );
    Ok(result)
}

// ---------------------------------------------------------------------------
// Validation and candidate grid
// ---------------------------------------------------------------------------

/// A validated request: the window, its candidate times and normalized weights.
#[derive(Debug)]
struct Plan {
    window: TimeWindow,
    candidates: Vec<DateTime<Utc>>,
    weights: Vec<f64>,
    weight_sum: f64,
    engine: AspectEngine,
}

impl Plan {
    /// Every check that needs no ephemeris.
    fn new(request: &RectificationRequest) -> Result<Self, RectificationError> {
        request.config.validate()?;
        request.chart.house_config().validate()?;
        let engine = AspectEngine::new(request.chart.aspect_config().clone())?;

        if request.evidence.is_empty() {
            return Err(RectificationError::EmptyEvidence);
        }
        match &request.evidence {
            Evidence::Patterns(patterns) => {
                if request.method == RectificationMethod::EventBased {
                    return Err(RectificationError::MethodMismatch {
                        method: request.method.name(),
                        evidence: request.evidence.label(),
                    });
                }
                for (i, p) in patterns.iter().enumerate() {
                    p.validate(i)?;
                }
            }
            Evidence::Events(_) => {}
        }

        let weights = resolve_weights(request.weights.as_deref(), request.evidence.len())?;
        let weight_sum = weights.iter().sum();

        let window = request.effective_window()?;
        if window.end < window.start {
            return Err(RectificationError::InvertedWindow {
                start: window.start,
                end: window.end,
            });
        }
        if window.end == window.start {
            return Err(RectificationError::EmptyWindow);
        }
        if let Evidence::Events(events) = &request.evidence {
            if let Some((index, e)) = events.iter().enumerate().find(|(_, e)| e.date < window.start) {
                return Err(RectificationError::EventBeforeWindow { index, date: e.date });
            }
        }

        let candidates = candidate_times(&window, request.config.step(), request.config.max_candidates)?;
        Ok(Self {
            window,
            candidates,
            weights,
            weight_sum,
            engine,
        })
    }
}

fn resolve_weights(weights: Option<&[f64]>, items: usize) -> Result<Vec<f64>, RectificationError> {
    let Some(weights) = weights else {
        return Ok(vec![1.0; items]);
    };
    if weights.len() != items {
        return Err(RectificationError::WeightCountMismatch {
            weights: weights.len(),
            items,
        });
    }
    if let Some((index, &value)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
    {
        return Err(RectificationError::InvalidWeight { index, value });
    }
    if weights.iter().all(|&w| w == 0.0) {
        return Err(RectificationError::ZeroWeights);
    }
    Ok(weights.to_vec())
}

/// `start + k·step` up to `end`, with `end` appended when off-grid.
fn candidate_times(
    window: &TimeWindow,
    step: Duration,
    limit: usize,
) -> Result<Vec<DateTime<Utc>>, RectificationError> {
    let step_ms = step.num_milliseconds().max(1);
    let span_ms = window.duration().num_milliseconds();
    let steps = (span_ms / step_ms) as usize;
    let on_grid = span_ms % step_ms == 0;
    let count = steps + 1 + usize::from(!on_grid);
    if count > limit {
        return Err(RectificationError::TooManyCandidates { count, limit });
    }
    let mut times: Vec<DateTime<Utc>> = (0..=steps)
        .map(|k| window.start + Duration::milliseconds(step_ms * k as i64))
        .collect();
    if !on_grid {
        times.push(window.end);
    }
    Ok(times)
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Scored {
    index: usize,
    time: DateTime<Utc>,
    score: f64,
    matches: Vec<Match>,
}

fn event_sky(eph: &dyn Ephemeris, event: &LifeEvent) -> Result<EventSky, RectificationError> {
    let jd = jd_tt(&event.date);
    let bodies = Body::ALL
        .iter()
        .map(|&b| CelestialBody::planet(eph, b, jd))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EventSky {
        event: event.clone(),
        bodies,
    })
}

fn candidate_sky(
    eph: &dyn Ephemeris,
    chart: &Chart,
    engine: &AspectEngine,
    time: DateTime<Utc>,
    with_patterns: bool,
) -> Result<CandidateSky, RectificationError> {
    let frame = ChartFrame::at(eph, &time, chart.location())?;
    let houses = houses_for_frame(eph, &frame, chart.house_config())?;
    let natal = Body::ALL
        .iter()
        .map(|&b| CelestialBody::planet(eph, b, frame.jd_tt))
        .collect::<Result<Vec<_>, _>>()?;
    let mut sky = CandidateSky {
        time,
        angles: frame.angles(),
        houses,
        natal,
        patterns: Vec::new(),
    };
    if with_patterns {
        let mut points: Vec<ChartPoint> = sky.natal.iter().map(CelestialBody::to_point).collect();
        points.extend(sky.angle_points());
        sky.patterns = detect_patterns(engine, &points);
    }
    Ok(sky)
}

fn score_candidate(
    eph: &dyn Ephemeris,
    request: &RectificationRequest,
    plan: &Plan,
    skies: &[EventSky],
    index: usize,
    time: DateTime<Utc>,
) -> Result<Scored, RectificationError> {
    let with_patterns = matches!(
        (&request.evidence, request.method),
        (Evidence::Patterns(_), RectificationMethod::PatternBased)
    );
    let candidate = candidate_sky(eph, &request.chart, &plan.engine, time, with_patterns)?;

    let matches: Vec<Match> = match &request.evidence {
        Evidence::Events(_) => skies
            .iter()
            .map(|sky| match request.method {
                RectificationMethod::EventBased => event_based(sky, &candidate),
                RectificationMethod::PatternBased => pattern_based_event(&plan.engine, sky, &candidate),
                RectificationMethod::Harmonic => harmonic_event(sky, &candidate),
            })
            .collect(),
        Evidence::Patterns(patterns) => patterns
            .iter()
            .map(|p| match request.method {
                RectificationMethod::Harmonic => harmonic_pattern(p, &candidate),
                // Rejected for pattern evidence during validation.
                RectificationMethod::EventBased | RectificationMethod::PatternBased => {
                    pattern_based_pattern(p, &candidate)
                }
            })
            .collect(),
    };

    let score = matches
        .iter()
        .zip(&plan.weights)
        .map(|(m, w)| m.strength * w)
        .sum::<f64>()
        / plan.weight_sum;
    Ok(Scored {
        index,
        time,
        score,
        matches,
    })
}

/// Highest score; the earliest candidate wins a tie.
fn pick_best<'a>(evaluated: &[&'a Scored]) -> Option<&'a Scored> {
    let mut best: Option<&Scored> = None;
    for &c in evaluated {
        match best {
            Some(b) if c.score > b.score || (c.score == b.score && c.index < b.index) => best = Some(c),
            None => best = Some(c),
            _ => {}
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Result assembly
// ---------------------------------------------------------------------------

fn distinctness(evaluated: &[&Scored], best: &Scored) -> f64 {
    if best.score <= 0.0 {
        return 0.0;
    }
    let min_gap = Duration::minutes(RIVAL_SEPARATION_MINUTES);
    let rival = evaluated
        .iter()
        .filter(|c| (c.time - best.time).abs() > min_gap)
        .map(|c| c.score)
        .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));
    let rival = rival.unwrap_or_else(|| evaluated.iter().map(|c| c.score).sum::<f64>() / evaluated.len() as f64);
    ((best.score - rival) / best.score).clamp(0.0, 1.0)
}

fn signals(m: &Match) -> Vec<MatchSignal> {
    m.signals
        .iter()
        .map(|&Signal { name, value, weight }| MatchSignal {
            name: name.to_string(),
            value,
            weight,
        })
        .collect()
}

fn factor(name: &str, value: f64, weight: f64) -> ConfidenceFactor {
    ConfidenceFactor {
        name: name.to_string(),
        value,
        weight,
        contribution: value * weight,
    }
}

fn build_result(
    request: &RectificationRequest,
    plan: &Plan,
    evaluated: &[&Scored],
    best: &Scored,
    complete: bool,
) -> RectificationResult {
    let peak = best.score.clamp(0.0, 1.0);
    let distinct = distinctness(evaluated, best);
    let coverage = best
        .matches
        .iter()
        .zip(&plan.weights)
        .filter(|(m, _)| m.strength >= COVERAGE_THRESHOLD)
        .map(|(_, w)| w)
        .sum::<f64>()
        / plan.weight_sum;

    let confidence_factors = vec![
        factor("peak_score", peak, PEAK_WEIGHT),
        factor("distinctness", distinct, DISTINCTNESS_WEIGHT),
        factor("evidence_coverage", coverage, COVERAGE_WEIGHT),
    ];
    let confidence = confidence_factors
        .iter()
        .map(|f| f.contribution)
        .sum::<f64>()
        .clamp(0.0, 1.0);

    let contribution = |i: usize, m: &Match| plan.weights[i] * m.strength / plan.weight_sum;
    let (event_matches, pattern_matches) = match &request.evidence {
        Evidence::Events(events) => (
            events
                .iter()
                .zip(&best.matches)
                .enumerate()
                .map(|(i, (e, m))| EventMatch {
                    index: i,
                    kind: e.kind,
                    date: e.date,
                    weight: plan.weights[i],
                    strength: m.strength,
                    contribution: contribution(i, m),
                    signals: signals(m),
                })
                .collect(),
            Vec::new(),
        ),
        Evidence::Patterns(patterns) => (
            Vec::new(),
            patterns
                .iter()
                .zip(&best.matches)
                .enumerate()
                .map(|(i, (p, m))| PatternMatch {
                    index: i,
                    kind: p.kind,
                    weight: plan.weights[i],
                    strength: m.strength,
                    contribution: contribution(i, m),
                    signals: signals(m),
                })
                .collect(),
        ),
    };

    RectificationResult {
        rectified_time: best.time,
        confidence,
        method: request.method,
        score: best.score,
        event_matches,
        pattern_matches,
        confidence_factors,
        window: plan.window,
        step_minutes: request.config.step_minutes,
        candidates_total: plan.candidates.len(),
        candidates_evaluated: evaluated.len(),
        complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window(h0: u32, h1: u32) -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(1990, 5, 1, h0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(1990, 5, 1, h1, 0, 0).unwrap(),
        )
    }

    #[test]
    fn grid_includes_both_ends() {
        let times = candidate_times(&window(0, 1), Duration::minutes(2), 1000).unwrap();
        assert_eq!(times.len(), 31);
        assert_eq!(times[0], window(0, 1).start);
        assert_eq!(*times.last().unwrap(), window(0, 1).end);
    }

    #[test]
    fn off_grid_end_is_appended() {
        let times = candidate_times(&window(0, 1), Duration::minutes(7), 1000).unwrap();
        assert_eq!(times.len(), 10);
        assert_eq!(times[8], window(0, 1).start + Duration::minutes(56));
        assert_eq!(times[9], window(0, 1).end);
    }

    #[test]
    fn candidate_limit_enforced() {
        let err = candidate_times(&window(0, 10), Duration::minutes(1), 100).unwrap_err();
        assert_eq!(err, RectificationError::TooManyCandidates { count: 601, limit: 100 });
    }

    #[test]
    fn weights_default_and_validate() {
        assert_eq!(resolve_weights(None, 3).unwrap(), vec![1.0; 3]);
        assert!(matches!(
            resolve_weights(Some(&[1.0]), 2),
            Err(RectificationError::WeightCountMismatch { weights: 1, items: 2 })
        ));
        assert!(matches!(
            resolve_weights(Some(&[1.0, -0.5]), 2),
            Err(RectificationError::InvalidWeight { index: 1, .. })
        ));
        assert_eq!(resolve_weights(Some(&[0.0, 0.0]), 2), Err(RectificationError::ZeroWeights));
    }

    fn scored(index: usize, minutes: i64, score: f64) -> Scored {
        Scored {
            index,
            time: window(0, 1).start + Duration::minutes(minutes),
            score,
            matches: Vec::new(),
        }
    }

    #[test]
    fn ties_go_to_the_earliest_candidate() {
        let a = scored(0, 0, 0.4);
        let b = scored(1, 2, 0.9);
        let c = scored(2, 4, 0.9);
        let best = pick_best(&[&c, &a, &b]).unwrap();
        assert_eq!(best.index, 1);
        assert!(pick_best(&[]).is_none());
    }

    #[test]
    fn distinctness_uses_distant_rival() {
        let best = scored(0, 0, 0.8);
        let near = scored(1, 10, 0.79);
        let far = scored(2, 120, 0.4);
        let d = distinctness(&[&best, &near, &far], &best);
        assert!((d - 0.5).abs() < 1e-12);
        // Without a distant rival the mean is the baseline.
        let d = distinctness(&[&best, &near], &best);
        assert!((d - (0.8 - 0.795) / 0.8).abs() < 1e-12);
    }
}
