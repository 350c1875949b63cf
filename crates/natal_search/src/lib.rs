//! Birth-time rectification.
//!
//! This crate provides:
//! - event evidence (dated life events) and pattern evidence (recognized
//!   configurations with their longitudes)
//! - three scoring strategies: EVENT_BASED, PATTERN_BASED and HARMONIC
//! - a parallel candidate scan with deterministic tie-breaking and an
//!   optional time budget
//! - confidence decomposed into auditable factors

pub mod error;
pub mod rectify;
pub mod rectify_types;
pub mod scoring;

pub use error::RectificationError;
pub use rectify::{
    COVERAGE_THRESHOLD, RIVAL_SEPARATION_MINUTES, rectify, rectify_multiple_events,
    rectify_patterns, rectify_single_event,
};
pub use rectify_types::{
    ALL_EVENT_KINDS, ALL_METHODS, ChartAngle, ConfidenceFactor, EventKind, EventMatch, Evidence,
    LifeEvent, MAX_WINDOW_HALF_WIDTH_HOURS, MatchSignal, PatternMatch, RecognizedPattern, RectificationConfig,
    RectificationMethod, RectificationRequest, RectificationResult, TimeWindow,
};
pub use scoring::{
    ALIGNMENT_ORB_DEG, DIRECTION_ORB_DEG, HARMONICS, NAIBOD_DEG_PER_YEAR, TRANSIT_ORB_DEG,
    age_years, harmonic_resonance, hard_aspect_strength, solar_arc_deg,
};
