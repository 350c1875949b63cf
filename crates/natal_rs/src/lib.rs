//! Request-level facade for the natal chart engine.
//!
//! Accepts string-shaped input (timestamps with zones, system and aspect
//! names, event and pattern types), validates all of it up front, and
//! returns serializable results. The ephemeris is injected; there is no
//! global engine.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use natal_rs::*;
//!
//! let service = ChartService::from_config(NatalConfig::load_default()?)?;
//! let mut request = ChartRequest::new("1990-07-15T06:45:00+02:00", 52.52, 13.405);
//! request.house_system = Some("KOCH".into());
//! let chart = service.calculate_chart(&request)?;
//! println!("Ascendant {:.2}°", chart.angles.ascendant);
//! ```

pub mod error;
pub mod request;
pub mod service;

pub use error::NatalError;
pub use request::{
    ChartRequest, EventInput, PatternInput, RectificationInput, TransitRequest, WindowInput,
};
pub use service::{ChartService, SynastryResult, TransitResult};

// Re-export the types callers meet in results so they need only this crate.
pub use natal_chart::{
    Aspect, AspectKind, AspectMotion, AspectPattern, CelestialBody, ChartAngles, ChartAspect,
    ChartData, ErrorKind, HouseSet, HouseSystem, PatternKind,
};
pub use natal_config::NatalConfig;
pub use natal_core::{AnalyticEphemeris, Body, Ephemeris};
pub use natal_frames::{CoordinateSystem, Position};
pub use natal_search::{
    ConfidenceFactor, EventKind, EventMatch, PatternMatch, RectificationMethod,
    RectificationResult,
};
