//! Chart geometry: angles, houses, aspects, patterns and bodies.
//!
//! Every entry point that needs the sky takes an injected
//! [`natal_core::Ephemeris`]; the house and aspect engines themselves are
//! pure functions of longitudes, sidereal time and latitude.
//!
//! ```rust,ignore
//! let eph = AnalyticEphemeris::default();
//! let chart = Chart::new(moment, Position::geographic(51.5, -0.13)?)?
//!     .with_houses(HouseConfig::with_system(HouseSystem::Koch));
//! let data = compute_chart(&eph, &chart)?;
//! for asp in &data.aspects {
//!     println!("{} {} {} (orb {:.2}°)", asp.first, asp.aspect.kind, asp.second, asp.aspect.orb);
//! }
//! ```

pub mod angles;
pub mod aspect_types;
pub mod aspects;
pub mod bodies;
pub mod chart;
pub mod error;
pub mod house_types;
pub mod houses;
pub mod nodes;
pub mod patterns;

pub use angles::{
    ChartAngles, ChartFrame, ascendant_deg, calculate_nutation, calculate_obliquity, mc_deg,
    require_geographic,
};
pub use aspect_types::{
    ALL_ASPECT_KINDS, Aspect, AspectConfig, AspectKind, AspectMotion, ChartAspect, ChartPoint,
    MAJOR_ASPECTS,
};
pub use aspects::{AspectEngine, EXACT_ORB_DEG, aspect_motion, aspect_orb, aspect_strength};
pub use bodies::{BodyKind, CelestialBody, FIXED_STARS, FixedStar, find_fixed_star};
pub use chart::{
    ASCENDANT_LABEL, BodySelection, Chart, ChartData, MIDHEAVEN_LABEL, compute_chart, synastry,
    transits,
};
pub use error::{ChartError, ErrorKind};
pub use house_types::{
    ALL_HOUSE_SYSTEMS, HouseConfig, HouseSet, HouseStartingPoint, HouseSystem, house_of,
};
pub use houses::{compute_houses, houses_for_frame, houses_from_lst};
pub use nodes::{NodeKind, NodeMode, lunar_node_deg, mean_node_deg, true_node_deg};
pub use patterns::{ALL_PATTERN_KINDS, AspectPattern, PatternKind, detect_patterns};
