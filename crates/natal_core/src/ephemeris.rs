//! The ephemeris contract the chart engine consumes.
//!
//! Sources are injected as `&dyn Ephemeris` (or `Arc<dyn Ephemeris>`) into
//! every computation; there is no process-wide instance. Implementations
//! must be deterministic for a fixed Julian Day.

use std::sync::atomic::{AtomicU32, Ordering};

use natal_frames::{Nutation, mean_obliquity_deg};
use natal_time::JulianDay;
use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::error::EphemerisError;

/// Geocentric apparent ecliptic coordinates of date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    /// Ecliptic longitude in degrees, [0, 360).
    pub longitude_deg: f64,
    /// Ecliptic latitude in degrees.
    pub latitude_deg: f64,
    /// Geocentric distance in AU.
    pub distance_au: f64,
    /// Longitude rate in degrees per day (negative when retrograde).
    pub longitude_speed: f64,
}

/// A source of planetary positions and Earth-orientation angles.
///
/// All epochs are Julian Days on the TT scale.
pub trait Ephemeris: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Geocentric apparent ecliptic state of `body`.
    fn body_state(&self, body: Body, jd_tt: JulianDay) -> Result<BodyState, EphemerisError>;

    /// Nutation in longitude and obliquity. Defaults to IAU 2000B.
    fn nutation(&self, jd_tt: JulianDay) -> Result<Nutation, EphemerisError> {
        Ok(Nutation::at(jd_tt.centuries_since_j2000()))
    }

    /// True obliquity of the ecliptic in degrees.
    fn obliquity(&self, jd_tt: JulianDay) -> Result<f64, EphemerisError> {
        let nutation = self.nutation(jd_tt)?;
        Ok(mean_obliquity_deg(jd_tt.centuries_since_j2000()) + nutation.obliquity_deg)
    }
}

/// Call counts recorded by [`InstrumentedEphemeris`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryStats {
    pub body_queries: u32,
    pub orientation_queries: u32,
}

/// Wraps another source and counts how often it is consulted.
///
/// Useful to assert that input validation happens before any lookup, and
/// to profile how many queries a computation issues.
#[derive(Debug)]
pub struct InstrumentedEphemeris<E> {
    inner: E,
    body_queries: AtomicU32,
    orientation_queries: AtomicU32,
}

impl<E: Ephemeris> InstrumentedEphemeris<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            body_queries: AtomicU32::new(0),
            orientation_queries: AtomicU32::new(0),
        }
    }

    pub fn stats(&self) -> QueryStats {
        QueryStats {
            body_queries: self.body_queries.load(Ordering::Relaxed),
            orientation_queries: self.orientation_queries.load(Ordering::Relaxed),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Ephemeris> Ephemeris for InstrumentedEphemeris<E> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn body_state(&self, body: Body, jd_tt: JulianDay) -> Result<BodyState, EphemerisError> {
        self.body_queries.fetch_add(1, Ordering::Relaxed);
        self.inner.body_state(body, jd_tt)
    }

    fn nutation(&self, jd_tt: JulianDay) -> Result<Nutation, EphemerisError> {
        self.orientation_queries.fetch_add(1, Ordering::Relaxed);
        self.inner.nutation(jd_tt)
    }

    fn obliquity(&self, jd_tt: JulianDay) -> Result<f64, EphemerisError> {
        self.orientation_queries.fetch_add(1, Ordering::Relaxed);
        self.inner.obliquity(jd_tt)
    }
}
