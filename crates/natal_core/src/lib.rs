//! Ephemeris contract and sources.
//!
//! The chart engine never reaches for a global ephemeris: every
//! computation receives an [`Ephemeris`] handle. This crate provides the
//! trait, the [`AnalyticEphemeris`] used by default, a [`TableEphemeris`]
//! for reproducible fixtures, and an [`InstrumentedEphemeris`] wrapper
//! that counts queries.
//!
//! ```rust,ignore
//! let eph: Arc<dyn Ephemeris> = Arc::new(AnalyticEphemeris::new(config)?);
//! let handle = std::thread::spawn({
//!     let eph = Arc::clone(&eph);
//!     move || eph.body_state(Body::Sun, jd_tt)
//! });
//! ```

pub mod analytic;
pub mod body;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod table;

pub use analytic::AnalyticEphemeris;
pub use body::Body;
pub use config::EphemerisConfig;
pub use ephemeris::{BodyState, Ephemeris, InstrumentedEphemeris, QueryStats};
pub use error::EphemerisError;
pub use table::{LinearMotion, TableEphemeris};
