//! Embedded analytic ephemeris.
//!
//! Planets: Keplerian mean elements and rates referred to the J2000
//! ecliptic and equinox (Standish, "Approximate Positions of the Planets",
//! JPL/SSD, Table 1; valid 1800–2050, usable with degraded accuracy to
//! 2200). Geocentric vectors are taken relative to the Earth-Moon
//! barycentre, then precessed to the equinox of date and corrected for
//! nutation in longitude.
//!
//! Moon: truncated series from the Astronomical Almanac low-precision
//! formulae (≈0.3° in longitude), already referred to the mean equinox of
//! date.
//!
//! Typical error is under an arcminute for the inner planets and the Sun.
//! Sources needing arc-second accuracy plug in through [`Ephemeris`].

use natal_frames::{
    SphericalCoords, cartesian_to_spherical, general_precession_longitude_deg, normalize_360,
    normalize_pm180,
};
use natal_time::JulianDay;

use crate::body::Body;
use crate::config::EphemerisConfig;
use crate::ephemeris::{BodyState, Ephemeris};
use crate::error::EphemerisError;

/// Equatorial radius of the Earth in AU.
const EARTH_RADIUS_AU: f64 = 6378.137 / 149_597_870.7;

/// Mean elements at J2000 and their rates per Julian century.
///
/// Columns: a (AU), e, I (°), L (°), ϖ (°), Ω (°).
#[derive(Debug, Clone, Copy)]
struct Elements {
    base: [f64; 6],
    rate: [f64; 6],
}

#[rustfmt::skip]
const MERCURY: Elements = Elements {
    base: [0.38709927, 0.20563593, 7.00497902, 252.25032350, 77.45779628, 48.33076593],
    rate: [0.00000037, 0.00001906, -0.00594749, 149472.67411175, 0.16047689, -0.12534081],
};
#[rustfmt::skip]
const VENUS: Elements = Elements {
    base: [0.72333566, 0.00677672, 3.39467605, 181.97909950, 131.60246718, 76.67984255],
    rate: [0.00000390, -0.00004107, -0.00078890, 58517.81538729, 0.00268329, -0.27769418],
};
#[rustfmt::skip]
const EARTH_MOON_BARYCENTER: Elements = Elements {
    base: [1.00000261, 0.01671123, -0.00001531, 100.46457166, 102.93768193, 0.0],
    rate: [0.00000562, -0.00004392, -0.01294668, 35999.37244981, 0.32327364, 0.0],
};
#[rustfmt::skip]
const MARS: Elements = Elements {
    base: [1.52371034, 0.09339410, 1.84969142, -4.55343205, -23.94362959, 49.55953891],
    rate: [0.00001847, 0.00007882, -0.00813131, 19140.30268499, 0.44441088, -0.29257343],
};
#[rustfmt::skip]
const JUPITER: Elements = Elements {
    base: [5.20288700, 0.04838624, 1.30439695, 34.39644051, 14.72847983, 100.47390909],
    rate: [-0.00011607, -0.00013253, -0.00183714, 3034.74612775, 0.21252668, 0.20469106],
};
#[rustfmt::skip]
const SATURN: Elements = Elements {
    base: [9.53667594, 0.05386179, 2.48599187, 49.95424423, 92.59887831, 113.66242448],
    rate: [-0.00125060, -0.00050991, 0.00193609, 1222.49362201, -0.41897216, -0.28867794],
};
#[rustfmt::skip]
const URANUS: Elements = Elements {
    base: [19.18916464, 0.04725744, 0.77263783, 313.23810451, 170.95427630, 74.01692503],
    rate: [-0.00196176, -0.00004397, -0.00242939, 428.48202785, 0.40805281, 0.04240589],
};
#[rustfmt::skip]
const NEPTUNE: Elements = Elements {
    base: [30.06992276, 0.00859048, 1.77004347, -55.12002969, 44.96476227, 131.78422574],
    rate: [0.00026291, 0.00005105, 0.00035372, 218.45945325, -0.32241464, -0.00508664],
};
#[rustfmt::skip]
const PLUTO: Elements = Elements {
    base: [39.48211675, 0.24882730, 17.14001206, 238.92903833, 224.06891629, 110.30393684],
    rate: [-0.00031596, 0.00005170, 0.00004818, 145.20780515, -0.04062942, -0.01183482],
};

fn elements_for(body: Body) -> Option<&'static Elements> {
    match body {
        Body::Mercury => Some(&MERCURY),
        Body::Venus => Some(&VENUS),
        Body::Mars => Some(&MARS),
        Body::Jupiter => Some(&JUPITER),
        Body::Saturn => Some(&SATURN),
        Body::Uranus => Some(&URANUS),
        Body::Neptune => Some(&NEPTUNE),
        Body::Pluto => Some(&PLUTO),
        Body::Sun | Body::Moon => None,
    }
}

/// Geocentric positions from mean orbital elements and a short lunar series.
#[derive(Debug, Clone, Default)]
pub struct AnalyticEphemeris {
    config: EphemerisConfig,
}

impl AnalyticEphemeris {
    pub fn new(config: EphemerisConfig) -> Result<Self, EphemerisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EphemerisConfig {
        &self.config
    }

    /// Solve Kepler's equation E − e·sin E = M (radians) by Newton iteration.
    fn eccentric_anomaly(&self, m: f64, e: f64) -> Result<f64, EphemerisError> {
        let mut ecc = if e < 0.8 { m } else { std::f64::consts::PI };
        for _ in 0..self.config.kepler_max_iterations {
            let delta = (ecc - e * ecc.sin() - m) / (1.0 - e * ecc.cos());
            ecc -= delta;
            if delta.abs() < 1e-12 {
                return Ok(ecc);
            }
        }
        Err(EphemerisError::NoConvergence("Kepler equation"))
    }

    /// Heliocentric J2000 ecliptic position (AU) from mean elements.
    fn heliocentric(&self, el: &Elements, t: f64) -> Result<[f64; 3], EphemerisError> {
        let v: [f64; 6] = std::array::from_fn(|i| el.base[i] + el.rate[i] * t);
        let (a, e) = (v[0], v[1]);
        let (inc, l, peri, node) = (
            v[2].to_radians(),
            v[3].to_radians(),
            v[4].to_radians(),
            v[5].to_radians(),
        );
        let omega = peri - node;
        let m = normalize_pm180((l - peri).to_degrees()).to_radians();
        let ecc = self.eccentric_anomaly(m, e)?;

        let xp = a * (ecc.cos() - e);
        let yp = a * (1.0 - e * e).sqrt() * ecc.sin();

        let (so, co) = omega.sin_cos();
        let (sn, cn) = node.sin_cos();
        let (si, ci) = inc.sin_cos();

        Ok([
            (co * cn - so * sn * ci) * xp + (-so * cn - co * sn * ci) * yp,
            (co * sn + so * cn * ci) * xp + (-so * sn + co * cn * ci) * yp,
            (so * si) * xp + (co * si) * yp,
        ])
    }

    /// Geocentric ecliptic coordinates of date, without speed.
    fn position(&self, body: Body, jd_tt: JulianDay) -> Result<SphericalCoords, EphemerisError> {
        let t = jd_tt.centuries_since_j2000();
        let mut coords = match body {
            Body::Moon => moon_of_date(t),
            _ => {
                let earth = self.heliocentric(&EARTH_MOON_BARYCENTER, t)?;
                let geo = match elements_for(body) {
                    Some(el) => {
                        let p = self.heliocentric(el, t)?;
                        [p[0] - earth[0], p[1] - earth[1], p[2] - earth[2]]
                    }
                    None => [-earth[0], -earth[1], -earth[2]],
                };
                let mut c = cartesian_to_spherical(&geo);
                c.lon_deg += general_precession_longitude_deg(t);
                c
            }
        };
        if self.config.apply_nutation {
            coords.lon_deg += self.nutation(jd_tt)?.longitude_deg;
        }
        coords.lon_deg = normalize_360(coords.lon_deg);
        Ok(coords)
    }

    fn check_epoch(&self, jd_tt: JulianDay) -> Result<(), EphemerisError> {
        let jd = jd_tt.to_f64();
        if jd < self.config.min_jd_tt || jd > self.config.max_jd_tt {
            return Err(EphemerisError::EpochOutOfRange { jd_tt: jd });
        }
        Ok(())
    }
}

impl Ephemeris for AnalyticEphemeris {
    fn name(&self) -> &str {
        "analytic"
    }

    fn body_state(&self, body: Body, jd_tt: JulianDay) -> Result<BodyState, EphemerisError> {
        self.check_epoch(jd_tt)?;
        let h = self.config.speed_step_days;
        let here = self.position(body, jd_tt)?;
        let before = self.position(body, jd_tt.add_seconds(-h * 86_400.0))?;
        let after = self.position(body, jd_tt.add_seconds(h * 86_400.0))?;

        Ok(BodyState {
            longitude_deg: here.lon_deg,
            latitude_deg: here.lat_deg,
            distance_au: here.distance,
            longitude_speed: normalize_pm180(after.lon_deg - before.lon_deg) / (2.0 * h),
        })
    }
}

/// Low-precision lunar longitude, latitude and distance, mean equinox of date.
fn moon_of_date(t: f64) -> SphericalCoords {
    let s = |a: f64, b: f64| (a + b * t).to_radians().sin();
    let c = |a: f64, b: f64| (a + b * t).to_radians().cos();

    let lon = 218.32 + 481_267.881 * t + 6.29 * s(135.0, 477_198.87) - 1.27 * s(259.3, -413_335.36)
        + 0.66 * s(235.7, 890_534.22)
        + 0.21 * s(269.9, 954_397.74)
        - 0.19 * s(357.5, 35_999.05)
        - 0.11 * s(186.5, 966_404.03);

    let lat = 5.13 * s(93.3, 483_202.02) + 0.28 * s(228.2, 960_400.89)
        - 0.28 * s(318.3, 6_003.15)
        - 0.17 * s(217.6, -407_332.21);

    let parallax = 0.9508
        + 0.0518 * c(135.0, 477_198.87)
        + 0.0095 * c(259.3, -413_335.36)
        + 0.0078 * c(235.7, 890_534.22)
        + 0.0028 * c(269.9, 954_397.74);

    SphericalCoords {
        lon_deg: lon,
        lat_deg: lat,
        distance: EARTH_RADIUS_AU / parallax.to_radians().sin(),
    }
}
