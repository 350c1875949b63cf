//! ΔT = TT − UT1 in seconds.
//!
//! Piecewise model:
//! - before 1973: Espenak & Meeus (2006) polynomials (NASA eclipse pages);
//! - 1973.0 – 2020.0: annual IERS/USNO values, linearly interpolated;
//! - 2020 – 2050: the Espenak & Meeus 2005–2050 polynomial, shifted to meet
//!   the last tabulated value and relaxed back onto the polynomial by 2050;
//! - 2050 – 2150: Espenak & Meeus bridge to the long-term parabola;
//! - after 2150: long-term parabola −20 + 32·u², u = (y − 1820)/100.
//!
//! Extrapolation beyond the table is never clamped; the result is
//! non-decreasing from 1941 onward.

use chrono::{DateTime, Utc};

use crate::julian::{datetime_to_julian_day, decimal_year};

/// First year covered by [`OBSERVED`].
const TABLE_START: f64 = 1973.0;

/// ΔT at the start of each year 1973..=2020 (seconds).
#[rustfmt::skip]
const OBSERVED: [f64; 48] = [
    43.37, 44.49, 45.48, 46.46, 47.52, 48.53, 49.59, 50.54, 51.38, 52.17,
    52.96, 53.79, 54.34, 54.87, 55.32, 55.82, 56.30, 56.86, 57.57, 58.31,
    59.12, 59.98, 60.78, 61.63, 62.29, 62.97, 63.47, 63.83, 64.09, 64.30,
    64.47, 64.57, 64.69, 64.85, 65.15, 65.46, 65.78, 66.07, 66.32, 66.60,
    66.91, 67.28, 67.64, 68.10, 68.59, 68.97, 69.22, 69.36,
];

/// Last year covered by [`OBSERVED`].
const TABLE_END: f64 = TABLE_START + (OBSERVED.len() - 1) as f64;

/// ΔT in seconds for a Julian Day (UT).
pub fn delta_t_seconds(jd_ut: f64) -> f64 {
    delta_t_for_year(decimal_year(jd_ut))
}

/// ΔT in seconds for a UTC instant.
pub fn calculate_delta_t(dt: &DateTime<Utc>) -> f64 {
    delta_t_seconds(datetime_to_julian_day(dt).to_f64())
}

/// ΔT in seconds for a decimal year.
pub fn delta_t_for_year(y: f64) -> f64 {
    if y < TABLE_START {
        historical(y)
    } else if y <= TABLE_END {
        tabulated(y)
    } else if y < 2050.0 {
        let offset = espenak_2005_2050(TABLE_END) - OBSERVED[OBSERVED.len() - 1];
        espenak_2005_2050(y) - offset * (2050.0 - y) / (2050.0 - TABLE_END)
    } else if y < 2150.0 {
        let rate = (long_term(2050.0) - espenak_2005_2050(2050.0)) / 100.0;
        long_term(y) - rate * (2150.0 - y)
    } else {
        long_term(y)
    }
}

fn tabulated(y: f64) -> f64 {
    let pos = y - TABLE_START;
    let i = (pos.floor() as usize).min(OBSERVED.len() - 2);
    let frac = pos - i as f64;
    OBSERVED[i] + (OBSERVED[i + 1] - OBSERVED[i]) * frac
}

fn long_term(y: f64) -> f64 {
    let u = (y - 1820.0) / 100.0;
    -20.0 + 32.0 * u * u
}

fn espenak_2005_2050(y: f64) -> f64 {
    let t = y - 2000.0;
    62.92 + 0.32217 * t + 0.005589 * t * t
}

/// Espenak & Meeus polynomials for years before 1973.
fn historical(y: f64) -> f64 {
    if y < -500.0 {
        return long_term(y);
    }
    if y < 500.0 {
        let u = y / 100.0;
        return poly(
            u,
            &[10583.6, -1014.41, 33.78311, -5.952053, -0.1798452, 0.022174192, 0.0090316521],
        );
    }
    if y < 1600.0 {
        let u = (y - 1000.0) / 100.0;
        return poly(
            u,
            &[1574.2, -556.01, 71.23472, 0.319781, -0.8503463, -0.005050998, 0.0083572073],
        );
    }
    if y < 1700.0 {
        let t = y - 1600.0;
        return poly(t, &[120.0, -0.9808, -0.01532, 1.0 / 7129.0]);
    }
    if y < 1800.0 {
        let t = y - 1700.0;
        return poly(t, &[8.83, 0.1603, -0.0059285, 0.00013336, -1.0 / 1_174_000.0]);
    }
    if y < 1860.0 {
        let t = y - 1800.0;
        return poly(
            t,
            &[
                13.72,
                -0.332447,
                0.0068612,
                0.0041116,
                -0.00037436,
                0.0000121272,
                -0.0000001699,
                0.000000000875,
            ],
        );
    }
    if y < 1900.0 {
        let t = y - 1860.0;
        return poly(
            t,
            &[7.62, 0.5737, -0.251754, 0.01680668, -0.0004473624, 1.0 / 233_174.0],
        );
    }
    if y < 1920.0 {
        let t = y - 1900.0;
        return poly(t, &[-2.79, 1.494119, -0.0598939, 0.0061966, -0.000197]);
    }
    if y < 1941.0 {
        let t = y - 1920.0;
        return poly(t, &[21.20, 0.84493, -0.076100, 0.0020936]);
    }
    if y < 1961.0 {
        let t = y - 1950.0;
        return poly(t, &[29.07, 0.407, -1.0 / 233.0, 1.0 / 2547.0]);
    }
    let t = y - 1975.0;
    poly(t, &[45.45, 1.067, -1.0 / 260.0, -1.0 / 718.0])
}

/// Horner evaluation, coefficients in ascending order.
fn poly(x: f64, coeffs: &[f64]) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn table_endpoints() {
        assert!((delta_t_for_year(1973.0) - 43.37).abs() < 1e-9);
        assert!((delta_t_for_year(2020.0) - 69.36).abs() < 1e-9);
    }

    #[test]
    fn continuous_after_table() {
        let before = delta_t_for_year(2020.0);
        let after = delta_t_for_year(2020.0 + 1e-6);
        assert!((after - before).abs() < 1e-3, "{before} vs {after}");
        let at_2050 = delta_t_for_year(2050.0);
        let below = delta_t_for_year(2050.0 - 1e-6);
        assert!((at_2050 - below).abs() < 1e-3);
        let at_2150 = delta_t_for_year(2150.0);
        let below = delta_t_for_year(2150.0 - 1e-6);
        assert!((at_2150 - below).abs() < 1e-3);
        assert!((at_2150 - long_term(2150.0)).abs() < 1e-9);
    }

    #[test]
    fn year_1900_close_to_reference() {
        // Morrison & Stephenson: ΔT(1900) ≈ −2.8 s
        assert!((delta_t_for_year(1900.0) + 2.79).abs() < 0.1);
    }

    #[test]
    fn non_decreasing_since_1941() {
        let mut prev = delta_t_for_year(1941.0);
        let mut y = 1941.0;
        while y < 2200.0 {
            y += 0.25;
            let cur = delta_t_for_year(y);
            assert!(cur >= prev, "ΔT decreased at {y}: {prev} -> {cur}");
            prev = cur;
        }
    }

    #[test]
    fn no_clamping_in_far_future() {
        assert!(delta_t_for_year(2500.0) > delta_t_for_year(2200.0));
    }

    #[test]
    fn datetime_entry_point() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let v = calculate_delta_t(&dt);
        assert!((v - 63.83).abs() < 0.05, "ΔT(2000) = {v}");
    }
}
