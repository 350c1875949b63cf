//! NAIF Leapseconds Kernel (LSK) text parser.
//!
//! Reads the `\begindata` section of an LSK file and extracts the
//! `DELTET/DELTA_T_A` and `DELTET/DELTA_AT` variables, which is all the
//! UTC/TAI/TT chain needs. The TDB periodic terms are not used.
//!
//! Reference: NAIF Time Required Reading (public domain, US Government work product).

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::TimeError;
use crate::julian::month_from_abbrev;

/// Parsed contents of an LSK file.
#[derive(Debug, Clone, PartialEq)]
pub struct LskData {
    /// TT − TAI offset in seconds (DELTET/DELTA_T_A).
    pub delta_t_a: f64,
    /// (TAI − UTC seconds, UTC date the offset takes effect), sorted by date.
    pub leap_seconds: Vec<(i32, NaiveDate)>,
}

/// One value in a kernel pool assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PoolValue {
    Number(f64),
    Date(NaiveDate),
}

type KernelPool = HashMap<String, Vec<PoolValue>>;

/// Parse an LSK file from its text content.
pub fn parse_lsk(content: &str) -> Result<LskData, TimeError> {
    let data_text = extract_data_section(content)?;
    let pool = parse_kernel_pool(&data_text)?;

    let delta_t_a = match pool.get("DELTET/DELTA_T_A").and_then(|v| v.first()) {
        Some(PoolValue::Number(x)) => *x,
        _ => return Err(TimeError::LskParse("missing DELTET/DELTA_T_A".into())),
    };

    let delta_at = pool
        .get("DELTET/DELTA_AT")
        .ok_or_else(|| TimeError::LskParse("missing DELTET/DELTA_AT".into()))?;

    Ok(LskData {
        delta_t_a,
        leap_seconds: build_leap_table(delta_at)?,
    })
}

/// Find text between `\begindata` and `\begintext` (or EOF).
fn extract_data_section(content: &str) -> Result<String, TimeError> {
    let mut in_data = false;
    let mut data_lines = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("\\begindata") {
            in_data = true;
        } else if trimmed.eq_ignore_ascii_case("\\begintext") {
            in_data = false;
        } else if in_data {
            data_lines.push(line);
        }
    }

    if data_lines.is_empty() {
        return Err(TimeError::LskParse("no \\begindata section found".into()));
    }
    Ok(data_lines.join("\n"))
}

/// Parse `NAME = VALUE` and `NAME = ( V1 V2 ... )` assignments, arrays may span lines.
fn parse_kernel_pool(text: &str) -> Result<KernelPool, TimeError> {
    let mut pool = KernelPool::new();
    let mut current: Option<(String, Vec<PoolValue>)> = None;
    let mut in_array = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let rhs = if let Some(eq_pos) = line.find('=') {
            if let Some((name, values)) = current.take() {
                pool.insert(name, values);
            }
            current = Some((line[..eq_pos].trim().to_string(), Vec::new()));
            let rhs = line[eq_pos + 1..].trim();
            match rhs.strip_prefix('(') {
                Some(rest) => {
                    in_array = true;
                    rest
                }
                None => rhs,
            }
        } else if in_array {
            line
        } else {
            continue;
        };

        let rhs = match rhs.strip_suffix(')') {
            Some(rest) => {
                in_array = false;
                rest
            }
            None => rhs,
        };

        if let Some((_, values)) = current.as_mut() {
            parse_values(rhs, values)?;
        }
    }

    if let Some((name, values)) = current {
        pool.insert(name, values);
    }
    Ok(pool)
}

/// Parse whitespace/comma separated numbers (Fortran `D` exponents allowed)
/// and `@YYYY-MON-DD` date literals.
fn parse_values(text: &str, out: &mut Vec<PoolValue>) -> Result<(), TimeError> {
    for token in text.split([' ', ',', '\t']).filter(|t| !t.is_empty()) {
        if let Some(date_str) = token.strip_prefix('@') {
            out.push(PoolValue::Date(parse_naif_date(date_str)?));
        } else {
            let normalized = token.replace(['D', 'd'], "E");
            let val: f64 = normalized
                .parse()
                .map_err(|e| TimeError::LskParse(format!("cannot parse '{token}' as f64: {e}")))?;
            out.push(PoolValue::Number(val));
        }
    }
    Ok(())
}

/// Parse a NAIF date literal like `1972-JAN-1`.
fn parse_naif_date(s: &str) -> Result<NaiveDate, TimeError> {
    let bad = || TimeError::LskParse(format!("bad date literal: @{s}"));
    let mut parts = s.split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(bad());
    };
    let year: i32 = y.parse().map_err(|_| bad())?;
    let month = month_from_abbrev(m).ok_or_else(bad)?;
    let day: u32 = d.parse().map_err(|_| bad())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(bad)
}

/// Build the leap table from the flat `[ΔAT₁, @date₁, ΔAT₂, @date₂, ...]` array.
fn build_leap_table(flat: &[PoolValue]) -> Result<Vec<(i32, NaiveDate)>, TimeError> {
    if flat.len() % 2 != 0 {
        return Err(TimeError::LskParse(
            "DELTET/DELTA_AT must have even number of values".into(),
        ));
    }

    let mut table = flat
        .chunks(2)
        .map(|pair| match (pair[0], pair[1]) {
            (PoolValue::Number(secs), PoolValue::Date(date)) if secs.fract() == 0.0 => {
                Ok((secs as i32, date))
            }
            _ => Err(TimeError::LskParse(
                "DELTET/DELTA_AT entries must be (whole seconds, @date) pairs".into(),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    table.sort_by_key(|&(_, date)| date);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LSK: &str = r#"
\begintext
Some comments here.
\begindata

DELTET/DELTA_T_A       =   32.184
DELTET/K               =    1.657D-3
DELTET/EB              =    1.671D-2
DELTET/M               = (  6.239996   1.99096871D-7  )

DELTET/DELTA_AT        = ( 10,   @1972-JAN-1
                           11,   @1972-JUL-1
                           37,   @2017-JAN-1  )

\begintext
"#;

    #[test]
    fn parse_sample_lsk() {
        let data = parse_lsk(SAMPLE_LSK).expect("should parse");
        assert!((data.delta_t_a - 32.184).abs() < 1e-10);
        assert_eq!(data.leap_seconds.len(), 3);
        assert_eq!(data.leap_seconds[0].0, 10);
        assert_eq!(
            data.leap_seconds[1].1,
            NaiveDate::from_ymd_opt(1972, 7, 1).unwrap()
        );
        assert_eq!(data.leap_seconds[2].0, 37);
    }

    #[test]
    fn fortran_exponent() {
        let mut out = Vec::new();
        parse_values("1.657D-3", &mut out).unwrap();
        assert_eq!(out, vec![PoolValue::Number(1.657e-3)]);
    }

    #[test]
    fn naif_date_literal() {
        let d = parse_naif_date("2017-JAN-1").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2017, 1, 1).unwrap());
        assert!(parse_naif_date("2017-XXX-1").is_err());
        assert!(parse_naif_date("2017-JAN").is_err());
    }

    #[test]
    fn missing_data_section() {
        assert!(matches!(
            parse_lsk("just comments"),
            Err(TimeError::LskParse(_))
        ));
    }

    #[test]
    fn odd_delta_at_rejected() {
        let text = "\\begindata\nDELTET/DELTA_T_A = 32.184\nDELTET/DELTA_AT = ( 10, @1972-JAN-1, 11 )\n";
        assert!(parse_lsk(text).is_err());
    }
}
