//! Pure value normalizers: the raw textual encodings used by the catalog
//! (size tags, pull counts, timestamps, date expressions) turned into
//! comparable values. No hidden state, no locale dependence.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{OmError, Result};

/// Parse a size tag like `7b`, `1.5b`, `500m` into billions of parameters.
pub fn parse_size(tag: &str) -> Result<f64> {
    let t = tag.trim();
    let split = t
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .ok_or_else(|| OmError::MalformedSize(tag.to_string()))?;
    let (num, unit) = t.split_at(split);
    let value: f64 = num
        .parse()
        .map_err(|_| OmError::MalformedSize(tag.to_string()))?;
    match unit.to_ascii_lowercase().as_str() {
        "b" => Ok(value),
        "m" => Ok(value / 1_000.0),
        "k" => Ok(value / 1_000_000.0),
        _ => Err(OmError::MalformedSize(tag.to_string())),
    }
}

/// Parse a pull-count string like `1.2M`, `500K`, `843` into pulls.
/// Fractional prefixes truncate after the multiplier is applied.
pub fn parse_pull_count(raw: &str) -> Result<u64> {
    let t = raw.trim();
    let split = t
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(t.len());
    let (num, suffix) = t.split_at(split);
    let value: f64 = num
        .parse()
        .map_err(|_| OmError::MalformedPopularity(raw.to_string()))?;
    let multiplier = match suffix.to_ascii_uppercase().as_str() {
        "" => 1.0,
        "K" => 1e3,
        "M" => 1e6,
        "B" => 1e9,
        _ => return Err(OmError::MalformedPopularity(raw.to_string())),
    };
    Ok((value * multiplier) as u64)
}

/// Parse a canonical `YYYY-MM-DD HH:MM:SS` timestamp.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S")
        .map_err(|_| OmError::MalformedTimestamp(raw.to_string()))
}

/// Parse the raw timestamp form shown on the library page,
/// e.g. `Mar 25, 2025 12:12 AM UTC`. Used by the extraction stage only;
/// unparseable values are kept verbatim, so this is soft.
pub fn parse_catalog_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), "%b %d, %Y %I:%M %p UTC").ok()
}

/// Resolve a filter instant: either relative (`3 months ago`) against
/// `now`, or absolute (`2023-06-01`, `2023-06-01 12:00:00`).
///
/// Duration units are fixed-width for determinism: day, week = 7 days,
/// month = 30 days, year = 365 days. Not calendar-aware.
pub fn parse_instant(expr: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let t = expr.trim();

    if let Some(rel) = t.strip_suffix("ago") {
        let mut parts = rel.split_whitespace();
        let count: i64 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| OmError::MalformedDateExpression(expr.to_string()))?;
        let unit = parts
            .next()
            .ok_or_else(|| OmError::MalformedDateExpression(expr.to_string()))?;
        if parts.next().is_some() {
            return Err(OmError::MalformedDateExpression(expr.to_string()));
        }
        let days = match unit.to_ascii_lowercase().trim_end_matches('s') {
            "day" => 1,
            "week" => 7,
            "month" => 30,
            "year" => 365,
            _ => return Err(OmError::MalformedDateExpression(expr.to_string())),
        };
        return Ok(now - Duration::days(count * days));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return Ok(d.and_time(NaiveTime::MIN));
    }

    Err(OmError::MalformedDateExpression(expr.to_string()))
}
