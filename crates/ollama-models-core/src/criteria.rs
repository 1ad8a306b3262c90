//! Filter criteria: one value per user-supplied flag occurrence, decoded
//! once at the parse boundary into tagged operators. Criteria of different
//! kinds AND together; same-kind numeric criteria accumulate into ranges
//! (see [`crate::query`]).

use chrono::NaiveDateTime;

use crate::error::{OmError, Result};
use crate::parse;

/// An inclusive bound with an explicit direction, decoded from the CLI's
/// sign-prefix shorthand (`-7` = at most 7, `+4` = at least 4, bare `7` =
/// at most 7).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound<T> {
    AtMost(T),
    AtLeast(T),
}

/// A bound on the canonical update timestamp. `Since` is an inclusive
/// lower bound, `Before` an exclusive upper bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateBound {
    Since(NaiveDateTime),
    Before(NaiveDateTime),
}

/// One user-specified filter instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Case-insensitive substring of the model name.
    Name(String),
    /// Case-insensitive capability tag, must be present.
    Capability(String),
    /// Parameter-size bound in billions; matches per-size, not per-record.
    Size(Bound<f64>),
    /// Pull-count bound.
    Popularity(Bound<u64>),
    /// Keep only the N most-pulled survivors. A post-filter ranking
    /// directive, not a per-record predicate.
    TopN(usize),
    /// Update-recency window bound.
    Updated(DateBound),
}

fn split_sign(raw: &str) -> (bool, &str) {
    match raw.as_bytes().first() {
        Some(b'+') => (true, &raw[1..]),
        Some(b'-') => (false, &raw[1..]),
        _ => (false, raw),
    }
}

impl Criterion {
    /// Decode a size filter value: `7`, `1.5`, `+4`, `-12` (billions).
    pub fn parse_size(raw: &str) -> Result<Self> {
        let (at_least, rest) = split_sign(raw.trim());
        let value: f64 = rest
            .parse()
            .map_err(|_| OmError::MalformedSize(raw.to_string()))?;
        Ok(Self::Size(if at_least {
            Bound::AtLeast(value)
        } else {
            Bound::AtMost(value)
        }))
    }

    /// Decode a popularity filter value: `top5`, `+1M`, `-500K`, `843`.
    pub fn parse_popularity(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if let Some(n) = trimmed.strip_prefix("top") {
            let n: usize = n
                .parse()
                .map_err(|_| OmError::MalformedPopularity(raw.to_string()))?;
            return Ok(Self::TopN(n));
        }
        let (at_least, rest) = split_sign(trimmed);
        let value = parse::parse_pull_count(rest)?;
        Ok(Self::Popularity(if at_least {
            Bound::AtLeast(value)
        } else {
            Bound::AtMost(value)
        }))
    }

    /// Decode an update filter value: `since:3 months ago`,
    /// `after:2024-01-01`, `before:2023-06-01`. Relative durations are
    /// resolved against `now`.
    pub fn parse_updated(raw: &str, now: NaiveDateTime) -> Result<Self> {
        let trimmed = raw.trim();
        let bound = if let Some(rest) = trimmed.strip_prefix("since:") {
            DateBound::Since(parse::parse_instant(rest, now)?)
        } else if let Some(rest) = trimmed.strip_prefix("after:") {
            DateBound::Since(parse::parse_instant(rest, now)?)
        } else if let Some(rest) = trimmed.strip_prefix("before:") {
            DateBound::Before(parse::parse_instant(rest, now)?)
        } else {
            return Err(OmError::MalformedDateExpression(raw.to_string()));
        };
        Ok(Self::Updated(bound))
    }
}

/// The attribute governing result order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDimension {
    Size,
    Popularity,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub dimension: SortDimension,
    pub direction: SortDirection,
}

/// Fold the ordered criterion sequence into the active sort dimension:
/// the last sortable criterion wins. Name and capability criteria never
/// establish one; `TopN` has its own final ranking step and does not
/// occupy the slot.
///
/// Direction convention: an at-most/before bound sorts ascending, an
/// at-least/since/after bound sorts descending. So `-s -7` lists smallest
/// first, `-p +1M` most popular first, `-u since:...` most recent first.
pub fn sort_key(criteria: &[Criterion]) -> Option<SortKey> {
    let mut key = None;
    for criterion in criteria {
        let next = match criterion {
            Criterion::Size(b) => SortKey {
                dimension: SortDimension::Size,
                direction: direction_of(b),
            },
            Criterion::Popularity(b) => SortKey {
                dimension: SortDimension::Popularity,
                direction: direction_of(b),
            },
            Criterion::Updated(DateBound::Since(_)) => SortKey {
                dimension: SortDimension::Updated,
                direction: SortDirection::Descending,
            },
            Criterion::Updated(DateBound::Before(_)) => SortKey {
                dimension: SortDimension::Updated,
                direction: SortDirection::Ascending,
            },
            Criterion::Name(_) | Criterion::Capability(_) | Criterion::TopN(_) => continue,
        };
        key = Some(next);
    }
    key
}

fn direction_of<T>(bound: &Bound<T>) -> SortDirection {
    match bound {
        Bound::AtMost(_) => SortDirection::Ascending,
        Bound::AtLeast(_) => SortDirection::Descending,
    }
}
