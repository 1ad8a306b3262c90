//! The query engine: compiles an ordered criterion sequence into effective
//! ranges, evaluates the conjunction over a record set, and orders the
//! survivors by the active sort dimension.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::criteria::{
    sort_key, Bound, Criterion, DateBound, SortDimension, SortDirection, SortKey,
};
use crate::parse;
use crate::record::ModelRecord;

/// A surviving record paired with the sizes that satisfied the active size
/// bound (all of the record's sizes when no size bound was active).
#[derive(Debug)]
pub struct QueryMatch<'a> {
    pub record: &'a ModelRecord,
    pub sizes: Vec<String>,
}

/// A single-shot, read-only query over an already-materialized record set.
#[derive(Debug, Clone)]
pub struct Query {
    criteria: Vec<Criterion>,
}

/// Effective ranges after tightest-bound accumulation: repeated same-kind
/// criteria of the same direction keep the most restrictive value,
/// opposite directions form an inclusive range.
#[derive(Debug, Default)]
struct Compiled {
    names: Vec<String>,
    capabilities: Vec<String>,
    size_lo: Option<f64>,
    size_hi: Option<f64>,
    pull_lo: Option<u64>,
    pull_hi: Option<u64>,
    since: Option<NaiveDateTime>,
    before: Option<NaiveDateTime>,
    top_n: Option<usize>,
}

impl Compiled {
    fn size_bound_active(&self) -> bool {
        self.size_lo.is_some() || self.size_hi.is_some()
    }

    fn pull_bound_active(&self) -> bool {
        self.pull_lo.is_some() || self.pull_hi.is_some()
    }

    fn window_active(&self) -> bool {
        self.since.is_some() || self.before.is_some()
    }
}

impl Query {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    /// The active sort dimension, chosen by the last sortable criterion.
    pub fn sort_key(&self) -> Option<SortKey> {
        sort_key(&self.criteria)
    }

    /// Filter, sort, and (for `topN`) rank-and-truncate the record set.
    /// With no sortable criterion the input order is preserved.
    pub fn evaluate<'a>(&self, records: &'a [ModelRecord]) -> Vec<QueryMatch<'a>> {
        let compiled = self.compile();

        let mut matches: Vec<QueryMatch<'a>> = records
            .iter()
            .filter_map(|record| {
                if !compiled.matches_name(record)
                    || !compiled.matches_capabilities(record)
                    || !compiled.matches_pull_count(record)
                    || !compiled.matches_window(record)
                {
                    return None;
                }
                let sizes = compiled.matching_sizes(record)?;
                Some(QueryMatch { record, sizes })
            })
            .collect();

        if let Some(key) = self.sort_key() {
            sort_matches(&mut matches, key);
        }

        if let Some(n) = compiled.top_n {
            rank_by_pulls(&mut matches);
            matches.truncate(n);
        }

        matches
    }

    fn compile(&self) -> Compiled {
        let mut c = Compiled::default();
        for criterion in &self.criteria {
            match criterion {
                Criterion::Name(s) => c.names.push(s.to_lowercase()),
                Criterion::Capability(s) => c.capabilities.push(s.clone()),
                Criterion::Size(Bound::AtLeast(v)) => {
                    c.size_lo = Some(c.size_lo.map_or(*v, |lo| lo.max(*v)));
                }
                Criterion::Size(Bound::AtMost(v)) => {
                    c.size_hi = Some(c.size_hi.map_or(*v, |hi| hi.min(*v)));
                }
                Criterion::Popularity(Bound::AtLeast(v)) => {
                    c.pull_lo = Some(c.pull_lo.map_or(*v, |lo| lo.max(*v)));
                }
                Criterion::Popularity(Bound::AtMost(v)) => {
                    c.pull_hi = Some(c.pull_hi.map_or(*v, |hi| hi.min(*v)));
                }
                Criterion::Updated(DateBound::Since(t)) => {
                    c.since = Some(c.since.map_or(*t, |lo| lo.max(*t)));
                }
                Criterion::Updated(DateBound::Before(t)) => {
                    c.before = Some(c.before.map_or(*t, |hi| hi.min(*t)));
                }
                Criterion::TopN(n) => c.top_n = Some(*n),
            }
        }
        c
    }
}

impl Compiled {
    fn matches_name(&self, record: &ModelRecord) -> bool {
        if self.names.is_empty() {
            return true;
        }
        let model = record.model.to_lowercase();
        self.names.iter().all(|needle| model.contains(needle))
    }

    fn matches_capabilities(&self, record: &ModelRecord) -> bool {
        self.capabilities
            .iter()
            .all(|tag| record.has_capability(tag))
    }

    fn matches_pull_count(&self, record: &ModelRecord) -> bool {
        if !self.pull_bound_active() {
            return true;
        }
        let pulls = match record.pull_count.as_deref().map(parse::parse_pull_count) {
            Some(Ok(n)) => n,
            Some(Err(_)) | None => {
                debug!(
                    model = %record.model,
                    pull_count = record.pull_count.as_deref().unwrap_or("<missing>"),
                    "unparseable pull count; record excluded from popularity filter"
                );
                return false;
            }
        };
        self.pull_lo.map_or(true, |lo| pulls >= lo) && self.pull_hi.map_or(true, |hi| pulls <= hi)
    }

    fn matches_window(&self, record: &ModelRecord) -> bool {
        if !self.window_active() {
            return true;
        }
        let updated = match record.updated.as_deref().map(parse::parse_timestamp) {
            Some(Ok(t)) => t,
            Some(Err(_)) | None => {
                debug!(
                    model = %record.model,
                    updated = record.updated.as_deref().unwrap_or("<missing>"),
                    "unparseable timestamp; record excluded from update filter"
                );
                return false;
            }
        };
        self.since.map_or(true, |lo| updated >= lo) && self.before.map_or(true, |hi| updated < hi)
    }

    /// The subset of the record's sizes admitted by the size range, in the
    /// record's own order. `None` when a bound is active and nothing
    /// matches (the record is rejected).
    fn matching_sizes(&self, record: &ModelRecord) -> Option<Vec<String>> {
        if !self.size_bound_active() {
            return Some(record.sizes.clone());
        }
        let sizes: Vec<String> = record
            .sizes
            .iter()
            .filter(|tag| match parse::parse_size(tag) {
                Ok(v) => {
                    self.size_lo.map_or(true, |lo| v >= lo)
                        && self.size_hi.map_or(true, |hi| v <= hi)
                }
                Err(_) => {
                    debug!(
                        model = %record.model,
                        size = %tag,
                        "unparseable size tag; excluded from size filter"
                    );
                    false
                }
            })
            .cloned()
            .collect();
        if sizes.is_empty() {
            None
        } else {
            Some(sizes)
        }
    }
}

/// Stable sort by the active dimension. Records without a computable key
/// (unparseable pull count or timestamp) order after keyed ones.
fn sort_matches(matches: &mut Vec<QueryMatch<'_>>, key: SortKey) {
    match key.dimension {
        SortDimension::Size => {
            // Per-size matching means a record has several candidate keys;
            // the representative is the smallest matching size ascending,
            // the largest descending.
            sort_by_optional(matches, key.direction, |m| {
                let mut parsed = m.sizes.iter().filter_map(|s| parse::parse_size(s).ok());
                match key.direction {
                    SortDirection::Ascending => parsed.fold(None, |acc: Option<f64>, v| {
                        Some(acc.map_or(v, |a| a.min(v)))
                    }),
                    SortDirection::Descending => parsed.fold(None, |acc: Option<f64>, v| {
                        Some(acc.map_or(v, |a| a.max(v)))
                    }),
                }
            });
        }
        SortDimension::Popularity => {
            sort_by_optional(matches, key.direction, |m| {
                m.record
                    .pull_count
                    .as_deref()
                    .and_then(|p| parse::parse_pull_count(p).ok())
            });
        }
        SortDimension::Updated => {
            sort_by_optional(matches, key.direction, |m| {
                m.record
                    .updated
                    .as_deref()
                    .and_then(|u| parse::parse_timestamp(u).ok())
            });
        }
    }
}

fn sort_by_optional<'a, K, F>(
    matches: &mut Vec<QueryMatch<'a>>,
    direction: SortDirection,
    mut key: F,
) where
    K: PartialOrd,
    F: FnMut(&QueryMatch<'a>) -> Option<K>,
{
    let mut keyed: Vec<(Option<K>, QueryMatch<'a>)> =
        matches.drain(..).map(|m| (key(&m), m)).collect();
    keyed.sort_by(|a, b| compare_optional(&a.0, &b.0, direction));
    matches.extend(keyed.into_iter().map(|(_, m)| m));
}

fn compare_optional<K: PartialOrd>(
    a: &Option<K>,
    b: &Option<K>,
    direction: SortDirection,
) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(y).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The `topN` final step: stable descending sort by normalized pull count
/// (ties keep input order), caller truncates.
fn rank_by_pulls(matches: &mut Vec<QueryMatch<'_>>) {
    sort_by_optional(matches, SortDirection::Descending, |m| {
        m.record
            .pull_count
            .as_deref()
            .and_then(|p| parse::parse_pull_count(p).ok())
    });
}
