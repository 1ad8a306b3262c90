//! Result formatting: query-mode `model:size` lines and the
//! capability listing.

use std::collections::BTreeSet;

use crate::query::QueryMatch;
use crate::record::ModelRecord;

/// One line per (model, matching size) in sort order, size order preserved
/// from the record. A record with no size tags yields a bare model line.
pub fn render_matches(matches: &[QueryMatch<'_>]) -> Vec<String> {
    let mut lines = Vec::new();
    for m in matches {
        if m.sizes.is_empty() {
            lines.push(m.record.model.clone());
            continue;
        }
        for size in &m.sizes {
            lines.push(format!("{}:{}", m.record.model, size));
        }
    }
    lines
}

/// The sorted, deduplicated set of capability tags across all records,
/// case as stored.
pub fn render_capabilities(records: &[ModelRecord]) -> Vec<String> {
    let tags: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.capabilities.iter().map(String::as_str))
        .collect();
    tags.into_iter().map(String::from).collect()
}
