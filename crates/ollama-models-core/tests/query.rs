use ollama_models_core::criteria::{Bound, Criterion};
use ollama_models_core::format::render_matches;
use ollama_models_core::parse::parse_timestamp;
use ollama_models_core::query::Query;
use ollama_models_core::record::ModelRecord;

fn record(model: &str, sizes: &[&str], caps: &[&str], pulls: &str, updated: &str) -> ModelRecord {
    let mut rec = ModelRecord::new(model);
    rec.sizes = sizes.iter().map(|s| s.to_string()).collect();
    rec.capabilities = caps.iter().map(|s| s.to_string()).collect();
    rec.pull_count = Some(pulls.to_string());
    rec.updated = Some(updated.to_string());
    rec
}

fn catalog() -> Vec<ModelRecord> {
    vec![
        record(
            "llama3.1",
            &["8b", "70b", "405b"],
            &["tools"],
            "98M",
            "2024-12-06 17:21:44",
        ),
        record(
            "llama3.2-vision",
            &["11b", "90b"],
            &["vision"],
            "1.4M",
            "2024-11-06 09:00:00",
        ),
        record(
            "qwen2.5",
            &["0.5b", "1.5b", "7b", "72b"],
            &["tools"],
            "4.1M",
            "2024-09-19 12:00:00",
        ),
        record(
            "tinymodel",
            &["1b"],
            &[],
            "843",
            "2023-05-31 23:59:59",
        ),
        record(
            "granite3-dense",
            &["2b", "8b"],
            &["tools"],
            "500K",
            "2024-10-21 08:30:00",
        ),
    ]
}

fn lines(criteria: Vec<Criterion>, records: &[ModelRecord]) -> Vec<String> {
    render_matches(&Query::new(criteria).evaluate(records))
}

#[test]
fn size_range_is_inclusive_both_ends() {
    let records = catalog();
    let out = lines(
        vec![
            Criterion::parse_size("+7").unwrap(),
            Criterion::parse_size("-11").unwrap(),
        ],
        &records,
    );
    // [7, 11] admits 8b, 7b, 11b, 8b; reports only the matching sizes.
    assert!(out.contains(&"llama3.1:8b".to_string()));
    assert!(out.contains(&"llama3.2-vision:11b".to_string()));
    assert!(out.contains(&"qwen2.5:7b".to_string()));
    assert!(out.contains(&"granite3-dense:8b".to_string()));
    assert!(!out.iter().any(|l| l.ends_with(":70b") || l.ends_with(":90b")));
    assert!(!out.iter().any(|l| l.starts_with("tinymodel")));
}

#[test]
fn same_direction_bounds_collapse_to_tightest() {
    let records = catalog();
    let loose_then_tight = lines(
        vec![
            Criterion::parse_size("-50").unwrap(),
            Criterion::parse_size("-7").unwrap(),
        ],
        &records,
    );
    let tight_only = lines(vec![Criterion::parse_size("-7").unwrap()], &records);
    assert_eq!(loose_then_tight, tight_only);
}

#[test]
fn bare_size_value_means_at_most() {
    let records = catalog();
    assert_eq!(
        lines(vec![Criterion::parse_size("7").unwrap()], &records),
        lines(vec![Criterion::parse_size("-7").unwrap()], &records),
    );
}

#[test]
fn malformed_size_tag_excludes_only_that_size() {
    let rec = record("oddball", &["7xyz", "2b"], &[], "100", "2024-01-01 00:00:00");
    let out = lines(vec![Criterion::parse_size("-7").unwrap()], &[rec]);
    assert_eq!(out, vec!["oddball:2b"]);
}

#[test]
fn name_filter_is_case_insensitive_substring() {
    let records = catalog();
    let out = lines(vec![Criterion::Name("LLAMA".into())], &records);
    assert!(out.iter().all(|l| l.starts_with("llama")));
    assert!(out.contains(&"llama3.1:8b".to_string()));
    assert!(out.contains(&"llama3.2-vision:11b".to_string()));
}

#[test]
fn capability_criteria_and_together() {
    let multi = record("omni", &["7b"], &["vision", "tools"], "1K", "2024-01-01 00:00:00");
    let vision_only = record("looker", &["7b"], &["vision"], "1K", "2024-01-01 00:00:00");
    let records = vec![multi, vision_only];

    let out = lines(
        vec![
            Criterion::Capability("Vision".into()),
            Criterion::Capability("tools".into()),
        ],
        &records,
    );
    // A record with only {vision} must not match -c vision -c tools.
    assert_eq!(out, vec!["omni:7b"]);
}

#[test]
fn popularity_bound_is_record_level() {
    let records = catalog();
    let out = lines(
        vec![Criterion::parse_popularity("+1M").unwrap()],
        &records,
    );
    // All sizes of a popular-enough record are reported.
    assert!(out.contains(&"llama3.1:405b".to_string()));
    assert!(!out.iter().any(|l| l.starts_with("granite3-dense")));
    assert!(!out.iter().any(|l| l.starts_with("tinymodel")));
}

#[test]
fn malformed_pull_count_excluded_from_popularity_filter_only() {
    let bad = record("mystery", &["7b"], &[], "lots", "2024-01-01 00:00:00");
    let records = vec![bad];

    // Popularity filter: excluded.
    let out = lines(
        vec![Criterion::parse_popularity("-1M").unwrap()],
        &records,
    );
    assert!(out.is_empty());

    // Unrelated filter: still visible.
    let out = lines(vec![Criterion::Name("myst".into())], &records);
    assert_eq!(out, vec!["mystery:7b"]);
}

#[test]
fn top_n_truncates_descending_by_pulls() {
    let records = catalog();
    let matches = Query::new(vec![Criterion::parse_popularity("top3").unwrap()])
        .evaluate(&records);
    let names: Vec<&str> = matches.iter().map(|m| m.record.model.as_str()).collect();
    assert_eq!(names, vec!["llama3.1", "qwen2.5", "llama3.2-vision"]);
}

#[test]
fn top_n_ties_keep_input_order() {
    let records = vec![
        record("first", &["1b"], &[], "500K", "2024-01-01 00:00:00"),
        record("second", &["1b"], &[], "500K", "2024-01-01 00:00:00"),
        record("third", &["1b"], &[], "1M", "2024-01-01 00:00:00"),
    ];
    let matches = Query::new(vec![Criterion::parse_popularity("top3").unwrap()])
        .evaluate(&records);
    let names: Vec<&str> = matches.iter().map(|m| m.record.model.as_str()).collect();
    assert_eq!(names, vec!["third", "first", "second"]);
}

#[test]
fn top_n_with_fewer_survivors_returns_all() {
    let records = catalog();
    let matches = Query::new(vec![
        Criterion::Name("llama".into()),
        Criterion::parse_popularity("top10").unwrap(),
    ])
    .evaluate(&records);
    assert_eq!(matches.len(), 2);
}

#[test]
fn last_sortable_criterion_sets_the_dimension() {
    let records = catalog();

    // -s -15 -p +1M: popularity governs, most popular first.
    let matches = Query::new(vec![
        Criterion::parse_size("-15").unwrap(),
        Criterion::parse_popularity("+1M").unwrap(),
    ])
    .evaluate(&records);
    let names: Vec<&str> = matches.iter().map(|m| m.record.model.as_str()).collect();
    assert_eq!(names, vec!["llama3.1", "qwen2.5", "llama3.2-vision"]);

    // -p +1M -s -15: size governs, smallest matching size first.
    let matches = Query::new(vec![
        Criterion::parse_popularity("+1M").unwrap(),
        Criterion::parse_size("-15").unwrap(),
    ])
    .evaluate(&records);
    let names: Vec<&str> = matches.iter().map(|m| m.record.model.as_str()).collect();
    assert_eq!(names, vec!["qwen2.5", "llama3.1", "llama3.2-vision"]);
}

#[test]
fn at_least_size_sorts_largest_first() {
    let records = catalog();
    let matches = Query::new(vec![Criterion::parse_size("+70").unwrap()]).evaluate(&records);
    let names: Vec<&str> = matches.iter().map(|m| m.record.model.as_str()).collect();
    // llama3.1 matches up to 405b, llama3.2-vision up to 90b, qwen2.5 72b.
    assert_eq!(names, vec!["llama3.1", "llama3.2-vision", "qwen2.5"]);
}

#[test]
fn update_window_since_is_inclusive() {
    let now = parse_timestamp("2025-01-01 00:00:00").unwrap();
    let records = vec![
        record("on-boundary", &["1b"], &[], "1K", "2024-10-03 00:00:00"),
        record("older", &["1b"], &[], "1K", "2024-10-02 23:59:59"),
    ];
    // 3 months = 90 days before 2025-01-01 is 2024-10-03 00:00:00.
    let out = lines(
        vec![Criterion::parse_updated("since:3 months ago", now).unwrap()],
        &records,
    );
    assert_eq!(out, vec!["on-boundary:1b"]);
}

#[test]
fn update_window_before_is_exclusive() {
    let now = parse_timestamp("2025-01-01 00:00:00").unwrap();
    let records = vec![
        record("at-midnight", &["1b"], &[], "1K", "2023-06-01 00:00:00"),
        record("just-under", &["1b"], &[], "1K", "2023-05-31 23:59:59"),
    ];
    let out = lines(
        vec![Criterion::parse_updated("before:2023-06-01", now).unwrap()],
        &records,
    );
    assert_eq!(out, vec!["just-under:1b"]);
}

#[test]
fn update_window_sorts_most_recent_first_for_since() {
    let now = parse_timestamp("2025-01-01 00:00:00").unwrap();
    let records = catalog();
    let matches = Query::new(vec![
        Criterion::parse_updated("since:1 year ago", now).unwrap(),
    ])
    .evaluate(&records);
    let names: Vec<&str> = matches.iter().map(|m| m.record.model.as_str()).collect();
    assert_eq!(
        names,
        vec!["llama3.1", "llama3.2-vision", "granite3-dense", "qwen2.5"]
    );
}

#[test]
fn no_sortable_criterion_preserves_input_order() {
    let records = catalog();
    let matches = Query::new(vec![Criterion::Name("a".into())]).evaluate(&records);
    let names: Vec<&str> = matches.iter().map(|m| m.record.model.as_str()).collect();
    assert_eq!(names, vec!["llama3.1", "llama3.2-vision", "granite3-dense"]);
}

#[test]
fn empty_inputs_are_success_not_error() {
    let out = lines(vec![Criterion::Name("zzz".into())], &catalog());
    assert!(out.is_empty());
    let out = lines(vec![], &[]);
    assert!(out.is_empty());
}

#[test]
fn no_criteria_returns_everything() {
    let records = catalog();
    let matches = Query::new(vec![]).evaluate(&records);
    assert_eq!(matches.len(), records.len());
    // All sizes pass through when no size bound is active.
    assert_eq!(matches[0].sizes, records[0].sizes);
}

#[test]
fn explicit_bounds_compose_with_constructed_criteria() {
    // Bound variants can be built directly, bypassing the sign shorthand.
    let records = catalog();
    let out = lines(
        vec![
            Criterion::Size(Bound::AtLeast(70.0)),
            Criterion::Size(Bound::AtMost(90.0)),
        ],
        &records,
    );
    assert!(out.contains(&"llama3.1:70b".to_string()));
    assert!(out.contains(&"llama3.2-vision:90b".to_string()));
    assert!(out.contains(&"qwen2.5:72b".to_string()));
    assert!(!out.iter().any(|l| l.ends_with(":405b")));
}
