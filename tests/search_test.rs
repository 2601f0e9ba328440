//! End-to-end tests for evaluation, highlighting and context extraction

use live_search::search::*;
use serde_json::json;

/// Helper to build the two-ticket collection used across scenarios
fn website_and_email() -> Vec<Record> {
    vec![
        record(json!({"id": 1, "title": "Website not loading"})),
        record(json!({"id": 2, "title": "Email help"})),
    ]
}

fn ids(set: &SearchResultSet) -> Vec<String> {
    set.keys().iter().map(ToString::to_string).collect()
}

#[test]
fn test_single_word_query_matches_one_record() {
    let set = evaluate(
        &website_and_email(),
        "website",
        &SearchOptions::new(["title"]),
        &SearchConfig::default(),
    );

    assert_eq!(ids(&set), vec!["1"]);
    assert_eq!(set.total_count, 1);
    assert!(!set.has_more);
}

#[test]
fn test_empty_query_returns_collection_in_order() {
    let set = evaluate(
        &website_and_email(),
        "",
        &SearchOptions::new(["title"]),
        &SearchConfig::default(),
    );

    assert_eq!(ids(&set), vec!["1", "2"]);
    assert_eq!(set.total_count, 2);
    assert!(!set.scored);
}

#[test]
fn test_title_outranks_email_for_same_match() {
    let records = vec![record(json!({"title": "login", "email": "login@x.com"}))];
    let set = evaluate(
        &records,
        "login",
        &SearchOptions::new(["title", "email"]),
        &SearchConfig::default(),
    );

    assert_eq!(set.results[0].field.as_deref(), Some("title"));
    assert!(score("login", "login", "title") > score("login", "login", "email"));
}

#[test]
fn test_highlight_multi_word_query() {
    let spans = highlight("Email configuration help", "email config");
    let marked: Vec<(&str, bool)> = spans.iter().map(|s| (s.text.as_str(), s.is_match)).collect();

    assert_eq!(
        marked,
        vec![
            ("Email", true),
            (" ", false),
            ("config", true),
            ("uration help", false),
        ]
    );
}

#[test]
fn test_context_around_late_match() {
    let text = format!("{}needle{}", "x".repeat(400), "y".repeat(94));
    assert_eq!(text.chars().count(), 500);

    let excerpt = extract_context(&text, "needle", 100);
    assert!(excerpt.starts_with(ELLIPSIS));
    assert!(excerpt.ends_with(ELLIPSIS));
    assert!(excerpt.contains("needle"));

    let body = excerpt.chars().count() - 2 * ELLIPSIS.len();
    assert!((100..=110).contains(&body), "excerpt body was {} chars", body);
}

#[test]
fn test_alphabetical_sort_ignores_case() {
    let records = vec![
        record(json!({"title": "Banana", "category": "fruit"})),
        record(json!({"title": "apple", "category": "fruit"})),
        record(json!({"title": "Cherry", "category": "fruit"})),
    ];
    let options =
        SearchOptions::new(["title", "category"]).with_sort(SortStrategy::Alphabetical);
    let set = evaluate(&records, "fruit", &options, &SearchConfig::default());

    let titles: Vec<&str> = set
        .results
        .iter()
        .filter_map(|r| r.record["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["apple", "Banana", "Cherry"]);
}

#[test]
fn test_date_sort_newest_first_missing_last() {
    let records = vec![
        record(json!({"id": "old", "title": "Report", "updated_at": "2024-01-01T00:00:00Z"})),
        record(json!({"id": "none", "title": "Report"})),
        record(json!({"id": "new", "title": "Report", "created_at": "2024-06-01"})),
    ];
    let options = SearchOptions::new(["title"]).with_sort(SortStrategy::Date);
    let set = evaluate(&records, "report", &options, &SearchConfig::default());

    assert_eq!(ids(&set), vec!["new", "old", "none"]);
}

#[test]
fn test_date_sort_reads_sql_timestamps() {
    let records = vec![
        record(json!({"id": "old", "title": "Report", "updated_at": "2024-01-01T00:00:00Z"})),
        record(json!({"id": "naive", "title": "Report", "updated_at": "2024-06-01T10:00:00"})),
        record(json!({"id": "spaced", "title": "Report", "updated_at": "2024-07-01 10:00:00+00"})),
    ];
    let options = SearchOptions::new(["title"]).with_sort(SortStrategy::Date);
    let set = evaluate(&records, "report", &options, &SearchConfig::default());

    assert_eq!(ids(&set), vec!["spaced", "naive", "old"]);
}

#[test]
fn test_alphabetical_sort_ignores_accents() {
    let records = vec![
        record(json!({"title": "apple", "category": "fruit"})),
        record(json!({"title": "zebra", "category": "fruit"})),
        record(json!({"title": "École", "category": "fruit"})),
    ];
    let options =
        SearchOptions::new(["title", "category"]).with_sort(SortStrategy::Alphabetical);
    let set = evaluate(&records, "fruit", &options, &SearchConfig::default());

    let titles: Vec<&str> = set
        .results
        .iter()
        .filter_map(|r| r.record["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["apple", "École", "zebra"]);
}

#[test]
fn test_cap_and_has_more() {
    let records: Vec<Record> = (0..12)
        .map(|i| record(json!({"id": i, "title": format!("Invoice {}", i)})))
        .collect();
    let config = SearchConfig::builder().max_results(5).build().unwrap();
    let set = evaluate(&records, "invoice", &SearchOptions::new(["title"]), &config);

    assert_eq!(set.len(), 5);
    assert_eq!(set.total_count, 12);
    assert!(set.has_more);
    // equal scores keep collection order
    assert_eq!(ids(&set), vec!["0", "1", "2", "3", "4"]);
}

#[test]
fn test_relevance_order_by_match_kind() {
    let records = vec![
        record(json!({"id": "word", "title": "reset your password now"})),
        record(json!({"id": "exact", "title": "password"})),
        record(json!({"id": "prefix", "title": "password reset"})),
        record(json!({"id": "none", "title": "billing"})),
    ];
    let set = evaluate(
        &records,
        "password",
        &SearchOptions::new(["title"]),
        &SearchConfig::default(),
    );

    assert_eq!(ids(&set), vec!["exact", "prefix", "word"]);
    assert!(set.results.iter().all(|r| r.score > 0.0));
}

#[test]
fn test_accents_and_punctuation_ignored() {
    let records = vec![record(json!({"id": 7, "title": "Crème Brûlée: the recipe!"}))];
    let set = evaluate(
        &records,
        "creme brulee",
        &SearchOptions::new(["title"]),
        &SearchConfig::default(),
    );

    assert_eq!(ids(&set), vec!["7"]);
}

#[test]
fn test_filters_and_nested_fields() {
    let records = vec![
        record(json!({"id": 1, "title": "VPN down", "status": "open", "owner": {"name": "Dana"}})),
        record(json!({"id": 2, "title": "VPN slow", "status": "closed", "owner": {"name": "Sam"}})),
        record(json!({"id": 3, "title": "VPN setup", "status": "open", "owner": {"name": "Sam"}})),
    ];
    let options = SearchOptions::new(["title", "owner.name"]).with_filter("status", "open");

    let set = evaluate(&records, "vpn", &options, &SearchConfig::default());
    assert_eq!(ids(&set), vec!["1", "3"]);

    let set = evaluate(&records, "sam", &options, &SearchConfig::default());
    assert_eq!(ids(&set), vec!["3"]);
    assert_eq!(set.results[0].field.as_deref(), Some("owner.name"));
}

#[test]
fn test_min_query_length_falls_back_to_passthrough() {
    let config = SearchConfig::builder().min_query_length(3).build().unwrap();
    let set = evaluate(&website_and_email(), "we", &SearchOptions::new(["title"]), &config);

    assert!(!set.scored);
    assert_eq!(set.total_count, 2);
}

#[test]
fn test_computed_field() {
    let records = vec![
        record(json!({"id": 1, "first": "Ada", "last": "Lovelace"})),
        record(json!({"id": 2, "first": "Alan", "last": "Turing"})),
    ];
    let full_name = SearchField::computed("full_name", |r: &Record| {
        format!("{} {}", path_text(r, "first"), path_text(r, "last"))
    });
    let set = evaluate(
        &records,
        "ada lovelace",
        &SearchOptions::new([full_name]),
        &SearchConfig::default(),
    );

    assert_eq!(ids(&set), vec!["1"]);
    assert_eq!(set.results[0].matched.as_deref(), Some("Ada Lovelace"));
}

#[test]
fn test_records_from_json_rejects_non_arrays() {
    assert!(matches!(
        records_from_json(&serde_json::Value::Null),
        Err(SearchError::MissingCollection(_))
    ));
    assert!(matches!(
        records_from_json(&json!({"title": "not a list"})),
        Err(SearchError::InvalidCollection(_))
    ));
    assert_eq!(records_from_json(&json!([])).unwrap().len(), 0);
}
