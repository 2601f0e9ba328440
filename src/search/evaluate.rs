//! One-shot evaluation of a settled query against a collection

use crate::search::config::SearchConfig;
use crate::search::highlight::{highlight, HighlightSpan};
use crate::search::normalize::normalize;
use crate::search::query::{SearchOptions, SortStrategy};
use crate::search::record::{path_text, timestamp_at, Record, RecordKey};
use crate::search::scorer::PreparedQuery;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// A record that survived scoring, decorated with how it matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Result key: the record id, or its position for this evaluation only
    #[serde(rename = "_searchKey")]
    pub key: RecordKey,

    /// Position in the searched collection
    #[serde(rename = "_searchPosition")]
    pub position: usize,

    /// The record, after any transform
    #[serde(flatten)]
    pub record: Record,

    /// Best score over all searched fields; 0 when no scoring happened
    #[serde(rename = "_searchScore")]
    pub score: f64,

    /// Field that produced the best score
    #[serde(rename = "_searchField", default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Raw text of that field
    #[serde(rename = "_searchMatch", default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,

    /// Highlighted text of each searched field
    #[serde(rename = "_highlights", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub highlights: BTreeMap<String, Vec<HighlightSpan>>,
}

impl ScoredResult {
    fn unscored(record: Record, position: usize) -> Self {
        Self {
            key: RecordKey::of(&record, position),
            position,
            record,
            score: 0.0,
            field: None,
            matched: None,
            highlights: BTreeMap::new(),
        }
    }
}

/// Results of one evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSet {
    /// Returned results, sorted and capped
    pub results: Vec<ScoredResult>,

    /// Matches before capping; the collection size for unscored queries
    pub total_count: usize,

    /// Whether `total_count` exceeds the cap
    pub has_more: bool,

    /// Whether the query was long enough to be scored
    pub scored: bool,
}

impl SearchResultSet {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Keys of the returned results, in order
    pub fn keys(&self) -> Vec<RecordKey> {
        self.results.iter().map(|r| r.key.clone()).collect()
    }
}

/// Whether `query` is long enough to be scored.
pub fn is_searchable(query: &str, config: &SearchConfig) -> bool {
    let len = query.trim().chars().count();
    len > 0 && len >= config.min_query_length
}

/// Evaluate `query` against `records`.
///
/// Queries that are not searchable return the first `max_results` records in
/// collection order without scoring or filtering.
pub fn evaluate(
    records: &[Record],
    query: &str,
    options: &SearchOptions,
    config: &SearchConfig,
) -> SearchResultSet {
    let cap = config.max_results;

    if !is_searchable(query, config) {
        let results = records
            .iter()
            .take(cap)
            .enumerate()
            .map(|(position, record)| {
                let mut record = record.clone();
                options.apply_transform(&mut record);
                ScoredResult::unscored(record, position)
            })
            .collect();
        return SearchResultSet {
            results,
            total_count: records.len(),
            has_more: records.len() > cap,
            scored: false,
        };
    }

    let query = query.trim();
    let prepared = PreparedQuery::new(query);

    let mut matches: Vec<(usize, BestMatch)> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| options.admits(record))
        .filter_map(|(position, record)| {
            best_match(record, options, &prepared).map(|best| (position, best))
        })
        .collect();

    match options.sort {
        // stable sorts: ties keep collection order
        SortStrategy::Relevance => matches.sort_by(|a, b| b.1.score.total_cmp(&a.1.score)),
        SortStrategy::Date => matches.sort_by_cached_key(|(position, _)| {
            Reverse(sort_timestamp(&records[*position], &options.date_fields))
        }),
        SortStrategy::Alphabetical => matches.sort_by_cached_key(|(position, _)| {
            match sort_name(&records[*position], &options.name_fields) {
                Some(name) => (false, name),
                None => (true, String::new()),
            }
        }),
    }

    let total_count = matches.len();
    matches.truncate(cap);

    let results = matches
        .into_iter()
        .map(|(position, best)| {
            let original = &records[position];
            let highlights = if config.highlight_results {
                options
                    .fields
                    .iter()
                    .filter_map(|field| {
                        let text = field.text(original);
                        (!text.is_empty()).then(|| (field.name.clone(), highlight(&text, query)))
                    })
                    .collect()
            } else {
                BTreeMap::new()
            };

            let mut record = original.clone();
            options.apply_transform(&mut record);

            ScoredResult {
                key: RecordKey::of(original, position),
                position,
                record,
                score: best.score,
                field: Some(options.fields[best.field].name.clone()),
                matched: Some(best.text),
                highlights,
            }
        })
        .collect();

    SearchResultSet {
        results,
        total_count,
        has_more: total_count > cap,
        scored: true,
    }
}

struct BestMatch {
    field: usize,
    score: f64,
    text: String,
}

/// Highest-scoring field of `record`; the earlier field wins ties. `None` when nothing scores.
fn best_match(record: &Record, options: &SearchOptions, query: &PreparedQuery) -> Option<BestMatch> {
    let mut best: Option<BestMatch> = None;
    for (index, field) in options.fields.iter().enumerate() {
        let text = field.text(record);
        let score = query.score(&normalize(&text), field.weight_key());
        if score > best.as_ref().map_or(0.0, |b| b.score) {
            best = Some(BestMatch {
                field: index,
                score,
                text,
            });
        }
    }
    best
}

fn sort_timestamp(record: &Record, date_fields: &[String]) -> i64 {
    date_fields
        .iter()
        .find_map(|field| timestamp_at(record, field))
        .map(|ts| ts.timestamp_millis())
        .unwrap_or(0)
}

/// Normalized name used for alphabetical ordering; accents and punctuation do not count.
fn sort_name(record: &Record, name_fields: &[String]) -> Option<String> {
    name_fields
        .iter()
        .map(|field| normalize(&path_text(record, field)))
        .find(|name| !name.is_empty())
}
