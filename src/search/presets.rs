//! Fixed search configurations for common record shapes
//!
//! Each preset is a field list, an optional pre-filter and an optional
//! transform layered on [`SearchOptions`]. [`CrossCollectionSearch`] searches
//! several preset collections at once.

use crate::search::config::SearchConfig;
use crate::search::engine::{SearchEngine, SearchSnapshot};
use crate::search::error::{SearchError, SearchResult};
use crate::search::query::{SearchOptions, SortStrategy};
use crate::search::record::{path_text, FieldKind, Record, SearchField};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Field added to every record searched through [`CrossCollectionSearch`].
pub const COLLECTION_FIELD: &str = "_collection";

/// Record shapes with a built-in configuration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Preset {
    People,
    Files,
    Tickets,
    Proposals,
}

impl Preset {
    pub fn options(&self) -> SearchOptions {
        match self {
            Preset::People => people_options(),
            Preset::Files => file_options(),
            Preset::Tickets => ticket_options(),
            Preset::Proposals => proposal_options(),
        }
    }

    /// Engine over `records` configured for this preset.
    pub fn engine(&self, records: Vec<Record>, config: SearchConfig) -> SearchResult<SearchEngine> {
        SearchEngine::new(self.to_string(), records, self.options(), config)
    }
}

/// Users and contacts. Adds `display_name`.
pub fn people_options() -> SearchOptions {
    SearchOptions::new([
        SearchField::path("name"),
        SearchField::path("full_name").with_label("Full name"),
        SearchField::path("email").with_kind(FieldKind::Email),
        SearchField::path("role"),
        SearchField::path("department"),
    ])
    .with_name_fields(vec!["full_name", "name", "email"])
    .with_transform(|record| {
        let name = display_name(record);
        record.insert("display_name".to_string(), Value::String(name));
    })
}

/// Uploaded files. Adds `size_display`.
pub fn file_options() -> SearchOptions {
    SearchOptions::new([
        SearchField::path("name"),
        SearchField::path("description"),
        SearchField::path("tags").with_kind(FieldKind::Tags),
        SearchField::path("mime_type").with_label("Type"),
    ])
    .with_transform(|record| {
        if let Some(bytes) = record.get("size").and_then(Value::as_u64) {
            record.insert("size_display".to_string(), Value::String(human_size(bytes)));
        }
    })
}

/// Support tickets. Archived tickets are never scored.
pub fn ticket_options() -> SearchOptions {
    SearchOptions::new([
        SearchField::path("title"),
        SearchField::path("description"),
        SearchField::path("tags").with_kind(FieldKind::Tags),
        SearchField::path("customer_email")
            .with_label("Customer")
            .with_kind(FieldKind::Email),
        SearchField::path("status")
            .with_kind(FieldKind::Select)
            .with_options(vec!["open", "in_progress", "resolved", "closed"]),
    ])
    .with_pre_filter(|record| !is_archived(record))
}

/// Client proposals, newest first.
pub fn proposal_options() -> SearchOptions {
    SearchOptions::new([
        SearchField::path("title"),
        SearchField::path("client_name").with_label("Client"),
        SearchField::path("description"),
        SearchField::path("status").with_kind(FieldKind::Select),
    ])
    .with_sort(SortStrategy::Date)
}

fn is_archived(record: &Record) -> bool {
    record.get("archived").and_then(Value::as_bool).unwrap_or(false)
        || record.get("status").and_then(Value::as_str) == Some("archived")
}

/// Best human-readable name of a person record.
///
/// Tries `full_name`, then `first_name last_name`, then `name`, then `email`.
pub fn display_name(record: &Record) -> String {
    let full_name = path_text(record, "full_name");
    if !full_name.trim().is_empty() {
        return full_name.trim().to_string();
    }

    let parts = format!(
        "{} {}",
        path_text(record, "first_name").trim(),
        path_text(record, "last_name").trim()
    );
    if !parts.trim().is_empty() {
        return parts.trim().to_string();
    }

    ["name", "email"]
        .iter()
        .map(|field| path_text(record, field))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_default()
}

/// Format a byte count with 1024-based units: `1536` → `"1.5 KB"`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    // compare the rounded value so 1023.95 KB carries over to 1 MB
    while unit < UNITS.len() - 1 && (size * 10.0).round() / 10.0 >= 1024.0 {
        size /= 1024.0;
        unit += 1;
    }
    let formatted = format!("{:.1}", size);
    let trimmed = formatted.trim_end_matches(".0");
    format!("{} {}", trimmed, UNITS[unit])
}

/// Search over several named collections, one at a time or all together.
///
/// Every record is tagged with [`COLLECTION_FIELD`] before merging. Each
/// record keeps the pre-filter and transform of its own collection's preset.
pub struct CrossCollectionSearch {
    collections: Vec<(String, Vec<Record>)>,
    active: Option<String>,
    engine: SearchEngine,
}

impl CrossCollectionSearch {
    pub fn new(
        collections: Vec<(String, Preset, Vec<Record>)>,
        config: SearchConfig,
    ) -> SearchResult<Self> {
        if collections.is_empty() {
            return Err(SearchError::MissingCollection(
                "cross-collection search needs at least one collection".to_string(),
            ));
        }

        let mut presets: HashMap<String, SearchOptions> = HashMap::new();
        let mut fields: Vec<SearchField> = Vec::new();
        let mut field_names: HashSet<String> = HashSet::new();
        let mut name_fields: Vec<String> = Vec::new();
        let mut date_fields: Vec<String> = Vec::new();
        let mut tagged: Vec<(String, Vec<Record>)> = Vec::with_capacity(collections.len());

        for (name, preset, records) in collections {
            if presets.contains_key(&name) {
                return Err(SearchError::InvalidConfiguration(format!(
                    "collection '{}' registered twice",
                    name
                )));
            }

            let options = preset.options();
            for field in &options.fields {
                if field_names.insert(field.name.clone()) {
                    fields.push(field.clone());
                }
            }
            extend_unique(&mut name_fields, &options.name_fields);
            extend_unique(&mut date_fields, &options.date_fields);
            presets.insert(name.clone(), options);

            let records: Vec<Record> = records
                .into_iter()
                .map(|mut record| {
                    record.insert(COLLECTION_FIELD.to_string(), Value::String(name.clone()));
                    record
                })
                .collect();
            tagged.push((name, records));
        }

        let presets = Arc::new(presets);
        let filter_presets = presets.clone();
        let options = SearchOptions::new(fields)
            .with_name_fields(name_fields)
            .with_date_fields(date_fields)
            .with_pre_filter(move |record| {
                collection_options(&filter_presets, record).map_or(true, |o| o.admits(record))
            })
            .with_transform(move |record| {
                if let Some(options) = collection_options(&presets, record) {
                    options.apply_transform(record);
                }
            });

        info!(
            collections = tagged.len(),
            fields = options.fields.len(),
            "Creating cross-collection search"
        );

        let merged = merge(&tagged, None);
        let engine = SearchEngine::new("cross_collection", merged, options, config)?;

        Ok(Self {
            collections: tagged,
            active: None,
            engine,
        })
    }

    /// Narrow the search to one collection, or `None` for all of them.
    pub fn set_active_collection(&mut self, collection: Option<&str>) -> SearchResult<()> {
        if let Some(name) = collection {
            if !self.collections.iter().any(|(n, _)| n == name) {
                return Err(SearchError::UnknownCollection(name.to_string()));
            }
        }

        self.active = collection.map(String::from);
        self.engine
            .set_records(merge(&self.collections, self.active.as_deref()));
        Ok(())
    }

    pub fn active_collection(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn collection_names(&self) -> Vec<&str> {
        self.collections.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn search(&self, query: impl Into<String>) {
        self.engine.search(query);
    }

    pub fn clear_search(&self) {
        self.engine.clear_search();
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.engine.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.engine.subscribe()
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }
}

fn collection_options<'a>(
    presets: &'a HashMap<String, SearchOptions>,
    record: &Record,
) -> Option<&'a SearchOptions> {
    record
        .get(COLLECTION_FIELD)
        .and_then(Value::as_str)
        .and_then(|name| presets.get(name))
}

/// Append the entries of `extra` not already in `into`, keeping order.
fn extend_unique(into: &mut Vec<String>, extra: &[String]) {
    for item in extra {
        if !into.contains(item) {
            into.push(item.clone());
        }
    }
}

fn merge(collections: &[(String, Vec<Record>)], active: Option<&str>) -> Vec<Record> {
    collections
        .iter()
        .filter(|(name, _)| active.map_or(true, |a| a == name))
        .flat_map(|(_, records)| records.iter().cloned())
        .collect()
}
