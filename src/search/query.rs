//! Search options: fields, sorting, filters and result shaping

use crate::search::error::{SearchError, SearchResult};
use crate::search::record::{lookup_path, value_text, Record, SearchField};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied predicate applied before scoring.
pub type RecordPredicate = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// Caller-supplied shaping applied to returned records after sorting.
pub type RecordTransform = Arc<dyn Fn(&mut Record) + Send + Sync>;

/// Ordering of scored results
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortStrategy {
    /// Highest score first; ties keep collection order
    #[default]
    Relevance,
    /// Newest first by the best available timestamp; undated records count as epoch 0
    Date,
    /// Case-insensitive by name/title; unnamed records last
    Alphabetical,
}

/// Discrete `field == value` filter. Array fields match when any element does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match lookup_path(record, &self.field) {
            None => false,
            Some(Value::Array(items)) if !self.value.is_array() => {
                items.iter().any(|item| scalar_eq(item, &self.value))
            }
            Some(found) => scalar_eq(found, &self.value),
        }
    }
}

fn scalar_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            left == right
        }
        _ => value_text(left) == value_text(right),
    }
}

/// Everything that shapes one search besides the query text.
#[derive(Clone)]
pub struct SearchOptions {
    /// Fields scored on every record, in tie-break order
    pub fields: Vec<SearchField>,

    /// Result ordering
    pub sort: SortStrategy,

    /// Discrete filters, ANDed with the pre-filter
    pub filters: Vec<FieldFilter>,

    /// Timestamp fields for date sorting, most preferred first
    pub date_fields: Vec<String>,

    /// Name fields for alphabetical sorting, most preferred first
    pub name_fields: Vec<String>,

    pre_filter: Option<RecordPredicate>,
    transform: Option<RecordTransform>,
}

impl SearchOptions {
    pub fn new<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<SearchField>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            sort: SortStrategy::default(),
            filters: Vec::new(),
            date_fields: vec![
                "updated_at".to_string(),
                "created_at".to_string(),
                "date".to_string(),
            ],
            name_fields: vec!["name".to_string(), "title".to_string()],
            pre_filter: None,
            transform: None,
        }
    }

    pub fn with_sort(mut self, sort: SortStrategy) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter::new(field, value));
        self
    }

    pub fn with_date_fields(mut self, fields: Vec<impl Into<String>>) -> Self {
        self.date_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_name_fields(mut self, fields: Vec<impl Into<String>>) -> Self {
        self.name_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Only records for which `predicate` holds are scored.
    pub fn with_pre_filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.pre_filter = Some(Arc::new(predicate));
        self
    }

    /// Shape each returned record, e.g. to add display-only fields.
    pub fn with_transform<T>(mut self, transform: T) -> Self
    where
        T: Fn(&mut Record) + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Reject empty, unnamed or duplicated field lists.
    pub fn validate(&self) -> SearchResult<()> {
        if self.fields.is_empty() {
            return Err(SearchError::InvalidField(
                "at least one search field is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(SearchError::InvalidField("field name is empty".to_string()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SearchError::InvalidField(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
        }

        Ok(())
    }

    /// Whether `record` passes the pre-filter and every discrete filter.
    pub fn admits(&self, record: &Record) -> bool {
        self.pre_filter.as_ref().map_or(true, |p| p(record))
            && self.filters.iter().all(|f| f.matches(record))
    }

    pub(crate) fn apply_transform(&self, record: &mut Record) {
        if let Some(transform) = &self.transform {
            transform(record);
        }
    }
}

impl fmt::Debug for SearchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOptions")
            .field("fields", &self.fields)
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .field("date_fields", &self.date_fields)
            .field("name_fields", &self.name_fields)
            .field("pre_filter", &self.pre_filter.is_some())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}
