//! Records and the fields searched on them

use crate::search::error::{SearchError, SearchResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A schemaless record: field name to JSON value.
pub type Record = Map<String, Value>;

/// Extracts the searchable text of one field from a record.
pub type FieldAccessor = Arc<dyn Fn(&Record) -> String + Send + Sync>;

/// Stable identity of a result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    /// Value of the record's `id` field
    Id(String),
    /// Position in the searched collection; only valid for one evaluation
    Position(usize),
}

impl RecordKey {
    /// Key a record by its `id` field, falling back to `position`.
    pub fn of(record: &Record, position: usize) -> Self {
        match record.get("id") {
            Some(Value::String(id)) => RecordKey::Id(id.clone()),
            Some(Value::Number(id)) => RecordKey::Id(id.to_string()),
            _ => RecordKey::Position(position),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Id(id) => write!(f, "{}", id),
            RecordKey::Position(position) => write!(f, "#{}", position),
        }
    }
}

/// Coerce any JSON value to display text.
///
/// Arrays (tags) and objects are flattened to their values separated by a
/// space; `null` is empty.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => join_texts(items.iter()),
        Value::Object(map) => join_texts(map.values()),
    }
}

fn join_texts<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values
        .map(value_text)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a dotted path (`customer.email`) against a record.
pub fn lookup_path<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Text at `path`, or "" when any segment is missing.
pub fn path_text(record: &Record, path: &str) -> String {
    lookup_path(record, path).map(value_text).unwrap_or_default()
}

/// Interpret a field as a timestamp.
///
/// Accepts RFC 3339 strings, SQL-style `YYYY-MM-DD HH:MM:SS[.f][+TZ]`,
/// datetimes without an offset (read as UTC), plain `YYYY-MM-DD` dates and
/// numbers holding epoch milliseconds.
pub fn timestamp_at(record: &Record, path: &str) -> Option<DateTime<Utc>> {
    match lookup_path(record, path)? {
        Value::String(s) => parse_timestamp(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|dt| dt.and_utc())
}

/// Semantic type of a field, used by UIs to pick an input widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Tags,
    Date,
    Number,
    Select,
}

/// A field searched on every record.
#[derive(Clone)]
pub struct SearchField {
    /// Semantic name; selects the field weight
    pub name: String,

    /// Human-readable label
    pub label: Option<String>,

    /// Field type
    pub kind: FieldKind,

    /// Allowed values for discrete filters
    pub options: Vec<String>,

    accessor: FieldAccessor,
}

impl SearchField {
    /// Field read from a (possibly dotted) path of the same name.
    pub fn path(path: impl Into<String>) -> Self {
        let name = path.into();
        let lookup = name.clone();
        Self {
            name,
            label: None,
            kind: FieldKind::Text,
            options: Vec::new(),
            accessor: Arc::new(move |record| path_text(record, &lookup)),
        }
    }

    /// Field computed by an explicit accessor.
    pub fn computed<F>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            label: None,
            kind: FieldKind::Text,
            options: Vec::new(),
            accessor: Arc::new(accessor),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_options(mut self, options: Vec<impl Into<String>>) -> Self {
        self.options = options.into_iter().map(|o| o.into()).collect();
        self
    }

    /// Searchable text of this field on `record`.
    pub fn text(&self, record: &Record) -> String {
        (self.accessor)(record)
    }

    /// Name used for the weight table: the last segment of a dotted path.
    pub fn weight_key(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Debug for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchField")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl From<&str> for SearchField {
    fn from(path: &str) -> Self {
        SearchField::path(path)
    }
}

/// Convert a loaded JSON payload into records.
///
/// `null` is a missing collection and anything but an array is rejected.
/// Elements that are not objects are kept as `{"value": element}`.
pub fn records_from_json(payload: &Value) -> SearchResult<Vec<Record>> {
    match payload {
        Value::Null => Err(SearchError::MissingCollection(
            "collection payload is null".to_string(),
        )),
        Value::Array(items) => Ok(items
            .iter()
            .map(|item| match item {
                Value::Object(map) => map.clone(),
                other => {
                    let mut wrapped = Map::new();
                    wrapped.insert("value".to_string(), other.clone());
                    wrapped
                }
            })
            .collect()),
        other => Err(SearchError::InvalidCollection(format!(
            "expected an array of records, got {}",
            json_type(other)
        ))),
    }
}

/// Read a JSON file holding an array of records.
pub fn read_records(path: impl AsRef<Path>) -> crate::Result<Vec<Record>> {
    let text = std::fs::read_to_string(path)?;
    let payload: Value = serde_json::from_str(&text)?;
    Ok(records_from_json(&payload)?)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Build a record from a `json!({...})` literal. Non-objects produce an empty record.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn test_record_key() {
        let with_id = record(json!({"id": 7, "title": "x"}));
        assert_eq!(RecordKey::of(&with_id, 3), RecordKey::Id("7".to_string()));

        let without_id = record(json!({"title": "x"}));
        assert_eq!(RecordKey::of(&without_id, 3), RecordKey::Position(3));
    }

    #[test]
    fn test_lookup_path() {
        let r = record(json!({
            "customer": {"email": "ops@example.com", "aliases": ["a", "b"]},
            "title": "Outage"
        }));

        assert_eq!(path_text(&r, "customer.email"), "ops@example.com");
        assert_eq!(path_text(&r, "customer.aliases.1"), "b");
        assert_eq!(path_text(&r, "customer.missing.deeper"), "");
        assert_eq!(path_text(&r, "title.length"), "");
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!(["billing", null, "vip"])), "billing vip");
        assert_eq!(value_text(&json!({"first": "Ada", "last": "Lovelace"})), "Ada Lovelace");
        assert_eq!(value_text(&json!(true)), "true");
    }

    #[test]
    fn test_timestamp_at() {
        let r = record(json!({
            "rfc": "2024-03-01T12:00:00Z",
            "day": "2023-12-31",
            "millis": 86_400_000,
            "junk": "yesterday"
        }));

        assert_eq!(timestamp_at(&r, "rfc").map(|d| d.month()), Some(3));
        assert_eq!(timestamp_at(&r, "day").map(|d| d.year()), Some(2023));
        assert_eq!(timestamp_at(&r, "millis").map(|d| d.day()), Some(2));
        assert!(timestamp_at(&r, "junk").is_none());
        assert!(timestamp_at(&r, "absent").is_none());
    }

    #[test]
    fn test_timestamp_at_sql_forms() {
        let r = record(json!({
            "naive": "2024-06-01T10:00:00",
            "naive_fraction": "2024-06-01T10:00:00.250",
            "spaced": "2024-07-01 10:00:00",
            "spaced_offset": "2024-07-01 10:00:00+00",
            "spaced_full_offset": "2024-07-01 12:30:00.5+02:00",
        }));

        let ts = |field: &str| timestamp_at(&r, field).map(|d| d.to_rfc3339());
        assert_eq!(ts("naive").as_deref(), Some("2024-06-01T10:00:00+00:00"));
        assert_eq!(ts("naive_fraction").as_deref(), Some("2024-06-01T10:00:00.250+00:00"));
        assert_eq!(ts("spaced").as_deref(), Some("2024-07-01T10:00:00+00:00"));
        assert_eq!(ts("spaced_offset").as_deref(), Some("2024-07-01T10:00:00+00:00"));
        assert_eq!(ts("spaced_full_offset").as_deref(), Some("2024-07-01T10:30:00.500+00:00"));
    }

    #[test]
    fn test_search_field_accessors() {
        let r = record(json!({"first_name": "Grace", "last_name": "Hopper"}));
        let full = SearchField::computed("name", |r| {
            format!("{} {}", path_text(r, "first_name"), path_text(r, "last_name"))
        });
        assert_eq!(full.text(&r), "Grace Hopper");
        assert_eq!(SearchField::path("customer.email").weight_key(), "email");
    }

    #[test]
    fn test_read_records() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 1, "title": "Printer jam"}}, "loose"]"#).unwrap();
        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["value"], json!("loose"));

        let err = read_records("does/not/exist.json").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[{{not json").unwrap();
        assert_eq!(read_records(file.path()).unwrap_err().error_code(), "SERIALIZATION_ERROR");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"title": "single"}}"#).unwrap();
        assert_eq!(read_records(file.path()).unwrap_err().error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_records_from_json() {
        assert!(matches!(
            records_from_json(&Value::Null),
            Err(SearchError::MissingCollection(_))
        ));
        assert!(matches!(
            records_from_json(&json!({"id": 1})),
            Err(SearchError::InvalidCollection(_))
        ));

        let records = records_from_json(&json!([{"id": 1}, "loose"])).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("value"), Some(&json!("loose")));
    }
}
