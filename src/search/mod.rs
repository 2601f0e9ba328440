//! In-memory search-as-you-type over small record collections
//!
//! This module provides relevance search for collections that fit comfortably
//! in memory (tickets, files, users, proposals), including:
//!
//! - **Normalization**: case folding, accent stripping, punctuation removal
//! - **Relevance Scoring**: exact/prefix/substring/word rules with field weights
//! - **Debouncing**: only the final query of a typing burst is evaluated
//! - **Result Shaping**: relevance/date/alphabetical sorting, capping, counts
//! - **Highlighting**: matched spans and context excerpts for display
//! - **Presets**: ready-made configurations, including cross-collection search
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │           SearchEngine                           │
//! ├─────────────────────────────────────────────────┤
//! │  - search()         - clear_search()            │
//! │  - settle_now()     - subscribe()               │
//! │  - Debouncer (cancellable Tokio timer)          │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │           evaluate()                             │
//! ├─────────────────────────────────────────────────┤
//! │  - pre-filter + discrete filters                │
//! │  - best field score per record                  │
//! │  - sort, cap, total/has-more                    │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │      scorer / normalize / highlight / context   │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use live_search::search::{record, SearchConfig, SearchEngine, SearchOptions};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let records = vec![
//!         record(json!({"id": 1, "title": "Website not loading"})),
//!         record(json!({"id": 2, "title": "Email help"})),
//!     ];
//!     let engine = SearchEngine::new(
//!         "tickets",
//!         records,
//!         SearchOptions::new(["title", "description"]),
//!         SearchConfig::default(),
//!     )?;
//!
//!     let mut updates = engine.subscribe();
//!     engine.search("website");
//!     while updates.changed().await.is_ok() {
//!         let snapshot = updates.borrow().clone();
//!         if !snapshot.is_searching {
//!             println!("Found {} records", snapshot.results.total_count);
//!             break;
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod context;
mod debounce;
mod engine;
mod error;
mod evaluate;
mod highlight;
mod normalize;
mod presets;
mod query;
mod record;
mod scorer;

pub use config::{SearchConfig, SearchConfigBuilder};
pub use context::{extract_context, ELLIPSIS};
pub use debounce::Debouncer;
pub use engine::{SearchEngine, SearchPhase, SearchSnapshot};
pub use error::{SearchError, SearchResult};
pub use evaluate::{evaluate, is_searchable, ScoredResult, SearchResultSet};
pub use highlight::{highlight, render_marked, HighlightSpan};
pub use normalize::{normalize, normalize_value, normalize_with_offsets};
pub use presets::{
    display_name, file_options, human_size, people_options, proposal_options, ticket_options,
    CrossCollectionSearch, Preset, COLLECTION_FIELD,
};
pub use query::{FieldFilter, RecordPredicate, RecordTransform, SearchOptions, SortStrategy};
pub use record::{
    lookup_path, path_text, read_records, record, records_from_json, timestamp_at, value_text,
    FieldAccessor, FieldKind, Record, RecordKey, SearchField,
};
pub use scorer::{field_weight, score, PreparedQuery};
