//! Live search: in-memory search-as-you-type with relevance ranking
//!
//! The [`search`] module holds the engine; [`config`] loads layered
//! configuration and [`error`] defines the application error type.

pub mod config;
pub mod error;
pub mod search;

pub use error::{AppError, Result};
pub use search::{
    extract_context, highlight, normalize, score, SearchConfig, SearchEngine, SearchError,
    SearchOptions, SearchResultSet, SearchSnapshot, SortStrategy,
};
