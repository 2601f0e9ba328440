//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while configuring a search.
///
/// Data-shape problems inside records are never reported here; they are
/// coerced to empty text during scoring.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// No collection was supplied
    #[error("Missing collection: {0}")]
    MissingCollection(String),

    /// The supplied collection is not a list of records
    #[error("Invalid collection: {0}")]
    InvalidCollection(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid field list
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Collection name not registered with a cross-collection search
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            SearchError::MissingCollection(_)
            | SearchError::InvalidCollection(_)
            | SearchError::InvalidField(_)
            | SearchError::UnknownCollection(_) => AppError::Validation(err.to_string()),
        }
    }
}
