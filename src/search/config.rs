//! Search configuration

use crate::search::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a query is evaluated
    pub debounce_ms: u64,

    /// Queries shorter than this (in chars, after trimming) are not scored
    pub min_query_length: usize,

    /// Maximum number of results returned per evaluation
    pub max_results: usize,

    /// Attach highlighted spans of every searched field to each result
    pub highlight_results: bool,

    /// Window used by callers extracting context excerpts
    pub context_window: usize,
}

impl SearchConfig {
    /// Create a new builder for SearchConfig
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> SearchResult<()> {
        if self.max_results == 0 {
            return Err(SearchError::InvalidConfiguration(
                "max_results must be greater than 0".to_string(),
            ));
        }

        if self.min_query_length == 0 {
            return Err(SearchError::InvalidConfiguration(
                "min_query_length must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_length: 1,
            max_results: 50,
            highlight_results: false,
            context_window: 100,
        }
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    pub fn min_query_length(mut self, len: usize) -> Self {
        self.config.min_query_length = len;
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.config.max_results = max;
        self
    }

    pub fn highlight_results(mut self, enabled: bool) -> Self {
        self.config.highlight_results = enabled;
        self
    }

    pub fn context_window(mut self, window: usize) -> Self {
        self.config.context_window = window;
        self
    }

    /// Build and validate
    pub fn build(self) -> SearchResult<SearchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
