//! Live search state: debounced query, settled results and change notification

use crate::search::config::SearchConfig;
use crate::search::debounce::Debouncer;
use crate::search::error::SearchResult;
use crate::search::evaluate::{evaluate, is_searchable, SearchResultSet};
use crate::search::query::{SearchOptions, SortStrategy};
use crate::search::record::{records_from_json, Record};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info};

/// Where the engine is in the type → settle cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchPhase {
    /// Nothing typed, or the search was cleared
    Idle,
    /// The raw query changed and its quiet period has not elapsed
    Pending,
    /// Results reflect the settled query
    Settled,
}

/// Everything a UI needs to render the current search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub phase: SearchPhase,

    /// Query as typed
    pub raw_query: String,

    /// Query the results were computed from
    pub settled_query: String,

    pub results: SearchResultSet,

    /// The raw query has not settled yet
    pub is_searching: bool,

    /// The settled query was searchable and nothing matched
    pub is_empty: bool,

    /// Number of evaluations run since construction
    pub evaluations: u64,
}

struct EngineState {
    records: Vec<Record>,
    options: SearchOptions,
    raw_query: String,
    settled_query: String,
    phase: SearchPhase,
    results: SearchResultSet,
    evaluations: u64,
    /// Bumped on every query mutation; a timer only settles its own generation
    generation: u64,
}

impl EngineState {
    fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            phase: self.phase,
            raw_query: self.raw_query.clone(),
            settled_query: self.settled_query.clone(),
            results: self.results.clone(),
            is_searching: self.phase == SearchPhase::Pending,
            is_empty: self.results.scored && self.results.is_empty(),
            evaluations: self.evaluations,
        }
    }
}

struct Shared {
    name: String,
    config: SearchConfig,
    state: Mutex<EngineState>,
    updates: watch::Sender<SearchSnapshot>,
}

impl Shared {
    fn publish(&self, state: &EngineState) {
        self.updates.send_replace(state.snapshot());
    }

    fn evaluate(&self, state: &mut EngineState, counted: bool) {
        let start = Instant::now();
        state.results = evaluate(
            &state.records,
            &state.settled_query,
            &state.options,
            &self.config,
        );
        if counted {
            state.evaluations += 1;
        }

        debug!(
            engine = %self.name,
            query = %state.settled_query,
            total = state.results.total_count,
            returned = state.results.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Evaluated search"
        );
    }

    /// Settle the raw query if no mutation happened since `generation`.
    fn settle(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(engine = %self.name, "Dropping stale debounced search");
            return;
        }

        state.settled_query = state.raw_query.clone();
        state.phase = if is_searchable(&state.settled_query, &self.config) {
            SearchPhase::Settled
        } else {
            SearchPhase::Idle
        };
        self.evaluate(&mut state, true);
        self.publish(&state);
    }

    /// Recompute results after the records or options changed.
    fn refresh(&self, state: &mut EngineState) {
        match state.phase {
            SearchPhase::Pending => {}
            SearchPhase::Idle => self.evaluate(state, false),
            SearchPhase::Settled => self.evaluate(state, true),
        }
        self.publish(state);
    }
}

/// Debounced search over one in-memory collection.
///
/// Must be driven from within a Tokio runtime for debouncing; without one,
/// or with a zero `debounce_ms`, every [`search`](Self::search) settles
/// immediately. Dropping the engine cancels any pending evaluation.
pub struct SearchEngine {
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

impl SearchEngine {
    /// Create an engine over `records`. Fails on invalid configuration or fields.
    pub fn new(
        name: impl Into<String>,
        records: Vec<Record>,
        options: SearchOptions,
        config: SearchConfig,
    ) -> SearchResult<Self> {
        config.validate()?;
        options.validate()?;

        let name = name.into();
        info!(
            engine = %name,
            records = records.len(),
            fields = options.fields.len(),
            sort = %options.sort,
            debounce_ms = config.debounce_ms,
            "Creating search engine"
        );

        let results = evaluate(&records, "", &options, &config);
        let state = EngineState {
            records,
            options,
            raw_query: String::new(),
            settled_query: String::new(),
            phase: SearchPhase::Idle,
            results,
            evaluations: 0,
            generation: 0,
        };
        let (updates, _) = watch::channel(state.snapshot());

        Ok(Self {
            shared: Arc::new(Shared {
                name,
                config,
                state: Mutex::new(state),
                updates,
            }),
            debouncer: Debouncer::new(),
        })
    }

    /// Create an engine from a loaded JSON payload, which must be an array.
    pub fn from_json(
        name: impl Into<String>,
        payload: &Value,
        options: SearchOptions,
        config: SearchConfig,
    ) -> SearchResult<Self> {
        let records = records_from_json(payload)?;
        Self::new(name, records, options, config)
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn config(&self) -> &SearchConfig {
        &self.shared.config
    }

    /// Set the raw query and restart the quiet period.
    pub fn search(&self, query: impl Into<String>) {
        let generation = {
            let mut state = self.shared.state.lock();
            state.raw_query = query.into();
            state.phase = SearchPhase::Pending;
            state.generation += 1;
            self.shared.publish(&state);
            state.generation
        };

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let scheduled = self.debouncer.schedule(self.shared.config.debounce(), async move {
            if let Some(shared) = weak.upgrade() {
                shared.settle(generation);
            }
        });

        if scheduled {
            debug!(engine = %self.shared.name, generation, "Scheduled debounced search");
        } else {
            self.shared.settle(generation);
        }
    }

    /// Evaluate the raw query now, skipping the rest of the quiet period.
    pub fn settle_now(&self) {
        self.debouncer.cancel();
        let generation = self.shared.state.lock().generation;
        self.shared.settle(generation);
    }

    /// Clear raw and settled query and return to [`SearchPhase::Idle`].
    pub fn clear_search(&self) {
        self.debouncer.cancel();

        let mut state = self.shared.state.lock();
        state.generation += 1;
        state.raw_query.clear();
        state.settled_query.clear();
        state.phase = SearchPhase::Idle;
        self.shared.evaluate(&mut state, false);
        self.shared.publish(&state);
    }

    /// Replace the searched collection.
    pub fn set_records(&self, records: Vec<Record>) {
        let mut state = self.shared.state.lock();
        state.records = records;
        self.shared.refresh(&mut state);
    }

    /// Change the sort strategy.
    pub fn set_sort(&self, sort: SortStrategy) {
        let mut state = self.shared.state.lock();
        state.options.sort = sort;
        self.shared.refresh(&mut state);
    }

    /// Replace the search options. Fails, leaving the current options, when they are invalid.
    pub fn set_options(&self, options: SearchOptions) -> SearchResult<()> {
        options.validate()?;
        let mut state = self.shared.state.lock();
        state.options = options;
        self.shared.refresh(&mut state);
        Ok(())
    }

    /// Current state
    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.updates.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.updates.subscribe()
    }

    pub fn results(&self) -> SearchResultSet {
        self.shared.updates.borrow().results.clone()
    }

    pub fn raw_query(&self) -> String {
        self.shared.state.lock().raw_query.clone()
    }

    pub fn phase(&self) -> SearchPhase {
        self.shared.state.lock().phase
    }

    pub fn is_searching(&self) -> bool {
        self.phase() == SearchPhase::Pending
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("SearchEngine")
            .field("name", &self.shared.name)
            .field("phase", &state.phase)
            .field("raw_query", &state.raw_query)
            .field("records", &state.records.len())
            .finish_non_exhaustive()
    }
}
