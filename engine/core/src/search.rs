//! Search Session
//!
//! Holds the current query and the results of the last completed search.
//! Each completed search replaces the results wholesale; a failed search
//! leaves the session empty instead of showing stale results.
//!
//! Results are stored in the order the service ranked them. The display
//! order applies one extra policy on top: boilerplate sections containing
//! the phrase [`DEMOTED_PHRASE`] are moved behind everything else.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::backend::{AssistantApi, SearchRequest, SearchResponse, SearchResult};
use crate::config::{DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
use crate::lifecycle::{RequestController, StartOutcome};

/// Results whose text contains this phrase (any case) are listed last
pub const DEMOTED_PHRASE: &str = "place of work your";

/// The single channel a search session uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchChannel {
    /// One semantic search
    Search,
}

/// Current query plus last result set
pub struct SearchSession {
    api: Arc<dyn AssistantApi>,
    controller: RequestController<SearchChannel>,
    query: RwLock<String>,
    results: RwLock<Vec<SearchResult>>,
    limit: u32,
}

impl SearchSession {
    /// Create a session with an empty query and no results
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        Self {
            api,
            controller: RequestController::new(),
            query: RwLock::new(String::new()),
            results: RwLock::new(Vec::new()),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Set how many results to request, clamped to `1..=20`
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        self
    }

    /// Replace the query text
    pub fn set_query(&self, query: impl Into<String>) {
        *self.query.write() = query.into();
    }

    /// Current query text, as typed
    #[must_use]
    pub fn query(&self) -> String {
        self.query.read().clone()
    }

    /// Run the current query
    ///
    /// Returns `None` without contacting the service if the query is empty
    /// or whitespace.
    pub async fn search(&self) -> Option<StartOutcome> {
        let query = self.query.read().trim().to_string();
        if query.is_empty() {
            return None;
        }

        let request = SearchRequest {
            query,
            limit: self.limit,
        };
        let outcome = self
            .controller
            .start(
                SearchChannel::Search,
                request,
                |request| {
                    let api = Arc::clone(&self.api);
                    async move { api.search(&request).await }
                },
                |response: SearchResponse| {
                    tracing::debug!(count = response.results.len(), "Search completed");
                    *self.results.write() = response.results;
                },
                |_| self.results.write().clear(),
            )
            .await;
        Some(outcome)
    }

    /// Results in the order the service returned them
    #[must_use]
    pub fn results(&self) -> Vec<SearchResult> {
        self.results.read().clone()
    }

    /// Results in display order
    #[must_use]
    pub fn ordered_results(&self) -> Vec<SearchResult> {
        order_results(&self.results.read())
    }

    /// Whether a search is in flight
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.controller.is_pending(SearchChannel::Search)
    }

    /// Nothing to show and nothing on the way
    #[must_use]
    pub fn is_empty_state(&self) -> bool {
        self.results.read().is_empty() && !self.is_searching()
    }

    /// Number of results requested per search
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

/// Order results for display
///
/// Results not containing [`DEMOTED_PHRASE`] come first, then those that
/// do. Relative order within each group is preserved.
#[must_use]
pub fn order_results(results: &[SearchResult]) -> Vec<SearchResult> {
    let (demoted, kept): (Vec<_>, Vec<_>) = results
        .iter()
        .cloned()
        .partition(|r| r.text.to_lowercase().contains(DEMOTED_PHRASE));
    kept.into_iter().chain(demoted).collect()
}
