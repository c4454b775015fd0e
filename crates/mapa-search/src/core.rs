//! The search aggregator: one entry point over every registered provider.
//!
//! A query is fanned out to all selected providers at once, their results are
//! merged into a single relevance-ordered list and the query is remembered in
//! the [`SearchHistory`].
//!
//! # Quick Start
//!
//! ```rust
//! use mapa_search::{AggregatorConfig, SearchAggregator};
//!
//! let aggregator = SearchAggregator::new(AggregatorConfig::default());
//! assert!(aggregator.provider_types().is_empty());
//! assert!(aggregator.search_history().is_empty());
//! ```

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use itertools::Itertools;
use mapa_search_data::StateStore;
use tracing::{debug, info, instrument};

use crate::{
    config::{AggregatorConfig, MIN_QUERY_CHARS},
    history::SearchHistory,
    search::{
        ProviderRegistry, SearchError, SearchOptions, SearchProvider, SearchResult, fan_out,
        merge_ranked,
    },
};

/// Fans queries out to registered [`SearchProvider`]s and merges their results.
///
/// Construct one at startup and share it by reference (or `Arc`) with whatever
/// issues queries. Registration takes `&self`, so providers can be added after
/// the aggregator has been shared; a search only sees the providers registered
/// when it started.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use mapa_search::{
///     AggregatorConfig, LocationProvider, SearchAggregator, SearchOptions,
///     data::{InMemoryRecordSource, TestDataConfig, create_test_records},
/// };
///
/// # async fn run() -> Result<(), mapa_search::error::MapaSearchError> {
/// let records = create_test_records(&TestDataConfig::sample());
/// let aggregator = SearchAggregator::new(AggregatorConfig::default());
/// aggregator.register_provider(
///     LocationProvider::TYPE,
///     Arc::new(LocationProvider::new(InMemoryRecordSource::new(records))),
/// )?;
///
/// let options = SearchOptions::default().with_limit(3);
/// let results = aggregator.search("praia", &options).await;
/// assert!(results.len() <= 3);
/// # Ok(())
/// # }
/// ```
pub struct SearchAggregator {
    registry: RwLock<ProviderRegistry>,
    history: SearchHistory,
    config: AggregatorConfig,
}

impl std::fmt::Debug for SearchAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchAggregator")
            .field("providers", &self.provider_types())
            .field("history", &self.history)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for SearchAggregator {
    fn default() -> Self {
        Self::new(AggregatorConfig::default())
    }
}

impl SearchAggregator {
    /// Create an aggregator whose history lives only in memory.
    pub fn new(config: AggregatorConfig) -> Self {
        let history = SearchHistory::in_memory(config.history_capacity);
        Self::with_history(config, history)
    }

    /// Create an aggregator whose history is read from and written to `store`.
    ///
    /// Missing or corrupt persisted history starts the aggregator with an
    /// empty history.
    ///
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use mapa_search::{AggregatorConfig, HISTORY_KEY, SearchAggregator, data::MemoryStore};
    ///
    /// let store = Arc::new(MemoryStore::with_value(HISTORY_KEY, r#"["praia","museu"]"#));
    /// let aggregator = SearchAggregator::with_state_store(AggregatorConfig::default(), store);
    /// assert_eq!(aggregator.search_history(), vec!["praia", "museu"]);
    /// ```
    pub fn with_state_store(config: AggregatorConfig, store: Arc<dyn StateStore>) -> Self {
        let history = SearchHistory::load(store, config.history_capacity);
        Self::with_history(config, history)
    }

    fn with_history(config: AggregatorConfig, history: SearchHistory) -> Self {
        info!(?config, "Search aggregator created");
        Self {
            registry: RwLock::new(ProviderRegistry::default()),
            history,
            config,
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Register `provider` under `provider_type` with the provider's own priority.
    ///
    /// Re-registering a type replaces the previous provider. Fails only for a
    /// blank type.
    pub fn register_provider(
        &self,
        provider_type: &str,
        provider: Arc<dyn SearchProvider>,
    ) -> Result<(), SearchError> {
        let priority = provider.priority();
        self.register_provider_with_priority(provider_type, provider, priority)
    }

    /// Register `provider`, overriding its priority.
    pub fn register_provider_with_priority(
        &self,
        provider_type: &str,
        provider: Arc<dyn SearchProvider>,
        priority: i32,
    ) -> Result<(), SearchError> {
        self.registry_mut().register(provider_type, provider, priority)
    }

    /// Remove the provider registered under `provider_type`, if any.
    pub fn unregister_provider(&self, provider_type: &str) -> bool {
        self.registry_mut().unregister(provider_type)
    }

    /// Registered types, highest priority first.
    pub fn provider_types(&self) -> Vec<String> {
        self.registry()
            .select(None)
            .into_iter()
            .map(|entry| entry.provider_type)
            .collect()
    }

    pub fn has_provider(&self, provider_type: &str) -> bool {
        self.registry().contains(provider_type)
    }

    /// Search every selected provider and return one ranked list.
    ///
    /// Queries shorter than [`MIN_QUERY_CHARS`] after trimming return an empty
    /// list without touching any provider or the history. Otherwise the
    /// lower-cased query is recorded in the history, whether or not anything
    /// matched. Provider failures and timeouts only remove that provider's
    /// contribution.
    #[instrument(name = "Aggregate search", skip(self, options), level = "info")]
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        let term = query.trim().to_lowercase();
        if term.chars().count() < MIN_QUERY_CHARS {
            debug!("Query below minimum length, skipping providers");
            return Vec::new();
        }

        // The guard must be released before awaiting the providers.
        let providers = self.registry().select(options.types.as_deref());
        let batches = fan_out(providers, &term, options, self.config.provider_timeout).await;
        let results = merge_ranked(batches, options.limit_or(self.config.limit));

        self.history.add_async(&term).await;
        info!(count = results.len(), "Search complete");
        results
    }

    /// [`search`](Self::search) capped at the configured quick limit.
    pub async fn quick_search(&self, query: &str) -> Vec<SearchResult> {
        let options = SearchOptions::default().with_limit(self.config.quick_limit);
        self.search(query, &options).await
    }

    /// [`search`](Self::search) restricted to a single provider type.
    pub async fn search_by_type(&self, query: &str, provider_type: &str) -> Vec<SearchResult> {
        let options = SearchOptions::default().with_types([provider_type]);
        self.search(query, &options).await
    }

    /// Suggestions for a partially typed query.
    ///
    /// An empty input yields the most recent history entries. Otherwise history
    /// entries containing `partial` come first, followed by titles of quick
    /// search results that start with it; duplicates are removed. The lookup
    /// goes through [`quick_search`](Self::quick_search), so a committable
    /// partial is recorded in the history like any other query.
    pub async fn get_suggestions(&self, partial: &str) -> Vec<String> {
        let partial = partial.trim();
        if partial.is_empty() {
            return self.history.recent(self.config.recent_suggestions);
        }

        let prefix = partial.to_lowercase();
        // Read before the lookup records the partial itself.
        let past = self.history.matching(partial);
        let titles = self
            .quick_search(partial)
            .await
            .into_iter()
            .map(|result| result.title)
            .filter(|title| title.to_lowercase().starts_with(&prefix));

        past.into_iter()
            .chain(titles)
            .unique()
            .take(self.config.suggestion_limit)
            .collect()
    }

    /// Record `term` as if it had been searched.
    pub fn add_to_history(&self, term: &str) {
        self.history.add(term);
    }

    /// Past queries, most recent first.
    pub fn search_history(&self) -> Vec<String> {
        self.history.entries()
    }

    pub fn clear_search_history(&self) {
        self.history.clear();
    }

    fn registry(&self) -> RwLockReadGuard<'_, ProviderRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, ProviderRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}
