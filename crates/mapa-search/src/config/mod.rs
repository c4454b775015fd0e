use std::time::Duration;

use crate::error::MapaSearchError;

/// Queries shorter than this (after trimming) return nothing and are not recorded.
pub const MIN_QUERY_CHARS: usize = 2;

/// Runtime settings of a [`SearchAggregator`](crate::SearchAggregator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Results returned by `search` when the caller sets no limit
    pub limit: usize,
    /// Results returned by `quick_search`
    pub quick_limit: usize,
    /// Upper bound on a single provider call; `None` waits indefinitely
    pub provider_timeout: Option<Duration>,
    /// Entries kept in the search history
    pub history_capacity: usize,
    /// Maximum number of suggestions returned
    pub suggestion_limit: usize,
    /// History entries offered when the partial query is empty
    pub recent_suggestions: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            limit: 20,
            quick_limit: 5,
            provider_timeout: Some(Duration::from_secs(5)),
            history_capacity: 10,
            suggestion_limit: 8,
            recent_suggestions: 5,
        }
    }
}

impl AggregatorConfig {
    pub fn builder() -> AggregatorConfigBuilder {
        AggregatorConfigBuilder::new()
    }
}

/// Builder for creating aggregator configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct AggregatorConfigBuilder {
    config: AggregatorConfig,
}

impl AggregatorConfigBuilder {
    /// Create a new builder with sensible defaults
    pub fn new() -> Self {
        Self {
            config: AggregatorConfig::default(),
        }
    }

    /// Create a builder for keystroke-driven callers (short timeout, fewer results)
    pub fn interactive() -> Self {
        let mut builder = Self::new();
        builder.config.limit = 10;
        builder.config.provider_timeout = Some(Duration::from_millis(800));
        builder
    }

    /// Create a builder for exhaustive searches (long timeout, more results)
    pub fn thorough() -> Self {
        let mut builder = Self::new();
        builder.config.limit = 50;
        builder.config.quick_limit = 10;
        builder.config.provider_timeout = Some(Duration::from_secs(30));
        builder
    }

    /// Set the maximum number of results to return
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = limit;
        self
    }

    /// Set the number of results returned by quick searches
    pub fn quick_limit(mut self, limit: usize) -> Self {
        self.config.quick_limit = limit;
        self
    }

    /// Bound each provider call; a zero timeout is rejected
    pub fn provider_timeout(mut self, timeout: Duration) -> Result<Self, MapaSearchError> {
        if timeout.is_zero() {
            return Err(MapaSearchError::ConfigError(
                "Provider timeout must be greater than zero".to_string(),
            ));
        }
        self.config.provider_timeout = Some(timeout);
        Ok(self)
    }

    /// Wait for every provider however long it takes
    pub fn without_timeout(mut self) -> Self {
        self.config.provider_timeout = None;
        self
    }

    /// Set how many past queries are remembered (at least one)
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity.max(1);
        self
    }

    /// Set the maximum number of suggestions
    pub fn suggestion_limit(mut self, limit: usize) -> Self {
        self.config.suggestion_limit = limit;
        self
    }

    /// Set how many recent queries are suggested for an empty input
    pub fn recent_suggestions(mut self, count: usize) -> Self {
        self.config.recent_suggestions = count;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> AggregatorConfig {
        self.config
    }
}
