//! mapa-search - search aggregation and relevance ranking
//!
//! `mapa-search` answers the search box of the map-browsing content platform.
//! Content domains plug in as [`SearchProvider`]s; a [`SearchAggregator`]
//! queries every registered provider concurrently, merges their partial
//! results into one relevance-ordered list and remembers what was searched.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mapa_search::{
//!     AggregatorConfig, LocationProvider, SearchAggregator, SearchOptions,
//!     data::{InMemoryRecordSource, TestDataConfig, create_test_records},
//! };
//!
//! # async fn run() -> Result<(), mapa_search::error::MapaSearchError> {
//! let source = InMemoryRecordSource::new(create_test_records(&TestDataConfig::sample()));
//!
//! let aggregator = SearchAggregator::new(AggregatorConfig::default());
//! aggregator.register_provider(LocationProvider::TYPE, Arc::new(LocationProvider::new(source)))?;
//!
//! let results = aggregator.search("museu", &SearchOptions::default()).await;
//! for result in &results {
//!     println!("{} ({}) -> {}", result.title, result.score, result.url);
//! }
//!
//! let suggestions = aggregator.get_suggestions("mu").await;
//! # Ok(())
//! # }
//! ```
//!
//! # Ranking
//!
//! Each provider owns its scoring policy. [`LocationProvider`] uses additive
//! weighted substring matching over title, descriptions, category and link
//! labels, with small bonuses for coordinates and media. The aggregator only
//! re-sorts the merged list by score (ties broken by provider priority) and
//! truncates it.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
mod history;
mod search;
mod slug;

pub use config::{AggregatorConfig, AggregatorConfigBuilder, MIN_QUERY_CHARS};
pub use crate::core::SearchAggregator;
pub use history::{HISTORY_KEY, SearchHistory};
pub use mapa_search_data as data;
pub use search::{
    FieldMatch, LocationProvider, LocationProviderConfig, MatchType, ProviderTag, SearchError,
    SearchOptions, SearchProvider, SearchResult, scoring,
};
pub use slug::slugify;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the search engine.
///
/// Installs a `tracing` fmt subscriber. `RUST_LOG` takes precedence over
/// `level` when set. Call once at startup; later calls are no-ops.
///
/// # Examples
///
/// ```rust
/// use mapa_search::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), mapa_search::error::MapaSearchError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::MapaSearchError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("reqwest=warn".parse()?)
            .add_directive("hyper_util=warn".parse()?);

        // Another subscriber may already be installed by the host application.
        let _ = tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::{InMemoryRecordSource, TestDataConfig, create_test_records};

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    fn sample_aggregator() -> SearchAggregator {
        let source = InMemoryRecordSource::new(create_test_records(&TestDataConfig::sample()));
        let aggregator = SearchAggregator::new(AggregatorConfig::default());
        aggregator
            .register_provider(LocationProvider::TYPE, Arc::new(LocationProvider::new(source)))
            .unwrap();
        aggregator
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        setup_test_env();
        assert!(init_logging(tracing::Level::DEBUG).is_ok());
    }

    #[tokio::test]
    async fn test_basic_search() {
        setup_test_env();

        let aggregator = sample_aggregator();
        let results = aggregator.search("museu", &SearchOptions::default()).await;

        assert!(!results.is_empty(), "Should find museums in the sample data");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(results.iter().all(|r| r.score > 0));
    }

    #[tokio::test]
    async fn test_empty_search() {
        setup_test_env();

        let aggregator = sample_aggregator();
        assert!(aggregator.search("", &SearchOptions::default()).await.is_empty());
        assert!(aggregator.search(" a ", &SearchOptions::default()).await.is_empty());
        assert!(aggregator.search_history().is_empty());
    }

    #[tokio::test]
    async fn test_quick_search_respects_limit() {
        setup_test_env();

        let aggregator = sample_aggregator();
        let results = aggregator.quick_search("a").await;
        assert!(results.is_empty());

        let results = aggregator.quick_search("santos").await;
        assert!(results.len() <= 5);
    }
}
