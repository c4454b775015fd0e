//! Aggregator configuration and customization
//!
//! This example demonstrates how presets and builder options change the
//! behaviour of the aggregator, and how to persist search history on disk.

use std::{sync::Arc, time::Duration};

use mapa_search::{
    AggregatorConfig, AggregatorConfigBuilder, LocationProvider, LocationProviderConfig,
    SearchAggregator, SearchOptions,
    data::{InMemoryRecordSource, JsonFileStore, TestDataConfig, create_test_records},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    mapa_search::init_logging(tracing::Level::WARN)?;
    let query = "santos";

    println!("Comparing aggregator configurations for '{query}':\n");

    test_preset_configs(query).await?;
    test_custom_configs(query).await?;
    test_persistent_history().await?;

    Ok(())
}

fn location_provider(config: LocationProviderConfig) -> Arc<LocationProvider> {
    let source = InMemoryRecordSource::new(create_test_records(&TestDataConfig::sample()));
    Arc::new(LocationProvider::new(source).with_config(config))
}

fn aggregator_with(config: AggregatorConfig) -> Result<SearchAggregator, Box<dyn std::error::Error>> {
    let aggregator = SearchAggregator::new(config);
    aggregator.register_provider(
        LocationProvider::TYPE,
        location_provider(LocationProviderConfig::default()),
    )?;
    Ok(aggregator)
}

async fn test_preset_configs(query: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Preset configurations:");

    // Interactive configuration - keystroke-driven callers
    let interactive = AggregatorConfigBuilder::interactive().build();
    let results = aggregator_with(interactive.clone())?
        .search(query, &SearchOptions::default())
        .await;
    println!(
        "  Interactive: {} results (limit: {}, timeout: {:?})",
        results.len(),
        interactive.limit,
        interactive.provider_timeout
    );

    // Thorough configuration - wait longer, return more
    let thorough = AggregatorConfigBuilder::thorough().build();
    let results = aggregator_with(thorough.clone())?
        .search(query, &SearchOptions::default())
        .await;
    println!(
        "  Thorough:    {} results (limit: {}, timeout: {:?})\n",
        results.len(),
        thorough.limit,
        thorough.provider_timeout
    );

    Ok(())
}

async fn test_custom_configs(query: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Custom configurations:");

    let config = AggregatorConfig::builder()
        .limit(2)
        .provider_timeout(Duration::from_millis(500))?
        .suggestion_limit(3)
        .build();
    let aggregator = SearchAggregator::new(config);

    // Short description snippets, few candidate rows per query
    aggregator.register_provider(
        LocationProvider::TYPE,
        location_provider(LocationProviderConfig {
            default_limit: 4,
            context_radius: 15,
        }),
    )?;

    let results = aggregator.search(query, &SearchOptions::default()).await;
    println!("  Minimal:     {} results", results.len());
    for result in &results {
        for field_match in &result.matches {
            println!("    {} -> {:?}", field_match.field, field_match.text);
        }
    }
    println!();

    Ok(())
}

async fn test_persistent_history() -> Result<(), Box<dyn std::error::Error>> {
    println!("Persistent history:");

    let dir = std::env::temp_dir().join("mapa-search-configuration-example");
    let store = Arc::new(JsonFileStore::new(&dir));

    let aggregator = SearchAggregator::with_state_store(AggregatorConfig::default(), store.clone());
    aggregator.register_provider(
        LocationProvider::TYPE,
        location_provider(LocationProviderConfig::default()),
    )?;
    aggregator.search("museu", &SearchOptions::default()).await;
    aggregator.search("praia", &SearchOptions::default()).await;

    let reopened = SearchAggregator::with_state_store(AggregatorConfig::default(), store);
    println!("  Stored in {}: {:?}", dir.display(), reopened.search_history());
    println!("  Suggestions for '': {:?}", reopened.get_suggestions("").await);

    reopened.clear_search_history();
    Ok(())
}
