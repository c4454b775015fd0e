//! Basic search functionality
//!
//! This example demonstrates the fundamental search operations:
//! - Creating an aggregator and registering the location provider
//! - Aggregated, quick and per-type searches
//! - Suggestions built from history and live results

use std::sync::Arc;

use mapa_search::{
    AggregatorConfig, LocationProvider, SearchAggregator, SearchOptions, SearchResult,
    data::{InMemoryRecordSource, TestDataConfig, create_test_records},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    mapa_search::init_logging(tracing::Level::WARN)?;

    // Sample records stand in for the hosted database
    let source = InMemoryRecordSource::new(create_test_records(&TestDataConfig::sample()));
    let aggregator = SearchAggregator::new(AggregatorConfig::default());
    aggregator.register_provider(LocationProvider::TYPE, Arc::new(LocationProvider::new(source)))?;

    println!("Searching for 'museu':");
    let results = aggregator.search("museu", &SearchOptions::default()).await;
    print_search_results(&results, 3);

    println!("\nQuick search for 'praia':");
    let results = aggregator.quick_search("praia").await;
    print_search_results(&results, 3);

    println!("\nLocations only, 'café':");
    let results = aggregator.search_by_type("café", LocationProvider::TYPE).await;
    print_search_results(&results, 3);

    println!("\nSuggestions for 'ca': {:?}", aggregator.get_suggestions("ca").await);
    println!("History: {:?}", aggregator.search_history());

    Ok(())
}

fn print_search_results(results: &[SearchResult], limit: usize) {
    for (i, result) in results.iter().take(limit).enumerate() {
        let location = result
            .coordinates
            .map(|c| format!("{:.4}, {:.4}", c.lat, c.lng))
            .unwrap_or_else(|| "no coordinates".to_string());

        println!(
            "  {}. {} [{}] - Score: {}, {} -> {}",
            i + 1,
            result.title,
            result.category,
            result.score,
            location,
            result.url
        );
    }

    if results.len() > limit {
        println!("  ... and {} more results", results.len() - limit);
    }
}
