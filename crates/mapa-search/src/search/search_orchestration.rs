//! Concurrent fan-out to the selected providers and the merge that follows.
//!
//! Every provider runs in its own task. A provider that errors, panics or
//! outlives the timeout contributes an empty list; the others are neither
//! cancelled nor delayed. The merge is a single stable sort over the
//! flattened results, so ordering inside one provider survives equal scores.

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use super::{ProviderTag, RegisteredProvider, SearchError, SearchOptions, SearchResult};

/// Results of one provider, with the priority used to break score ties.
#[derive(Debug, Clone)]
pub(crate) struct ProviderBatch {
    pub priority: i32,
    pub results: Vec<SearchResult>,
}

/// Query every provider concurrently and wait for all of them to settle.
///
/// Batches come back in the order of `providers`, each result tagged with its
/// provider. Failures are logged and replaced by empty batches.
#[instrument(
    name = "Provider fan-out",
    skip(providers, options),
    fields(providers = providers.len()),
    level = "debug"
)]
pub(crate) async fn fan_out(
    providers: Vec<RegisteredProvider>,
    term: &str,
    options: &SearchOptions,
    timeout: Option<Duration>,
) -> Vec<ProviderBatch> {
    let handles = providers
        .iter()
        .map(|entry| {
            let provider = Arc::clone(&entry.provider);
            let term = term.to_string();
            let options = options.clone();
            tokio::spawn(async move {
                let call = provider.search(&term, &options);
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, call)
                        .await
                        .unwrap_or(Err(SearchError::Timeout(limit))),
                    None => call.await,
                }
            })
        })
        .collect_vec();

    join_all(handles)
        .await
        .into_iter()
        .zip(providers)
        .map(|(outcome, entry)| {
            let results = match outcome {
                Ok(Ok(results)) => {
                    debug!(provider_type = %entry.provider_type, count = results.len(), "Provider finished");
                    results
                }
                Ok(Err(e)) => {
                    warn!(provider_type = %entry.provider_type, error = %e, "Provider failed, contributing no results");
                    Vec::new()
                }
                Err(e) => {
                    warn!(provider_type = %entry.provider_type, error = %e, "Provider task aborted, contributing no results");
                    Vec::new()
                }
            };
            ProviderBatch {
                priority: entry.priority,
                results: tag_results(results, &entry),
            }
        })
        .collect()
}

fn tag_results(results: Vec<SearchResult>, entry: &RegisteredProvider) -> Vec<SearchResult> {
    let tag = ProviderTag {
        provider_type: entry.provider_type.clone(),
        name: entry.name.clone(),
    };
    results
        .into_iter()
        .map(|mut result| {
            result.provider = Some(tag.clone());
            result
        })
        .collect()
}

/// Flatten, drop non-positive scores, sort by (score desc, priority desc) and truncate.
pub(crate) fn merge_ranked(batches: Vec<ProviderBatch>, limit: usize) -> Vec<SearchResult> {
    batches
        .into_iter()
        .flat_map(|batch| {
            let priority = batch.priority;
            batch.results.into_iter().map(move |result| (priority, result))
        })
        .filter(|(_, result)| result.score > 0)
        // `sorted_by` is stable
        .sorted_by(|(pa, a), (pb, b)| b.score.cmp(&a.score).then(pb.cmp(pa)))
        .take(limit)
        .map(|(_, result)| result)
        .collect()
}
