use std::sync::Arc;

use ahash::AHashMap as HashMap;
use itertools::Itertools;
use tracing::{debug, info};

use super::{Result, SearchError, SearchProvider};

/// A provider as stored in the registry.
#[derive(Clone)]
pub(crate) struct RegisteredProvider {
    pub provider_type: String,
    pub name: String,
    pub priority: i32,
    pub provider: Arc<dyn SearchProvider>,
    /// Registration order, used to keep equal priorities deterministic
    sequence: u64,
}

/// Providers keyed by their type tag.
#[derive(Default)]
pub(crate) struct ProviderRegistry {
    entries: HashMap<String, RegisteredProvider>,
    next_sequence: u64,
}

impl ProviderRegistry {
    /// Add or replace the provider for `provider_type`.
    pub fn register(
        &mut self,
        provider_type: &str,
        provider: Arc<dyn SearchProvider>,
        priority: i32,
    ) -> Result<()> {
        let provider_type = provider_type.trim();
        if provider_type.is_empty() {
            return Err(SearchError::InvalidRegistration(
                "provider type must not be empty".into(),
            ));
        }

        let name = match provider.name().trim() {
            "" => provider_type.to_string(),
            name => name.to_string(),
        };
        let entry = RegisteredProvider {
            provider_type: provider_type.to_string(),
            name,
            priority,
            provider,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        if self.entries.insert(provider_type.to_string(), entry).is_some() {
            info!(provider_type, priority, "Replaced search provider");
        } else {
            info!(provider_type, priority, "Registered search provider");
        }
        Ok(())
    }

    pub fn unregister(&mut self, provider_type: &str) -> bool {
        self.entries.remove(provider_type.trim()).is_some()
    }

    pub fn contains(&self, provider_type: &str) -> bool {
        self.entries.contains_key(provider_type.trim())
    }

    /// Providers in presentation order: priority descending, then registration order.
    ///
    /// With `types`, only those providers are returned; unknown types are ignored.
    pub fn select(&self, types: Option<&[String]>) -> Vec<RegisteredProvider> {
        let selected = self
            .entries
            .values()
            .filter(|entry| {
                types.is_none_or(|types| types.iter().any(|t| t.trim() == entry.provider_type))
            })
            .sorted_by_key(|entry| (std::cmp::Reverse(entry.priority), entry.sequence))
            .cloned()
            .collect_vec();

        if let Some(types) = types {
            for unknown in types.iter().filter(|t| !self.contains(t)) {
                debug!(provider_type = %unknown, "Requested provider type is not registered");
            }
        }
        selected
    }
}
