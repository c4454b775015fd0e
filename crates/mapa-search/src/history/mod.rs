//! Persisted, de-duplicated, most-recent-first query history.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use itertools::Itertools;
use mapa_search_data::{DataError, MemoryStore, StateStore};
use tracing::{debug, instrument, warn};

use crate::config::MIN_QUERY_CHARS;

/// Key of the persisted history slot.
pub const HISTORY_KEY: &str = "searchHistory";

/// Past query terms backed by a [`StateStore`].
///
/// Every mutation is written through to the store as a JSON array of strings.
/// Unreadable or corrupt state loads as an empty history; failed writes are
/// logged and the in-memory history stays authoritative.
pub struct SearchHistory {
    state: Mutex<HistoryState>,
    capacity: usize,
    writer: Arc<HistoryWriter>,
}

#[derive(Debug, Default)]
struct HistoryState {
    entries: Vec<String>,
    /// Bumped on every mutation
    version: u64,
}

/// The entries as of one mutation.
#[derive(Debug)]
struct Snapshot {
    version: u64,
    entries: Vec<String>,
}

/// Serializes writes to the store and drops snapshots older than the last one written.
struct HistoryWriter {
    store: Arc<dyn StateStore>,
    written: Mutex<u64>,
}

impl HistoryWriter {
    #[instrument(name = "Persist search history", skip_all, fields(version = snapshot.version), level = "debug")]
    fn write(&self, snapshot: &Snapshot) {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        if snapshot.version <= *written {
            debug!(written = *written, "Skipping stale history snapshot");
            return;
        }

        let outcome = serde_json::to_string(&snapshot.entries)
            .map_err(DataError::from)
            .and_then(|json| self.store.save(HISTORY_KEY, &json));
        match outcome {
            Ok(()) => *written = snapshot.version,
            Err(e) => warn!(error = %e, "Failed to persist search history"),
        }
    }
}

impl std::fmt::Debug for SearchHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHistory")
            .field("entries", &self.lock().entries)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl SearchHistory {
    /// Read the history slot from `store`, keeping at most `capacity` entries.
    pub fn load(store: Arc<dyn StateStore>, capacity: usize) -> Self {
        let entries = match store.load(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, "Persisted search history is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Could not read persisted search history, starting empty");
                Vec::new()
            }
        };

        let entries = entries
            .into_iter()
            .map(|term| term.trim().to_string())
            .filter(|term| is_committable(term))
            .unique()
            .take(capacity)
            .collect_vec();
        debug!(count = entries.len(), "Search history loaded");

        Self {
            state: Mutex::new(HistoryState {
                entries,
                version: 0,
            }),
            capacity,
            writer: Arc::new(HistoryWriter {
                store,
                written: Mutex::new(0),
            }),
        }
    }

    /// A history that lives only as long as the process.
    pub fn in_memory(capacity: usize) -> Self {
        Self::load(Arc::new(MemoryStore::new()), capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Move `term` to the front, dropping the oldest entry past capacity.
    ///
    /// Terms shorter than the minimum query length after trimming are ignored.
    /// The store is written on the calling thread.
    pub fn add(&self, term: &str) {
        if let Some(snapshot) = self.insert(term) {
            self.writer.write(&snapshot);
        }
    }

    /// [`add`](Self::add) for async callers: the store is written on the
    /// blocking pool and awaited.
    pub async fn add_async(&self, term: &str) {
        let Some(snapshot) = self.insert(term) else {
            return;
        };
        let writer = Arc::clone(&self.writer);
        if let Err(e) = tokio::task::spawn_blocking(move || writer.write(&snapshot)).await {
            warn!(error = %e, "Search history write task failed");
        }
    }

    /// A copy of the history, most recent first.
    pub fn entries(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    pub fn recent(&self, n: usize) -> Vec<String> {
        self.lock().entries.iter().take(n).cloned().collect()
    }

    /// Entries containing `partial`, ignoring case, most recent first.
    pub fn matching(&self, partial: &str) -> Vec<String> {
        let needle = partial.trim().to_lowercase();
        self.lock()
            .entries
            .iter()
            .filter(|entry| entry.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        let snapshot = self.mutate(Vec::clear);
        self.writer.write(&snapshot);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn insert(&self, term: &str) -> Option<Snapshot> {
        let term = term.trim();
        if !is_committable(term) {
            return None;
        }
        let capacity = self.capacity;
        Some(self.mutate(|entries| {
            entries.retain(|existing| existing != term);
            entries.insert(0, term.to_string());
            entries.truncate(capacity);
        }))
    }

    fn mutate(&self, change: impl FnOnce(&mut Vec<String>)) -> Snapshot {
        let mut state = self.lock();
        change(&mut state.entries);
        state.version += 1;
        Snapshot {
            version: state.version,
            entries: state.entries.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_committable(term: &str) -> bool {
    term.chars().count() >= MIN_QUERY_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReadOnlyStore;

    impl StateStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> mapa_search_data::Result<Option<String>> {
            Ok(Some(r#"["praia"]"#.to_string()))
        }

        fn save(&self, _key: &str, _value: &str) -> mapa_search_data::Result<()> {
            Err(DataError::SourceUnavailable("read-only".into()))
        }
    }

    #[test]
    fn test_repeated_term_is_stored_once() {
        let history = SearchHistory::in_memory(10);
        for _ in 0..15 {
            history.add("praia");
        }
        assert_eq!(history.entries(), vec!["praia"]);
    }

    #[test]
    fn test_capacity_keeps_most_recent_first() {
        let history = SearchHistory::in_memory(10);
        for i in 0..15 {
            history.add(&format!("termo {i}"));
        }

        let entries = history.entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0], "termo 14");
        assert_eq!(entries[9], "termo 5");
    }

    #[test]
    fn test_readding_moves_to_front() {
        let history = SearchHistory::in_memory(10);
        history.add("museu");
        history.add("praia");
        history.add("museu");
        assert_eq!(history.entries(), vec!["museu", "praia"]);
    }

    #[test]
    fn test_short_terms_are_ignored() {
        let history = SearchHistory::in_memory(10);
        history.add("");
        history.add(" a ");
        assert!(history.is_empty());

        history.add("  ab  ");
        assert_eq!(history.entries(), vec!["ab"]);
    }

    #[test]
    fn test_corrupt_state_loads_empty() {
        let store = Arc::new(MemoryStore::with_value(HISTORY_KEY, "{not json"));
        let history = SearchHistory::load(store, 10);
        assert!(history.is_empty());

        let store = Arc::new(MemoryStore::with_value(HISTORY_KEY, r#"{"a": 1}"#));
        assert!(SearchHistory::load(store, 10).is_empty());
    }

    #[test]
    fn test_load_sanitizes_entries() {
        let store = Arc::new(MemoryStore::with_value(
            HISTORY_KEY,
            r#"["praia", " praia ", "x", "museu", "café", "orla"]"#,
        ));
        let history = SearchHistory::load(store, 3);
        assert_eq!(history.entries(), vec!["praia", "museu", "café"]);
    }

    #[test]
    fn test_mutations_are_persisted() {
        let store = Arc::new(MemoryStore::new());
        let history = SearchHistory::load(store.clone(), 10);
        history.add("museu");
        history.add("praia");

        let reloaded = SearchHistory::load(store.clone(), 10);
        assert_eq!(reloaded.entries(), vec!["praia", "museu"]);

        history.clear();
        assert_eq!(store.load(HISTORY_KEY).unwrap().as_deref(), Some("[]"));
        assert!(SearchHistory::load(store, 10).is_empty());
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let history = SearchHistory::load(Arc::new(ReadOnlyStore), 10);
        history.add("museu");
        assert_eq!(history.entries(), vec!["museu", "praia"]);
    }

    #[test]
    fn test_stale_snapshots_are_not_written() {
        let store = Arc::new(MemoryStore::new());
        let history = SearchHistory::load(store.clone(), 10);

        let older = history.insert("museu").unwrap();
        let newer = history.insert("praia").unwrap();
        history.writer.write(&newer);
        history.writer.write(&older);

        assert_eq!(
            store.load(HISTORY_KEY).unwrap().as_deref(),
            Some(r#"["praia","museu"]"#)
        );
    }

    #[tokio::test]
    async fn test_add_async_persists_before_returning() {
        let store = Arc::new(MemoryStore::new());
        let history = SearchHistory::load(store.clone(), 10);
        history.add_async("museu").await;
        history.add_async(" x ").await;

        assert_eq!(SearchHistory::load(store, 10).entries(), vec!["museu"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_leave_store_matching_memory() {
        let store = Arc::new(MemoryStore::new());
        let history = Arc::new(SearchHistory::load(store.clone(), 10));

        let handles = (0..8)
            .map(|i| {
                let history = Arc::clone(&history);
                tokio::spawn(async move { history.add_async(&format!("termo {i}")).await })
            })
            .collect_vec();
        for handle in handles {
            handle.await.unwrap();
        }

        let reloaded = SearchHistory::load(store, 10);
        assert_eq!(reloaded.entries(), history.entries());
        assert_eq!(reloaded.len(), 8);
    }

    #[test]
    fn test_matching_and_recent() {
        let history = SearchHistory::in_memory(10);
        for term in ["praia grande", "museu", "Praia do Gonzaga"] {
            history.add(term);
        }

        assert_eq!(history.matching("PRAIA"), vec!["Praia do Gonzaga", "praia grande"]);
        assert_eq!(history.recent(2), vec!["Praia do Gonzaga", "museu"]);
    }
}
