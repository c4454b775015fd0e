use std::{cmp::Reverse, path::Path};

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::{RawLocationRecord, RecordOrder, RecordQuery, RecordSource};
use crate::Result;

/// A [`RecordSource`] backed by rows held in memory.
///
/// Useful for tests, demos and for small datasets exported from the hosted
/// store as JSON.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordSource {
    records: Vec<RawLocationRecord>,
}

impl InMemoryRecordSource {
    pub fn new(records: Vec<RawLocationRecord>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of rows.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<RawLocationRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    /// Load a JSON array of rows from disk.
    #[instrument(name = "Load records from JSON", level = "info")]
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let records = tokio::task::spawn_blocking(move || {
            serde_json::from_slice::<Vec<RawLocationRecord>>(&bytes)
        })
        .await??;
        info!(rows = records.len(), "Loaded location records");
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RawLocationRecord] {
        &self.records
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn query(&self, query: &RecordQuery) -> Result<Vec<RawLocationRecord>> {
        let mut rows: Vec<RawLocationRecord> = self
            .records
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();

        if query.order == RecordOrder::NewestFirst {
            // `None` sorts below any timestamp, so undated rows land last; the sort is stable.
            rows.sort_by_key(|record| Reverse(record.created_at));
        }
        rows.truncate(query.limit);

        debug!(term = %query.term, rows = rows.len(), "In-memory query complete");
        Ok(rows)
    }
}
