use async_trait::async_trait;

use super::{Result, SearchResult};

/// Per-call options shared by the aggregator and the providers it fans out to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of results; each layer applies its own default when unset
    pub limit: Option<usize>,
    /// Restrict the search to these provider types
    pub types: Option<Vec<String>>,
}

impl SearchOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub(crate) fn limit_or(&self, default: usize) -> usize {
        self.limit.unwrap_or(default)
    }
}

/// A searchable content domain.
///
/// `search` receives a trimmed, lower-cased term but must still match
/// case-insensitively. Implementations own their scoring and should return
/// results sorted by score, highest first. An `Err` is treated by the
/// aggregator as an empty contribution; it never reaches the caller.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Tie-break rank among providers when scores are equal; higher wins.
    fn priority(&self) -> i32 {
        0
    }

    async fn search(&self, term: &str, options: &SearchOptions) -> Result<Vec<SearchResult>>;
}
