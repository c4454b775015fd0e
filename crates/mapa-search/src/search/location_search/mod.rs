//! The location provider: geo-tagged points of interest from the record store.

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use ahash::AHasher as DefaultHasher;
use async_trait::async_trait;
use mapa_search_data::{LocationRecord, RecordQuery, RecordSource, normalize_record};
use tracing::{debug, instrument, warn};

use super::{Result, SearchOptions, SearchProvider, SearchResult};
use crate::slug::slugify;

pub mod scoring;

use scoring::{ScoredRecord, score_record};

const DEFAULT_TITLE: &str = "Sem título";
const DEFAULT_DESCRIPTION: &str = "Sem descrição";
const URL_PREFIX: &str = "/conteudo#";

/// Tunables for [`LocationProvider`]. Scoring weights are not configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationProviderConfig {
    /// Rows fetched from the record source when the caller sets no limit
    pub default_limit: usize,
    /// Characters kept either side of a description match
    pub context_radius: usize,
}

impl Default for LocationProviderConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            context_radius: 50,
        }
    }
}

/// Searches location records and ranks them with [`score_record`].
///
/// Candidate rows come from a [`RecordSource`] filtered by "any text field
/// contains the term", newest first. Rows are normalized, scored, stripped
/// of zero scores and stably sorted by score, so equal scores keep the
/// store's recency order.
#[derive(Clone)]
pub struct LocationProvider {
    source: Arc<dyn RecordSource>,
    config: LocationProviderConfig,
}

impl fmt::Debug for LocationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LocationProvider {
    /// Registration type and result tag for locations.
    pub const TYPE: &'static str = "location";

    pub fn new(source: impl RecordSource + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    pub fn from_shared(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            config: LocationProviderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LocationProviderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LocationProviderConfig {
        &self.config
    }

    /// Fetch, normalize, score and rank. Record source failures propagate.
    #[instrument(name = "Location search", skip(self, options), level = "debug")]
    pub async fn search_records(
        &self,
        term: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let limit = options.limit_or(self.config.default_limit);
        let rows = self.source.query(&RecordQuery::contains(term, limit)).await?;
        let fetched = rows.len();

        let mut results: Vec<SearchResult> = rows
            .into_iter()
            .map(normalize_record)
            .filter_map(|record| {
                let scored = score_record(&record, term, self.config.context_radius);
                (scored.score > 0).then(|| build_result(record, scored))
            })
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score));

        debug!(fetched, kept = results.len(), "Location results scored");
        Ok(results)
    }
}

fn build_result(record: LocationRecord, scored: ScoredRecord) -> SearchResult {
    let id = record
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| fallback_id(&record));
    let title = non_blank(record.titulo.as_deref()).unwrap_or(DEFAULT_TITLE).to_string();
    let description = non_blank(record.descricao.as_deref())
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();
    let url = format!("{URL_PREFIX}{}", slugify(record.titulo.as_deref().unwrap_or_default()));

    SearchResult {
        id,
        title,
        description,
        result_type: LocationProvider::TYPE.to_string(),
        category: record.tipo.as_deref().unwrap_or_default().to_lowercase(),
        score: scored.score,
        matches: scored.matches,
        coordinates: record.coordinates(),
        url,
        data: serde_json::to_value(&record).unwrap_or_default(),
        provider: None,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// Rows without an id get one derived from their content alone, so the same
// row keeps its id whatever query or limit retrieved it.
fn fallback_id(record: &LocationRecord) -> String {
    let mut hasher = DefaultHasher::default();
    record.titulo.hash(&mut hasher);
    record.descricao.hash(&mut hasher);
    record.descricao_detalhada.hash(&mut hasher);
    record.tipo.hash(&mut hasher);
    record.created_at.hash(&mut hasher);
    format!("location-{:016x}", hasher.finish())
}

#[async_trait]
impl SearchProvider for LocationProvider {
    fn name(&self) -> &str {
        "Locais"
    }

    async fn search(&self, term: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        match self.search_records(term, options).await {
            Ok(results) => Ok(results),
            Err(e) => {
                warn!(error = %e, term, "Location search failed, returning no results");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mapa_search_data::{
        DataError, InMemoryRecordSource, RawLocationRecord, TestDataConfig, create_test_records,
    };

    use super::{
        scoring::{TITLE_CONTAINS_WEIGHT, TITLE_PREFIX_WEIGHT},
        *,
    };
    use crate::search::MatchType;

    struct UnavailableSource;

    #[async_trait]
    impl RecordSource for UnavailableSource {
        async fn query(&self, _query: &RecordQuery) -> mapa_search_data::Result<Vec<RawLocationRecord>> {
            Err(DataError::SourceUnavailable("connection refused".into()))
        }
    }

    fn sample_provider() -> LocationProvider {
        LocationProvider::new(InMemoryRecordSource::new(create_test_records(
            &TestDataConfig::sample(),
        )))
    }

    fn titled(titulo: &str) -> RawLocationRecord {
        RawLocationRecord {
            titulo: Some(titulo.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_policlinica_scenario() {
        let provider = sample_provider();
        let results = provider
            .search("aparecida", &SearchOptions::default())
            .await
            .unwrap();

        let hit = results
            .iter()
            .find(|r| r.title == "Policlínica Aparecida")
            .expect("policlínica should match");
        assert!(hit.score >= 35);
        assert_eq!(hit.url, "/conteudo#policlinica-aparecida");
        assert_eq!(hit.result_type, "location");
        assert!(hit.coordinates.is_some());
        assert_eq!(
            hit.matches
                .iter()
                .filter(|m| m.field == "titulo" && m.match_type == MatchType::Exact)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_equal_title_scores_keep_recency_order() {
        let source = InMemoryRecordSource::new(vec![
            titled("Museu do Café"),
            titled("Casa do Café"),
        ]);
        let results = LocationProvider::new(source)
            .search("café", &SearchOptions::default())
            .await
            .unwrap();

        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Museu do Café", "Casa do Café"]);
        assert!(results.iter().all(|r| r.score == TITLE_CONTAINS_WEIGHT));
    }

    #[tokio::test]
    async fn test_prefix_title_ranks_above_contained_title() {
        let source = InMemoryRecordSource::new(vec![
            titled("Museu do Café"),
            titled("Café Paraíso"),
        ]);
        let results = LocationProvider::new(source)
            .search("café", &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(results[0].title, "Café Paraíso");
        assert_eq!(results[0].score, TITLE_PREFIX_WEIGHT);
        assert_eq!(results[1].score, TITLE_CONTAINS_WEIGHT);
    }

    #[tokio::test]
    async fn test_defaults_for_missing_fields() {
        let source = InMemoryRecordSource::new(vec![RawLocationRecord {
            descricao_detalhada: Some("Ponto de ônibus perto do canal 3".into()),
            ..Default::default()
        }]);
        let results = LocationProvider::new(source)
            .search("canal", &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.title, DEFAULT_TITLE);
        assert_eq!(result.description, DEFAULT_DESCRIPTION);
        assert_eq!(result.url, "/conteudo#sem-titulo");
        assert!(result.id.starts_with("location-"));
        assert_eq!(result.data["titulo"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_limit_caps_retrieval() {
        let provider = sample_provider();
        let options = SearchOptions::default().with_limit(1);
        let results = provider.search("museu", &options).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_source_yields_empty() {
        let provider = LocationProvider::new(UnavailableSource);

        let results = provider.search("museu", &SearchOptions::default()).await.unwrap();
        assert!(results.is_empty());

        let err = provider
            .search_records("museu", &SearchOptions::default())
            .await;
        assert!(err.is_err());
    }

    #[test]
    fn test_fallback_id_depends_on_content_only() {
        let record = normalize_record(titled("Praia do Gonzaga"));
        let same = normalize_record(titled("Praia do Gonzaga"));
        let other = normalize_record(titled("Praia do Embaré"));

        assert_eq!(fallback_id(&record), fallback_id(&same));
        assert_ne!(fallback_id(&record), fallback_id(&other));
        assert!(fallback_id(&record).starts_with("location-"));
    }

    #[tokio::test]
    async fn test_fallback_id_survives_reordering() {
        let provider = LocationProvider::new(InMemoryRecordSource::new(vec![
            titled("Praia do Gonzaga"),
            titled("Praia do Embaré"),
        ]));
        let both = provider.search("praia", &SearchOptions::default()).await.unwrap();
        let narrowed = provider.search("embaré", &SearchOptions::default()).await.unwrap();

        let embare = both.iter().find(|r| r.title == "Praia do Embaré").unwrap();
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].id, embare.id);
    }
}
