//! Raw rows as returned by a record source, and the query contract used to fetch them.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize, de::IgnoredAny};
use tracing::debug;

use super::Result;

mod memory;
pub use memory::InMemoryRecordSource;

#[cfg(feature = "remote")]
mod fetch;
#[cfg(feature = "remote")]
pub use fetch::RestRecordSource;

/// A location row exactly as the record store hands it over.
///
/// Every field is optional: the store is edited through admin forms and
/// rows are routinely incomplete. Composite fields (`links`, `imagens`,
/// `localizacao`) are kept as their delimited string form here and parsed
/// during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocationRecord {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub descricao_detalhada: Option<String>,
    #[serde(default)]
    pub tipo: Option<String>,
    /// `label|url` entries separated by `;`
    #[serde(default)]
    pub links: Option<String>,
    /// Comma-separated image URLs
    #[serde(default)]
    pub imagens: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    /// `"lat,lng"`
    #[serde(default)]
    pub localizacao: Option<String>,
    /// Unparsable timestamps deserialize as `None` instead of failing the row
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

// Ids come back as numbers from some tables and as strings from others.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(
        Option::<RawId>::deserialize(deserializer)?.map(|id| match id {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }),
    )
}

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// `timestamptz` columns carry an offset, `timestamp` columns do not; the latter are read as UTC.
fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(RawTimestamp::Text(text)) => {
            let parsed = parse_timestamp(&text);
            if parsed.is_none() {
                debug!(value = %text, "Discarding unparsable created_at");
            }
            parsed
        }
        Some(RawTimestamp::Other(_)) => {
            debug!("Discarding non-string created_at");
            None
        }
        None => None,
    })
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|naive| naive.and_utc())
        })
}

/// Text columns that take part in the "any field contains" filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Titulo,
    Descricao,
    DescricaoDetalhada,
    Tipo,
}

impl RecordField {
    /// All filterable fields, in the order the store expects them.
    pub const ALL: [Self; 4] = [
        Self::Titulo,
        Self::Descricao,
        Self::DescricaoDetalhada,
        Self::Tipo,
    ];

    /// Column name in the record store.
    pub fn column(self) -> &'static str {
        match self {
            Self::Titulo => "titulo",
            Self::Descricao => "descricao",
            Self::DescricaoDetalhada => "descricao_detalhada",
            Self::Tipo => "tipo",
        }
    }

    /// Read this field from a raw row.
    pub fn value(self, record: &RawLocationRecord) -> Option<&str> {
        match self {
            Self::Titulo => record.titulo.as_deref(),
            Self::Descricao => record.descricao.as_deref(),
            Self::DescricaoDetalhada => record.descricao_detalhada.as_deref(),
            Self::Tipo => record.tipo.as_deref(),
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Ordering hint passed to the record store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordOrder {
    /// Most recently created rows first
    #[default]
    NewestFirst,
    /// Whatever order the store produces
    Unordered,
}

/// A case-insensitive "any of `fields` contains `term`" filter with a row cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub term: String,
    pub fields: Vec<RecordField>,
    pub limit: usize,
    pub order: RecordOrder,
}

impl RecordQuery {
    /// Query every filterable field, newest rows first.
    pub fn contains(term: impl Into<String>, limit: usize) -> Self {
        Self {
            term: term.into(),
            fields: RecordField::ALL.to_vec(),
            limit,
            order: RecordOrder::NewestFirst,
        }
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = RecordField>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    pub fn with_order(mut self, order: RecordOrder) -> Self {
        self.order = order;
        self
    }

    /// Whether `record` satisfies the filter (case-insensitive containment on any field).
    pub fn matches(&self, record: &RawLocationRecord) -> bool {
        let needle = self.term.to_lowercase();
        self.fields.iter().any(|field| {
            field
                .value(record)
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        })
    }
}

/// A queryable store of location rows.
///
/// Implementations perform whatever I/O they need; callers treat an `Err`
/// as "this source is unavailable right now".
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn query(&self, query: &RecordQuery) -> Result<Vec<RawLocationRecord>>;
}
