use mapa_search_data::Coordinates;
use serde::Serialize;

/// How a field matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// The whole field value is reported
    Exact,
    /// A window of text around the match is reported
    Partial,
}

/// One explanation of why a result matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    pub field: String,
    pub text: String,
    #[serde(rename = "matchType")]
    pub match_type: MatchType,
}

impl FieldMatch {
    pub fn exact(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
            match_type: MatchType::Exact,
        }
    }

    pub fn partial(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
            match_type: MatchType::Partial,
        }
    }
}

/// Which registered provider produced a result. Set by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderTag {
    #[serde(rename = "type")]
    pub provider_type: String,
    pub name: String,
}

/// A single ranked search hit, built fresh for every query.
///
/// `score` is always positive in anything returned to callers: zero-score
/// candidates are dropped by providers and again during the merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Unique within the provider's domain
    pub id: String,
    pub title: String,
    pub description: String,
    /// Domain tag of the producing provider, e.g. `"location"`
    #[serde(rename = "type")]
    pub result_type: String,
    /// Lower-cased classification from the source record
    pub category: String,
    pub score: u32,
    pub matches: Vec<FieldMatch>,
    /// The normalized source record, kept opaque for the caller
    pub data: serde_json::Value,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderTag>,
}
