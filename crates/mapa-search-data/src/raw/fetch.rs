use async_trait::async_trait;
use itertools::Itertools;
use reqwest::Client;
use tracing::{debug, instrument};

use super::{RawLocationRecord, RecordOrder, RecordQuery, RecordSource};
use crate::{DataError, Result};

/// A [`RecordSource`] that queries a hosted PostgREST endpoint.
///
/// Rows are fetched from `{base_url}/rest/v1/{table}` with an `or=(...)`
/// filter built from the query's fields, so filtering and the row cap happen
/// server side.
#[derive(Debug, Clone)]
pub struct RestRecordSource {
    client: Client,
    base_url: String,
    table: String,
    api_key: String,
}

impl RestRecordSource {
    pub fn new(
        base_url: impl Into<String>,
        table: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(DataError::InvalidSource("base url is empty".into()));
        }
        let table = table.into();
        if table.is_empty() {
            return Err(DataError::InvalidSource("table name is empty".into()));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            table,
            api_key: api_key.into(),
        })
    }

    /// Reuse an existing HTTP client (connection pool, proxies, timeouts).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

/// Build the PostgREST query-string pairs for `query`.
pub(crate) fn query_params(query: &RecordQuery) -> Vec<(&'static str, String)> {
    let pattern = quote_filter_value(&format!("*{}*", query.term));
    let filter = query
        .fields
        .iter()
        .map(|field| format!("{}.ilike.{pattern}", field.column()))
        .join(",");

    let mut params = vec![("select", "*".to_string())];
    if !query.fields.is_empty() {
        params.push(("or", format!("({filter})")));
    }
    if query.order == RecordOrder::NewestFirst {
        params.push(("order", "created_at.desc.nullslast".to_string()));
    }
    params.push(("limit", query.limit.to_string()));
    params
}

// Values containing PostgREST reserved characters must be double-quoted.
fn quote_filter_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[async_trait]
impl RecordSource for RestRecordSource {
    #[instrument(name = "REST record query", skip(self), fields(table = %self.table), level = "debug")]
    async fn query(&self, query: &RecordQuery) -> Result<Vec<RawLocationRecord>> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&query_params(query))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?
            .error_for_status()?;

        let rows: Vec<RawLocationRecord> = response.json().await?;
        debug!(rows = rows.len(), "REST query complete");
        Ok(rows)
    }
}
