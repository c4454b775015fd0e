//! Search functionality: the provider contract, the location provider and
//! the concurrent fan-out/fan-in that merges provider results.

pub use error::SearchError;
mod location_search;
mod provider;
mod registry;
mod result;
mod search_orchestration;

pub use location_search::{LocationProvider, LocationProviderConfig, scoring};
pub use provider::{SearchOptions, SearchProvider};
pub(crate) use registry::{ProviderRegistry, RegisteredProvider};
pub use result::{FieldMatch, MatchType, ProviderTag, SearchResult};
pub(crate) use search_orchestration::{fan_out, merge_ranked};

mod error {
    use std::time::Duration;

    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum SearchError {
        #[error("Record source error: {0}")]
        RecordSource(#[from] mapa_search_data::DataError),
        #[error("Invalid provider registration: {0}")]
        InvalidRegistration(String),
        #[error("Provider timed out after {0:?}")]
        Timeout(Duration),
        #[error("Provider failed: {0}")]
        Provider(String),
        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }
    pub type Result<T> = std::result::Result<T, SearchError>;
}
use error::Result;
