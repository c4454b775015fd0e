//! Data layer for the mapa-search engine.
//!
//! This crate owns everything that touches records before they are scored:
//! the [`RecordSource`] contract used by providers to fetch candidate rows,
//! the normalization step that turns raw rows into [`LocationRecord`]s,
//! and the [`StateStore`] slot used to persist search history.
use once_cell::sync::Lazy;
use std::path::PathBuf;
use tracing::debug;

pub mod processed;
pub mod raw;
pub mod state;
pub mod test_data;

mod error;

pub use error::{DataError, Result};
pub use processed::{
    Coordinates, FieldParseError, LocationRecord, Link, markdown_to_markup, normalize_record,
    parse_coordinates, parse_images, parse_links,
};
#[cfg(feature = "remote")]
pub use raw::RestRecordSource;
pub use raw::{InMemoryRecordSource, RawLocationRecord, RecordField, RecordOrder, RecordQuery, RecordSource};
pub use state::{JsonFileStore, MemoryStore, StateStore};
pub use test_data::{TestDataConfig, create_test_records};

pub const STATE_DIR_DEFAULT: &str = "./mapa_state";

/// Directory used by [`JsonFileStore::default_location`].
///
/// Resolution order: the `MAPA_STATE_DIR` environment variable, the platform
/// data directory (with the `system-dirs` feature), then [`STATE_DIR_DEFAULT`].
pub static STATE_DIR: Lazy<PathBuf> = Lazy::new(|| {
    if let Ok(dir) = std::env::var("MAPA_STATE_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(feature = "system-dirs")]
    if let Some(dirs) = directories::ProjectDirs::from("br", "mapa-cultural", "mapa-search") {
        let dir = dirs.data_dir().to_path_buf();
        debug!(dir = ?dir, "Using platform data directory for persisted state");
        return dir;
    }

    debug!("Falling back to default state directory");
    PathBuf::from(STATE_DIR_DEFAULT)
});
