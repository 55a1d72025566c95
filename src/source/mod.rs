/// Item sources
///
/// The gallery receives its items through a single collaborator: something
/// that yields an ordered list of well-formed items once per session. This
/// module defines that seam and its two implementations:
/// - JSON exports on disk (json.rs)
/// - The local SQLite catalog (`CatalogSource`)

pub mod json;

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::state::data::Item;
use crate::state::library::Library;

pub use json::JsonSource;

/// Yields the ordered item list for one session
pub trait ItemSource: Send + 'static {
    fn fetch_items(&self) -> Result<Vec<Item>>;

    /// Human readable description for the status line and logs
    fn describe(&self) -> String;
}

/// Items read from the SQLite catalog
#[derive(Debug, Clone)]
pub struct CatalogSource {
    path: PathBuf,
}

impl CatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ItemSource for CatalogSource {
    fn fetch_items(&self) -> Result<Vec<Item>> {
        // rusqlite::Connection is not Sync, so each fetch opens its own connection
        Library::open(&self.path)?.get_all_items()
    }

    fn describe(&self) -> String {
        format!("catalog {}", self.path.display())
    }
}

/// Pick a source for `path` by extension: `.json` exports, anything else is a catalog
pub fn open_source(path: &Path) -> Box<dyn ItemSource> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Box::new(JsonSource::new(path))
    } else {
        Box::new(CatalogSource::new(path))
    }
}

/// Fetch the item list off the UI thread
pub async fn fetch_items(source: Box<dyn ItemSource>) -> Result<Vec<Item>> {
    let description = source.describe();
    let items = tokio::task::spawn_blocking(move || source.fetch_items()).await??;
    info!(count = items.len(), source = %description, "🖼️ items loaded");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::MediaAsset;

    #[test]
    fn test_open_source_by_extension() {
        assert!(open_source(Path::new("export.JSON")).describe().starts_with("JSON export"));
        assert!(open_source(Path::new("gallery.db")).describe().starts_with("catalog"));
    }

    #[tokio::test]
    async fn test_fetch_items_from_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.db");
        let mut library = Library::open(&path).unwrap();
        library
            .import_items(&[Item::new("a", "A").with_media(vec![MediaAsset::image("a.jpg")])])
            .unwrap();
        drop(library);

        let items = fetch_items(open_source(&path)).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].media[0].url, "a.jpg");
    }

    #[tokio::test]
    async fn test_fetch_items_propagates_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = fetch_items(Box::new(JsonSource::new(dir.path().join("nope.json")))).await;
        assert!(result.is_err());
    }
}
