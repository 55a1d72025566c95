use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::data::{Item, MediaAsset, MediaKind};
use crate::error::{GalleryError, Result};

/// Result of importing items into the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub imported: usize,
    pub updated: usize,
}

/// The Library manages the SQLite item catalog.
/// It stores items, their ordered media and their channel tags.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Open the catalog in the user's data directory.
    ///
    /// - Linux: ~/.local/share/media-gallery/gallery.db
    /// - macOS: ~/Library/Application Support/media-gallery/gallery.db
    /// - Windows: %APPDATA%\media-gallery\gallery.db
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open (or create) a catalog at `db_path`
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| GalleryError::io(parent, e))?;
        }

        let conn = Connection::open(&db_path)?;
        debug!(path = %db_path.display(), "catalog opened");

        let library = Library { conn, db_path };
        library.init_schema()?;
        Ok(library)
    }

    /// Get the path where the catalog is stored by default
    pub fn default_path() -> Result<PathBuf> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(GalleryError::NoDirectory("data"))?;
        path.push("media-gallery");
        path.push("gallery.db");
        Ok(path)
    }

    /// Create all tables and indexes if they don't exist.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS items (
                seq             INTEGER PRIMARY KEY AUTOINCREMENT,
                id              TEXT NOT NULL UNIQUE,
                title           TEXT NOT NULL,
                link            TEXT,
                alt_text        TEXT,
                thumbnail       TEXT,
                views           INTEGER,
                engagements     INTEGER,
                display_order   REAL NOT NULL DEFAULT 0,
                imported_at     INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS media (
                item_id         TEXT NOT NULL,
                position        INTEGER NOT NULL,
                kind            TEXT NOT NULL,
                url             TEXT NOT NULL,
                PRIMARY KEY (item_id, position),
                FOREIGN KEY(item_id) REFERENCES items(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS channels (
                item_id         TEXT NOT NULL,
                position        INTEGER NOT NULL,
                name            TEXT NOT NULL,
                PRIMARY KEY (item_id, position),
                FOREIGN KEY(item_id) REFERENCES items(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_items_display_order
             ON items(display_order ASC);",
        )?;
        Ok(())
    }

    /// Get the path to the catalog file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Get a count of items in the catalog
    pub fn item_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert or replace items, keyed by id.
    /// Media and channels of an existing item are replaced as a whole.
    pub fn import_items(&mut self, items: &[Item]) -> Result<ImportResult> {
        let now = Utc::now().timestamp();
        let tx = self.conn.transaction()?;
        let mut result = ImportResult::default();

        for item in items {
            let existing: Option<i64> = tx
                .query_row("SELECT seq FROM items WHERE id = ?1", [&item.id], |row| row.get(0))
                .optional()?;

            if existing.is_some() {
                tx.execute(
                    "UPDATE items SET title = ?2, link = ?3, alt_text = ?4, thumbnail = ?5,
                        views = ?6, engagements = ?7, display_order = ?8, imported_at = ?9
                     WHERE id = ?1",
                    params![
                        item.id,
                        item.title,
                        item.link,
                        item.alt_text,
                        item.thumbnail,
                        item.view_count.map(to_sql_count),
                        item.engagement_count.map(to_sql_count),
                        item.display_order,
                        now,
                    ],
                )?;
                tx.execute("DELETE FROM media WHERE item_id = ?1", [&item.id])?;
                tx.execute("DELETE FROM channels WHERE item_id = ?1", [&item.id])?;
                result.updated += 1;
            } else {
                tx.execute(
                    "INSERT INTO items (id, title, link, alt_text, thumbnail, views, engagements, display_order, imported_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        item.id,
                        item.title,
                        item.link,
                        item.alt_text,
                        item.thumbnail,
                        item.view_count.map(to_sql_count),
                        item.engagement_count.map(to_sql_count),
                        item.display_order,
                        now,
                    ],
                )?;
                result.imported += 1;
            }

            for (position, asset) in item.media.iter().enumerate() {
                tx.execute(
                    "INSERT INTO media (item_id, position, kind, url) VALUES (?1, ?2, ?3, ?4)",
                    params![item.id, position as i64, asset.kind.as_str(), asset.url],
                )?;
            }
            for (position, channel) in item.channels.iter().enumerate() {
                tx.execute(
                    "INSERT INTO channels (item_id, position, name) VALUES (?1, ?2, ?3)",
                    params![item.id, position as i64, channel],
                )?;
            }
        }

        tx.commit()?;
        info!(
            imported = result.imported,
            updated = result.updated,
            "📥 catalog import complete"
        );
        Ok(result)
    }

    /// Get all items ordered by display order, then by insertion
    pub fn get_all_items(&self) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, link, alt_text, thumbnail, views, engagements, display_order
             FROM items ORDER BY display_order ASC, seq ASC",
        )?;

        let mut items = stmt
            .query_map([], |row| {
                let views: Option<i64> = row.get(5)?;
                let engagements: Option<i64> = row.get(6)?;
                Ok(Item {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    link: row.get(2)?,
                    alt_text: row.get(3)?,
                    thumbnail: row.get(4)?,
                    media: Vec::new(),
                    channels: Vec::new(),
                    view_count: views.map(from_sql_count),
                    engagement_count: engagements.map(from_sql_count),
                    display_order: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<Item>>>()?;

        let mut media_stmt = self
            .conn
            .prepare("SELECT kind, url FROM media WHERE item_id = ?1 ORDER BY position ASC")?;
        let mut channel_stmt = self
            .conn
            .prepare("SELECT name FROM channels WHERE item_id = ?1 ORDER BY position ASC")?;

        for item in &mut items {
            let rows = media_stmt
                .query_map([&item.id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            for (kind, url) in rows {
                match MediaKind::parse(&kind) {
                    Some(kind) => item.media.push(MediaAsset::new(kind, url)),
                    None => warn!(item = %item.id, kind = %kind, "skipping media of unknown kind"),
                }
            }

            item.channels = channel_stmt
                .query_map([&item.id], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
        }

        Ok(items)
    }
}

fn to_sql_count(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn from_sql_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_items() -> Vec<Item> {
        let mut first = Item::new("p1", "First")
            .with_order(2.0)
            .with_views(12)
            .with_channels(["Instagram", "TikTok"])
            .with_media(vec![
                MediaAsset::image("https://cdn.example.com/1.jpg"),
                MediaAsset::video("https://cdn.example.com/1.mp4"),
            ]);
        first.alt_text = Some("A caption".to_string());
        let second = Item::new("p2", "Second")
            .with_order(1.0)
            .with_media(vec![MediaAsset::design("https://www.canva.com/design/x")]);
        vec![first, second]
    }

    #[test]
    fn test_import_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = Library::open(dir.path().join("gallery.db")).unwrap();

        let result = library.import_items(&sample_items()).unwrap();
        assert_eq!(result, ImportResult { imported: 2, updated: 0 });
        assert_eq!(library.item_count().unwrap(), 2);

        let items = library.get_all_items().unwrap();
        assert_eq!(items[0].id, "p2");
        assert_eq!(items[1], sample_items()[0]);
        assert_eq!(items[0].media[0].kind, MediaKind::EmbeddedDesign);
    }

    #[test]
    fn test_reimport_updates_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = Library::open(dir.path().join("nested").join("gallery.db")).unwrap();
        library.import_items(&sample_items()).unwrap();

        let changed = vec![Item::new("p1", "Renamed")
            .with_order(5.0)
            .with_channels(["YouTube"])];
        let result = library.import_items(&changed).unwrap();
        assert_eq!(result, ImportResult { imported: 0, updated: 1 });

        let items = library.get_all_items().unwrap();
        assert_eq!(items.len(), 2);
        let p1 = items.iter().find(|i| i.id == "p1").unwrap();
        assert_eq!(p1.title, "Renamed");
        assert!(p1.media.is_empty());
        assert_eq!(p1.channels, ["YouTube"]);
        assert_eq!(p1.view_count, None);
    }
}
