//! Catalog database trait and SQLite implementation.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::types::SkinType;

use super::error::CatalogError;
use super::schema;
use super::types::{ArchiveRecord, CatalogSummary, Skin};

/// Trait for catalog database operations.
///
/// This trait is object-safe and can be used with `Arc<dyn CatalogDb>` for
/// shared access across async tasks.
#[async_trait]
pub trait CatalogDb: Send + Sync {
    /// Insert a skin if its md5 is not already in the catalog.
    ///
    /// Returns true if a row was inserted, false if the md5 was already
    /// present (the existing row is left untouched).
    async fn insert_skin(&self, skin: &Skin) -> Result<bool, CatalogError>;

    /// Look up a skin by its md5.
    async fn get_skin(&self, md5: &str) -> Result<Option<Skin>, CatalogError>;

    /// md5s of every skin of the given type that has no archive record
    /// yet, ordered by md5.
    async fn unarchived_md5s(&self, skin_type: SkinType) -> Result<Vec<String>, CatalogError>;

    /// True if any archive record already uses this identifier, compared
    /// case-insensitively. The archive treats identifiers differing only
    /// by case as aliases of the same item.
    async fn identifier_exists(&self, identifier: &str) -> Result<bool, CatalogError>;

    /// True if the skin already has an archive record.
    async fn has_archive_record(&self, skin_md5: &str) -> Result<bool, CatalogError>;

    /// Record that a skin now lives on the archive.
    ///
    /// The table has no unique constraints; callers are expected to check
    /// `has_archive_record` / `identifier_exists` before inserting.
    async fn insert_archive_record(&self, record: &ArchiveRecord) -> Result<(), CatalogError>;

    /// Every identifier currently recorded, in insertion order.
    async fn all_identifiers(&self) -> Result<Vec<String>, CatalogError>;

    /// Aggregate counts for status reporting.
    async fn summary(&self) -> Result<CatalogSummary, CatalogError>;
}

/// SQLite implementation of the catalog database.
pub struct SqliteCatalog {
    /// Wrapped in Mutex because rusqlite::Connection is not Sync.
    conn: Mutex<Connection>,
    /// Path to the database file (for error messages).
    path: PathBuf,
}

impl std::fmt::Debug for SqliteCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCatalog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteCatalog {
    /// Open or create a catalog database at the given path.
    pub async fn open(path: &Path) -> Result<Self, CatalogError> {
        let path = path.to_path_buf();
        let path_clone = path.clone();

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&path_clone).map_err(|e| CatalogError::Open {
                path: path_clone.clone(),
                source: e,
            })?;

            // WAL mode for better concurrent read/write behavior
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(CatalogError::Migration)?;

            // NORMAL synchronous is still safe under WAL
            conn.pragma_update(None, "synchronous", "NORMAL")
                .map_err(CatalogError::Migration)?;

            schema::migrate(&conn)?;

            Ok::<_, CatalogError>(conn)
        })
        .await??;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Open an in-memory catalog (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory().map_err(|e| CatalogError::Open {
            path: PathBuf::from(":memory:"),
            source: e,
        })?;
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Get the path to the database file.
    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogDb for SqliteCatalog {
    async fn insert_skin(&self, skin: &Skin) -> Result<bool, CatalogError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO skins (md5, filename, skin_type, download_url, screenshot_url, imported_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    skin.md5,
                    skin.filename,
                    skin.skin_type.as_str(),
                    skin.download_url,
                    skin.screenshot_url,
                    skin.imported_at.timestamp(),
                ],
            )
            .map_err(CatalogError::query)?;

        Ok(inserted == 1)
    }

    async fn get_skin(&self, md5: &str) -> Result<Option<Skin>, CatalogError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        conn.query_row(
            "SELECT md5, filename, skin_type, download_url, screenshot_url, imported_at
             FROM skins WHERE md5 = ?1",
            [md5],
            |row| Ok(row_to_skin(row)),
        )
        .optional()
        .map_err(CatalogError::query)
    }

    async fn unarchived_md5s(&self, skin_type: SkinType) -> Result<Vec<String>, CatalogError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT s.md5 FROM skins s
                 LEFT JOIN archive_records a ON a.skin_md5 = s.md5
                 WHERE s.skin_type = ?1 AND a.skin_md5 IS NULL
                 ORDER BY s.md5",
            )
            .map_err(CatalogError::query)?;

        let md5s = stmt
            .query_map([skin_type.as_str()], |row| row.get(0))
            .map_err(CatalogError::query)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(CatalogError::query)?;

        Ok(md5s)
    }

    async fn identifier_exists(&self, identifier: &str) -> Result<bool, CatalogError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM archive_records WHERE identifier = ?1 COLLATE NOCASE)",
                [identifier],
                |row| row.get(0),
            )
            .map_err(CatalogError::query)?;

        Ok(exists == 1)
    }

    async fn has_archive_record(&self, skin_md5: &str) -> Result<bool, CatalogError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM archive_records WHERE skin_md5 = ?1)",
                [skin_md5],
                |row| row.get(0),
            )
            .map_err(CatalogError::query)?;

        Ok(exists == 1)
    }

    async fn insert_archive_record(&self, record: &ArchiveRecord) -> Result<(), CatalogError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        conn.execute(
            "INSERT INTO archive_records (skin_md5, identifier, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                record.skin_md5,
                record.identifier,
                record.created_at.timestamp(),
            ],
        )
        .map_err(CatalogError::query)?;

        Ok(())
    }

    async fn all_identifiers(&self) -> Result<Vec<String>, CatalogError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT identifier FROM archive_records ORDER BY rowid")
            .map_err(CatalogError::query)?;

        let identifiers = stmt
            .query_map([], |row| row.get(0))
            .map_err(CatalogError::query)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(CatalogError::query)?;

        Ok(identifiers)
    }

    async fn summary(&self) -> Result<CatalogSummary, CatalogError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        let total_skins: u64 = conn
            .query_row("SELECT COUNT(*) FROM skins", [], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(CatalogError::query)? as u64;

        let classic: u64 = conn
            .query_row(
                "SELECT COUNT(*) FROM skins WHERE skin_type = 'CLASSIC'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map_err(CatalogError::query)? as u64;

        let modern: u64 = conn
            .query_row(
                "SELECT COUNT(*) FROM skins WHERE skin_type = 'MODERN'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map_err(CatalogError::query)? as u64;

        let archived: u64 = conn
            .query_row(
                "SELECT COUNT(DISTINCT skin_md5) FROM archive_records",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map_err(CatalogError::query)? as u64;

        let pending_classic: u64 = conn
            .query_row(
                "SELECT COUNT(*) FROM skins s
                 LEFT JOIN archive_records a ON a.skin_md5 = s.md5
                 WHERE s.skin_type = 'CLASSIC' AND a.skin_md5 IS NULL",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map_err(CatalogError::query)? as u64;

        Ok(CatalogSummary {
            total_skins,
            classic,
            modern,
            archived,
            pending_classic,
        })
    }
}

/// Convert a database row to a Skin.
fn row_to_skin(row: &rusqlite::Row<'_>) -> Skin {
    let md5: String = row.get(0).unwrap_or_default();
    let filename: String = row.get(1).unwrap_or_default();
    let skin_type_str: String = row.get(2).unwrap_or_default();
    let download_url: String = row.get(3).unwrap_or_default();
    let screenshot_url: String = row.get(4).unwrap_or_default();
    let imported_at_ts: i64 = row.get(5).unwrap_or(0);

    Skin {
        md5,
        filename,
        download_url,
        screenshot_url,
        imported_at: Utc
            .timestamp_opt(imported_at_ts, 0)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH),
        skin_type: SkinType::from_str(&skin_type_str).unwrap_or(SkinType::Classic),
    }
}
