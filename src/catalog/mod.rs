//! Local skin catalog.
//!
//! SQLite-backed store of every known skin, keyed by the md5 of its
//! file, plus the archive records linking skins to Internet Archive
//! items. The set of skins without archive records is what the sync
//! batch uploads; reconcile backfills records for items that already
//! exist remotely.

pub mod db;
pub mod error;
pub mod schema;
pub mod types;

pub use db::{CatalogDb, SqliteCatalog};
pub use types::{ArchiveRecord, Skin, SkinManifestEntry};
