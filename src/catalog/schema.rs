//! Database schema definitions and migrations.

use rusqlite::Connection;

use super::error::CatalogError;

/// Current schema version. Increment when making schema changes.
pub const SCHEMA_VERSION: i32 = 1;

/// Schema DDL for version 1.
///
/// `archive_records` deliberately carries no UNIQUE constraints: the
/// one-record-per-skin and one-skin-per-identifier rules are enforced by
/// the insert paths, which check before writing.
const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS skins (
    md5 TEXT PRIMARY KEY,
    filename TEXT NOT NULL,
    skin_type TEXT NOT NULL,
    download_url TEXT NOT NULL,
    screenshot_url TEXT NOT NULL,
    imported_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_skins_skin_type ON skins(skin_type);

CREATE TABLE IF NOT EXISTS archive_records (
    skin_md5 TEXT NOT NULL,
    identifier TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_archive_records_md5 ON archive_records(skin_md5);
CREATE INDEX IF NOT EXISTS idx_archive_records_identifier ON archive_records(identifier COLLATE NOCASE);
"#;

/// Get the current schema version from the database.
pub(crate) fn get_schema_version(conn: &Connection) -> Result<i32, CatalogError> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), CatalogError> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

/// Initialize or migrate the database schema.
///
/// This function is idempotent and safe to call on both new and existing databases.
pub(crate) fn migrate(conn: &Connection) -> Result<(), CatalogError> {
    let current_version = get_schema_version(conn)?;

    if current_version > SCHEMA_VERSION {
        return Err(CatalogError::UnsupportedSchemaVersion {
            found: current_version,
            expected: SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        // Fresh database — apply full schema
        conn.execute_batch(SCHEMA_V1)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
        tracing::debug!("Initialized catalog schema at version {}", SCHEMA_VERSION);
    } else if current_version < SCHEMA_VERSION {
        // Run incremental migrations
        for version in (current_version + 1)..=SCHEMA_VERSION {
            migrate_to_version(conn, version)?;
        }
    }

    Ok(())
}

/// Apply migration for a specific version.
fn migrate_to_version(conn: &Connection, version: i32) -> Result<(), CatalogError> {
    // Future migrations match on `version` here; version 1 is the base schema
    if version != SCHEMA_VERSION {
        tracing::warn!(
            "Unexpected schema version {}, applying base schema",
            version
        );
    }
    conn.execute_batch(SCHEMA_V1)?;
    set_schema_version(conn, version)?;
    tracing::info!("Migrated catalog to schema version {}", version);
    Ok(())
}
