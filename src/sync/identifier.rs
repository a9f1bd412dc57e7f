//! Archive identifier minting.
//!
//! Identifiers are derived from the skin filename's stem, sanitized to
//! the archive's allowed alphabet, and suffixed with `_N` until they
//! miss every identifier already recorded locally.

use std::path::Path;

use crate::catalog::error::CatalogError;
use crate::catalog::CatalogDb;

/// Prefix shared by every skin item identifier.
pub const IDENTIFIER_PREFIX: &str = "winampskins_";

/// Reduce a name to the archive's identifier alphabet.
///
/// Keeps ASCII letters, digits, `_`, `.` and `-`, then strips any
/// leading run of digits (the archive rejects identifiers that start
/// with one).
pub fn sanitize_identifier(name: &str) -> String {
    let filtered: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    filtered
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .to_string()
}

/// Prefixed identifier base for a skin filename. The extension is
/// dropped; `Sonic_AMP.wsz` becomes `winampskins_Sonic_AMP`.
pub fn identifier_base(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    format!("{IDENTIFIER_PREFIX}{}", sanitize_identifier(stem))
}

/// Mint a collision-free identifier for a skin filename.
///
/// Probes `base`, `base_1`, `base_2`, ... against the recorded
/// identifiers until one is free. Comparison is case-insensitive
/// because the archive aliases identifiers that differ only in case.
///
/// A record inserted between the probe and this upload's insert can
/// still collide; the tool reports that as a case alias and the batch
/// logs it without halting.
pub async fn allocate_identifier(
    catalog: &dyn CatalogDb,
    filename: &str,
) -> Result<String, CatalogError> {
    let base = identifier_base(filename);
    let mut suffix = 0u32;
    loop {
        let candidate = if suffix == 0 {
            base.clone()
        } else {
            format!("{base}_{suffix}")
        };
        if !catalog.identifier_exists(&candidate).await? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ArchiveRecord, SqliteCatalog};

    #[test]
    fn test_sanitize_passthrough() {
        assert_eq!(sanitize_identifier("Sonic_AMP"), "Sonic_AMP");
        assert_eq!(sanitize_identifier("skin-v1.2"), "skin-v1.2");
    }

    #[test]
    fn test_sanitize_drops_illegal_chars() {
        assert_eq!(
            sanitize_identifier("Winamp3 (for Winamp 5!)"),
            "Winamp3forWinamp5"
        );
        assert_eq!(sanitize_identifier("a b\tc"), "abc");
        assert_eq!(sanitize_identifier("ümlaut"), "mlaut");
    }

    #[test]
    fn test_sanitize_strips_leading_digits() {
        assert_eq!(sanitize_identifier("100 Pure Skin"), "PureSkin");
        assert_eq!(sanitize_identifier("2002_deck"), "_deck");
        // Inner digits survive
        assert_eq!(sanitize_identifier("mp3player2000"), "mp3player2000");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_identifier(""), "");
        assert_eq!(sanitize_identifier("12345"), "");
    }

    #[test]
    fn test_identifier_base_uses_stem() {
        assert_eq!(identifier_base("Sonic_AMP.wsz"), "winampskins_Sonic_AMP");
        assert_eq!(identifier_base("My Skin!.zip"), "winampskins_MySkin");
        assert_eq!(identifier_base("plainname"), "winampskins_plainname");
    }

    #[tokio::test]
    async fn test_allocate_free_base() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        let identifier = allocate_identifier(&catalog, "Sonic_AMP.wsz").await.unwrap();
        assert_eq!(identifier, "winampskins_Sonic_AMP");
    }

    #[tokio::test]
    async fn test_allocate_suffixes_on_collision() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog
            .insert_archive_record(&ArchiveRecord::new(
                "11111111111111111111111111111111".to_string(),
                "winampskins_Sonic_AMP".to_string(),
            ))
            .await
            .unwrap();
        catalog
            .insert_archive_record(&ArchiveRecord::new(
                "22222222222222222222222222222222".to_string(),
                "winampskins_Sonic_AMP_1".to_string(),
            ))
            .await
            .unwrap();

        let identifier = allocate_identifier(&catalog, "Sonic_AMP.wsz").await.unwrap();
        assert_eq!(identifier, "winampskins_Sonic_AMP_2");
    }

    #[tokio::test]
    async fn test_allocate_collision_is_case_insensitive() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog
            .insert_archive_record(&ArchiveRecord::new(
                "11111111111111111111111111111111".to_string(),
                "WINAMPSKINS_SONIC_AMP".to_string(),
            ))
            .await
            .unwrap();

        let identifier = allocate_identifier(&catalog, "Sonic_AMP.wsz").await.unwrap();
        assert_eq!(identifier, "winampskins_Sonic_AMP_1");
    }
}
