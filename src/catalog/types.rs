//! Types for the catalog module.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::SkinType;

/// A skin known to the catalog, keyed by the md5 of its file.
#[derive(Debug, Clone)]
pub struct Skin {
    /// md5 of the skin file as lowercase hex. Primary key.
    pub md5: String,
    /// Original filename, e.g. `Sonic_AMP.wsz`.
    pub filename: String,
    /// Where the skin file can be fetched.
    pub download_url: String,
    /// Where the skin's screenshot can be fetched.
    pub screenshot_url: String,
    /// When the skin entered the catalog.
    pub imported_at: DateTime<Utc>,
    /// Classic or modern.
    pub skin_type: SkinType,
}

/// Links a catalog skin to the archive item that holds it.
#[derive(Debug, Clone)]
pub struct ArchiveRecord {
    /// md5 of the skin, byte-exact against `skins.md5`.
    pub skin_md5: String,
    /// Archive item identifier, e.g. `winampskins_Sonic_AMP`.
    pub identifier: String,
    /// When the record was created locally.
    pub created_at: DateTime<Utc>,
}

impl ArchiveRecord {
    pub fn new(skin_md5: String, identifier: String) -> Self {
        Self {
            skin_md5,
            identifier,
            created_at: Utc::now(),
        }
    }
}

/// One entry of the JSON import manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct SkinManifestEntry {
    pub md5: String,
    pub filename: String,
    pub skin_type: SkinType,
    pub download_url: String,
    pub screenshot_url: String,
}

impl SkinManifestEntry {
    /// Normalize into a catalog row. The md5 is lowercased so later
    /// lookups stay byte-exact regardless of how the manifest spelled it.
    pub fn into_skin(self) -> Skin {
        Skin {
            md5: self.md5.to_ascii_lowercase(),
            filename: self.filename,
            download_url: self.download_url,
            screenshot_url: self.screenshot_url,
            imported_at: Utc::now(),
            skin_type: self.skin_type,
        }
    }
}

/// True if `s` is exactly 32 hex digits.
pub fn valid_md5(s: &str) -> bool {
    s.len() == 32 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Aggregate counts reported by `skinsync status`.
#[derive(Debug, Clone)]
pub struct CatalogSummary {
    /// Total number of skins tracked.
    pub total_skins: u64,
    /// Number of classic skins.
    pub classic: u64,
    /// Number of modern skins.
    pub modern: u64,
    /// Number of skins with an archive record.
    pub archived: u64,
    /// Number of classic skins still waiting for upload.
    pub pending_classic: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_entry_decode() {
        let json = r#"[
            {
                "md5": "5A01FD3EDF5B5F43BA8157CC2F14AB05",
                "filename": "Sonic_AMP.wsz",
                "skin_type": "CLASSIC",
                "download_url": "https://cdn.example.com/skins/Sonic_AMP.wsz",
                "screenshot_url": "https://cdn.example.com/screens/Sonic_AMP.png"
            }
        ]"#;
        let entries: Vec<SkinManifestEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "Sonic_AMP.wsz");
        assert_eq!(entries[0].skin_type, SkinType::Classic);
    }

    #[test]
    fn test_into_skin_lowercases_md5() {
        let entry = SkinManifestEntry {
            md5: "0F5BB235BE145E9C22E79452A9F67AD9".to_string(),
            filename: "base.wsz".to_string(),
            skin_type: SkinType::Classic,
            download_url: "https://example.com/base.wsz".to_string(),
            screenshot_url: "https://example.com/base.png".to_string(),
        };
        let skin = entry.into_skin();
        assert_eq!(skin.md5, "0f5bb235be145e9c22e79452a9f67ad9");
    }

    #[test]
    fn test_valid_md5() {
        assert!(valid_md5("0f5bb235be145e9c22e79452a9f67ad9"));
        assert!(valid_md5("0F5BB235BE145E9C22E79452A9F67AD9"));
        assert!(!valid_md5("0f5bb235be145e9c22e79452a9f67ad")); // 31 chars
        assert!(!valid_md5("0f5bb235be145e9c22e79452a9f67ad9a")); // 33 chars
        assert!(!valid_md5("0g5bb235be145e9c22e79452a9f67ad9")); // non-hex
        assert!(!valid_md5(""));
    }
}
