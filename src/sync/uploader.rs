//! Single-skin upload pipeline: extension gate, concurrent staging of
//! skin and screenshot, identifier minting, tool invocation, record
//! insert.

use crate::archive::{ArchiveTool, UploadJob};
use crate::catalog::{ArchiveRecord, CatalogDb, Skin};

use super::error::UploadError;
use super::identifier;
use super::stage::Stager;

/// Container extensions the archive accepts for classic skins.
pub const ALLOWED_EXTENSIONS: &[&str] = &["wsz", "zip"];

/// Extension given to staged screenshots.
pub const SCREENSHOT_EXTENSION: &str = "png";

/// True if the filename ends in an allowed container extension,
/// compared case-insensitively.
fn allowed_extension(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Screenshot filename paired with a skin filename: the stem plus
/// `.png`. `Sonic_AMP.wsz` pairs with `Sonic_AMP.png`.
pub fn screenshot_filename(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) => format!("{}.{SCREENSHOT_EXTENSION}", &filename[..idx]),
        None => format!("{filename}.{SCREENSHOT_EXTENSION}"),
    }
}

/// Upload one skin and record the resulting item.
///
/// Fails before any network or tool activity if the filename is not an
/// allowed container type. Skin and screenshot stage concurrently and
/// both must land before anything else happens; the identifier is
/// minted only after staging, and the archive record is inserted only
/// after the tool exits cleanly.
pub async fn upload_skin(
    catalog: &dyn CatalogDb,
    stager: &dyn Stager,
    tool: &dyn ArchiveTool,
    skin: &Skin,
) -> Result<String, UploadError> {
    if !allowed_extension(&skin.filename) {
        return Err(UploadError::UnsupportedFormat {
            filename: skin.filename.clone(),
        });
    }

    let screenshot = screenshot_filename(&skin.filename);
    let (skin_path, screenshot_path) = tokio::try_join!(
        stager.stage(&skin.download_url, &skin.filename),
        stager.stage(&skin.screenshot_url, &screenshot),
    )?;

    let identifier = identifier::allocate_identifier(catalog, &skin.filename).await?;

    let job = UploadJob {
        identifier: identifier.clone(),
        skin_path,
        screenshot_path,
        title: format!("Winamp Skin: {}", skin.filename),
    };
    tool.upload(&job).await?;

    catalog
        .insert_archive_record(&ArchiveRecord::new(skin.md5.clone(), identifier.clone()))
        .await?;

    tracing::debug!(md5 = %skin.md5, identifier = %identifier, "Uploaded skin");

    Ok(identifier)
}
