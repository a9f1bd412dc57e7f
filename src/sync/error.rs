//! Error types for the sync module.

use thiserror::Error;

use crate::archive::error::{ArchiveError, ToolError};
use crate::catalog::error::CatalogError;

/// Errors while staging a remote file into the scratch directory.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP error {status} downloading {url}")]
    Status { status: u16, url: String },

    #[error("HTTP error downloading: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Disk error: {0}")]
    Disk(#[from] std::io::Error),
}

/// Errors from uploading a single skin.
///
/// The `classify()` method buckets failures by inspecting the rendered
/// message for markers the upload tool is known to emit, so the batch
/// can tally and log each kind without halting.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The filename does not end in an allowed container extension.
    #[error("Unsupported skin format: {filename}")]
    UnsupportedFormat { filename: String },

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Buckets for failed uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The skin's zip container is damaged.
    CorruptArchive,
    /// The skin's zip container is password-protected; the archive
    /// rejects those.
    EncryptedContent,
    /// An existing item holds a case variant of the minted identifier.
    IdentifierConflict,
    /// Anything else; logged with full detail.
    Unexpected,
}

impl UploadError {
    /// Bucket this failure by the message markers the tool emits.
    pub fn classify(&self) -> FailureClass {
        let message = self.to_string().to_lowercase();
        if message.contains("case alias may already exist") {
            FailureClass::IdentifierConflict
        } else if message.contains("corrupt") {
            FailureClass::CorruptArchive
        } else if message.contains("encrypted") {
            FailureClass::EncryptedContent
        } else {
            FailureClass::Unexpected
        }
    }
}

/// Fatal errors that abort a sync or reconcile run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An md5 from the unarchived query no longer resolves to a skin.
    /// The catalog changed underneath the run, so nothing it reports
    /// can be trusted.
    #[error("Skin {md5} vanished from the catalog mid-run")]
    SkinNotFound { md5: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_failure(message: &str) -> UploadError {
        UploadError::Tool(ToolError::Failed {
            status: 1,
            message: message.to_string(),
        })
    }

    #[test]
    fn test_classify_identifier_conflict() {
        let e = tool_failure(
            "error uploading Sonic_AMP.wsz: Access Denied - case alias may already exist",
        );
        assert_eq!(e.classify(), FailureClass::IdentifierConflict);
    }

    #[test]
    fn test_classify_corrupt() {
        let e = tool_failure("error: zip archive is corrupt");
        assert_eq!(e.classify(), FailureClass::CorruptArchive);
    }

    #[test]
    fn test_classify_encrypted() {
        let e = tool_failure("refusing upload: file is encrypted");
        assert_eq!(e.classify(), FailureClass::EncryptedContent);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let e = tool_failure("ERROR: ARCHIVE IS CORRUPT");
        assert_eq!(e.classify(), FailureClass::CorruptArchive);
    }

    #[test]
    fn test_classify_unknown_tool_failure() {
        let e = tool_failure("internal server error");
        assert_eq!(e.classify(), FailureClass::Unexpected);
    }

    #[test]
    fn test_classify_download_failure() {
        let e = UploadError::Download(DownloadError::Status {
            status: 404,
            url: "https://example.com/skin.wsz".to_string(),
        });
        assert_eq!(e.classify(), FailureClass::Unexpected);
    }
}
