//! Error types for the archive module.

use thiserror::Error;

/// Errors from the archive web APIs.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The archive replied with a non-success status.
    #[error("Archive request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    /// Transport or decode failure.
    #[error("Archive request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A search hit carried a skintype other than the one queried for.
    #[error("Archive item {identifier} has unexpected skintype {found:?}")]
    SkinTypeMismatch {
        identifier: String,
        found: Option<String>,
    },
}

/// Errors from invoking the `ia` upload tool.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool binary could not be started.
    #[error("Failed to run upload tool: {0}")]
    Spawn(#[source] std::io::Error),

    /// The tool ran but exited unsuccessfully. `message` carries the
    /// tool's stderr (or stdout when stderr is empty).
    #[error("Upload tool exited with status {status}: {message}")]
    Failed { status: i32, message: String },
}
