//! Item creation via the `ia` command-line tool.
//!
//! The tool must be installed separately and configured with archive
//! credentials (`ia configure`). Each upload creates one item holding
//! the skin file and its screenshot.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use super::error::ToolError;
use super::{COLLECTION, MEDIA_TYPE, SKIN_TYPE_TAG};

/// Everything needed to create one archive item.
#[derive(Debug, Clone)]
pub struct UploadJob {
    /// Identifier for the new item.
    pub identifier: String,
    /// Staged skin file.
    pub skin_path: PathBuf,
    /// Staged screenshot.
    pub screenshot_path: PathBuf,
    /// Human-readable item title.
    pub title: String,
}

/// Trait over the archive upload tool, so the batch can run against a
/// fake in tests.
#[async_trait]
pub trait ArchiveTool: Send + Sync {
    /// Create the item and upload both files. Returns once the tool exits.
    async fn upload(&self, job: &UploadJob) -> Result<(), ToolError>;
}

/// Runs the real `ia` CLI.
#[derive(Debug, Clone)]
pub struct IaUploader {
    program: String,
}

impl IaUploader {
    pub fn new() -> Self {
        Self {
            program: "ia".to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Default for IaUploader {
    fn default() -> Self {
        Self::new()
    }
}

/// Argument vector for one upload invocation.
fn upload_args(job: &UploadJob) -> Vec<String> {
    vec![
        "upload".to_string(),
        job.identifier.clone(),
        job.skin_path.to_string_lossy().into_owned(),
        job.screenshot_path.to_string_lossy().into_owned(),
        "--metadata".to_string(),
        format!("collection:{COLLECTION}"),
        "--metadata".to_string(),
        format!("skintype:{SKIN_TYPE_TAG}"),
        "--metadata".to_string(),
        format!("mediatype:{MEDIA_TYPE}"),
        "--metadata".to_string(),
        format!("title:{}", job.title),
    ]
}

#[async_trait]
impl ArchiveTool for IaUploader {
    async fn upload(&self, job: &UploadJob) -> Result<(), ToolError> {
        let args = upload_args(job);
        tracing::debug!(identifier = %job.identifier, "Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(ToolError::Spawn)?;

        if !output.status.success() {
            let mut message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if message.is_empty() {
                message = String::from_utf8_lossy(&output.stdout).trim().to_string();
            }
            return Err(ToolError::Failed {
                status: output.status.code().unwrap_or(-1),
                message,
            });
        }

        Ok(())
    }
}
