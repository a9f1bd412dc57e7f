//! Staging remote files into scratch space.
//!
//! Skin and screenshot files are fetched into per-download temp
//! directories that live as long as the stager, so staged paths stay
//! valid for the whole batch and the trees are removed on exit.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

use super::error::DownloadError;

/// Trait over staging so the upload pipeline can run against a fake.
#[async_trait]
pub trait Stager: Send + Sync {
    /// Download `url` into scratch space under `filename`, returning the
    /// staged path.
    async fn stage(&self, url: &str, filename: &str) -> Result<PathBuf, DownloadError>;
}

/// Stages over HTTP into `tempfile` directories.
pub struct HttpStager {
    client: Client,
    /// Every scratch dir is parked here; `TempDir` removes its tree on
    /// drop, so staged files survive until the stager goes away.
    scratch: Mutex<Vec<TempDir>>,
}

impl HttpStager {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            scratch: Mutex::new(Vec::new()),
        }
    }
}

/// Strip path separators so the staged file lands inside its scratch dir.
fn scratch_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !matches!(c, '/' | '\\'))
        .collect()
}

#[async_trait]
impl Stager for HttpStager {
    async fn stage(&self, url: &str, filename: &str) -> Result<PathBuf, DownloadError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DownloadError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let dir = tempfile::tempdir()?;
        let path = dir.path().join(scratch_filename(filename));

        let mut file = tokio::fs::File::create(&path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        tracing::debug!(url = %url, path = %path.display(), "Staged file");

        self.scratch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(dir);

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_filename_plain() {
        assert_eq!(scratch_filename("Sonic_AMP.wsz"), "Sonic_AMP.wsz");
    }

    #[test]
    fn test_scratch_filename_drops_separators() {
        assert_eq!(scratch_filename("a/b.wsz"), "ab.wsz");
        assert_eq!(scratch_filename("..\\evil.wsz"), "..evil.wsz");
    }

    #[tokio::test]
    async fn test_stage_connection_error() {
        let stager = HttpStager::new(Client::new());
        let result = stager.stage("http://127.0.0.1:1/skin.wsz", "skin.wsz").await;
        assert!(matches!(result, Err(DownloadError::Http(_))));
    }
}
