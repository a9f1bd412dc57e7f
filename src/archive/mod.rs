//! Internet Archive surface: the search and metadata web APIs, plus the
//! `ia` upload tool.

pub mod error;
pub mod responses;
pub mod tool;

use async_trait::async_trait;

use error::ArchiveError;
use responses::{ItemMetadata, SearchDoc, SearchResponse};

pub use tool::{ArchiveTool, IaUploader, UploadJob};

/// Base URL for the archive web APIs.
pub const ARCHIVE_BASE_URL: &str = "https://archive.org";

/// Collection every skin item belongs to.
pub const COLLECTION: &str = "winampskins";

/// `skintype` metadata tag carried by classic skin items.
pub const SKIN_TYPE_TAG: &str = "wsz";

/// `mediatype` for skin items.
pub const MEDIA_TYPE: &str = "software";

/// Rows requested per search page. The collection is far smaller than
/// this, so a single page covers it; `search_skins` warns if that ever
/// stops holding.
const SEARCH_ROWS: u32 = 100_000;

/// Read-only view of the archive, used by reconcile.
#[async_trait]
pub trait ArchiveIndex: Send + Sync {
    /// Every skin item currently in the collection.
    async fn search_skins(&self) -> Result<Vec<SearchDoc>, ArchiveError>;

    /// File listing for one item.
    async fn fetch_metadata(&self, identifier: &str) -> Result<ItemMetadata, ArchiveError>;
}

/// HTTP client for the archive web APIs.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: reqwest::Client,
}

impl ArchiveClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Search query matching the whole skin collection.
fn search_query() -> String {
    format!("collection:{COLLECTION} AND skintype:{SKIN_TYPE_TAG}")
}

#[async_trait]
impl ArchiveIndex for ArchiveClient {
    async fn search_skins(&self) -> Result<Vec<SearchDoc>, ArchiveError> {
        let url = format!("{ARCHIVE_BASE_URL}/advancedsearch.php");
        let query = search_query();
        let rows = SEARCH_ROWS.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("fl[]", "identifier"),
                ("fl[]", "skintype"),
                ("rows", rows.as_str()),
                ("page", "1"),
                ("output", "json"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ArchiveError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }

        let search: SearchResponse = resp.json().await?;
        let page = search.response;
        if page.num_found as usize > page.docs.len() {
            tracing::warn!(
                num_found = page.num_found,
                returned = page.docs.len(),
                "Archive search did not return the full collection"
            );
        }

        Ok(page.docs)
    }

    async fn fetch_metadata(&self, identifier: &str) -> Result<ItemMetadata, ArchiveError> {
        let url = format!("{ARCHIVE_BASE_URL}/metadata/{identifier}");
        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(ArchiveError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }

        let metadata: ItemMetadata = resp.json().await?;
        Ok(metadata)
    }
}
