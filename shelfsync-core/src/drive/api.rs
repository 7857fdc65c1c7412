//! Drive v3 folder listing.

use crate::drive::auth::{ServiceAccount, TokenProvider};
use crate::drive::FOLDER_MIME_TYPE;
use crate::error::Result;
use crate::model::DriveItem;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

const FILES_ENDPOINT: &str = "https://www.googleapis.com/drive/v3/files";
const PAGE_SIZE: u32 = 1000;
const LIST_FIELDS: &str = "nextPageToken, files(id, name, size, mimeType, modifiedTime)";

/// Listing seam for the walker and the engine. The production implementation
/// talks to Drive; tests substitute an in-memory tree.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Lists the immediate children of a folder, name-sorted, following the
    /// continuation token until the listing is exhausted.
    async fn list_children(&self, folder_id: &str, folders_only: bool) -> Result<Vec<DriveItem>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListPage {
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<RawFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFile {
    id: String,
    name: String,
    mime_type: String,
    /// Drive serializes sizes as decimal strings; folders have none.
    size: Option<String>,
    modified_time: Option<String>,
}

impl RawFile {
    fn into_item(self) -> DriveItem {
        let modified_time = self
            .modified_time
            .as_deref()
            .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.timestamp_millis())
            .unwrap_or(0);
        DriveItem {
            id: self.id,
            name: self.name,
            mime_type: self.mime_type,
            size: self.size.and_then(|s| s.parse().ok()),
            modified_time,
        }
    }
}

pub struct GoogleDriveClient {
    http: reqwest::Client,
    token: TokenProvider,
}

impl GoogleDriveClient {
    pub fn new(account: ServiceAccount) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let token = TokenProvider::new(account, http.clone());
        Ok(Self { http, token })
    }
}

#[async_trait]
impl DriveApi for GoogleDriveClient {
    async fn list_children(&self, folder_id: &str, folders_only: bool) -> Result<Vec<DriveItem>> {
        let mut query = format!("'{folder_id}' in parents and trashed = false");
        if folders_only {
            query.push_str(&format!(" and mimeType = '{FOLDER_MIME_TYPE}'"));
        }

        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let bearer = self.token.bearer_token().await?;
            let mut request = self
                .http
                .get(FILES_ENDPOINT)
                .bearer_auth(bearer)
                .query(&[
                    ("q", query.as_str()),
                    ("fields", LIST_FIELDS),
                    ("pageSize", &PAGE_SIZE.to_string()),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: FileListPage = request.send().await?.error_for_status()?.json().await?;
            if page.files.is_empty() && page.next_page_token.is_some() {
                warn!(folder_id, "drive returned an empty page with a continuation token");
            }
            items.extend(page.files.into_iter().map(RawFile::into_item));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }
}
