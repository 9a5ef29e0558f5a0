//! Google Docs API client
//!
//! Thin pass-through for the four document operations exposed over JSON-RPC.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{google::DOCUMENT_MIME_TYPE, Config};
use crate::docs::credentials::CredentialManager;
use crate::docs::types::*;
use crate::error::{BridgeError, DocsApiError, Result};

/// Index just after the document's leading structural element
pub const DEFAULT_INSERT_INDEX: i64 = 1;

/// Maximum number of documents returned by `list_docs`
const LIST_PAGE_SIZE: u32 = 50;

/// Google Docs/Drive API client
pub struct DocsClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// Source of valid access tokens
    credentials: Arc<CredentialManager>,

    docs_base_url: String,
    drive_base_url: String,
}

impl DocsClient {
    pub fn new(
        config: &Config,
        http_client: reqwest::Client,
        credentials: Arc<CredentialManager>,
    ) -> Self {
        Self {
            http_client,
            credentials,
            docs_base_url: config.docs_api_base_url.trim_end_matches('/').to_string(),
            drive_base_url: config.drive_api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get a valid access token
    async fn access_token(&self) -> Result<String> {
        Ok(self.credentials.obtain_valid_credential().await?.access_token)
    }

    fn document_url(&self, document_id: &str) -> String {
        format!(
            "{}/documents/{}",
            self.docs_base_url,
            urlencoding::encode(document_id)
        )
    }

    /// List non-trashed Google Docs visible to the user
    pub async fn list_docs(&self) -> Result<Vec<DocSummary>> {
        let token = self.access_token().await?;
        let query = format!("mimeType='{}' and trashed=false", DOCUMENT_MIME_TYPE);
        let url = format!(
            "{}/files?q={}&pageSize={}&fields={}",
            self.drive_base_url,
            urlencoding::encode(&query),
            LIST_PAGE_SIZE,
            urlencoding::encode("files(id,name)")
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        let files: FileList = read_json(response, "list_docs").await?;
        Ok(files.files)
    }

    /// Fetch a document's title and body
    pub async fn get_doc(&self, document_id: &str) -> Result<DocContent> {
        let token = self.access_token().await?;

        let response = self
            .http_client
            .get(self.document_url(document_id))
            .bearer_auth(&token)
            .send()
            .await?;

        let mut document: Value = read_json(response, "get_doc").await?;
        Ok(DocContent {
            title: document
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string),
            body: document.get_mut("body").map(Value::take),
        })
    }

    /// Insert `text` at `index`
    pub async fn insert_text(
        &self,
        document_id: &str,
        text: &str,
        index: i64,
    ) -> Result<BatchUpdateResult> {
        let request = DocsRequest::InsertText {
            location: Location { index },
            text: text.to_string(),
        };
        self.batch_update(document_id, request, "insert_text").await
    }

    /// Apply `format` to the range `[start_index, end_index)`
    pub async fn format_range(
        &self,
        document_id: &str,
        start_index: i64,
        end_index: i64,
        format: TextFormat,
    ) -> Result<BatchUpdateResult> {
        let request = format.to_request(start_index, end_index);
        self.batch_update(document_id, request, "format_range").await
    }

    async fn batch_update(
        &self,
        document_id: &str,
        request: DocsRequest,
        operation: &'static str,
    ) -> Result<BatchUpdateResult> {
        let token = self.access_token().await?;
        let url = format!("{}:batchUpdate", self.document_url(document_id));
        let body = BatchUpdateRequest {
            requests: vec![request],
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let mut reply: Value = read_json(response, operation).await?;
        tracing::debug!(document_id, operation, "Applied batch update");
        Ok(BatchUpdateResult::ok(reply.get_mut("replies").map(Value::take)))
    }
}

/// Decode a successful response, or turn the remote error text into an error
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<T> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(BridgeError::Docs(DocsApiError::RequestFailed {
            operation,
            status: status.as_u16(),
            message: text,
        }))
    }
}
