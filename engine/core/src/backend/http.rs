//! HTTP Backend Implementation
//!
//! [`AssistantApi`] over the service's REST endpoints:
//!
//! - `POST /query` - chat turn
//! - `GET /documents` - document list
//! - `POST /vectorize-document` - multipart upload
//! - `DELETE /document/{id}` - delete
//! - `POST /embeddings` - semantic search
//!
//! Every response goes through the same two checks: the status must be a
//! success, and the body must parse into the expected shape.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use super::traits::{
    ApiError, AssistantApi, DeleteReceipt, DocumentId, DocumentList, DocumentUpload,
    QueryRequest, QueryResponse, SearchRequest, SearchResponse, UploadReceipt,
};
use crate::config::ApiSettings;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the assistant service
#[derive(Clone, Debug)]
pub struct HttpBackend {
    /// Service root, e.g. `http://localhost:8000/`
    base_url: Url,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend for `base_url` with default timeouts
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` cannot serve as a base
    /// for endpoint paths, or [`ApiError::Transport`] if the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::from_settings(&ApiSettings {
            base_url: base_url.to_string(),
            ..ApiSettings::default()
        })
    }

    /// Create a backend from API settings
    ///
    /// # Errors
    ///
    /// Same as [`HttpBackend::new`].
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&settings.base_url)?;
        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .build()?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// The service root this backend talks to
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments
    ///
    /// Segments are percent-encoded, so document ids cannot escape the path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

/// Fail on non-success statuses, keeping the body for diagnostics
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Check the status and parse the body as `T`
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl AssistantApi for HttpBackend {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn health_check(&self) -> bool {
        let Ok(url) = self.endpoint(&["documents"]) else {
            return false;
        };
        self.http_client
            .get(url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
            .is_ok()
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        let url = self.endpoint(&["query"])?;
        tracing::debug!(url = %url, "Sending query");
        let response = self.http_client.post(url).json(request).send().await?;
        read_json(response).await
    }

    async fn list_documents(&self) -> Result<DocumentList, ApiError> {
        let url = self.endpoint(&["documents"])?;
        let response = self.http_client.get(url).send().await?;
        read_json(response).await
    }

    async fn upload_document(&self, upload: &DocumentUpload) -> Result<UploadReceipt, ApiError> {
        let url = self.endpoint(&["vectorize-document"])?;
        let file = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(DOCX_MIME)?;
        let form = Form::new()
            .part("file", file)
            .text("document_name", upload.document_name.clone());

        tracing::debug!(
            url = %url,
            file_name = %upload.file_name,
            bytes = upload.bytes.len(),
            "Uploading document"
        );
        let response = self.http_client.post(url).multipart(form).send().await?;
        read_json(response).await
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<DeleteReceipt, ApiError> {
        let url = self.endpoint(&["document", id.as_str()])?;
        let response = self.http_client.delete(url).send().await?;
        let response = check_status(response).await?;

        // Status is authoritative; an unexpected body is not a failure
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        let url = self.endpoint(&["embeddings"])?;
        let response = self.http_client.post(url).json(request).send().await?;
        read_json(response).await
    }
}
