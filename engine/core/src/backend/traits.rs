//! Assistant API Traits
//!
//! The engine talks to the assistant service through [`AssistantApi`]. The
//! HTTP implementation lives in [`super::http`]; tests and alternative
//! transports implement the same trait.
//!
//! Wire types mirror the service's JSON field names through serde renames so
//! the rest of the crate can use Rust naming.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::markup::truncate_preview;

/// Errors from the assistant API
///
/// These are the three failure causes the service can produce. The request
/// controller collapses all of them into a single human-readable reason.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("Service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The configured base URL cannot be used to build endpoints
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Malformed(error.to_string())
        } else if let Some(status) = error.status() {
            Self::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}

/// Server-assigned document identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    /// Create a document ID from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document known to the service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique identifier
    #[serde(rename = "document_id")]
    pub id: DocumentId,
    /// Display name
    #[serde(rename = "document_name")]
    pub name: String,
    /// Leading text of the document, when the service provides it
    #[serde(
        rename = "document_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preview_text: Option<String>,
    /// Number of indexed chunks
    #[serde(
        rename = "chunks_count",
        alias = "chunks_added",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub chunk_count: Option<u32>,
}

impl DocumentRecord {
    /// Create a record with just an id and name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(id),
            name: name.into(),
            preview_text: None,
            chunk_count: None,
        }
    }

    /// Preview text, or a placeholder when the service sent none
    #[must_use]
    pub fn preview_or_placeholder(&self) -> &str {
        match self.preview_text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => "No preview available",
        }
    }
}

/// One indexed section matching a semantic search
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Section text
    pub text: String,
    /// Owning document
    pub document_id: DocumentId,
    /// Owning document's name
    pub document_name: String,
    /// Section heading, when known
    #[serde(default)]
    pub section: Option<String>,
    /// Relevance score
    pub score: f64,
}

impl SearchResult {
    /// Score formatted with two decimals
    #[must_use]
    pub fn score_label(&self) -> String {
        format!("{:.2}", self.score)
    }

    /// Section text shortened for table cells
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        truncate_preview(&self.text, max_chars)
    }
}

/// Body of `POST /query`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    /// The user's message
    pub query: String,
}

impl QueryRequest {
    /// Create a query request
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Response of `POST /query`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct QueryResponse {
    /// The assistant's answer
    pub result: String,
}

/// Body of `POST /embeddings`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    /// Search text
    pub query: String,
    /// Maximum number of sections to return
    pub limit: u32,
}

/// Response of `POST /embeddings`
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SearchResponse {
    /// Echo of the query, when the service includes it
    #[serde(default)]
    pub query: Option<String>,
    /// Matching sections in relevance order
    pub results: Vec<SearchResult>,
}

/// Response of `GET /documents`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DocumentList {
    /// Count reported by the service
    #[serde(default)]
    pub document_count: Option<usize>,
    /// Documents in service order
    pub documents: Vec<DocumentRecord>,
}

/// A document file to upload
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    /// File name as picked by the user (used for the multipart part)
    pub file_name: String,
    /// Name to store the document under
    pub document_name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Upload `bytes` under the file's own name
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            document_name: file_name.clone(),
            file_name,
            bytes,
        }
    }

    /// Store the document under a different name
    #[must_use]
    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = name.into();
        self
    }
}

impl fmt::Debug for DocumentUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentUpload")
            .field("file_name", &self.file_name)
            .field("document_name", &self.document_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Response of `POST /vectorize-document`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    /// Original file name
    #[serde(default)]
    pub filename: Option<String>,
    /// Name the document was stored under
    pub document_name: String,
    /// Assigned identifier
    #[serde(default)]
    pub document_id: Option<DocumentId>,
    /// Preview of the extracted text
    #[serde(default)]
    pub document_text: Option<String>,
    /// Number of chunks indexed
    #[serde(default)]
    pub chunks_added: Option<u32>,
}

/// Response of `DELETE /document/{id}`
///
/// Only the status matters; the body is parsed leniently.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteReceipt {
    /// Identifier that was deleted
    #[serde(default)]
    pub document_id: Option<DocumentId>,
    /// Number of chunks removed
    #[serde(default)]
    pub chunks_deleted: Option<u64>,
    /// Service-reported success flag
    #[serde(default)]
    pub success: Option<bool>,
}

/// The assistant service
///
/// Implementations are stateless and may be called from several sessions at
/// once; each session serializes its own requests.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Transport name for logs (e.g., "HTTP")
    fn name(&self) -> &str;

    /// Whether the service is reachable
    async fn health_check(&self) -> bool;

    /// Ask the assistant a question
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError>;

    /// List every stored document
    async fn list_documents(&self) -> Result<DocumentList, ApiError>;

    /// Upload and index a document
    async fn upload_document(&self, upload: &DocumentUpload) -> Result<UploadReceipt, ApiError>;

    /// Delete a document and its indexed sections
    async fn delete_document(&self, id: &DocumentId) -> Result<DeleteReceipt, ApiError>;

    /// Semantic search over indexed sections
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError>;
}

#[async_trait]
impl<T: AssistantApi + ?Sized> AssistantApi for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn health_check(&self) -> bool {
        (**self).health_check().await
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        (**self).query(request).await
    }

    async fn list_documents(&self) -> Result<DocumentList, ApiError> {
        (**self).list_documents().await
    }

    async fn upload_document(&self, upload: &DocumentUpload) -> Result<UploadReceipt, ApiError> {
        (**self).upload_document(upload).await
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<DeleteReceipt, ApiError> {
        (**self).delete_document(id).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        (**self).search(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_list_wire_names() {
        let body = r#"{
            "document_count": 2,
            "documents": [
                {"document_id": "a1", "document_name": "lease.docx", "chunks_count": 12},
                {"document_id": "b2", "document_name": "nda.docx"}
            ]
        }"#;

        let list: DocumentList = serde_json::from_str(body).unwrap();
        assert_eq!(list.document_count, Some(2));
        assert_eq!(list.documents[0].id, DocumentId::new("a1"));
        assert_eq!(list.documents[0].chunk_count, Some(12));
        assert_eq!(list.documents[1].preview_text, None);
        assert_eq!(list.documents[1].chunk_count, None);
    }

    #[test]
    fn test_document_record_accepts_upload_chunk_field() {
        let body = r#"{"document_id": "x", "document_name": "x.docx",
                       "document_text": "Preamble...", "chunks_added": 3}"#;
        let record: DocumentRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.chunk_count, Some(3));
        assert_eq!(record.preview_or_placeholder(), "Preamble...");
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        // `documents` is required
        assert!(serde_json::from_str::<DocumentList>(r#"{"document_count": 0}"#).is_err());
        // `result` is required
        assert!(serde_json::from_str::<QueryResponse>(r#"{"answer": "hi"}"#).is_err());
        // `document_name` is required
        assert!(serde_json::from_str::<UploadReceipt>(r#"{"filename": "a.docx"}"#).is_err());
    }

    #[test]
    fn test_search_response_null_section() {
        let body = r#"{"query": "salary", "results": [
            {"text": "Salary is paid monthly", "document_id": "d", "document_name": "contract.docx",
             "section": null, "score": 0.8731}
        ]}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].section, None);
        assert_eq!(response.results[0].score_label(), "0.87");
    }

    #[test]
    fn test_delete_receipt_lenient() {
        let receipt: DeleteReceipt = serde_json::from_str("{}").unwrap();
        assert_eq!(receipt, DeleteReceipt::default());

        let receipt: DeleteReceipt =
            serde_json::from_str(r#"{"document_id": "d", "chunks_deleted": 4, "success": true}"#)
                .unwrap();
        assert_eq!(receipt.chunks_deleted, Some(4));
    }

    #[test]
    fn test_placeholder_preview() {
        let mut record = DocumentRecord::new("id", "name.docx");
        assert_eq!(record.preview_or_placeholder(), "No preview available");
        record.preview_text = Some(String::new());
        assert_eq!(record.preview_or_placeholder(), "No preview available");
    }

    #[test]
    fn test_upload_defaults_document_name_to_file_name() {
        let upload = DocumentUpload::new("contract.docx", vec![1, 2, 3]);
        assert_eq!(upload.document_name, "contract.docx");

        let upload = upload.with_document_name("Employment contract");
        assert_eq!(upload.file_name, "contract.docx");
        assert_eq!(upload.document_name, "Employment contract");
        assert!(format!("{upload:?}").contains("bytes: 3"));
    }

    #[test]
    fn test_api_error_messages() {
        let err = ApiError::Status {
            status: 500,
            body: "Error processing document".to_string(),
        };
        assert_eq!(err.to_string(), "Service returned 500: Error processing document");

        let err = ApiError::Malformed("missing field `result`".to_string());
        assert!(err.to_string().starts_with("Malformed response"));
    }

    #[test]
    fn test_query_request_serializes() {
        let body = serde_json::to_value(QueryRequest::new("hello")).unwrap();
        assert_eq!(body, serde_json::json!({"query": "hello"}));

        let body = serde_json::to_value(SearchRequest {
            query: "salary".to_string(),
            limit: 5,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"query": "salary", "limit": 5}));
    }
}
