//! Assistant Service Integration
//!
//! Abstracted access to the assistant service through a common trait.
//!
//! # Available Backends
//!
//! - **HTTP**: the service's REST API (default)
//!
//! # Usage
//!
//! ```ignore
//! use docdesk_engine::backend::{AssistantApi, HttpBackend, QueryRequest};
//!
//! let backend = HttpBackend::new("http://localhost:8000")?;
//! let reply = backend.query(&QueryRequest::new("What is my notice period?")).await?;
//! println!("{}", reply.result);
//! ```

mod http;
mod traits;

pub use http::HttpBackend;
pub use traits::{
    ApiError, AssistantApi, DeleteReceipt, DocumentId, DocumentList, DocumentRecord,
    DocumentUpload, QueryRequest, QueryResponse, SearchRequest, SearchResponse, SearchResult,
    UploadReceipt,
};
