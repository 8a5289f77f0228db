//! Document Catalog
//!
//! The client's view of the documents the service has indexed, kept in
//! server order. Three channels drive it:
//!
//! | Channel  | Operation | On success                | On failure                  |
//! |----------|-----------|---------------------------|-----------------------------|
//! | `List`   | refresh   | replace the whole catalog | notify, catalog unchanged   |
//! | `Upload` | upload    | notify, then refresh      | notify, catalog unchanged   |
//! | `Delete` | remove    | notify, then refresh      | notify, catalog unchanged   |
//!
//! The catalog is never patched locally: after a mutation it is re-read from
//! the service, so it only ever holds what the server last reported.
//!
//! Uploads are checked locally before any network call. The service accepts
//! `.docx` files up to 10 MiB with names of at most 200 characters; anything
//! else is refused here with a warning notification.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::backend::{
    AssistantApi, DeleteReceipt, DocumentId, DocumentList, DocumentRecord, DocumentUpload,
    UploadReceipt,
};
use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::lifecycle::{RequestController, StartOutcome};
use crate::surface::{ConfirmPrompt, Notification, Notifier, NotifyLevel};

/// The only file extension the service indexes
pub const SUPPORTED_EXTENSION: &str = ".docx";

/// Longest document name the service stores
pub const MAX_DOCUMENT_NAME_CHARS: usize = 200;

/// Question asked before deleting a document
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this document?";

const FETCH_FAILED: &str = "Failed to fetch documents";
const UPLOAD_FAILED: &str = "Failed to upload document";
const DELETE_FAILED: &str = "Failed to delete document";
const DELETE_SUCCEEDED: &str = "Document deleted successfully";

/// Channels the catalog drives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CatalogChannel {
    /// Fetch the document list
    List,
    /// Upload one document
    Upload,
    /// Delete one document
    Delete,
}

/// Why an upload was refused before reaching the service
#[derive(Debug, Error)]
pub enum UploadRejection {
    /// File is not a `.docx`
    #[error("Only .docx files are supported")]
    UnsupportedType {
        /// Offending file name
        file_name: String,
    },

    /// File exceeds the upload limit
    #[error("File is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge {
        /// File size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Document name exceeds the service's limit
    #[error(
        "Document name is too long ({length} characters, limit {})",
        MAX_DOCUMENT_NAME_CHARS
    )]
    NameTooLong {
        /// Name length in characters
        length: usize,
    },

    /// File could not be read from disk
    #[error("Failed to read {}: {source}", path.display())]
    Unreadable {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Document list plus upload and delete operations
pub struct DocumentCatalog {
    api: Arc<dyn AssistantApi>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn ConfirmPrompt>,
    controller: RequestController<CatalogChannel>,
    documents: RwLock<Vec<DocumentRecord>>,
    max_upload_bytes: u64,
}

impl DocumentCatalog {
    /// Create an empty catalog
    ///
    /// Nothing is fetched until [`DocumentCatalog::refresh`] is called.
    pub fn new(
        api: Arc<dyn AssistantApi>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn ConfirmPrompt>,
    ) -> Self {
        Self {
            api,
            notifier,
            confirm,
            controller: RequestController::new(),
            documents: RwLock::new(Vec::new()),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Set the largest file accepted for upload
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Re-read the document list from the service
    pub async fn refresh(&self) -> StartOutcome {
        self.controller
            .start(
                CatalogChannel::List,
                (),
                |()| {
                    let api = Arc::clone(&self.api);
                    async move { api.list_documents().await }
                },
                |list: DocumentList| {
                    tracing::debug!(count = list.documents.len(), "Catalog refreshed");
                    *self.documents.write() = list.documents;
                },
                |_| self.notify(NotifyLevel::Error, FETCH_FAILED),
            )
            .await
    }

    /// Upload a document, then refresh the catalog
    ///
    /// # Errors
    ///
    /// Returns an [`UploadRejection`] (after a warning notification) if the
    /// file is refused locally; no network call is made in that case.
    /// Remote failures are reported through the returned [`StartOutcome`].
    pub async fn upload(&self, upload: DocumentUpload) -> Result<StartOutcome, UploadRejection> {
        self.check_upload(&upload)
            .map_err(|rejection| self.reject(rejection))?;

        let outcome = self
            .controller
            .start(
                CatalogChannel::Upload,
                upload,
                |upload| {
                    let api = Arc::clone(&self.api);
                    async move { api.upload_document(&upload).await }
                },
                |receipt: UploadReceipt| {
                    self.notify(
                        NotifyLevel::Success,
                        format!("Document \"{}\" uploaded successfully", receipt.document_name),
                    );
                },
                |_| self.notify(NotifyLevel::Error, UPLOAD_FAILED),
            )
            .await;

        if outcome.succeeded() {
            self.refresh().await;
        }
        Ok(outcome)
    }

    /// Read a file from disk and upload it under its file name
    ///
    /// The file type and size are checked before the contents are read.
    ///
    /// # Errors
    ///
    /// Same as [`DocumentCatalog::upload`], plus
    /// [`UploadRejection::Unreadable`] if the file cannot be read.
    pub async fn upload_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<StartOutcome, UploadRejection> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !file_name.ends_with(SUPPORTED_EXTENSION) {
            return Err(self.reject(UploadRejection::UnsupportedType { file_name }));
        }

        let unreadable = |source| UploadRejection::Unreadable {
            path: path.to_path_buf(),
            source,
        };
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| self.reject(unreadable(e)))?;
        if metadata.len() > self.max_upload_bytes {
            return Err(self.reject(UploadRejection::TooLarge {
                size: metadata.len(),
                limit: self.max_upload_bytes,
            }));
        }
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| self.reject(unreadable(e)))?;

        self.upload(DocumentUpload::new(file_name, bytes)).await
    }

    /// Delete a document after the user confirms, then refresh the catalog
    ///
    /// Returns `None` if the user declined.
    pub async fn remove(&self, id: &DocumentId) -> Option<StartOutcome> {
        if !self.confirm.confirm(DELETE_PROMPT).await {
            tracing::debug!(document_id = %id, "Delete declined");
            return None;
        }

        let outcome = self
            .controller
            .start(
                CatalogChannel::Delete,
                id.clone(),
                |id| {
                    let api = Arc::clone(&self.api);
                    async move { api.delete_document(&id).await }
                },
                |receipt: DeleteReceipt| {
                    tracing::debug!(chunks_deleted = ?receipt.chunks_deleted, "Document deleted");
                    self.notify(NotifyLevel::Success, DELETE_SUCCEEDED);
                },
                |_| self.notify(NotifyLevel::Error, DELETE_FAILED),
            )
            .await;

        if outcome.succeeded() {
            self.refresh().await;
        }
        Some(outcome)
    }

    /// Snapshot of the catalog, in server order
    #[must_use]
    pub fn documents(&self) -> Vec<DocumentRecord> {
        self.documents.read().clone()
    }

    /// Look up a document by id
    #[must_use]
    pub fn get(&self, id: &DocumentId) -> Option<DocumentRecord> {
        self.documents.read().iter().find(|d| &d.id == id).cloned()
    }

    /// Number of known documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether no documents are known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Whether the list is being fetched
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.controller.is_pending(CatalogChannel::List)
    }

    /// Whether an upload is in flight
    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.controller.is_pending(CatalogChannel::Upload)
    }

    /// Whether a delete is in flight
    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.controller.is_pending(CatalogChannel::Delete)
    }

    /// Largest file accepted for upload
    #[must_use]
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    fn check_upload(&self, upload: &DocumentUpload) -> Result<(), UploadRejection> {
        if !upload.file_name.ends_with(SUPPORTED_EXTENSION) {
            return Err(UploadRejection::UnsupportedType {
                file_name: upload.file_name.clone(),
            });
        }

        let size = upload.bytes.len() as u64;
        if size > self.max_upload_bytes {
            return Err(UploadRejection::TooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        let length = upload.document_name.chars().count();
        if length > MAX_DOCUMENT_NAME_CHARS {
            return Err(UploadRejection::NameTooLong { length });
        }

        Ok(())
    }

    fn reject(&self, rejection: UploadRejection) -> UploadRejection {
        tracing::warn!(reason = %rejection, "Upload refused");
        self.notify(NotifyLevel::Warning, rejection.to_string());
        rejection
    }

    fn notify(&self, level: NotifyLevel, message: impl Into<String>) {
        self.notifier.notify(Notification::new(level, message));
    }
}
