//! Two-phase document saves.
//!
//! # Phases
//! ```text
//! file upload:     validate → blob put → record create / add_version → share link
//! notion page:     validate → record create → share link
//! ```
//!
//! # Consistency
//! - The blob write happens at least once per accepted upload
//! - If the record write fails after the blob was written, the blob is deleted
//! - If that delete fails too, the blob is orphaned: logged with its key and
//!   counted, left for out-of-band garbage collection
//! - Validation failures happen before any write

use std::sync::{Arc, LazyLock};

use regex::bytes::Regex;

use crate::documents::error::DocumentError;
use crate::documents::notion;
use crate::documents::repository::DocumentRepository;
use crate::documents::storage::BlobStore;
use crate::documents::types::{
    CreatedDocument, Document, DocumentKind, FileUpload, NewDocument, NewVersion, StoredBlob,
};
use crate::observability::metrics;
use crate::team::is_valid_team_id;

static PDF_PAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/Type\s*/Page(?-u:\b)").unwrap());

/// Count page objects in a PDF. Returns `None` for anything that is not a PDF.
pub fn count_pdf_pages(bytes: &[u8]) -> Option<u32> {
    if !bytes.starts_with(b"%PDF") {
        return None;
    }
    let pages = PDF_PAGE.find_iter(bytes).count() as u32;
    (pages > 0).then_some(pages)
}

fn check_team(team_id: &str) -> Result<(), DocumentError> {
    if is_valid_team_id(team_id) {
        Ok(())
    } else {
        Err(DocumentError::InvalidTeam(team_id.to_string()))
    }
}

/// Runs the upload, new-version and Notion flows against a blob store and a repository.
pub struct UploadService {
    blobs: Arc<dyn BlobStore>,
    documents: Arc<dyn DocumentRepository>,
    base_url: String,
}

impl UploadService {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        documents: Arc<dyn DocumentRepository>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            blobs,
            documents,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Viewer URL for a share link.
    pub fn share_url(&self, link_id: &str) -> String {
        format!("{}/view/{}", self.base_url, link_id)
    }

    pub async fn get(&self, team_id: &str, document_id: &str) -> Result<Document, DocumentError> {
        check_team(team_id)?;
        self.documents
            .get(team_id, document_id)
            .await?
            .ok_or_else(|| DocumentError::NotFound(document_id.to_string()))
    }

    pub async fn count(&self) -> usize {
        self.documents.count().await
    }

    /// Store a new document and generate its first share link.
    pub async fn upload_document(
        &self,
        team_id: &str,
        upload: FileUpload,
    ) -> Result<CreatedDocument, DocumentError> {
        let result = self.upload_document_inner(team_id, upload).await;
        record_outcome("file", &result);
        result
    }

    async fn upload_document_inner(
        &self,
        team_id: &str,
        upload: FileUpload,
    ) -> Result<CreatedDocument, DocumentError> {
        check_team(team_id)?;
        let upload = checked_upload(upload)?;
        let blob = self.store_blob(team_id, &upload).await?;

        let record = NewDocument {
            team_id: team_id.to_string(),
            name: upload.name.clone(),
            kind: DocumentKind::File {
                content_type: upload.content_type.clone(),
            },
            version: new_version(&blob, upload.num_pages),
        };

        match self.documents.create(record).await {
            Ok(doc) => {
                tracing::info!(
                    team_id = %team_id,
                    document_id = %doc.id,
                    key = %blob.key,
                    size = blob.size,
                    "Document uploaded"
                );
                Ok(self.created(&doc))
            }
            Err(e) => {
                self.compensate(&blob).await;
                Err(DocumentError::from(e))
            }
        }
    }

    /// Add a version to an existing document. Its links keep pointing at it.
    pub async fn upload_version(
        &self,
        team_id: &str,
        document_id: &str,
        upload: FileUpload,
    ) -> Result<CreatedDocument, DocumentError> {
        let result = self.upload_version_inner(team_id, document_id, upload).await;
        record_outcome("version", &result);
        result
    }

    async fn upload_version_inner(
        &self,
        team_id: &str,
        document_id: &str,
        upload: FileUpload,
    ) -> Result<CreatedDocument, DocumentError> {
        check_team(team_id)?;
        let upload = checked_upload(upload)?;
        // Fail before the blob write when the target is already known to be missing.
        self.get(team_id, document_id).await?;

        let blob = self.store_blob(team_id, &upload).await?;
        match self
            .documents
            .add_version(team_id, document_id, new_version(&blob, upload.num_pages))
            .await
        {
            Ok(doc) => {
                tracing::info!(
                    team_id = %team_id,
                    document_id = %doc.id,
                    version = doc.latest_version_number(),
                    "Document version uploaded"
                );
                Ok(self.created(&doc))
            }
            Err(e) => {
                self.compensate(&blob).await;
                Err(DocumentError::from(e))
            }
        }
    }

    /// Register a public Notion page as a document.
    pub async fn add_notion_page(
        &self,
        team_id: &str,
        link: Option<&str>,
    ) -> Result<CreatedDocument, DocumentError> {
        let result = self.add_notion_page_inner(team_id, link).await;
        record_outcome("notion", &result);
        result
    }

    async fn add_notion_page_inner(
        &self,
        team_id: &str,
        link: Option<&str>,
    ) -> Result<CreatedDocument, DocumentError> {
        check_team(team_id)?;
        let (url, page_id) = notion::validate_link(link)?;

        let record = NewDocument {
            team_id: team_id.to_string(),
            name: notion::page_name(&url),
            kind: DocumentKind::Notion { url: url.clone() },
            version: NewVersion {
                file: url,
                storage_type: None,
                num_pages: Some(1),
            },
        };

        let doc = self.documents.create(record).await?;
        tracing::info!(team_id = %team_id, document_id = %doc.id, page_id = %page_id, "Notion page added");
        Ok(self.created(&doc))
    }

    async fn store_blob(&self, team_id: &str, upload: &FileUpload) -> Result<StoredBlob, DocumentError> {
        self.blobs
            .put(team_id, &upload.name, upload.bytes.clone())
            .await
            .map_err(|e| {
                tracing::error!(team_id = %team_id, error = %e, "Blob write failed");
                DocumentError::Storage(e)
            })
    }

    async fn compensate(&self, blob: &StoredBlob) {
        match self.blobs.delete(&blob.key).await {
            Ok(()) => tracing::warn!(key = %blob.key, "Record write failed, blob removed"),
            Err(e) => {
                metrics::record_orphaned_blob();
                tracing::warn!(key = %blob.key, error = %e, "Record write failed, blob orphaned");
            }
        }
    }

    fn created(&self, doc: &Document) -> CreatedDocument {
        let link_ids: Vec<String> = doc.links.iter().map(|l| l.id.clone()).collect();
        CreatedDocument {
            document_id: doc.id.clone(),
            name: doc.name.clone(),
            version: doc.latest_version_number(),
            num_pages: doc.num_pages,
            share_url: link_ids.first().map(|id| self.share_url(id)),
            link_ids,
        }
    }
}

fn checked_upload(mut upload: FileUpload) -> Result<FileUpload, DocumentError> {
    if upload.bytes.is_empty() || upload.name.trim().is_empty() {
        return Err(DocumentError::MissingFile);
    }
    if upload.num_pages.is_none() {
        upload.num_pages = count_pdf_pages(&upload.bytes);
    }
    Ok(upload)
}

fn new_version(blob: &StoredBlob, num_pages: Option<u32>) -> NewVersion {
    NewVersion {
        file: blob.key.clone(),
        storage_type: Some(blob.storage_type),
        num_pages,
    }
}

fn record_outcome<T>(kind: &'static str, result: &Result<T, DocumentError>) {
    let outcome = match result {
        Ok(_) => "created",
        Err(e) if e.is_validation() => "rejected",
        Err(_) => "failed",
    };
    metrics::record_upload(kind, outcome);
}
