//! Document records and upload payloads.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

/// Where a blob was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    Local,
    Memory,
}

/// Result of the blob phase of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub key: String,
    pub storage_type: StorageType,
    pub size: u64,
}

/// What a document is backed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentKind {
    File { content_type: String },
    Notion { url: String },
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::File { .. } => "file",
            DocumentKind::Notion { .. } => "notion",
        }
    }
}

/// One version of a document's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub number: u32,
    /// Blob key for files, page URL for Notion documents.
    pub file: String,
    pub storage_type: Option<StorageType>,
    pub num_pages: Option<u32>,
    pub is_primary: bool,
    pub created_at: u64,
}

/// A shareable link to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    pub id: String,
    pub created_at: u64,
}

/// A stored document with its versions and links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub team_id: String,
    pub name: String,
    pub kind: DocumentKind,
    pub num_pages: Option<u32>,
    pub versions: Vec<DocumentVersion>,
    pub links: Vec<ShareLink>,
    pub created_at: u64,
}

impl Document {
    pub fn primary_version(&self) -> Option<&DocumentVersion> {
        self.versions.iter().find(|v| v.is_primary)
    }

    pub fn latest_version_number(&self) -> u32 {
        self.versions.iter().map(|v| v.number).max().unwrap_or(0)
    }
}

/// Content of a new version before the repository assigns its number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVersion {
    pub file: String,
    pub storage_type: Option<StorageType>,
    pub num_pages: Option<u32>,
}

/// A document record to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub team_id: String,
    pub name: String,
    pub kind: DocumentKind,
    pub version: NewVersion,
}

/// A file as received from the client.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
    /// Page count reported by the client; detected for PDFs when absent.
    pub num_pages: Option<u32>,
}

/// What the caller gets back after a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDocument {
    pub document_id: String,
    pub name: String,
    pub version: u32,
    pub num_pages: Option<u32>,
    pub link_ids: Vec<String>,
    /// Viewer URL of the first link.
    pub share_url: Option<String>,
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
