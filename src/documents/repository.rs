//! Document metadata records.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::documents::error::RepositoryError;
use crate::documents::types::{
    unix_now, Document, DocumentVersion, NewDocument, NewVersion, ShareLink,
};

/// Metadata store for documents.
///
/// `create` assigns ids, makes the first version primary and generates one share link.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, document: NewDocument) -> Result<Document, RepositoryError>;

    /// Append a version, make it primary and demote the others. Links are untouched.
    async fn add_version(
        &self,
        team_id: &str,
        document_id: &str,
        version: NewVersion,
    ) -> Result<Document, RepositoryError>;

    async fn get(&self, team_id: &str, document_id: &str) -> Result<Option<Document>, RepositoryError>;

    async fn count(&self) -> usize;
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// In-memory repository backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryDocumentRepository {
    documents: DashMap<String, Document>,
}

impl MemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for MemoryDocumentRepository {
    async fn create(&self, document: NewDocument) -> Result<Document, RepositoryError> {
        let now = unix_now();
        let doc = Document {
            id: new_id(),
            team_id: document.team_id,
            name: document.name,
            kind: document.kind,
            num_pages: document.version.num_pages,
            versions: vec![DocumentVersion {
                number: 1,
                file: document.version.file,
                storage_type: document.version.storage_type,
                num_pages: document.version.num_pages,
                is_primary: true,
                created_at: now,
            }],
            links: vec![ShareLink {
                id: new_id(),
                created_at: now,
            }],
            created_at: now,
        };

        self.documents.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn add_version(
        &self,
        team_id: &str,
        document_id: &str,
        version: NewVersion,
    ) -> Result<Document, RepositoryError> {
        let mut entry = self
            .documents
            .get_mut(document_id)
            .filter(|d| d.team_id == team_id)
            .ok_or_else(|| RepositoryError::NotFound(document_id.to_string()))?;

        let number = entry.latest_version_number() + 1;
        for existing in entry.versions.iter_mut() {
            existing.is_primary = false;
        }
        entry.versions.push(DocumentVersion {
            number,
            file: version.file,
            storage_type: version.storage_type,
            num_pages: version.num_pages,
            is_primary: true,
            created_at: unix_now(),
        });
        entry.num_pages = version.num_pages;

        Ok(entry.value().clone())
    }

    async fn get(&self, team_id: &str, document_id: &str) -> Result<Option<Document>, RepositoryError> {
        Ok(self
            .documents
            .get(document_id)
            .filter(|d| d.team_id == team_id)
            .map(|d| d.value().clone()))
    }

    async fn count(&self) -> usize {
        self.documents.len()
    }
}
