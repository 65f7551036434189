//! Blob storage.
//!
//! # Responsibilities
//! - Write uploaded bytes under a fresh, unguessable key
//! - Delete a blob by key (compensation after a failed record write)
//!
//! # Design Decisions
//! - Keys are `{team_id}/{uuid}/{file_name}`; the uuid keeps re-uploads apart
//! - File names are sanitized; keys never contain `..`
//! - Writes are not deduplicated: a retried upload writes a second blob

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use dashmap::DashMap;
use uuid::Uuid;

use crate::documents::types::{StorageType, StoredBlob};

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, team_id: &str, file_name: &str, bytes: Bytes) -> std::io::Result<StoredBlob>;

    async fn delete(&self, key: &str) -> std::io::Result<()>;
}

/// Replace anything outside `[A-Za-z0-9._-]` and strip leading dots.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

fn new_key(team_id: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}",
        team_id,
        Uuid::new_v4().simple(),
        sanitize_file_name(file_name)
    )
}

/// Stores blobs as files below a root directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> std::io::Result<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid blob key {key:?}"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, team_id: &str, file_name: &str, bytes: Bytes) -> std::io::Result<StoredBlob> {
        let key = new_key(team_id, file_name);
        let path = self.path_for(&key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(key = %key, size = bytes.len(), "Blob written");
        Ok(StoredBlob {
            key,
            storage_type: StorageType::Local,
            size: bytes.len() as u64,
        })
    }

    async fn delete(&self, key: &str) -> std::io::Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::remove_file(&path).await?;
        if let Some(parent) = path.parent() {
            // The per-upload directory is empty now; ignore races with other writers.
            let _ = tokio::fs::remove_dir(parent).await;
        }
        Ok(())
    }
}

/// Keeps blobs in memory. Useful for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Bytes>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.blobs.get(key).map(|b| b.value().clone())
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, team_id: &str, file_name: &str, bytes: Bytes) -> std::io::Result<StoredBlob> {
        let key = new_key(team_id, file_name);
        let size = bytes.len() as u64;
        self.blobs.insert(key.clone(), bytes);
        Ok(StoredBlob {
            key,
            storage_type: StorageType::Memory,
            size,
        })
    }

    async fn delete(&self, key: &str) -> std::io::Result<()> {
        match self.blobs.remove(key) {
            Some(_) => Ok(()),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("blob {key:?} not found"),
            )),
        }
    }
}
