//! Document subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/teams/{team}/documents/upload        (file bytes)
//! POST /api/teams/{team}/documents/{id}/versions (file bytes)
//! POST /api/teams/{team}/documents               (notion link)
//!     → upload.rs (validation, two-phase save)
//!     → storage.rs (blob write / compensating delete)
//!     → repository.rs (metadata record, share links)
//!     → CreatedDocument { id, link ids, share url }
//! ```
//!
//! # Design Decisions
//! - Storage and repository are trait objects so deployments can swap them
//! - No distributed transaction: compensation instead (see upload.rs)

pub mod error;
pub mod notion;
pub mod repository;
pub mod storage;
pub mod types;
pub mod upload;

pub use error::{DocumentError, RepositoryError};
pub use repository::{DocumentRepository, MemoryDocumentRepository};
pub use storage::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use types::{CreatedDocument, Document, DocumentKind, FileUpload};
pub use upload::UploadService;
