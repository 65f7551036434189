//! Document flow errors.
//!
//! Display strings are the messages shown to the user.

use thiserror::Error;

/// Errors from a document repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("document {0} not found")]
    NotFound(String),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the upload and version flows.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Please select a file to upload.")]
    MissingFile,

    #[error("Please enter a Notion link to proceed.")]
    MissingNotionLink,

    #[error("Please enter a valid Notion link to proceed.")]
    InvalidNotionLink,

    #[error("Invalid team id.")]
    InvalidTeam(String),

    #[error("Document not found.")]
    NotFound(String),

    #[error("An error occurred while uploading the file.")]
    Storage(#[source] std::io::Error),

    #[error("An error occurred while saving the document.")]
    Record(#[source] RepositoryError),
}

impl DocumentError {
    /// Validation failures leave no state behind and are the caller's fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DocumentError::MissingFile
                | DocumentError::MissingNotionLink
                | DocumentError::InvalidNotionLink
                | DocumentError::InvalidTeam(_)
        )
    }
}

impl From<RepositoryError> for DocumentError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(id) => DocumentError::NotFound(id),
            other => DocumentError::Record(other),
        }
    }
}
