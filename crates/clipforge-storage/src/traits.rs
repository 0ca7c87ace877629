//! Artifact store abstraction
//!
//! This module defines the `ArtifactStore` trait that all store backends implement.

use async_trait::async_trait;
use clipforge_core::{AppError, ArtifactRef};
use std::path::PathBuf;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid artifact reference: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => AppError::InputNotFound(name),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Artifact store abstraction
///
/// Inputs and outputs live in separate namespaces. The store only hands out paths;
/// external tools write outputs directly to the path returned by `allocate_output`.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist uploaded bytes under a fresh name that keeps the upload's extension.
    async fn store_upload(&self, original_filename: &str, data: Vec<u8>)
        -> StorageResult<ArtifactRef>;

    /// Resolve an input reference to an existing file.
    async fn resolve_input(&self, artifact: &ArtifactRef) -> StorageResult<PathBuf>;

    /// Reserve a fresh, unique output name. The file itself is not created.
    fn allocate_output(&self, extension: &str) -> StorageResult<(ArtifactRef, PathBuf)>;

    /// Resolve an output reference to an existing file, for delivery.
    async fn resolve_output(&self, artifact: &ArtifactRef) -> StorageResult<PathBuf>;
}
