//! Artifact name generation and validation shared by store backends.

use crate::traits::{StorageError, StorageResult};

/// Generate a fresh artifact name: `{uuid-hex}.{extension}`.
pub fn generate_artifact_name(extension: &str) -> String {
    let id = uuid::Uuid::new_v4().simple();
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        id.to_string()
    } else {
        format!("{}.{}", id, extension.to_lowercase())
    }
}

/// Artifact names are flat file names: no separators, no traversal, not empty.
pub fn validate_artifact_name(name: &str) -> StorageResult<()> {
    if name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(StorageError::InvalidKey(format!(
            "Artifact reference is not a plain file name: {:?}",
            name
        )));
    }
    Ok(())
}
