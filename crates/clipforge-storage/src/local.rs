use crate::keys::{generate_artifact_name, validate_artifact_name};
use crate::traits::{ArtifactStore, StorageError, StorageResult};
use async_trait::async_trait;
use clipforge_core::ArtifactRef;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem artifact store
#[derive(Clone, Debug)]
pub struct LocalArtifactStore {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl LocalArtifactStore {
    /// Create a new LocalArtifactStore, creating both directories if needed.
    ///
    /// # Arguments
    /// * `upload_dir` - Directory holding uploaded inputs (e.g., "uploads")
    /// * `output_dir` - Directory receiving processed outputs (e.g., "processed")
    pub async fn new(
        upload_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> StorageResult<Self> {
        let upload_dir = upload_dir.into();
        let output_dir = output_dir.into();

        for dir in [&upload_dir, &output_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(LocalArtifactStore {
            upload_dir,
            output_dir,
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Convert an artifact name to a path inside `base`, refusing anything that would
    /// resolve outside it.
    fn name_to_path(base: &Path, name: &str) -> StorageResult<PathBuf> {
        validate_artifact_name(name)?;

        let path = base.join(name);

        let base_canonical = base.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Artifact reference resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    async fn existing(base: &Path, artifact: &ArtifactRef) -> StorageResult<PathBuf> {
        let path = Self::name_to_path(base, artifact.as_str())?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(artifact.to_string()));
        }
        Ok(path)
    }
}

/// Lowercased extension of a client-supplied file name, if it has one.
fn upload_extension(original_filename: &str) -> Option<String> {
    original_filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn store_upload(
        &self,
        original_filename: &str,
        data: Vec<u8>,
    ) -> StorageResult<ArtifactRef> {
        let extension = upload_extension(original_filename).unwrap_or_default();
        let name = generate_artifact_name(&extension);
        let path = Self::name_to_path(&self.upload_dir, &name)?;
        let size = data.len();

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            artifact = %name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload stored"
        );

        Ok(ArtifactRef::new(name))
    }

    async fn resolve_input(&self, artifact: &ArtifactRef) -> StorageResult<PathBuf> {
        Self::existing(&self.upload_dir, artifact).await
    }

    fn allocate_output(&self, extension: &str) -> StorageResult<(ArtifactRef, PathBuf)> {
        let name = generate_artifact_name(extension);
        let path = Self::name_to_path(&self.output_dir, &name)?;
        Ok((ArtifactRef::new(name), path))
    }

    async fn resolve_output(&self, artifact: &ArtifactRef) -> StorageResult<PathBuf> {
        Self::existing(&self.output_dir, artifact).await
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    async fn test_store(root: &Path) -> LocalArtifactStore {
        LocalArtifactStore::new(root.join("uploads"), root.join("processed"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_upload_then_resolve() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        let artifact = store
            .store_upload("Holiday Clip.MOV", b"fake video".to_vec())
            .await
            .unwrap();

        assert!(artifact.as_str().ends_with(".mov"));
        let path = store.resolve_input(&artifact).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"fake video");
    }

    #[tokio::test]
    async fn test_resolve_missing_input() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        let result = store.resolve_input(&ArtifactRef::new("missing.mp4")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        let result = store
            .resolve_input(&ArtifactRef::new("../../../etc/passwd"))
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store.resolve_output(&ArtifactRef::new("/etc/passwd")).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_allocate_output_does_not_create_file() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        let (artifact, path) = store.allocate_output("gif").unwrap();
        assert!(artifact.as_str().ends_with(".gif"));
        assert!(path.starts_with(store.output_dir()));
        assert!(!path.exists());

        let result = store.resolve_output(&artifact).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_allocated_outputs_are_unique() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        let names: HashSet<String> = (0..500)
            .map(|_| store.allocate_output("mp4").unwrap().0.to_string())
            .collect();
        assert_eq!(names.len(), 500);
    }

    #[tokio::test]
    async fn test_inputs_and_outputs_are_separate_namespaces() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        let artifact = store.store_upload("a.mp4", b"x".to_vec()).await.unwrap();
        let result = store.resolve_output(&artifact).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_upload_extension() {
        assert_eq!(upload_extension("clip.WebM").as_deref(), Some("webm"));
        assert_eq!(upload_extension("noext"), None);
        assert_eq!(upload_extension("trailing."), None);
        assert_eq!(upload_extension("weird.mp4;rm"), None);
    }
}
