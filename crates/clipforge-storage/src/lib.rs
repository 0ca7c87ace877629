//! Clipforge Storage Library
//!
//! Artifact storage for uploaded inputs and processed outputs.
//!
//! # Artifact names
//!
//! Every stored artifact is named `{uuid-hex}.{ext}` and lives flat inside either the
//! upload directory or the output directory. Names are generated per call, so two
//! requests never share an output path. References containing path separators or
//! `..` are rejected before touching the filesystem.

pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-local")]
pub use local::LocalArtifactStore;
pub use traits::{ArtifactStore, StorageError, StorageResult};
