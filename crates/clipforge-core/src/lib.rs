//! Clipforge Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the storage, processing and command-line crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{log_error, AppError, ErrorMetadata, LogLevel};
pub use models::{
    ArtifactRef, ExecutionResult, FailureKind, GifQuality, TaskKind, TransformRequest,
};
