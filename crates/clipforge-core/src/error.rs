//! Error types module
//!
//! `AppError` covers every failure that is reported to a caller as an error value:
//! input problems detected before any external process is spawned, storage
//! failures and internal faults. A tool that runs and exits non-zero is not an
//! `AppError`; it is reported as `ExecutionResult::Failure`.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP-equivalent status code, for front ends that speak HTTP
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INPUT_NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// True when the caller supplied something unusable and nothing was spawned
    fn is_input_error(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown task: {0}")]
    UnknownTaskKind(String),

    #[error("Input not found: {0}")]
    InputNotFound(String),

    #[error("Output not found: {0}")]
    OutputNotFound(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Rejected de-identification option: {0}")]
    DeidArgsRejected(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (status, error_code, input_error, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", true, LogLevel::Debug),
        AppError::UnknownTaskKind(_) => (400, "UNKNOWN_TASK", true, LogLevel::Debug),
        AppError::InputNotFound(_) => (404, "INPUT_NOT_FOUND", true, LogLevel::Debug),
        AppError::OutputNotFound(_) => (404, "OUTPUT_NOT_FOUND", true, LogLevel::Debug),
        AppError::UnsupportedFileType(_) => (400, "UNSUPPORTED_FILE_TYPE", true, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", true, LogLevel::Debug),
        AppError::DeidArgsRejected(_) => (400, "DEID_ARGS_REJECTED", true, LogLevel::Warn),
        AppError::Storage(_) => (500, "STORAGE_ERROR", false, LogLevel::Error),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", false, LogLevel::Error)
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_input_error(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::UnknownTaskKind(ref tag) => format!("unknown task: {}", tag),
            AppError::InputNotFound(_) => "input not found".to_string(),
            AppError::OutputNotFound(_) => "output not found".to_string(),
            AppError::UnsupportedFileType(_) => "unsupported file type".to_string(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::DeidArgsRejected(ref msg) => msg.clone(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal error".to_string()
            }
        }
    }
}

/// Emit `error` at the level its metadata declares.
pub fn log_error(error: &AppError) {
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_code = error_code, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_code = error_code, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_code = error_code, "Error occurred");
        }
    }
}
