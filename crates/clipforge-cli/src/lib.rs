use clipforge_core::{AppError, ErrorMetadata, ExecutionResult};
use serde::Serialize;
use std::path::PathBuf;

/// JSON shape printed for every transform, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TransformResponse {
    Processed {
        ok: bool,
        output: String,
        stdout: String,
        stderr: String,
        download: PathBuf,
    },
    /// Dry run: the command that would have been executed.
    Planned {
        ok: bool,
        output: String,
        command: String,
    },
    Failed {
        ok: bool,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<&'static str>,
        /// HTTP-equivalent status of a rejected request.
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        detail: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        /// Rejected before any tool was launched.
        #[serde(skip)]
        input_error: bool,
    },
}

// Process exit statuses: rejected input is told apart from tool and internal failures.
const EXIT_OK: u8 = 0;
const EXIT_FAILED: u8 = 1;
const EXIT_INPUT_ERROR: u8 = 2;

impl TransformResponse {
    /// `output_dir` is where the store keeps processed artifacts.
    pub fn from_result(result: ExecutionResult, output_dir: &std::path::Path) -> Self {
        match result {
            ExecutionResult::Success {
                output,
                stdout,
                stderr,
            } => TransformResponse::Processed {
                ok: true,
                download: output_dir.join(output.as_str()),
                output: output.to_string(),
                stdout,
                stderr,
            },
            ExecutionResult::Failure {
                error,
                detail,
                exit_code,
            } => TransformResponse::Failed {
                ok: false,
                error: error.to_string(),
                code: None,
                status: None,
                detail,
                exit_code,
                input_error: false,
            },
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        TransformResponse::Failed {
            ok: false,
            error: err.client_message(),
            code: Some(err.error_code()),
            status: Some(err.http_status_code()),
            detail: err.to_string(),
            exit_code: None,
            input_error: err.is_input_error(),
        }
    }

    pub fn is_ok(&self) -> bool {
        !matches!(self, TransformResponse::Failed { .. })
    }

    pub fn exit_status(&self) -> u8 {
        match self {
            TransformResponse::Failed { input_error: true, .. } => EXIT_INPUT_ERROR,
            TransformResponse::Failed { .. } => EXIT_FAILED,
            _ => EXIT_OK,
        }
    }
}

/// A tool or internal failure outranks rejected input.
pub fn batch_exit_status(responses: &[TransformResponse]) -> u8 {
    let statuses: Vec<u8> = responses.iter().map(TransformResponse::exit_status).collect();
    if statuses.contains(&EXIT_FAILED) {
        EXIT_FAILED
    } else if statuses.contains(&EXIT_INPUT_ERROR) {
        EXIT_INPUT_ERROR
    } else {
        EXIT_OK
    }
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays JSON;
/// `json_logs` switches the log lines themselves to JSON.
pub fn init_tracing(json_logs: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr);

    if json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_core::{ArtifactRef, FailureKind};
    use std::path::Path;

    #[test]
    fn success_response_shape() {
        let result = ExecutionResult::Success {
            output: ArtifactRef::new("abc.mp4"),
            stdout: String::new(),
            stderr: "frame=10".to_string(),
        };
        let response = TransformResponse::from_result(result, Path::new("processed"));
        assert!(response.is_ok());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["output"], "abc.mp4");
        assert_eq!(json["stderr"], "frame=10");
        assert_eq!(json["download"], "processed/abc.mp4");
    }

    #[test]
    fn failure_response_shape() {
        let result = ExecutionResult::Failure {
            error: FailureKind::ProcessingFailed,
            detail: "Invalid data found".to_string(),
            exit_code: Some(1),
        };
        let json =
            serde_json::to_value(TransformResponse::from_result(result, Path::new("out"))).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "processing failed");
        assert_eq!(json["detail"], "Invalid data found");
        assert_eq!(json["exit_code"], 1);
        assert!(json.get("code").is_none());
    }

    #[test]
    fn error_response_carries_code() {
        let err = AppError::InputNotFound("x.mp4".to_string());
        let response = TransformResponse::from_error(&err);
        assert!(!response.is_ok());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "input not found");
        assert_eq!(json["code"], "INPUT_NOT_FOUND");
        assert_eq!(json["status"], 404);
        assert!(json.get("exit_code").is_none());
        assert!(json.get("input_error").is_none());
        assert_eq!(response.exit_status(), 2);
    }

    #[test]
    fn internal_error_exit_status() {
        let err = AppError::Storage("disk full".to_string());
        let response = TransformResponse::from_error(&err);
        assert_eq!(response.exit_status(), 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], 500);
    }

    #[test]
    fn batch_exit_status_prefers_failures() {
        let processed = TransformResponse::Planned {
            ok: true,
            output: "a.mp4".to_string(),
            command: "ffmpeg".to_string(),
        };
        let rejected = TransformResponse::from_error(&AppError::UnknownTaskKind("x".to_string()));
        let failed = TransformResponse::from_result(
            ExecutionResult::Failure {
                error: FailureKind::LaunchFailed,
                detail: "no such file".to_string(),
                exit_code: None,
            },
            Path::new("out"),
        );

        assert_eq!(batch_exit_status(&[]), 0);
        assert_eq!(batch_exit_status(&[processed.clone()]), 0);
        assert_eq!(batch_exit_status(&[processed.clone(), rejected.clone()]), 2);
        assert_eq!(batch_exit_status(&[rejected, failed, processed]), 1);
    }
}
