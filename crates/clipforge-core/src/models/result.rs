use serde::Serialize;
use std::fmt;

use super::request::ArtifactRef;

/// Why an external tool run did not produce an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// The tool ran and exited with a non-zero status.
    #[serde(rename = "processing failed")]
    ProcessingFailed,
    /// The tool could not be started at all.
    #[serde(rename = "failed to launch")]
    LaunchFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ProcessingFailed => f.write_str("processing failed"),
            FailureKind::LaunchFailed => f.write_str("failed to launch"),
        }
    }
}

/// Outcome of one external tool run. Log fields hold at most
/// [`LOG_TAIL_CHARS`](crate::constants::LOG_TAIL_CHARS) trailing characters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    Success {
        output: ArtifactRef,
        stdout: String,
        stderr: String,
    },
    Failure {
        error: FailureKind,
        detail: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
    },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    /// Output artifact of a successful run.
    pub fn output(&self) -> Option<&ArtifactRef> {
        match self {
            ExecutionResult::Success { output, .. } => Some(output),
            ExecutionResult::Failure { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serializes_kind_as_message() {
        let result = ExecutionResult::Failure {
            error: FailureKind::ProcessingFailed,
            detail: "boom".to_string(),
            exit_code: Some(1),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["error"], "processing failed");
        assert_eq!(json["exit_code"], 1);
        assert!(!result.is_success());
        assert!(result.output().is_none());
    }

    #[test]
    fn test_success_exposes_output() {
        let result = ExecutionResult::Success {
            output: ArtifactRef::new("out.gif"),
            stdout: String::new(),
            stderr: "frame=10".to_string(),
        };
        assert!(result.is_success());
        assert_eq!(result.output().map(ArtifactRef::as_str), Some("out.gif"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["output"], "out.gif");
    }
}
