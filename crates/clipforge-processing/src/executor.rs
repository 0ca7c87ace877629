//! Process executor - spawns the external tool and interprets its exit.

use async_trait::async_trait;
use clipforge_core::constants::LOG_TAIL_CHARS;
use clipforge_core::{ExecutionResult, FailureKind};
use std::process::Stdio;
use tokio::process::Command;

use crate::command::CompiledCommand;
use crate::traits::CommandExecutor;

/// Last `max` characters of `text`. Counts characters, not bytes.
pub fn tail_chars(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    match text.char_indices().rev().nth(max - 1) {
        Some((idx, _)) => text[idx..].to_string(),
        None => text.to_string(),
    }
}

/// Runs commands as child processes with both output streams captured.
///
/// No timeout and no cancellation: a spawned tool runs until it exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    #[tracing::instrument(skip_all, fields(
        process.executable.name = %command.program,
        tool = %command.tool,
        artifact = %command.output,
        exit_code = tracing::field::Empty,
    ))]
    async fn execute(&self, command: CompiledCommand) -> ExecutionResult {
        let start = std::time::Instant::now();

        let output = match Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(error = %e, "Failed to execute {}", command.program);
                return ExecutionResult::Failure {
                    error: FailureKind::LaunchFailed,
                    detail: tail_chars(
                        &format!("Failed to execute {}: {}", command.program, e),
                        LOG_TAIL_CHARS,
                    ),
                    exit_code: None,
                };
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let exit_code = output.status.code();
        if let Some(code) = exit_code {
            tracing::Span::current().record("exit_code", code);
        }

        if !output.status.success() {
            let detail = if stderr.is_empty() {
                format!("{} exited with {}", command.program, output.status)
            } else {
                tail_chars(&stderr, LOG_TAIL_CHARS)
            };
            tracing::warn!(
                duration_ms = start.elapsed().as_millis(),
                stderr_bytes = output.stderr.len(),
                "External tool failed"
            );
            return ExecutionResult::Failure {
                error: FailureKind::ProcessingFailed,
                detail,
                exit_code,
            };
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            output_path = %command.output_path.display(),
            "External tool completed"
        );

        ExecutionResult::Success {
            output: command.output,
            stdout: tail_chars(&stdout, LOG_TAIL_CHARS),
            stderr: tail_chars(&stderr, LOG_TAIL_CHARS),
        }
    }
}
