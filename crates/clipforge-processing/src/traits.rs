//! Execution seam between command compilation and process spawning.

use async_trait::async_trait;
use clipforge_core::ExecutionResult;

use crate::command::CompiledCommand;

/// Runs a compiled command to completion and packages the outcome.
///
/// Implementations never return an error: launch failures and non-zero exits are
/// both `ExecutionResult::Failure`.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: CompiledCommand) -> ExecutionResult;
}
