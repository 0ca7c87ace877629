//! Transform service - the single entry point for running a transform request.

use anyhow::Context;
use clipforge_core::{log_error, AppError, ArtifactRef, Config, ExecutionResult, TransformRequest};
use clipforge_storage::{ArtifactStore, LocalArtifactStore, StorageError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::command::CompiledCommand;
use crate::compiler::CommandCompiler;
use crate::executor::ProcessExecutor;
use crate::plan::TransformPlan;
use crate::traits::CommandExecutor;
use crate::validator::UploadValidator;

/// Validates requests, compiles them against the artifact store and runs them with
/// at most `max_concurrent` external tools alive at once.
///
/// Cloning is cheap and clones share the same concurrency limit.
#[derive(Clone)]
pub struct TransformService {
    store: Arc<dyn ArtifactStore>,
    compiler: CommandCompiler,
    executor: Arc<dyn CommandExecutor>,
    validator: UploadValidator,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl TransformService {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        compiler: CommandCompiler,
        executor: Arc<dyn CommandExecutor>,
        validator: UploadValidator,
        max_concurrent: usize,
    ) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            store,
            compiler,
            executor,
            validator,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// Build a service backed by local storage and real processes.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = LocalArtifactStore::new(&config.upload_dir, &config.output_dir)
            .await
            .context("Failed to initialize artifact store")?;
        let compiler =
            CommandCompiler::new(config.ffmpeg_path.clone(), config.deface_path.clone())?;
        let validator = UploadValidator::new(
            config.max_upload_size_bytes,
            config.allowed_extensions.clone(),
        );

        tracing::info!(
            upload_dir = %config.upload_dir.display(),
            output_dir = %config.output_dir.display(),
            max_concurrent = config.max_concurrent_transforms,
            "Transform service initialized"
        );

        Ok(Self::new(
            Arc::new(store),
            compiler,
            Arc::new(ProcessExecutor),
            validator,
            config.max_concurrent_transforms,
        ))
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Validate and store uploaded bytes, returning the reference to transform later.
    pub async fn ingest_upload(
        &self,
        original_filename: &str,
        data: Vec<u8>,
    ) -> Result<ArtifactRef, AppError> {
        self.validator.validate_all(original_filename, data.len() as u64)?;
        Ok(self.store.store_upload(original_filename, data).await?)
    }

    /// Resolve, validate and compile a request without running it.
    ///
    /// Every input error surfaces here, so a returned command is always safe to
    /// execute and nothing has been spawned or written yet.
    pub async fn prepare(&self, request: &TransformRequest) -> Result<CompiledCommand, AppError> {
        let input_path = self.store.resolve_input(&request.input).await?;
        let plan = TransformPlan::from_request(request)?;
        let (output, output_path) = self.store.allocate_output(plan.output_extension())?;

        Ok(self.compiler.compile(&plan, &input_path, output, output_path))
    }

    /// Compile and run a request. Input errors are returned as `Err`; anything that
    /// happens once the tool is launched is reported in the `ExecutionResult`.
    #[tracing::instrument(
        skip(self, request),
        fields(input = %request.input, task = %request.task)
    )]
    pub async fn process(&self, request: &TransformRequest) -> Result<ExecutionResult, AppError> {
        let command = self.prepare(request).await.map_err(|e| {
            log_error(&e);
            e
        })?;

        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::Internal(format!("Concurrency limiter closed: {}", e)))?;

        let start = std::time::Instant::now();
        tracing::info!(command = %command.display_line(), "Starting transform");

        let result = self.executor.execute(command).await;

        match &result {
            ExecutionResult::Success { output, .. } => tracing::info!(
                output = %output,
                duration_ms = start.elapsed().as_millis(),
                "Transform completed"
            ),
            ExecutionResult::Failure { error, exit_code, .. } => tracing::warn!(
                error = %error,
                exit_code = ?exit_code,
                duration_ms = start.elapsed().as_millis(),
                "Transform failed"
            ),
        }

        Ok(result)
    }

    /// Path of a finished output, for delivery.
    pub async fn resolve_output(&self, artifact: &ArtifactRef) -> Result<PathBuf, AppError> {
        self.store.resolve_output(artifact).await.map_err(|e| match e {
            StorageError::NotFound(name) => AppError::OutputNotFound(name),
            other => other.into(),
        })
    }
}
