use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clipforge_core::{
    log_error, AppError, ArtifactRef, Config, ExecutionResult, GifQuality, TaskKind,
    TransformRequest,
};
use clipforge_processing::TransformService;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use clipforge_cli::{batch_exit_status, init_tracing, print_json, TransformResponse};

#[derive(Parser, Debug)]
#[command(name = "clipforge")]
#[command(about = "Trim, re-encode, GIF-convert and de-identify video files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a local video file and print its artifact reference
    Upload {
        /// Video file to store
        file: PathBuf,
    },
    /// Transform a previously uploaded artifact
    Process {
        /// Artifact reference returned by `upload`
        #[arg(long, required_unless_present = "json")]
        input: Option<String>,

        #[command(flatten)]
        options: TransformArgs,
    },
    /// Upload a file and transform it in one step
    Run {
        /// Video file to upload
        file: PathBuf,

        #[command(flatten)]
        options: TransformArgs,
    },
    /// Process a JSON array of requests concurrently
    Batch {
        /// File holding a JSON array of request objects
        file: PathBuf,
    },
    /// Copy a processed artifact to a destination path
    Download {
        /// Output artifact reference
        output: String,
        /// Destination file
        dest: PathBuf,
    },
}

#[derive(Args, Debug)]
struct TransformArgs {
    /// Task: vv (re-encode), vgif (GIF) or deid (de-identify). Ignored with --json
    #[arg(long, default_value = "vv")]
    task: String,

    /// Start offset: seconds, MM:SS or HH:MM:SS
    #[arg(long)]
    start_time: Option<String>,

    /// Duration: seconds, MM:SS or HH:MM:SS
    #[arg(long)]
    duration: Option<String>,

    /// Output width in pixels; height keeps the aspect ratio
    #[arg(long)]
    resolution: Option<u32>,

    /// Output frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Drop the audio track (re-encode only)
    #[arg(long)]
    mute: bool,

    /// GIF preset: tiny, small, medium, high or custom
    #[arg(long)]
    gif_quality: Option<String>,

    /// Extra face anonymizer options, e.g. "--thresh 0.3 --replacewith mosaic"
    #[arg(long, allow_hyphen_values = true)]
    deid_args: Option<String>,

    /// Request as a JSON object, in the upload front end's field names
    #[arg(long, value_name = "JSON")]
    json: Option<String>,

    /// Print the compiled command instead of running it
    #[arg(long)]
    dry_run: bool,
}

impl TransformArgs {
    /// Build the request; `input` overrides any file name in `--json`.
    fn to_request(&self, input: Option<ArtifactRef>) -> Result<TransformRequest, AppError> {
        if let Some(body) = &self.json {
            let mut body: serde_json::Value = serde_json::from_str(body)?;
            if let (Some(input), Some(fields)) = (input, body.as_object_mut()) {
                fields.remove("input");
                fields.insert("filename".to_string(), serde_json::json!(input));
            }
            return TransformRequest::from_value(body);
        }

        let input = input.ok_or_else(|| AppError::InvalidInput("missing input".to_string()))?;
        let mut request = TransformRequest::new(input, TaskKind::from_str(&self.task)?)
            .with_trim(self.start_time.as_deref(), self.duration.as_deref())
            .with_mute(self.mute);
        request.resolution_width = self.resolution;
        request.frame_rate = self.fps;
        request.gif_quality = self.gif_quality.as_deref().map(GifQuality::from_label);
        request.deid_args = self.deid_args.clone();
        Ok(request)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.is_production());
    let service = TransformService::from_config(&config).await?;

    match cli.command {
        Command::Upload { file } => {
            let artifact = upload(&service, &file).await?;
            print_json(&serde_json::json!({ "ok": true, "filename": artifact }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Process { input, options } => {
            let response =
                transform(&service, &config, &options, input.map(ArtifactRef::new)).await?;
            exit_with(response)
        }
        Command::Run { file, options } => {
            let artifact = upload(&service, &file).await?;
            let response = transform(&service, &config, &options, Some(artifact)).await?;
            exit_with(response)
        }
        Command::Batch { file } => batch(&service, &config, &file).await,
        Command::Download { output, dest } => {
            let source = service.resolve_output(&ArtifactRef::new(output)).await?;
            let bytes = tokio::fs::copy(&source, &dest)
                .await
                .with_context(|| format!("Failed to copy to {}", dest.display()))?;
            tracing::info!(
                source = %source.display(),
                dest = %dest.display(),
                size_bytes = bytes,
                "Downloaded output"
            );
            print_json(&serde_json::json!({ "ok": true, "path": dest, "size_bytes": bytes }))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn upload(service: &TransformService, file: &Path) -> Result<ArtifactRef> {
    let filename = file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", file.display()))?;
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(service.ingest_upload(filename, data).await?)
}

async fn transform(
    service: &TransformService,
    config: &Config,
    options: &TransformArgs,
    input: Option<ArtifactRef>,
) -> Result<TransformResponse> {
    let request = match options.to_request(input) {
        Ok(request) => request,
        Err(e) => return Ok(reject(&e)),
    };

    if options.dry_run {
        let command = match service.prepare(&request).await {
            Ok(command) => command,
            Err(e) => return Ok(reject(&e)),
        };
        return Ok(TransformResponse::Planned {
            ok: true,
            output: command.output.to_string(),
            command: command.display_line(),
        });
    }

    Ok(respond(service.process(&request).await, config))
}

/// Service errors are logged by the service itself.
fn respond(outcome: Result<ExecutionResult, AppError>, config: &Config) -> TransformResponse {
    match outcome {
        Ok(result) => TransformResponse::from_result(result, &config.output_dir),
        Err(e) => TransformResponse::from_error(&e),
    }
}

/// Response for a request rejected before it reached the service.
fn reject(err: &AppError) -> TransformResponse {
    log_error(err);
    TransformResponse::from_error(err)
}

async fn batch(service: &TransformService, config: &Config, file: &Path) -> Result<ExitCode> {
    let body = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(&body).context("Batch file must be a JSON array")?;

    tracing::info!(
        requests = entries.len(),
        max_concurrent = service.max_concurrent(),
        "Starting batch"
    );

    let responses = join_all(entries.into_iter().map(|entry| async move {
        match TransformRequest::from_value(entry) {
            Ok(request) => respond(service.process(&request).await, config),
            Err(e) => reject(&e),
        }
    }))
    .await;

    print_json(&responses)?;
    Ok(ExitCode::from(batch_exit_status(&responses)))
}

fn exit_with(response: TransformResponse) -> Result<ExitCode> {
    print_json(&response)?;
    Ok(ExitCode::from(response.exit_status()))
}
