//! Command compiler - turns a transform plan into a concrete tool invocation.

use anyhow::Result;
use clipforge_core::config::validate_tool_path;
use clipforge_core::ArtifactRef;
use std::path::{Path, PathBuf};

use crate::command::{CompiledCommand, ExternalTool};
use crate::deid::DeidOption;
use crate::normalize::GifPreset;
use crate::plan::{TransformPlan, TrimBounds};

/// Constant-quality, fast-preset H.264 profile used for every re-encode.
const REENCODE_PROFILE: [&str; 6] = ["-c:v", "libx264", "-preset", "veryfast", "-crf", "23"];

#[derive(Debug, Clone)]
pub struct CommandCompiler {
    ffmpeg_path: String,
    deface_path: String,
}

impl CommandCompiler {
    pub fn new(ffmpeg_path: String, deface_path: String) -> Result<Self> {
        validate_tool_path("ffmpeg_path", &ffmpeg_path)?;
        validate_tool_path("deface_path", &deface_path)?;

        Ok(Self {
            ffmpeg_path,
            deface_path,
        })
    }

    pub fn compile(
        &self,
        plan: &TransformPlan,
        input_path: &Path,
        output: ArtifactRef,
        output_path: PathBuf,
    ) -> CompiledCommand {
        let (tool, program, args) = match plan {
            TransformPlan::ReEncode {
                trim,
                scale_width,
                frame_rate,
                mute,
            } => (
                ExternalTool::Transcoder,
                &self.ffmpeg_path,
                reencode_args(
                    trim,
                    *scale_width,
                    *frame_rate,
                    *mute,
                    input_path,
                    &output_path,
                ),
            ),
            TransformPlan::GifExtract { trim, preset } => (
                ExternalTool::Transcoder,
                &self.ffmpeg_path,
                gif_args(trim, preset, input_path, &output_path),
            ),
            TransformPlan::Deidentify { options } => (
                ExternalTool::FaceAnonymizer,
                &self.deface_path,
                deidentify_args(options, input_path, &output_path),
            ),
        };

        CompiledCommand {
            tool,
            program: program.clone(),
            args,
            output,
            output_path,
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn reencode_args(
    trim: &TrimBounds,
    scale_width: Option<u32>,
    frame_rate: Option<u32>,
    mute: bool,
    input_path: &Path,
    output_path: &Path,
) -> Vec<String> {
    let mut args = vec!["-y".to_string()];
    args.extend(trim.to_args());
    args.extend_from_slice(&["-i".to_string(), path_arg(input_path)]);

    if let Some(width) = scale_width {
        args.extend_from_slice(&[
            "-vf".to_string(),
            format!("scale={}:-2:flags=bicubic", width),
        ]);
    }

    if let Some(fps) = frame_rate {
        args.extend_from_slice(&["-r".to_string(), fps.to_string()]);
    }

    if mute {
        args.push("-an".to_string());
    }

    args.extend(REENCODE_PROFILE.iter().map(|s| s.to_string()));
    args.push(path_arg(output_path));
    args
}

fn gif_args(
    trim: &TrimBounds,
    preset: &GifPreset,
    input_path: &Path,
    output_path: &Path,
) -> Vec<String> {
    let mut args = vec!["-y".to_string()];
    args.extend(trim.to_args());
    args.extend_from_slice(&[
        "-i".to_string(),
        path_arg(input_path),
        "-vf".to_string(),
        preset.filter_graph(),
        path_arg(output_path),
    ]);
    args
}

fn deidentify_args(options: &[DeidOption], input_path: &Path, output_path: &Path) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        path_arg(input_path),
        "-o".to_string(),
        path_arg(output_path),
    ];
    args.extend(options.iter().flat_map(DeidOption::to_args));
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_core::{GifQuality, TaskKind, TransformRequest};

    fn compiler() -> CommandCompiler {
        CommandCompiler::new("ffmpeg".to_string(), "deface".to_string()).unwrap()
    }

    fn compile(request: &TransformRequest) -> CompiledCommand {
        let plan = TransformPlan::from_request(request).unwrap();
        compiler().compile(
            &plan,
            Path::new("/data/uploads/in.mp4"),
            ArtifactRef::new("out.mp4"),
            PathBuf::from("/data/processed/out.mp4"),
        )
    }

    fn request(task: TaskKind) -> TransformRequest {
        TransformRequest::new(ArtifactRef::new("in.mp4"), task)
    }

    #[test]
    fn test_rejects_dangerous_tool_path() {
        assert!(CommandCompiler::new("ffmpeg|sh".to_string(), "deface".to_string()).is_err());
        assert!(CommandCompiler::new("ffmpeg".to_string(), "$(deface)".to_string()).is_err());
    }

    #[test]
    fn test_reencode_minimal() {
        let cmd = compile(&request(TaskKind::ReEncode));
        assert_eq!(cmd.program, "ffmpeg");
        assert_eq!(cmd.tool, ExternalTool::Transcoder);
        assert_eq!(
            cmd.args,
            vec![
                "-y",
                "-i",
                "/data/uploads/in.mp4",
                "-c:v",
                "libx264",
                "-preset",
                "veryfast",
                "-crf",
                "23",
                "/data/processed/out.mp4",
            ]
        );
        for absent in ["-vf", "-r", "-an", "-ss", "-t"] {
            assert!(!cmd.contains(absent), "unexpected {}", absent);
        }
    }

    #[test]
    fn test_reencode_trim_precedes_input() {
        let cmd = compile(&request(TaskKind::ReEncode).with_trim(Some("10"), Some("5")));
        let input = cmd.position("-i").unwrap();
        assert!(cmd.position("-ss").unwrap() < input);
        assert!(cmd.position("-t").unwrap() < input);
        assert_eq!(cmd.value_of("-ss"), Some("10"));
        assert_eq!(cmd.value_of("-t"), Some("5"));
    }

    #[test]
    fn test_reencode_all_options() {
        let cmd = compile(
            &request(TaskKind::ReEncode)
                .with_resolution_width(1280)
                .with_frame_rate(30)
                .with_mute(true)
                .with_trim(Some("0:05"), None),
        );
        assert_eq!(cmd.value_of("-vf"), Some("scale=1280:-2:flags=bicubic"));
        assert_eq!(cmd.value_of("-r"), Some("30"));
        assert!(cmd.contains("-an"));
        assert_eq!(cmd.value_of("-ss"), Some("00:00:05"));
        assert!(!cmd.contains("-t"));
        assert!(cmd.position("-vf").unwrap() > cmd.position("-i").unwrap());
        assert_eq!(cmd.args.last().map(String::as_str), Some("/data/processed/out.mp4"));
    }

    #[test]
    fn test_reencode_malformed_trim_dropped() {
        let cmd = compile(&request(TaskKind::ReEncode).with_trim(Some("ten"), Some("1:2:3:4")));
        assert!(!cmd.contains("-ss"));
        assert!(!cmd.contains("-t"));
    }

    #[test]
    fn test_gif_command() {
        let cmd = compile(
            &request(TaskKind::GifExtract)
                .with_gif_quality(GifQuality::Custom)
                .with_resolution_width(200)
                .with_trim(Some("3"), Some("2"))
                .with_mute(true),
        );
        assert_eq!(
            cmd.args,
            vec![
                "-y",
                "-ss",
                "3",
                "-t",
                "2",
                "-i",
                "/data/uploads/in.mp4",
                "-vf",
                "fps=12,scale=200:-2:flags=lanczos,split[s0][s1];[s0]palettegen=stats_mode=diff[p];[s1][p]paletteuse=dither=bayer:bayer_scale=4",
                "/data/processed/out.mp4",
            ]
        );
    }

    #[test]
    fn test_deidentify_command_is_argument_vector() {
        let cmd = compile(
            &request(TaskKind::Deidentify)
                .with_deid_args("--replacewith mosaic --mosaicsize 16")
                .with_trim(Some("10"), None),
        );
        assert_eq!(cmd.program, "deface");
        assert_eq!(cmd.tool, ExternalTool::FaceAnonymizer);
        assert_eq!(
            cmd.args,
            vec![
                "-i",
                "/data/uploads/in.mp4",
                "-o",
                "/data/processed/out.mp4",
                "--replacewith",
                "mosaic",
                "--mosaicsize",
                "16",
            ]
        );
    }

    #[test]
    fn test_deidentify_without_options() {
        let cmd = compile(&request(TaskKind::Deidentify));
        assert_eq!(cmd.args.len(), 4);
    }
}
