//! Validated, normalized form of a transform request.

use clipforge_core::{AppError, TaskKind, TransformRequest};

use crate::deid::{parse_deid_args, DeidOption};
use crate::normalize::{normalize_time, resolve_gif_preset, GifPreset, NormalizedTime};

/// Optional input seek and duration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrimBounds {
    pub start: Option<NormalizedTime>,
    pub duration: Option<NormalizedTime>,
}

impl TrimBounds {
    /// Normalize both bounds. A malformed bound is dropped and logged.
    pub fn from_request(request: &TransformRequest) -> Self {
        Self {
            start: normalize_bound("start_time", request.start_time.as_deref()),
            duration: normalize_bound("duration", request.duration.as_deref()),
        }
    }

    /// `-ss`/`-t` flags; placed before `-i` they bound the input read.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(start) = &self.start {
            args.extend_from_slice(&["-ss".to_string(), start.to_string()]);
        }
        if let Some(duration) = &self.duration {
            args.extend_from_slice(&["-t".to_string(), duration.to_string()]);
        }
        args
    }
}

fn normalize_bound(field: &'static str, raw: Option<&str>) -> Option<NormalizedTime> {
    let normalized = normalize_time(raw);
    if normalized.is_none() {
        if let Some(raw) = raw.filter(|r| !r.trim().is_empty()) {
            tracing::warn!(
                field = field,
                raw = %raw,
                "Malformed time bound ignored, processing without it"
            );
        }
    }
    normalized
}

/// Everything needed to build a command, minus file paths.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformPlan {
    ReEncode {
        trim: TrimBounds,
        scale_width: Option<u32>,
        frame_rate: Option<u32>,
        mute: bool,
    },
    GifExtract {
        trim: TrimBounds,
        preset: GifPreset,
    },
    Deidentify {
        options: Vec<DeidOption>,
    },
}

impl TransformPlan {
    /// Normalize and validate a request. Fails only on input errors; nothing is
    /// touched on disk.
    pub fn from_request(request: &TransformRequest) -> Result<Self, AppError> {
        let plan = match request.task {
            TaskKind::ReEncode => TransformPlan::ReEncode {
                trim: TrimBounds::from_request(request),
                scale_width: request.resolution_width.filter(|w| *w > 0),
                frame_rate: request.frame_rate.filter(|f| *f > 0),
                mute: request.mute,
            },
            TaskKind::GifExtract => TransformPlan::GifExtract {
                trim: TrimBounds::from_request(request),
                preset: resolve_gif_preset(
                    request.gif_quality,
                    request.resolution_width,
                    request.frame_rate,
                ),
            },
            TaskKind::Deidentify => TransformPlan::Deidentify {
                options: parse_deid_args(request.deid_args.as_deref())?,
            },
        };
        Ok(plan)
    }

    pub fn task(&self) -> TaskKind {
        match self {
            TransformPlan::ReEncode { .. } => TaskKind::ReEncode,
            TransformPlan::GifExtract { .. } => TaskKind::GifExtract,
            TransformPlan::Deidentify { .. } => TaskKind::Deidentify,
        }
    }

    pub fn output_extension(&self) -> &'static str {
        self.task().output_extension()
    }
}
