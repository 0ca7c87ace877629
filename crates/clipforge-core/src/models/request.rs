use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Opaque handle to a stored artifact (an upload or a processed output).
///
/// The handle is the artifact's file name inside its store directory; callers must
/// not interpret it as a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requested transformation category.
///
/// Wire tags are the short names used by the upload front end (`vv`, `vgif`, `deid`);
/// the long names are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    #[serde(rename = "vv", alias = "reencode")]
    ReEncode,
    #[serde(rename = "vgif", alias = "gif")]
    GifExtract,
    #[serde(rename = "deid", alias = "deidentify")]
    Deidentify,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::ReEncode => "vv",
            TaskKind::GifExtract => "vgif",
            TaskKind::Deidentify => "deid",
        }
    }

    /// Container extension of the artifact this task produces.
    pub fn output_extension(&self) -> &'static str {
        match self {
            TaskKind::GifExtract => crate::constants::GIF_OUTPUT_EXTENSION,
            TaskKind::ReEncode | TaskKind::Deidentify => crate::constants::VIDEO_OUTPUT_EXTENSION,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vv" | "reencode" => Ok(TaskKind::ReEncode),
            "vgif" | "gif" => Ok(TaskKind::GifExtract),
            "deid" | "deidentify" => Ok(TaskKind::Deidentify),
            _ => Err(AppError::UnknownTaskKind(s.to_string())),
        }
    }
}

/// GIF quality label. Unrecognized labels select the custom path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum GifQuality {
    Tiny,
    Small,
    Medium,
    High,
    #[default]
    Custom,
}

impl GifQuality {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "tiny" => GifQuality::Tiny,
            "small" => GifQuality::Small,
            "medium" => GifQuality::Medium,
            "high" => GifQuality::High,
            _ => GifQuality::Custom,
        }
    }
}

impl From<String> for GifQuality {
    fn from(label: String) -> Self {
        GifQuality::from_label(&label)
    }
}

impl FromStr for GifQuality {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(GifQuality::from_label(s))
    }
}

/// A declarative transformation request.
///
/// Time bounds are kept raw; they are normalized when the command is compiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTransformRequest")]
pub struct TransformRequest {
    pub input: ArtifactRef,
    pub task: TaskKind,
    pub start_time: Option<String>,
    pub duration: Option<String>,
    pub resolution_width: Option<u32>,
    pub frame_rate: Option<u32>,
    pub mute: bool,
    pub gif_quality: Option<GifQuality>,
    pub deid_args: Option<String>,
}

impl TransformRequest {
    pub fn new(input: ArtifactRef, task: TaskKind) -> Self {
        Self {
            input,
            task,
            start_time: None,
            duration: None,
            resolution_width: None,
            frame_rate: None,
            mute: false,
            gif_quality: None,
            deid_args: None,
        }
    }

    pub fn with_trim(mut self, start_time: Option<&str>, duration: Option<&str>) -> Self {
        self.start_time = start_time.map(str::to_string);
        self.duration = duration.map(str::to_string);
        self
    }

    pub fn with_resolution_width(mut self, width: u32) -> Self {
        self.resolution_width = Some(width);
        self
    }

    pub fn with_frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = Some(fps);
        self
    }

    pub fn with_mute(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    pub fn with_gif_quality(mut self, quality: GifQuality) -> Self {
        self.gif_quality = Some(quality);
        self
    }

    pub fn with_deid_args(mut self, args: impl Into<String>) -> Self {
        self.deid_args = Some(args.into());
        self
    }

    /// Parse the JSON body sent by the upload front end.
    ///
    /// Malformed JSON is `InvalidInput`; a missing file name or an unknown task tag
    /// are reported with their own variants.
    pub fn from_json(body: &str) -> Result<Self, AppError> {
        let raw: RawTransformRequest = serde_json::from_str(body)?;
        TransformRequest::try_from(raw)
    }

    /// Same as [`TransformRequest::from_json`], for an already parsed body.
    pub fn from_value(body: Value) -> Result<Self, AppError> {
        let raw: RawTransformRequest = serde_json::from_value(body)?;
        TransformRequest::try_from(raw)
    }
}

/// Loose wire shape: `resolution` and `fps` arrive as numbers or digit strings, and
/// the task tag is validated after deserialization so its error stays typed.
#[derive(Debug, Deserialize)]
struct RawTransformRequest {
    #[serde(alias = "input")]
    filename: Option<String>,
    task: Option<String>,
    start_time: Option<Value>,
    duration: Option<Value>,
    #[serde(alias = "resolution_width")]
    resolution: Option<Value>,
    #[serde(alias = "frame_rate")]
    fps: Option<Value>,
    #[serde(default)]
    mute: Option<bool>,
    gif_quality: Option<String>,
    deid_args: Option<String>,
}

impl TryFrom<RawTransformRequest> for TransformRequest {
    type Error = AppError;

    fn try_from(raw: RawTransformRequest) -> Result<Self, Self::Error> {
        let input = raw
            .filename
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::InvalidInput("missing filename".to_string()))?;
        let task = raw
            .task
            .ok_or_else(|| AppError::UnknownTaskKind(String::new()))?
            .parse::<TaskKind>()?;

        Ok(Self {
            input: ArtifactRef::new(input),
            task,
            start_time: raw.start_time.as_ref().and_then(value_to_text),
            duration: raw.duration.as_ref().and_then(value_to_text),
            resolution_width: raw.resolution.as_ref().and_then(positive_int),
            frame_rate: raw.fps.as_ref().and_then(positive_int),
            mute: raw.mute.unwrap_or(false),
            gif_quality: raw.gif_quality.map(GifQuality::from),
            deid_args: raw.deid_args.filter(|args| !args.trim().is_empty()),
        })
    }
}

/// Time bounds may be sent as plain numbers; they are kept as text for normalization.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Positive integer from a JSON number or an all-digit string; anything else is absent.
fn positive_int(value: &Value) -> Option<u32> {
    let parsed = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64)),
        Value::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
            s.parse::<u64>().ok()
        }
        _ => None,
    }?;
    u32::try_from(parsed).ok().filter(|v| *v > 0)
}
