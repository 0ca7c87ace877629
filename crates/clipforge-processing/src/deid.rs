//! De-identification options.
//!
//! Free-form option text is never handed to a shell. It is split with shell-word
//! rules (quotes honoured, nothing expanded) and every token must map to one of the
//! options below; the face anonymizer then receives them as separate arguments.

use clipforge_core::AppError;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum DeidArgsError {
    #[error("could not split options: {0}")]
    Tokenize(String),

    #[error("option not allowed: {0}")]
    UnknownOption(String),

    #[error("option {0} requires a value")]
    MissingValue(String),

    #[error("option {0} does not take a value")]
    UnexpectedValue(String),

    #[error("invalid value {value:?} for {option}: {reason}")]
    InvalidValue {
        option: String,
        value: String,
        reason: &'static str,
    },
}

impl From<DeidArgsError> for AppError {
    fn from(err: DeidArgsError) -> Self {
        AppError::DeidArgsRejected(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceMode {
    Blur,
    Solid,
    None,
    Mosaic,
}

impl fmt::Display for ReplaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReplaceMode::Blur => "blur",
            ReplaceMode::Solid => "solid",
            ReplaceMode::None => "none",
            ReplaceMode::Mosaic => "mosaic",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Auto,
    Onnxrt,
    Opencv,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Auto => "auto",
            Backend::Onnxrt => "onnxrt",
            Backend::Opencv => "opencv",
        })
    }
}

/// One allow-listed face anonymizer option.
#[derive(Debug, Clone, PartialEq)]
pub enum DeidOption {
    /// Detection threshold, `0.0..=1.0`.
    Threshold(f32),
    /// Downscale images for detection to `WxH`.
    Scale { width: u32, height: u32 },
    /// Scale factor applied to detected face masks.
    MaskScale(f32),
    ReplaceWith(ReplaceMode),
    /// Mosaic tile width in pixels.
    MosaicSize(u32),
    Backend(Backend),
    Boxes,
    DrawScores,
    KeepAudio,
    KeepMetadata,
}

impl DeidOption {
    /// Canonical argument form.
    pub fn to_args(&self) -> Vec<String> {
        match self {
            DeidOption::Threshold(t) => vec!["--thresh".to_string(), t.to_string()],
            DeidOption::Scale { width, height } => {
                vec!["--scale".to_string(), format!("{}x{}", width, height)]
            }
            DeidOption::MaskScale(m) => vec!["--mask-scale".to_string(), m.to_string()],
            DeidOption::ReplaceWith(mode) => {
                vec!["--replacewith".to_string(), mode.to_string()]
            }
            DeidOption::MosaicSize(size) => vec!["--mosaicsize".to_string(), size.to_string()],
            DeidOption::Backend(backend) => vec!["--backend".to_string(), backend.to_string()],
            DeidOption::Boxes => vec!["--boxes".to_string()],
            DeidOption::DrawScores => vec!["--draw-scores".to_string()],
            DeidOption::KeepAudio => vec!["--keep-audio".to_string()],
            DeidOption::KeepMetadata => vec!["--keep-metadata".to_string()],
        }
    }
}

/// Parse free-form option text into allow-listed options. Absent or blank text
/// yields no options.
pub fn parse_deid_args(raw: Option<&str>) -> Result<Vec<DeidOption>, DeidArgsError> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(Vec::new()),
    };

    let tokens = shell_words::split(raw).map_err(|e| DeidArgsError::Tokenize(e.to_string()))?;
    let mut tokens = tokens.into_iter();
    let mut options = Vec::new();

    while let Some(token) = tokens.next() {
        let (flag, inline_value) = match token.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => {
                (flag.to_string(), Some(value.to_string()))
            }
            _ => (token, None),
        };

        let option = match flag.as_str() {
            "--boxes" | "--draw-scores" | "--keep-audio" | "-k" | "--keep-metadata" => {
                if inline_value.is_some() {
                    return Err(DeidArgsError::UnexpectedValue(flag));
                }
                match flag.as_str() {
                    "--boxes" => DeidOption::Boxes,
                    "--draw-scores" => DeidOption::DrawScores,
                    "--keep-metadata" => DeidOption::KeepMetadata,
                    _ => DeidOption::KeepAudio,
                }
            }
            "--thresh" | "-t" | "--scale" | "-s" | "--mask-scale" | "--replacewith"
            | "--mosaicsize" | "--backend" => {
                let value = match inline_value {
                    Some(value) => value,
                    None => tokens
                        .next()
                        .ok_or_else(|| DeidArgsError::MissingValue(flag.clone()))?,
                };
                parse_valued_option(&flag, &value)?
            }
            _ => return Err(DeidArgsError::UnknownOption(flag)),
        };
        options.push(option);
    }

    Ok(options)
}

fn parse_valued_option(flag: &str, value: &str) -> Result<DeidOption, DeidArgsError> {
    let invalid = |reason: &'static str| DeidArgsError::InvalidValue {
        option: flag.to_string(),
        value: value.to_string(),
        reason,
    };

    match flag {
        "--thresh" | "-t" => {
            let t: f32 = value.parse().map_err(|_| invalid("not a number"))?;
            if !t.is_finite() || !(0.0..=1.0).contains(&t) {
                return Err(invalid("must be between 0 and 1"));
            }
            Ok(DeidOption::Threshold(t))
        }
        "--scale" | "-s" => {
            let (w, h) = value
                .split_once('x')
                .ok_or_else(|| invalid("expected WxH"))?;
            let width: u32 = w.parse().map_err(|_| invalid("expected WxH"))?;
            let height: u32 = h.parse().map_err(|_| invalid("expected WxH"))?;
            if width == 0 || height == 0 {
                return Err(invalid("dimensions must be positive"));
            }
            Ok(DeidOption::Scale { width, height })
        }
        "--mask-scale" => {
            let m: f32 = value.parse().map_err(|_| invalid("not a number"))?;
            if !m.is_finite() || m <= 0.0 {
                return Err(invalid("must be positive"));
            }
            Ok(DeidOption::MaskScale(m))
        }
        "--replacewith" => {
            let mode = match value {
                "blur" => ReplaceMode::Blur,
                "solid" => ReplaceMode::Solid,
                "none" => ReplaceMode::None,
                "mosaic" => ReplaceMode::Mosaic,
                _ => return Err(invalid("expected blur, solid, none or mosaic")),
            };
            Ok(DeidOption::ReplaceWith(mode))
        }
        "--mosaicsize" => {
            let size: u32 = value.parse().map_err(|_| invalid("not an integer"))?;
            if size == 0 {
                return Err(invalid("must be positive"));
            }
            Ok(DeidOption::MosaicSize(size))
        }
        "--backend" => {
            let backend = match value {
                "auto" => Backend::Auto,
                "onnxrt" => Backend::Onnxrt,
                "opencv" => Backend::Opencv,
                _ => return Err(invalid("expected auto, onnxrt or opencv")),
            };
            Ok(DeidOption::Backend(backend))
        }
        _ => Err(DeidArgsError::UnknownOption(flag.to_string())),
    }
}
