//! Configuration module
//!
//! Settings come from the environment (optionally seeded from a `.env` file): where
//! artifacts live, which external tools to run, how many may run at once, and what
//! uploads are accepted.

use std::env;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_SIZE_BYTES, DEFAULT_OUTPUT_DIR,
    DEFAULT_UPLOAD_DIR,
};

const MAX_CONCURRENT_TRANSFORMS: usize = 2;

/// Characters that would let a configured tool path smuggle in a second command.
const DANGEROUS_PATH_CHARS: [char; 11] = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];

#[derive(Clone, Debug)]
pub struct Config {
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub ffmpeg_path: String,
    pub deface_path: String,
    /// Upper bound on simultaneously running external tools.
    pub max_concurrent_transforms: usize,
    pub max_upload_size_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            ffmpeg_path: "ffmpeg".to_string(),
            deface_path: "deface".to_string(),
            max_concurrent_transforms: MAX_CONCURRENT_TRANSFORMS,
            max_upload_size_bytes: DEFAULT_MAX_UPLOAD_SIZE_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let config = Config {
            upload_dir: env::var("CLIPFORGE_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            output_dir: env::var("CLIPFORGE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            deface_path: env::var("DEFACE_PATH").unwrap_or(defaults.deface_path),
            max_concurrent_transforms: env::var("MAX_CONCURRENT_TRANSFORMS")
                .unwrap_or_else(|_| MAX_CONCURRENT_TRANSFORMS.to_string())
                .parse()
                .unwrap_or(MAX_CONCURRENT_TRANSFORMS),
            max_upload_size_bytes: env::var("MAX_UPLOAD_SIZE_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_BYTES),
            allowed_extensions: env::var("ALLOWED_EXTENSIONS")
                .map(|list| {
                    list.split(',')
                        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_extensions),
            environment: env::var("ENVIRONMENT")
                .or_else(|_| env::var("APP_ENV"))
                .unwrap_or(defaults.environment),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_concurrent_transforms == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_TRANSFORMS must be at least 1"
            ));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_EXTENSIONS must name at least one extension"
            ));
        }

        validate_tool_path("FFMPEG_PATH", &self.ffmpeg_path)?;
        validate_tool_path("DEFACE_PATH", &self.deface_path)?;

        if self.upload_dir == self.output_dir {
            return Err(anyhow::anyhow!(
                "CLIPFORGE_UPLOAD_DIR and CLIPFORGE_OUTPUT_DIR must differ"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

/// Reject tool paths that are empty or carry shell metacharacters.
pub fn validate_tool_path(name: &str, path: &str) -> Result<(), anyhow::Error> {
    if path.trim().is_empty() {
        return Err(anyhow::anyhow!("{} must not be empty", name));
    }
    if path.chars().any(|c| DANGEROUS_PATH_CHARS.contains(&c)) {
        return Err(anyhow::anyhow!(
            "Invalid {}: contains dangerous characters",
            name
        ));
    }
    Ok(())
}
