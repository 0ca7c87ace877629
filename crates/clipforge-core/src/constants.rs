//! Fixed values shared across crates.

/// Number of trailing characters of each captured process stream kept in a result.
pub const LOG_TAIL_CHARS: usize = 4000;

/// Container extension written by re-encode and de-identification tasks.
pub const VIDEO_OUTPUT_EXTENSION: &str = "mp4";

/// Container extension written by GIF extraction.
pub const GIF_OUTPUT_EXTENSION: &str = "gif";

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_OUTPUT_DIR: &str = "processed";

/// Default upload ceiling (2 GiB).
pub const DEFAULT_MAX_UPLOAD_SIZE_BYTES: u64 = 2 * 1024 * 1024 * 1024;

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm"];
