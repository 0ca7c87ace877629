//! Parameter normalization: time bounds and GIF presets.

mod gif;
mod time;

pub use gif::{resolve_gif_preset, DitherMode, GifPreset};
pub use time::{normalize_time, NormalizedTime};
