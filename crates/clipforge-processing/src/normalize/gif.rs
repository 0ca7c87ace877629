use clipforge_core::GifQuality;
use std::fmt;

const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_FPS: u32 = 12;
const DEFAULT_BAYER_SCALE: i32 = 4;
const MAX_BAYER_SCALE: i32 = 5;

/// Palette dithering algorithm passed to ffmpeg's `paletteuse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DitherMode {
    Bayer,
}

impl fmt::Display for DitherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DitherMode::Bayer => f.write_str("bayer"),
        }
    }
}

/// Concrete GIF encode parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifPreset {
    pub width: u32,
    pub fps: u32,
    pub dither: DitherMode,
    /// Always within `0..=5`.
    pub bayer_scale: u8,
}

impl GifPreset {
    fn new(width: u32, fps: u32, dither: DitherMode, bayer_scale: i32) -> Self {
        Self {
            width,
            fps,
            dither,
            bayer_scale: bayer_scale.clamp(0, MAX_BAYER_SCALE) as u8,
        }
    }

    /// Single-pass palette filter graph: set the frame rate, scale keeping the aspect
    /// ratio, then split into palette generation and palette application.
    pub fn filter_graph(&self) -> String {
        format!(
            "fps={},scale={}:-2:flags=lanczos,split[s0][s1];[s0]palettegen=stats_mode=diff[p];[s1][p]paletteuse=dither={}:bayer_scale={}",
            self.fps, self.width, self.dither, self.bayer_scale
        )
    }
}

/// Resolve the GIF preset for a quality label.
///
/// Named presets win outright and ignore the overrides. The custom path (also taken
/// for an absent label) uses the overrides when they are positive.
pub fn resolve_gif_preset(
    quality: Option<GifQuality>,
    width_override: Option<u32>,
    fps_override: Option<u32>,
) -> GifPreset {
    match quality.unwrap_or_default() {
        GifQuality::Tiny => GifPreset::new(360, 8, DitherMode::Bayer, 5),
        GifQuality::Small => GifPreset::new(480, 10, DitherMode::Bayer, 4),
        GifQuality::Medium => GifPreset::new(640, 12, DitherMode::Bayer, 3),
        GifQuality::High => GifPreset::new(720, 15, DitherMode::Bayer, 2),
        GifQuality::Custom => GifPreset::new(
            width_override.filter(|w| *w > 0).unwrap_or(DEFAULT_WIDTH),
            fps_override.filter(|f| *f > 0).unwrap_or(DEFAULT_FPS),
            DitherMode::Bayer,
            DEFAULT_BAYER_SCALE,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_preset_ignores_overrides() {
        for (w, f) in [(None, None), (Some(200), Some(30)), (Some(4000), None)] {
            let preset = resolve_gif_preset(Some(GifQuality::from_label("high")), w, f);
            assert_eq!(preset.width, 720);
            assert_eq!(preset.fps, 15);
            assert_eq!(preset.dither, DitherMode::Bayer);
            assert_eq!(preset.bayer_scale, 2);
        }
    }

    #[test]
    fn test_preset_table() {
        let tiny = resolve_gif_preset(Some(GifQuality::Tiny), None, None);
        assert_eq!((tiny.width, tiny.fps, tiny.bayer_scale), (360, 8, 5));
        let small = resolve_gif_preset(Some(GifQuality::Small), None, None);
        assert_eq!((small.width, small.fps, small.bayer_scale), (480, 10, 4));
        let medium = resolve_gif_preset(Some(GifQuality::Medium), None, None);
        assert_eq!((medium.width, medium.fps, medium.bayer_scale), (640, 12, 3));
    }

    #[test]
    fn test_custom_uses_width_override_and_default_fps() {
        let preset = resolve_gif_preset(Some(GifQuality::Custom), Some(200), None);
        assert_eq!(preset.width, 200);
        assert_eq!(preset.fps, 12);
        assert_eq!(preset.bayer_scale, 4);
    }

    #[test]
    fn test_unknown_label_and_absent_label_take_custom_path() {
        let unknown = resolve_gif_preset(Some(GifQuality::from_label("ultra")), None, Some(24));
        assert_eq!((unknown.width, unknown.fps), (640, 24));
        let absent = resolve_gif_preset(None, Some(0), Some(0));
        assert_eq!((absent.width, absent.fps), (640, 12));
    }

    #[test]
    fn test_bayer_scale_clamped() {
        assert_eq!(GifPreset::new(1, 1, DitherMode::Bayer, 9).bayer_scale, 5);
        assert_eq!(GifPreset::new(1, 1, DitherMode::Bayer, -3).bayer_scale, 0);
    }

    #[test]
    fn test_filter_graph() {
        let preset = resolve_gif_preset(Some(GifQuality::High), None, None);
        assert_eq!(
            preset.filter_graph(),
            "fps=15,scale=720:-2:flags=lanczos,split[s0][s1];[s0]palettegen=stats_mode=diff[p];[s1][p]paletteuse=dither=bayer:bayer_scale=2"
        );
    }
}
