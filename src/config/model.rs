use crate::foundation::core::{Canvas, Rgb8};
use std::path::PathBuf;

/// Default accent palette: cyan, magenta, green, yellow, pink.
pub const DEFAULT_NEON_COLORS: [Rgb8; 5] = [
    [0, 255, 255],
    [255, 0, 255],
    [57, 255, 20],
    [255, 240, 31],
    [255, 20, 147],
];

/// JSON-facing, human-edited generation settings.
///
/// Every field is optional in JSON; missing fields take the defaults below. The values are
/// only checked when converted into a [`crate::GenerationConfig`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfigDef {
    /// Output frame size. Defaults to a 1080x1920 vertical canvas.
    pub output_resolution: Canvas,
    /// Output frames per second.
    pub fps: u32,
    /// Final video length in seconds.
    pub target_duration: f64,
    /// Length of the base clip that gets tiled, in seconds.
    pub base_clip_duration: f64,
    /// Seed for every stochastic effect.
    pub seed: u64,
    /// Frames between minor pattern breaks.
    pub minor_break_interval: u64,
    /// Frames between major pattern breaks.
    pub major_break_interval: u64,
    /// How long each caption stays on screen, in seconds.
    pub caption_duration: f64,
    /// Accent palette, cycled by frame index.
    pub neon_colors: Vec<Rgb8>,
    /// Peak micro-movement translation in pixels.
    pub jitter_amplitude_px: f64,
    /// Peak zoom pulse, as a fraction of the frame size.
    pub zoom_amplitude: f64,
    /// Frames per zoom pulse cycle.
    pub zoom_period_frames: u64,
    /// Sobel magnitude (|gx| + |gy|) above which a pixel counts as an edge.
    pub edge_threshold: u32,
    /// Exponent of the dark-base tone curve.
    pub dark_base_gamma: f64,
    /// Output level reached by full-white input under the dark-base curve.
    pub dark_base_ceiling: f64,
    /// Overlay safe margin as a fraction of each frame dimension.
    pub safe_margin: f64,
    /// Progress bar fill colour.
    pub progress_color: Rgb8,
    /// Optional TTF/OTF font for caption text.
    pub caption_font: Option<PathBuf>,
    /// Caption glyph size in pixels. Defaults to `width / 18`.
    pub caption_font_px: Option<f32>,
}

impl Default for GenerationConfigDef {
    fn default() -> Self {
        Self {
            output_resolution: Canvas {
                width: 1080,
                height: 1920,
            },
            fps: 30,
            target_duration: 27.0,
            base_clip_duration: 3.0,
            seed: 42,
            minor_break_interval: 40,
            major_break_interval: 80,
            caption_duration: 2.5,
            neon_colors: DEFAULT_NEON_COLORS.to_vec(),
            jitter_amplitude_px: 2.5,
            zoom_amplitude: 0.015,
            zoom_period_frames: 90,
            edge_threshold: 96,
            dark_base_gamma: 1.6,
            dark_base_ceiling: 0.94,
            safe_margin: 0.06,
            progress_color: [255, 255, 255],
            caption_font: None,
            caption_font_px: None,
        }
    }
}

/// One caption cue as written in a captions JSON file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptionCueDef {
    /// Caption text.
    pub text: String,
    /// First output frame showing the caption.
    pub start_frame: u64,
}
