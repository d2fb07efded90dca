use crate::config::model::GenerationConfigDef;
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{ReelError, ReelResult};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Validated, immutable generation settings for one run.
///
/// Built once from a [`GenerationConfigDef`] and then shared read-only (usually behind an
/// `Arc`) by every stage. Frame counts are derived at construction with half-away-from-zero
/// rounding and are guaranteed to be at least one.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationConfig {
    canvas: Canvas,
    fps: u32,
    target_duration: f64,
    base_clip_duration: f64,
    seed: u64,
    minor_break_interval: u64,
    major_break_interval: u64,
    caption_duration: f64,
    neon_colors: Vec<Rgb8>,
    jitter_amplitude_px: f64,
    zoom_amplitude: f64,
    zoom_period_frames: u64,
    edge_threshold: u32,
    dark_base_gamma: f64,
    dark_base_ceiling: f64,
    safe_margin: f64,
    progress_color: Rgb8,
    caption_font: Option<PathBuf>,
    caption_font_px: f32,

    total_frames: u64,
    base_frames: u64,
    caption_frames: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::from_checked(GenerationConfigDef::default())
    }
}

impl GenerationConfig {
    /// Validate a definition and derive frame counts.
    pub fn new(def: GenerationConfigDef) -> ReelResult<Self> {
        let canvas = def.output_resolution;
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ReelError::config(format!(
                "output_resolution must be positive, got {}x{}",
                canvas.width, canvas.height
            )));
        }
        if def.fps == 0 {
            return Err(ReelError::config("fps must be > 0"));
        }
        positive("target_duration", def.target_duration)?;
        positive("base_clip_duration", def.base_clip_duration)?;
        positive("caption_duration", def.caption_duration)?;
        if def.base_clip_duration > def.target_duration {
            return Err(ReelError::config(format!(
                "base_clip_duration ({}) must be <= target_duration ({})",
                def.base_clip_duration, def.target_duration
            )));
        }
        if def.minor_break_interval == 0 || def.major_break_interval == 0 {
            return Err(ReelError::config(
                "minor_break_interval and major_break_interval must be > 0",
            ));
        }
        if def.neon_colors.is_empty() {
            return Err(ReelError::config("neon_colors must not be empty"));
        }
        if !def.jitter_amplitude_px.is_finite() || def.jitter_amplitude_px < 0.0 {
            return Err(ReelError::config("jitter_amplitude_px must be finite and >= 0"));
        }
        if !(0.0..0.5).contains(&def.zoom_amplitude) {
            return Err(ReelError::config("zoom_amplitude must be in [0, 0.5)"));
        }
        if def.zoom_period_frames == 0 {
            return Err(ReelError::config("zoom_period_frames must be > 0"));
        }
        if def.edge_threshold == 0 {
            return Err(ReelError::config("edge_threshold must be > 0"));
        }
        if !def.dark_base_gamma.is_finite() || def.dark_base_gamma <= 1.0 {
            return Err(ReelError::config("dark_base_gamma must be finite and > 1"));
        }
        if !(def.dark_base_ceiling > 0.0 && def.dark_base_ceiling < 1.0) {
            return Err(ReelError::config("dark_base_ceiling must be in (0, 1)"));
        }
        if !(0.0..0.4).contains(&def.safe_margin) {
            return Err(ReelError::config("safe_margin must be in [0, 0.4)"));
        }
        if let Some(px) = def.caption_font_px
            && !(px.is_finite() && px > 0.0)
        {
            return Err(ReelError::config("caption_font_px must be finite and > 0"));
        }
        for (name, secs) in [
            ("target_duration", def.target_duration),
            ("base_clip_duration", def.base_clip_duration),
            ("caption_duration", def.caption_duration),
        ] {
            if frames_for(secs, def.fps) == 0 {
                return Err(ReelError::config(format!(
                    "{name} is shorter than half a frame at {} fps",
                    def.fps
                )));
            }
        }

        Ok(Self::from_checked(def))
    }

    /// Assemble from a definition that already passed validation.
    fn from_checked(def: GenerationConfigDef) -> Self {
        let canvas = def.output_resolution;
        Self {
            canvas,
            fps: def.fps,
            target_duration: def.target_duration,
            base_clip_duration: def.base_clip_duration,
            seed: def.seed,
            minor_break_interval: def.minor_break_interval,
            major_break_interval: def.major_break_interval,
            caption_duration: def.caption_duration,
            neon_colors: def.neon_colors,
            jitter_amplitude_px: def.jitter_amplitude_px,
            zoom_amplitude: def.zoom_amplitude,
            zoom_period_frames: def.zoom_period_frames,
            edge_threshold: def.edge_threshold,
            dark_base_gamma: def.dark_base_gamma,
            dark_base_ceiling: def.dark_base_ceiling,
            safe_margin: def.safe_margin,
            progress_color: def.progress_color,
            caption_font: def.caption_font,
            caption_font_px: def
                .caption_font_px
                .unwrap_or_else(|| default_font_px(canvas)),
            total_frames: frames_for(def.target_duration, def.fps),
            base_frames: frames_for(def.base_clip_duration, def.fps),
            caption_frames: frames_for(def.caption_duration, def.fps),
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let def: GenerationConfigDef = serde_json::from_reader(r)
            .map_err(|e| ReelError::config(format!("parse generation config JSON: {e}")))?;
        Self::new(def)
    }

    /// Parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::config(format!("open generation config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Output canvas (`output_resolution`).
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Output frames per second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Final video length in seconds.
    pub fn target_duration(&self) -> f64 {
        self.target_duration
    }

    /// Base clip length in seconds.
    pub fn base_clip_duration(&self) -> f64 {
        self.base_clip_duration
    }

    /// Seed for every stochastic effect.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Frames between minor pattern breaks.
    pub fn minor_break_interval(&self) -> u64 {
        self.minor_break_interval
    }

    /// Frames between major pattern breaks.
    pub fn major_break_interval(&self) -> u64 {
        self.major_break_interval
    }

    /// Caption lifetime in seconds.
    pub fn caption_duration(&self) -> f64 {
        self.caption_duration
    }

    /// Accent palette.
    pub fn neon_colors(&self) -> &[Rgb8] {
        &self.neon_colors
    }

    /// Palette colour for a frame index (`index mod len`).
    pub fn neon_color_for(&self, frame_index: u64) -> Rgb8 {
        let n = self.neon_colors.len() as u64;
        self.neon_colors[(frame_index % n) as usize]
    }

    /// Peak micro-movement translation in pixels.
    pub fn jitter_amplitude_px(&self) -> f64 {
        self.jitter_amplitude_px
    }

    /// Peak zoom pulse, as a fraction of the frame size.
    pub fn zoom_amplitude(&self) -> f64 {
        self.zoom_amplitude
    }

    /// Frames per zoom pulse cycle.
    pub fn zoom_period_frames(&self) -> u64 {
        self.zoom_period_frames
    }

    /// Sobel magnitude above which a pixel counts as an edge.
    pub fn edge_threshold(&self) -> u32 {
        self.edge_threshold
    }

    /// Exponent of the dark-base tone curve.
    pub fn dark_base_gamma(&self) -> f64 {
        self.dark_base_gamma
    }

    /// Output level reached by full-white input under the dark-base curve.
    pub fn dark_base_ceiling(&self) -> f64 {
        self.dark_base_ceiling
    }

    /// Overlay safe margin as a fraction of each frame dimension.
    pub fn safe_margin(&self) -> f64 {
        self.safe_margin
    }

    /// Progress bar fill colour.
    pub fn progress_color(&self) -> Rgb8 {
        self.progress_color
    }

    /// Caption font file, if any. Block glyphs are drawn when unset.
    pub fn caption_font(&self) -> Option<&Path> {
        self.caption_font.as_deref()
    }

    /// Caption font size in pixels.
    pub fn caption_font_px(&self) -> f32 {
        self.caption_font_px
    }

    /// `round(target_duration * fps)`.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// `round(base_clip_duration * fps)`.
    pub fn base_frames(&self) -> u64 {
        self.base_frames
    }

    /// `ceil(total_frames / base_frames)`.
    pub fn tiles_needed(&self) -> u64 {
        self.total_frames.div_ceil(self.base_frames)
    }

    /// `round(caption_duration * fps)`.
    pub fn caption_frames(&self) -> u64 {
        self.caption_frames
    }
}

fn positive(name: &str, v: f64) -> ReelResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(ReelError::config(format!(
            "{name} must be finite and > 0, got {v}"
        )));
    }
    Ok(())
}

fn frames_for(secs: f64, fps: u32) -> u64 {
    (secs * f64::from(fps)).round().max(0.0) as u64
}

fn default_font_px(canvas: Canvas) -> f32 {
    (canvas.width as f32 / 18.0).max(8.0)
}

#[cfg(test)]
#[path = "../../tests/unit/config/generation.rs"]
mod tests;
