use crate::config::generation::GenerationConfig;
use crate::effects::composite::lerp_toward_in_place;
use crate::foundation::core::{Frame, Rgb8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{Rng64, value_noise};
use kurbo::{Affine, Vec2};
use std::sync::Arc;

const SALT_JITTER_X: u64 = 0x6A09_E667_F3BC_C908;
const SALT_JITTER_Y: u64 = 0xBB67_AE85_84CA_A73B;
const SALT_GLITCH: u64 = 0x3C6E_F372_FE94_F82B;

/// Frames between jitter noise lattice points.
const JITTER_KNOT_FRAMES: f64 = 5.0;

const FLASH_COLOR: Rgb8 = [255, 255, 255];
const MINOR_FLASH: f32 = 0.35;
const MAJOR_FLASH: f32 = 0.75;
/// Number of horizontal slices a major break cuts the frame into.
const GLITCH_BANDS: u32 = 12;

/// Kind of periodic visual discontinuity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// Short white flash.
    Minor,
    /// Slice displacement plus a strong flash.
    Major,
}

/// Per-frame micro-movement and pattern-break scheduling.
#[derive(Clone, Debug)]
pub struct MotionEffects {
    config: Arc<GenerationConfig>,
    minor_interval: u64,
    major_interval: u64,
}

impl MotionEffects {
    /// Build motion effects; break intervals must be positive.
    pub fn new(config: Arc<GenerationConfig>) -> ReelResult<Self> {
        let minor_interval = config.minor_break_interval();
        let major_interval = config.major_break_interval();
        if minor_interval == 0 || major_interval == 0 {
            return Err(ReelError::config(format!(
                "pattern break intervals must be > 0 (minor={minor_interval}, major={major_interval})"
            )));
        }
        Ok(Self {
            config,
            minor_interval,
            major_interval,
        })
    }

    /// Translation (pixels) and zoom factor applied to `frame_index`.
    pub fn movement_at(&self, frame_index: u64) -> (Vec2, f64) {
        let seed = self.config.seed();
        let amp = self.config.jitter_amplitude_px();
        let t = frame_index as f64 / JITTER_KNOT_FRAMES;
        let offset = Vec2::new(
            amp * value_noise(seed ^ SALT_JITTER_X, t),
            amp * value_noise(seed ^ SALT_JITTER_Y, t),
        );

        let period = self.config.zoom_period_frames();
        let phase = (frame_index % period) as f64 / period as f64;
        let zoom = 1.0
            + self.config.zoom_amplitude() * (1.0 - (std::f64::consts::TAU * phase).cos()) * 0.5;
        (offset, zoom)
    }

    /// Shift and scale the frame by a small, seeded amount.
    ///
    /// The transform zooms around the frame centre and then translates; output pixels are
    /// resampled bilinearly from the source with edge clamping.
    pub fn apply_micro_movement(&self, frame: &Frame, frame_index: u64) -> Frame {
        let (offset, zoom) = self.movement_at(frame_index);
        let center = Vec2::new(f64::from(frame.width) * 0.5, f64::from(frame.height) * 0.5);
        let forward = Affine::translate(center + offset)
            * Affine::scale(zoom)
            * Affine::translate(-center);
        let [a, b, c, d, e, f] = forward.inverse().as_coeffs();

        let w = frame.width as usize;
        let h = frame.height as usize;
        let mut data = vec![0u8; frame.data.len()];
        for y in 0..h {
            let py = y as f64 + 0.5;
            for x in 0..w {
                let px = x as f64 + 0.5;
                let sx = a * px + c * py + e - 0.5;
                let sy = b * px + d * py + f - 0.5;
                let out = sample_bilinear(frame, sx, sy);
                let i = (y * w + x) * 3;
                data[i..i + 3].copy_from_slice(&out);
            }
        }

        Frame {
            width: frame.width,
            height: frame.height,
            data,
        }
    }

    /// Decide whether `frame_index` carries a pattern break.
    ///
    /// Frame 0 never breaks. Multiples of the major interval win over multiples of the minor
    /// interval.
    pub fn should_apply_pattern_break(&self, frame_index: u64) -> Option<BreakKind> {
        if frame_index == 0 {
            None
        } else if frame_index.is_multiple_of(self.major_interval) {
            Some(BreakKind::Major)
        } else if frame_index.is_multiple_of(self.minor_interval) {
            Some(BreakKind::Minor)
        } else {
            None
        }
    }

    /// Apply a one-frame discontinuity of the given kind.
    pub fn apply_pattern_break(&self, frame: &mut Frame, kind: BreakKind, frame_index: u64) {
        match kind {
            BreakKind::Minor => lerp_toward_in_place(frame, FLASH_COLOR, MINOR_FLASH),
            BreakKind::Major => {
                self.glitch_slices(frame, frame_index);
                lerp_toward_in_place(frame, FLASH_COLOR, MAJOR_FLASH);
            }
        }
    }

    /// Displace every other horizontal band by a seeded amount, wrapping around.
    fn glitch_slices(&self, frame: &mut Frame, frame_index: u64) {
        let w = frame.width as usize;
        if w < 2 {
            return;
        }
        let band_h = (frame.height / GLITCH_BANDS).max(1) as usize;
        let max_shift = (w / 10).max(1) as u64;
        let mut rng = Rng64::new(self.config.seed() ^ SALT_GLITCH ^ frame_index);
        let stride = w * 3;

        for (band, rows) in frame.data.chunks_mut(band_h * stride).enumerate() {
            if band % 2 == 0 {
                continue;
            }
            let shift = 1 + (rng.next_u64() % max_shift) as usize;
            for row in rows.chunks_exact_mut(stride) {
                row.rotate_right(shift * 3);
            }
        }
    }
}

fn sample_bilinear(frame: &Frame, sx: f64, sy: f64) -> Rgb8 {
    let max_x = f64::from(frame.width - 1);
    let max_y = f64::from(frame.height - 1);
    let sx = sx.clamp(0.0, max_x);
    let sy = sy.clamp(0.0, max_y);

    let x0 = sx.floor() as u32;
    let y0 = sy.floor() as u32;
    let x1 = (x0 + 1).min(frame.width - 1);
    let y1 = (y0 + 1).min(frame.height - 1);
    let tx = sx - f64::from(x0);
    let ty = sy - f64::from(y0);

    let p00 = frame.pixel(x0, y0);
    let p10 = frame.pixel(x1, y0);
    let p01 = frame.pixel(x0, y1);
    let p11 = frame.pixel(x1, y1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = f64::from(p00[c]) + (f64::from(p10[c]) - f64::from(p00[c])) * tx;
        let bottom = f64::from(p01[c]) + (f64::from(p11[c]) - f64::from(p01[c])) * tx;
        out[c] = (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/motion.rs"]
mod tests;
