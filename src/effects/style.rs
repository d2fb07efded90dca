use crate::config::generation::GenerationConfig;
use crate::foundation::core::{EdgeMask, Frame};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{blend_u8, luma601};
use std::sync::Arc;

/// Coverage used when painting neon accents over detected edges.
const ACCENT_COVERAGE: u8 = 230;

/// High-contrast "dark base, neon edge" look.
///
/// Midtones are pushed toward black with a power curve while strong luminance gradients are
/// repainted in the palette colour of the current frame.
#[derive(Clone, Debug)]
pub struct VisualStyle {
    config: Arc<GenerationConfig>,
    lut: [u8; 256],
}

impl VisualStyle {
    /// Build the style and its tone-curve lookup table.
    pub fn new(config: Arc<GenerationConfig>) -> Self {
        let lut = dark_base_lut(config.dark_base_gamma(), config.dark_base_ceiling());
        Self { config, lut }
    }

    /// Darken midtones while keeping highlight separation.
    ///
    /// `out = floor(255 * ceiling * (v / 255) ^ gamma)` per channel. With `gamma > 1` and
    /// `ceiling < 1` every non-zero channel strictly decreases and zero stays zero.
    pub fn apply_dark_base(&self, frame: &Frame) -> Frame {
        let data = frame.data.iter().map(|&v| self.lut[v as usize]).collect();
        Frame {
            width: frame.width,
            height: frame.height,
            data,
        }
    }

    /// Sobel edge detection on Rec.601 luma with clamped borders.
    ///
    /// A pixel is an edge when `|gx| + |gy|` exceeds the configured threshold, so a uniform
    /// frame always yields an empty mask.
    pub fn detect_edges(&self, frame: &Frame) -> EdgeMask {
        let w = frame.width as usize;
        let h = frame.height as usize;
        let luma: Vec<i32> = frame
            .data
            .chunks_exact(3)
            .map(|px| luma601([px[0], px[1], px[2]]))
            .collect();
        let threshold = self.config.edge_threshold() as i32;

        let mut data = vec![0u8; w * h];
        if w == 0 || h == 0 {
            return EdgeMask {
                width: frame.width,
                height: frame.height,
                data,
            };
        }

        for y in 0..h {
            let ym = y.saturating_sub(1);
            let yp = (y + 1).min(h - 1);
            for x in 0..w {
                let xm = x.saturating_sub(1);
                let xp = (x + 1).min(w - 1);
                let l = |xx: usize, yy: usize| luma[yy * w + xx];

                let gx = (l(xp, ym) + 2 * l(xp, y) + l(xp, yp)) - (l(xm, ym) + 2 * l(xm, y) + l(xm, yp));
                let gy = (l(xm, yp) + 2 * l(x, yp) + l(xp, yp)) - (l(xm, ym) + 2 * l(x, ym) + l(xp, ym));
                if gx.abs() + gy.abs() > threshold {
                    data[y * w + x] = 255;
                }
            }
        }

        EdgeMask {
            width: frame.width,
            height: frame.height,
            data,
        }
    }

    /// Paint mask pixels in `neon_colors[frame_index mod len]`.
    pub fn accent_edges(
        &self,
        frame: &mut Frame,
        mask: &EdgeMask,
        frame_index: u64,
    ) -> ReelResult<()> {
        if mask.width != frame.width
            || mask.height != frame.height
            || mask.data.len() * 3 != frame.data.len()
        {
            return Err(ReelError::shape(format!(
                "edge mask {}x{} does not match frame {}x{}",
                mask.width, mask.height, frame.width, frame.height
            )));
        }
        let color = self.config.neon_color_for(frame_index);
        for (px, &m) in frame.data.chunks_exact_mut(3).zip(mask.data.iter()) {
            if m == 0 {
                continue;
            }
            for c in 0..3 {
                px[c] = blend_u8(px[c], color[c], ACCENT_COVERAGE);
            }
        }
        Ok(())
    }

    /// Edges from the incoming frame, then dark base, then neon accents.
    pub fn stylize(&self, frame: &Frame, frame_index: u64) -> ReelResult<Frame> {
        let mask = self.detect_edges(frame);
        let mut out = self.apply_dark_base(frame);
        self.accent_edges(&mut out, &mask, frame_index)?;
        Ok(out)
    }
}

fn dark_base_lut(gamma: f64, ceiling: f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (v, slot) in lut.iter_mut().enumerate() {
        let x = v as f64 / 255.0;
        let y = (255.0 * ceiling * x.powf(gamma)).floor();
        *slot = y.clamp(0.0, 255.0) as u8;
    }
    lut
}

#[cfg(test)]
#[path = "../../tests/unit/effects/style.rs"]
mod tests;
