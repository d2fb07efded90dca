use crate::foundation::core::{Frame, Rgb8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::blend_u8;
use kurbo::Rect;

/// Integer pixel bounds `[x0, x1) x [y0, y1)`, already clipped to a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelBounds {
    pub(crate) fn is_empty(self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// Round a layout rectangle to pixel bounds clipped to `frame`.
pub(crate) fn pixel_bounds(rect: Rect, frame: &Frame) -> PixelBounds {
    let clip = |v: f64, max: u32| -> u32 { v.round().clamp(0.0, f64::from(max)) as u32 };
    PixelBounds {
        x0: clip(rect.x0, frame.width),
        y0: clip(rect.y0, frame.height),
        x1: clip(rect.x1, frame.width),
        y1: clip(rect.y1, frame.height),
    }
}

/// Blend `color` into every pixel of `rect` with uniform 8-bit coverage.
pub(crate) fn fill_rect(frame: &mut Frame, rect: Rect, color: Rgb8, coverage: u8) {
    let b = pixel_bounds(rect, frame);
    if b.is_empty() || coverage == 0 {
        return;
    }
    let stride = frame.width as usize * 3;
    for y in b.y0..b.y1 {
        let row = y as usize * stride;
        let span = &mut frame.data[row + b.x0 as usize * 3..row + b.x1 as usize * 3];
        for px in span.chunks_exact_mut(3) {
            for c in 0..3 {
                px[c] = blend_u8(px[c], color[c], coverage);
            }
        }
    }
}

/// Per-channel `max(dst, color)` over `rect`; never removes ink.
pub(crate) fn lighten_rect(frame: &mut Frame, rect: Rect, color: Rgb8) {
    let b = pixel_bounds(rect, frame);
    if b.is_empty() {
        return;
    }
    let stride = frame.width as usize * 3;
    for y in b.y0..b.y1 {
        let row = y as usize * stride;
        let span = &mut frame.data[row + b.x0 as usize * 3..row + b.x1 as usize * 3];
        for px in span.chunks_exact_mut(3) {
            for c in 0..3 {
                px[c] = px[c].max(color[c]);
            }
        }
    }
}

/// Blend every pixel of `frame` toward `color` by `t` in `[0, 1]`.
pub(crate) fn lerp_toward_in_place(frame: &mut Frame, color: Rgb8, t: f32) {
    let t = t.clamp(0.0, 1.0);
    let coverage = ((t * 255.0).round() as i32).clamp(0, 255) as u8;
    if coverage == 0 {
        return;
    }
    for px in frame.data.chunks_exact_mut(3) {
        for c in 0..3 {
            px[c] = blend_u8(px[c], color[c], coverage);
        }
    }
}

/// Mean absolute per-channel difference between two equally sized frames.
pub fn mean_abs_diff(a: &Frame, b: &Frame) -> ReelResult<f64> {
    if a.width != b.width || a.height != b.height || a.data.len() != b.data.len() {
        return Err(ReelError::shape(format!(
            "mean_abs_diff expects equal frames, got {}x{} and {}x{}",
            a.width, a.height, b.width, b.height
        )));
    }
    if a.data.is_empty() {
        return Ok(0.0);
    }
    let sum: u64 = a
        .data
        .iter()
        .zip(b.data.iter())
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();
    Ok(sum as f64 / a.data.len() as f64)
}

/// Sum of all channel values, the "ink" of a frame.
pub fn ink(frame: &Frame) -> u64 {
    frame.data.iter().map(|&v| u64::from(v)).sum()
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
