use crate::effects::composite::fill_rect;
use crate::foundation::core::{Frame, Rgb8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::blend_u8;
use kurbo::Rect;
use std::path::Path;

/// Fallback glyph cell geometry, in multiples of the font size.
const BLOCK_ADVANCE: f32 = 0.62;
const BLOCK_WIDTH: f32 = 0.48;
const BLOCK_HEIGHT: f32 = 0.66;

/// Caption glyph source: a real font via `fontdue`, or solid block cells when no font is
/// configured.
#[derive(Clone)]
pub(crate) struct CaptionFont {
    font: Option<fontdue::Font>,
    px: f32,
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionFont")
            .field("loaded", &self.font.is_some())
            .field("px", &self.px)
            .finish()
    }
}

impl CaptionFont {
    pub(crate) fn load(path: Option<&Path>, px: f32) -> ReelResult<Self> {
        let Some(path) = path else {
            return Ok(Self::blocks(px));
        };
        let bytes = std::fs::read(path).map_err(|e| {
            ReelError::resource(format!("read caption font '{}': {e}", path.display()))
        })?;
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(
            |e| ReelError::resource(format!("parse caption font '{}': {e}", path.display())),
        )?;
        Ok(Self {
            font: Some(font),
            px,
        })
    }

    pub(crate) fn blocks(px: f32) -> Self {
        Self { font: None, px }
    }

    pub(crate) fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub(crate) fn line_height(&self) -> f32 {
        match &self.font {
            Some(font) => font
                .horizontal_line_metrics(self.px)
                .map(|m| m.new_line_size)
                .unwrap_or(self.px * 1.2),
            None => self.px * 1.2,
        }
    }

    /// Distance from the top of a line box to its baseline.
    pub(crate) fn ascent(&self) -> f32 {
        match &self.font {
            Some(font) => font
                .horizontal_line_metrics(self.px)
                .map(|m| m.ascent)
                .unwrap_or(self.px * 0.9),
            None => self.px * 0.9,
        }
    }

    pub(crate) fn measure(&self, text: &str) -> f32 {
        match &self.font {
            Some(font) => text
                .chars()
                .map(|ch| font.metrics(ch, self.px).advance_width)
                .sum(),
            None => text.chars().count() as f32 * self.px * BLOCK_ADVANCE,
        }
    }

    /// Greedy word wrap to `max_width`. Words wider than a line get a line of their own.
    pub(crate) fn wrap(&self, text: &str, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if self.measure(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Draw one line with its pen starting at `(x, baseline)`.
    pub(crate) fn draw_line(&self, frame: &mut Frame, text: &str, x: f32, baseline: f32, color: Rgb8) {
        let mut pen = x;
        match &self.font {
            Some(font) => {
                for ch in text.chars() {
                    let (metrics, coverage) = font.rasterize(ch, self.px);
                    let left = pen.round() as i64 + i64::from(metrics.xmin);
                    let top = baseline.round() as i64 - (metrics.height as i64 + i64::from(metrics.ymin));
                    blit_coverage(frame, left, top, metrics.width, metrics.height, &coverage, color);
                    pen += metrics.advance_width;
                }
            }
            None => {
                let advance = self.px * BLOCK_ADVANCE;
                for ch in text.chars() {
                    if !ch.is_whitespace() {
                        let rect = Rect::new(
                            f64::from(pen),
                            f64::from(baseline - self.px * BLOCK_HEIGHT),
                            f64::from(pen + self.px * BLOCK_WIDTH),
                            f64::from(baseline),
                        );
                        fill_rect(frame, rect, color, 255);
                    }
                    pen += advance;
                }
            }
        }
    }
}

fn blit_coverage(
    frame: &mut Frame,
    left: i64,
    top: i64,
    width: usize,
    height: usize,
    coverage: &[u8],
    color: Rgb8,
) {
    let fw = i64::from(frame.width);
    let fh = i64::from(frame.height);
    for gy in 0..height {
        let y = top + gy as i64;
        if y < 0 || y >= fh {
            continue;
        }
        for gx in 0..width {
            let x = left + gx as i64;
            if x < 0 || x >= fw {
                continue;
            }
            let a = coverage[gy * width + gx];
            if a == 0 {
                continue;
            }
            let mut px = frame.pixel(x as u32, y as u32);
            for c in 0..3 {
                px[c] = blend_u8(px[c], color[c], a);
            }
            frame.put_pixel(x as u32, y as u32, px);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/text.rs"]
mod tests;
