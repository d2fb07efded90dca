use crate::config::generation::GenerationConfig;
use crate::config::model::CaptionCueDef;
use crate::effects::composite::{fill_rect, lighten_rect};
use crate::effects::text::CaptionFont;
use crate::foundation::core::{Canvas, Frame, Rgb8};
use crate::foundation::error::{ReelError, ReelResult};
use kurbo::Rect;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

const TRACK_COLOR: Rgb8 = [40, 40, 40];
const TRACK_COVERAGE: u8 = 200;
const PLATE_COLOR: Rgb8 = [0, 0, 0];
const PLATE_COVERAGE: u8 = 160;
const CAPTION_COLOR: Rgb8 = [255, 255, 255];
/// Vertical centre of the caption block, as a fraction of frame height.
const CAPTION_CENTER_Y: f64 = 0.68;

/// A caption shown on the half-open frame interval `[start_frame, end_frame)`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Caption {
    /// Caption text.
    pub text: String,
    /// First frame showing the caption.
    pub start_frame: u64,
    /// First frame no longer showing the caption.
    pub end_frame: u64,
}

impl Caption {
    /// Whether the caption is visible on `frame_index`.
    pub fn is_active(&self, frame_index: u64) -> bool {
        self.start_frame <= frame_index && frame_index < self.end_frame
    }
}

/// Caption and progress-bar compositing.
///
/// Captions are kept in registration order. Every caption active on a frame is drawn, later
/// registrations on top, and the progress bar is always drawn last.
#[derive(Clone, Debug)]
pub struct Overlay {
    config: Arc<GenerationConfig>,
    captions: Vec<Caption>,
    font: CaptionFont,
}

impl Overlay {
    /// Create an empty overlay, loading the configured caption font if any.
    pub fn new(config: Arc<GenerationConfig>) -> ReelResult<Self> {
        let font = CaptionFont::load(config.caption_font(), config.caption_font_px())?;
        if !font.has_font() {
            tracing::warn!("no caption font configured; captions use block glyphs");
        }
        Ok(Self {
            config,
            captions: Vec::new(),
            font,
        })
    }

    /// Register a caption starting at `start_frame` and lasting `caption_duration`.
    pub fn add_caption(&mut self, text: impl Into<String>, start_frame: u64) -> &Caption {
        let end_frame = start_frame.saturating_add(self.config.caption_frames());
        self.captions.push(Caption {
            text: text.into(),
            start_frame,
            end_frame,
        });
        &self.captions[self.captions.len() - 1]
    }

    /// Register caption cues in order.
    pub fn add_cues(&mut self, cues: impl IntoIterator<Item = CaptionCueDef>) {
        for cue in cues {
            self.add_caption(cue.text, cue.start_frame);
        }
    }

    /// Load a JSON array of `{ "text", "start_frame" }` cues and register them.
    ///
    /// Returns the number of captions added.
    pub fn load_captions(&mut self, path: impl AsRef<Path>) -> ReelResult<usize> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::resource(format!("open captions file '{}': {e}", path.display()))
        })?;
        let cues: Vec<CaptionCueDef> = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| ReelError::config(format!("parse captions JSON: {e}")))?;
        let n = cues.len();
        self.add_cues(cues);
        Ok(n)
    }

    /// All registered captions in registration order.
    pub fn captions(&self) -> &[Caption] {
        &self.captions
    }

    /// Captions visible on `frame_index`, in draw order.
    pub fn active_captions(&self, frame_index: u64) -> impl Iterator<Item = &Caption> {
        self.captions.iter().filter(move |c| c.is_active(frame_index))
    }

    /// Draw the progress bar inside the top safe margin.
    ///
    /// `progress` is clamped to `[0, 1]` (NaN counts as 0); the filled length is proportional
    /// to it. The fill lightens the track channel by channel, so total ink never decreases as
    /// progress grows, whatever `progress_color` is.
    pub fn draw_progress_bar(&self, frame: &mut Frame, progress: f64) {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        let track = self.progress_track(frame.canvas());
        fill_rect(frame, track, TRACK_COLOR, TRACK_COVERAGE);

        let filled = (progress * track.width()).round();
        if filled > 0.0 {
            let fill = Rect::new(track.x0, track.y0, track.x0 + filled, track.y1);
            lighten_rect(frame, fill, self.config.progress_color());
        }
    }

    /// Draw every caption active on `frame_index`.
    pub fn draw_captions(&self, frame: &mut Frame, frame_index: u64) {
        for caption in self.active_captions(frame_index) {
            self.draw_caption(frame, &caption.text);
        }
    }

    /// Captions first, then the progress bar on top.
    pub fn composite(&self, frame: &mut Frame, frame_index: u64, progress: f64) -> ReelResult<()> {
        frame.ensure_canvas(self.config.canvas(), "overlay")?;
        self.draw_captions(frame, frame_index);
        self.draw_progress_bar(frame, progress);
        Ok(())
    }

    fn margins(&self, canvas: Canvas) -> (f64, f64) {
        let m = self.config.safe_margin();
        (
            (f64::from(canvas.width) * m).round(),
            (f64::from(canvas.height) * m).round(),
        )
    }

    fn progress_track(&self, canvas: Canvas) -> Rect {
        let (mx, my) = self.margins(canvas);
        let bar_h = f64::from((canvas.height / 120).max(2));
        Rect::new(
            mx,
            my,
            (f64::from(canvas.width) - mx).max(mx),
            my + bar_h,
        )
    }

    fn draw_caption(&self, frame: &mut Frame, text: &str) {
        let canvas = frame.canvas();
        let (mx, my) = self.margins(canvas);
        let pad = f64::from(self.font.line_height()) * 0.3;
        let max_w = (f64::from(canvas.width) - 2.0 * mx - 2.0 * pad).max(1.0);

        let lines = self.font.wrap(text, max_w as f32);
        if lines.is_empty() {
            return;
        }
        let line_h = f64::from(self.font.line_height());
        let block_h = line_h * lines.len() as f64;
        let block_w = lines
            .iter()
            .map(|l| f64::from(self.font.measure(l)))
            .fold(0.0, f64::max);

        let cx = f64::from(canvas.width) * 0.5;
        let bottom_limit = f64::from(canvas.height) - my - pad;
        let top = (f64::from(canvas.height) * CAPTION_CENTER_Y - block_h * 0.5)
            .min(bottom_limit - block_h)
            .max(my + pad);

        let plate = Rect::new(
            cx - block_w * 0.5 - pad,
            top - pad,
            cx + block_w * 0.5 + pad,
            top + block_h + pad,
        );
        fill_rect(frame, plate, PLATE_COLOR, PLATE_COVERAGE);

        let ascent = f64::from(self.font.ascent());
        for (i, line) in lines.iter().enumerate() {
            let w = f64::from(self.font.measure(line));
            let x = cx - w * 0.5;
            let baseline = top + line_h * i as f64 + ascent;
            self.font
                .draw_line(frame, line, x as f32, baseline as f32, CAPTION_COLOR);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/overlay.rs"]
mod tests;
