use crate::config::generation::GenerationConfig;
use crate::foundation::core::{Canvas, Frame, Rgb8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::Rng64;
use std::path::{Path, PathBuf};

/// Provider of raw base-clip frames.
///
/// This is the seam for model-backed generators (image or video synthesis): anything that can
/// turn `(index, total_base_frames)` into a frame of the configured resolution. Implementations
/// may be slow or fallible but must be deterministic for a given configuration.
pub trait FrameSource: Send + Sync {
    /// Produce base frame `index` of `total_base_frames`.
    fn frame(&self, index: u64, total_base_frames: u64) -> ReelResult<Frame>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

const SALT_ORBS: u64 = 0xA54F_F53A_5F1D_36F1;
const ORB_COUNT: usize = 5;
/// Number of posterization levels; the level boundaries are the hard edges the neon style
/// picks up.
const BANDS: f64 = 4.0;
const BG_TOP: Rgb8 = [6, 4, 18];
const BG_BOTTOM: Rgb8 = [22, 8, 38];

#[derive(Clone, Copy, Debug)]
struct Orb {
    cx: f64,
    cy: f64,
    orbit: f64,
    phase: f64,
    radius: f64,
    color: Rgb8,
}

/// Seeded procedural "abstract pattern" frames.
///
/// A dark vertical gradient with palette-coloured orbs drifting on circular paths. Each orb
/// completes exactly one orbit over the base clip, so the clip loops without a seam.
#[derive(Clone, Debug)]
pub struct AbstractPatternSource {
    canvas: Canvas,
    orbs: Vec<Orb>,
}

impl AbstractPatternSource {
    /// Derive orb layout from the configured seed and palette.
    pub fn new(config: &GenerationConfig) -> Self {
        let mut rng = Rng64::new(config.seed() ^ SALT_ORBS);
        let orbs = (0..ORB_COUNT)
            .map(|i| Orb {
                cx: 0.2 + 0.6 * rng.next_f64_01(),
                cy: 0.15 + 0.7 * rng.next_f64_01(),
                orbit: 0.05 + 0.12 * rng.next_f64_01(),
                phase: std::f64::consts::TAU * rng.next_f64_01(),
                radius: 0.18 + 0.2 * rng.next_f64_01(),
                color: config.neon_color_for(i as u64),
            })
            .collect();
        Self {
            canvas: config.canvas(),
            orbs,
        }
    }

    /// Render base frame `index` of a `total_base_frames` loop.
    pub fn generate_abstract_frame(&self, index: u64, total_base_frames: u64) -> ReelResult<Frame> {
        if total_base_frames == 0 {
            return Err(ReelError::config("total_base_frames must be > 0"));
        }
        let w = self.canvas.width as usize;
        let h = self.canvas.height as usize;
        let scale = f64::from(self.canvas.width.min(self.canvas.height));
        let t = std::f64::consts::TAU * (index % total_base_frames) as f64 / total_base_frames as f64;

        // Orb centres and radii in pixels for this frame.
        let placed: Vec<(f64, f64, f64, Rgb8)> = self
            .orbs
            .iter()
            .map(|o| {
                let x = o.cx * w as f64 + o.orbit * scale * (t + o.phase).cos();
                let y = o.cy * h as f64 + o.orbit * scale * (t + o.phase).sin();
                let r = o.radius * scale;
                (x, y, r * r, o.color)
            })
            .collect();

        let mut data = vec![0u8; self.canvas.rgb_len()];
        for y in 0..h {
            let v = if h > 1 { y as f64 / (h - 1) as f64 } else { 0.0 };
            let bg = [
                lerp_channel(BG_TOP[0], BG_BOTTOM[0], v),
                lerp_channel(BG_TOP[1], BG_BOTTOM[1], v),
                lerp_channel(BG_TOP[2], BG_BOTTOM[2], v),
            ];
            let py = y as f64 + 0.5;
            for x in 0..w {
                let px = x as f64 + 0.5;
                let mut field = 0.0;
                let mut mix = [0.0f64; 3];
                for &(ox, oy, r2, color) in &placed {
                    let d2 = (px - ox) * (px - ox) + (py - oy) * (py - oy);
                    if d2 >= r2 {
                        continue;
                    }
                    let k = 1.0 - d2 / r2;
                    let wgt = k * k;
                    field += wgt;
                    for c in 0..3 {
                        mix[c] += wgt * f64::from(color[c]);
                    }
                }

                let i = (y * w + x) * 3;
                if field <= 0.0 {
                    data[i..i + 3].copy_from_slice(&bg);
                    continue;
                }
                let level = (field.min(1.0) * BANDS).floor() / BANDS;
                for c in 0..3 {
                    let tint = mix[c] / field;
                    let out = f64::from(bg[c]) + (tint - f64::from(bg[c])) * level;
                    data[i + c] = out.round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        Frame::from_raw(self.canvas.width, self.canvas.height, data)
    }
}

impl FrameSource for AbstractPatternSource {
    fn frame(&self, index: u64, total_base_frames: u64) -> ReelResult<Frame> {
        self.generate_abstract_frame(index, total_base_frames)
    }

    fn name(&self) -> &str {
        "abstract-pattern"
    }
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
}

/// Still images ingested from a directory and cycled as base frames.
///
/// PNG and JPEG files are loaded in file-name order and resized to the output resolution.
#[derive(Clone, Debug)]
pub struct ImageSequenceSource {
    dir: PathBuf,
    frames: Vec<Frame>,
}

impl ImageSequenceSource {
    /// Load every supported image in `dir`.
    pub fn load(dir: impl AsRef<Path>, canvas: Canvas) -> ReelResult<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ReelError::resource(format!("read image directory '{}': {e}", dir.display()))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ReelError::resource(format!("list image directory '{}': {e}", dir.display()))
            })?;
            let path = entry.path();
            if path.is_file() && is_supported_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(ReelError::resource(format!(
                "no png/jpeg images found in '{}'",
                dir.display()
            )));
        }

        let frames = paths
            .iter()
            .map(|p| load_still(p, canvas))
            .collect::<ReelResult<Vec<_>>>()?;
        tracing::debug!(dir = %dir.display(), count = frames.len(), "loaded base stills");

        Ok(Self {
            dir: dir.to_path_buf(),
            frames,
        })
    }

    /// Directory the stills were loaded from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of ingested stills.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; loading fails on empty directories.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn frame(&self, index: u64, _total_base_frames: u64) -> ReelResult<Frame> {
        let i = (index % self.frames.len() as u64) as usize;
        Ok(self.frames[i].clone())
    }

    fn name(&self) -> &str {
        "image-sequence"
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            e == "png" || e == "jpg" || e == "jpeg"
        })
        .unwrap_or(false)
}

fn load_still(path: &Path, canvas: Canvas) -> ReelResult<Frame> {
    let img = image::open(path)
        .map_err(|e| ReelError::resource(format!("decode image '{}': {e}", path.display())))?
        .to_rgb8();
    let img = if img.dimensions() == (canvas.width, canvas.height) {
        img
    } else {
        image::imageops::resize(
            &img,
            canvas.width,
            canvas.height,
            image::imageops::FilterType::Triangle,
        )
    };
    Frame::from_rgb_image(img)
}

#[cfg(test)]
#[path = "../../tests/unit/generate/source.rs"]
mod tests;
