use crate::foundation::error::{ReelError, ReelResult};

/// An RGB colour, 8 bits per channel.
pub type Rgb8 = [u8; 3];

/// Absolute 0-based frame index in output timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Number of pixels on the canvas.
    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Byte length of a tightly packed RGB8 frame of this size.
    pub fn rgb_len(self) -> usize {
        self.pixel_count() * 3
    }
}

/// One full-resolution RGB8 image.
///
/// Pixels are tightly packed and row-major, so the buffer has shape `(height, width, 3)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGB8 bytes.
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a frame from raw RGB8 bytes, validating the buffer length.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> ReelResult<Self> {
        let expected = Canvas { width, height }.rgb_len();
        if width == 0 || height == 0 {
            return Err(ReelError::shape("frame width/height must be non-zero"));
        }
        if data.len() != expected {
            return Err(ReelError::shape(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height} rgb8",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a frame filled with a single colour.
    pub fn filled(canvas: Canvas, color: Rgb8) -> Self {
        let mut data = Vec::with_capacity(canvas.rgb_len());
        for _ in 0..canvas.pixel_count() {
            data.extend_from_slice(&color);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    /// Canvas this frame covers.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// `(height, width, channels)`, matching the usual array layout of video frames.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, 3)
    }

    /// Return an error unless the frame matches `canvas` exactly.
    pub fn ensure_canvas(&self, canvas: Canvas, stage: &str) -> ReelResult<()> {
        if self.width != canvas.width
            || self.height != canvas.height
            || self.data.len() != canvas.rgb_len()
        {
            return Err(ReelError::shape(format!(
                "{stage}: frame is {}x{} ({} bytes), expected {}x{}",
                self.width,
                self.height,
                self.data.len(),
                canvas.width,
                canvas.height
            )));
        }
        Ok(())
    }

    /// Read one pixel. Callers keep `x < width` and `y < height`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb8 {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Overwrite one pixel. Callers keep `x < width` and `y < height`.
    pub fn put_pixel(&mut self, x: u32, y: u32, px: Rgb8) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&px);
    }

    /// Mean of all channel values.
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.data.iter().map(|&v| u64::from(v)).sum();
        sum as f64 / self.data.len() as f64
    }

    /// Convert into an `image` buffer (used by PNG output).
    pub fn into_rgb_image(self) -> ReelResult<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| ReelError::shape("frame buffer does not match its dimensions"))
    }

    /// Wrap an `image` buffer.
    pub fn from_rgb_image(img: image::RgbImage) -> ReelResult<Self> {
        let (w, h) = img.dimensions();
        Self::from_raw(w, h, img.into_raw())
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 3
    }
}

/// Single-channel edge mask with the same width/height as its source frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeMask {
    /// Mask width in pixels.
    pub width: u32,
    /// Mask height in pixels.
    pub height: u32,
    /// One byte per pixel: 255 on an edge, 0 elsewhere.
    pub data: Vec<u8>,
}

impl EdgeMask {
    /// Number of edge pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// `true` when no pixel is marked.
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Whether the pixel at `(x, y)` is on an edge.
    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        self.data[(y as usize) * (self.width as usize) + (x as usize)] != 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
