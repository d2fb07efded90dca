use crate::foundation::core::{Frame, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use xxhash_rust::xxh3::Xxh3;

/// Configuration provided to a [`FrameSink`] before any frame is pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames per second.
    pub fps: u32,
    /// Number of frames the run will push.
    pub total_frames: u64,
}

/// Sink contract for consuming finished frames.
///
/// Ordering contract: `begin` once, `push_frame` in strictly increasing `FrameIndex` order, `end`
/// once. A failed run stops calling the sink; cleaning up partial output is left to the caller.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame in strictly increasing index order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> ReelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ReelResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Frame)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, Frame)] {
        &self.frames
    }

    /// Whether `end` has been called since the last `begin`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take ownership of the captured frames.
    pub fn into_frames(self) -> Vec<(FrameIndex, Frame)> {
        self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> ReelResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Sink that hashes every frame (xxh3-64) instead of storing it.
///
/// Two runs with identical configuration must produce identical digests.
#[derive(Default)]
pub struct DigestSink {
    hasher: Option<Xxh3>,
    frames: u64,
    last_idx: Option<FrameIndex>,
    digest: Option<u64>,
}

impl std::fmt::Debug for DigestSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestSink")
            .field("frames", &self.frames)
            .field("digest", &self.digest)
            .finish()
    }
}

impl DigestSink {
    /// Create a new digest sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Final digest, available after `end`.
    pub fn digest(&self) -> Option<u64> {
        self.digest
    }

    /// Frames hashed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameSink for DigestSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        let mut hasher = Xxh3::new();
        hasher.update(&cfg.width.to_le_bytes());
        hasher.update(&cfg.height.to_le_bytes());
        hasher.update(&cfg.fps.to_le_bytes());
        self.hasher = Some(hasher);
        self.frames = 0;
        self.last_idx = None;
        self.digest = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> ReelResult<()> {
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::encode(
                "digest sink received out-of-order frame index",
            ));
        }
        let hasher = self
            .hasher
            .as_mut()
            .ok_or_else(|| ReelError::encode("digest sink not started"))?;
        hasher.update(&idx.0.to_le_bytes());
        hasher.update(&frame.data);
        self.last_idx = Some(idx);
        self.frames += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        let hasher = self
            .hasher
            .take()
            .ok_or_else(|| ReelError::encode("digest sink not started"))?;
        self.digest = Some(hasher.digest());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
