use crate::config::generation::GenerationConfig;
use crate::foundation::core::Frame;
use crate::foundation::error::ReelResult;
use crate::generate::source::{AbstractPatternSource, FrameSource};
use rayon::prelude::*;
use std::sync::Arc;

/// Produces the short base clip that the pipeline tiles to full length.
///
/// Procedural generation is built in; any other [`FrameSource`] (ingested stills, a model
/// bridge, a test fake) can be plugged in with [`VideoGenerator::with_source`].
pub struct VideoGenerator {
    config: Arc<GenerationConfig>,
    pattern: AbstractPatternSource,
    source: Option<Box<dyn FrameSource>>,
}

impl std::fmt::Debug for VideoGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoGenerator")
            .field("source", &self.source_name())
            .field("base_frames", &self.config.base_frames())
            .finish()
    }
}

impl VideoGenerator {
    /// Procedural generator for `config`.
    pub fn new(config: Arc<GenerationConfig>) -> Self {
        let pattern = AbstractPatternSource::new(&config);
        Self {
            config,
            pattern,
            source: None,
        }
    }

    /// Generator backed by an external frame source.
    pub fn with_source(config: Arc<GenerationConfig>, source: Box<dyn FrameSource>) -> Self {
        let mut g = Self::new(config);
        g.source = Some(source);
        g
    }

    /// Name of the active frame source.
    pub fn source_name(&self) -> &str {
        match &self.source {
            Some(s) => s.name(),
            None => self.pattern.name(),
        }
    }

    /// One procedural frame, independent of any plugged-in source.
    pub fn generate_abstract_frame(
        &self,
        frame_index: u64,
        total_base_frames: u64,
    ) -> ReelResult<Frame> {
        self.pattern
            .generate_abstract_frame(frame_index, total_base_frames)
    }

    /// Base frame `index` from the active source, checked against the configured resolution.
    pub fn generate_base_frame(&self, index: u64) -> ReelResult<Frame> {
        let source: &dyn FrameSource = match &self.source {
            Some(s) => s.as_ref(),
            None => &self.pattern,
        };
        let frame = source.frame(index, self.config.base_frames())?;
        frame.ensure_canvas(self.config.canvas(), "base clip")?;
        Ok(frame)
    }

    /// Exactly `base_frames` frames from the active source.
    ///
    /// Frames are produced in parallel and collected in index order.
    #[tracing::instrument(skip(self), fields(source = self.source_name()))]
    pub fn generate_base_clip(&self) -> ReelResult<Vec<Frame>> {
        let frames = (0..self.config.base_frames())
            .into_par_iter()
            .map(|i| self.generate_base_frame(i))
            .collect::<ReelResult<Vec<_>>>()?;

        tracing::debug!(frames = frames.len(), "base clip generated");
        Ok(frames)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/generator.rs"]
mod tests;
