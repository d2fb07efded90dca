//! Reelforge composes short vertical clips tuned for viewer retention.
//!
//! A short base clip is generated (procedurally or from a pluggable [`FrameSource`]), tiled to
//! the target duration, and every output frame is run through the same chain:
//!
//! - micro-movement (sub-pixel jitter plus a slow zoom breathe)
//! - periodic pattern breaks (flash, or slice glitch plus flash)
//! - neon-on-dark styling with edge accents
//! - captions and a progress bar inside the safe margins
//!
//! Frames are streamed in order into a [`FrameSink`]: MP4 through the system `ffmpeg`, a PNG
//! sequence, an in-memory buffer, or an xxh3 digest. Output is a pure function of the
//! [`GenerationConfig`] and the registered captions.
#![forbid(unsafe_code)]

mod foundation;

/// Generation parameters and their JSON boundary types.
pub mod config;
/// Per-frame effects: styling, motion, overlay.
pub mod effects;
/// Frame sinks.
pub mod encode;
/// Base-clip generation.
pub mod generate;
/// End-to-end orchestration.
pub mod pipeline;

pub use crate::foundation::core::{Canvas, EdgeMask, Frame, FrameIndex, Rgb8};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::config::generation::GenerationConfig;
pub use crate::config::model::{CaptionCueDef, DEFAULT_NEON_COLORS, GenerationConfigDef};
pub use crate::effects::composite::{ink, mean_abs_diff};
pub use crate::effects::motion::{BreakKind, MotionEffects};
pub use crate::effects::overlay::{Caption, Overlay};
pub use crate::effects::style::VisualStyle;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::sink::{DigestSink, FrameSink, InMemorySink, SinkConfig};
pub use crate::generate::generator::VideoGenerator;
pub use crate::generate::source::{AbstractPatternSource, FrameSource, ImageSequenceSource};
pub use crate::pipeline::cancel::CancelToken;
pub use crate::pipeline::observer::{
    CountingObserver, NullObserver, PipelineObserver, TracingObserver,
};
pub use crate::pipeline::video_pipeline::{
    PipelineState, RenderStats, RunOpts, VideoPipeline, progress_for, tile_index,
};
