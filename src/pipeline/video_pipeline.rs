use crate::config::generation::GenerationConfig;
use crate::effects::motion::{BreakKind, MotionEffects};
use crate::effects::overlay::{Caption, Overlay};
use crate::effects::style::VisualStyle;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Frame, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::generate::generator::VideoGenerator;
use crate::generate::source::FrameSource;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::observer::{NullObserver, PipelineObserver};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

/// Cap on bytes buffered for reordering in parallel mode.
const MAX_REORDER_BUFFER_BYTES: u64 = 256 * 1024 * 1024;

/// Lifecycle of a [`VideoPipeline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Built, never run.
    Initialized,
    /// Producing the base clip.
    Generating,
    /// Composing and emitting output frames.
    Compositing,
    /// Last run completed and the sink was closed.
    Finalized,
    /// Last run failed or was cancelled.
    Aborted,
}

/// Options controlling how [`VideoPipeline::run`] executes.
#[derive(Clone, Debug)]
pub struct RunOpts {
    /// Compose frames on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Frames composed per parallel chunk.
    pub chunk_size: usize,
    /// Bounded channel capacity between compose workers and the sink thread.
    pub channel_capacity: usize,
    /// Checked between frames; a cancelled run returns [`ReelError::Cancelled`].
    pub cancel: Option<CancelToken>,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            chunk_size: 64,
            channel_capacity: 4,
            cancel: None,
        }
    }
}

impl RunOpts {
    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn check_cancelled(&self) -> ReelResult<()> {
        if self.is_cancelled() {
            return Err(ReelError::Cancelled);
        }
        Ok(())
    }
}

/// Run statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    /// Frames the run was asked to produce.
    pub frames_total: u64,
    /// Frames handed to the sink.
    pub frames_emitted: u64,
    /// Emitted frames carrying a minor pattern break.
    pub minor_breaks: u64,
    /// Emitted frames carrying a major pattern break.
    pub major_breaks: u64,
    /// Length of the generated base clip.
    pub base_frames: u64,
}

impl RenderStats {
    fn record(&mut self, pattern_break: Option<BreakKind>) {
        self.frames_emitted += 1;
        match pattern_break {
            Some(BreakKind::Minor) => self.minor_breaks += 1,
            Some(BreakKind::Major) => self.major_breaks += 1,
            None => {}
        }
    }
}

struct FrameMsg {
    idx: FrameIndex,
    frame: Frame,
    pattern_break: Option<BreakKind>,
}

/// End-to-end composition of an engagement clip.
///
/// A run generates the base clip once, tiles it to the target length, and for every output
/// frame applies micro-movement, the scheduled pattern break, the neon style and the overlay
/// before handing the frame to a [`FrameSink`]. Frames reach the sink in strictly increasing
/// index order in both sequential and parallel mode, and the bytes are identical between the
/// two.
pub struct VideoPipeline {
    config: Arc<GenerationConfig>,
    generator: VideoGenerator,
    style: VisualStyle,
    motion: MotionEffects,
    overlay: Overlay,
    observer: Arc<dyn PipelineObserver>,
    state: PipelineState,
}

impl std::fmt::Debug for VideoPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPipeline")
            .field("state", &self.state)
            .field("generator", &self.generator)
            .field("captions", &self.overlay.captions().len())
            .field("total_frames", &self.config.total_frames())
            .finish()
    }
}

impl VideoPipeline {
    /// Wire every component to a shared copy of `config`.
    pub fn new(config: GenerationConfig) -> ReelResult<Self> {
        let config = Arc::new(config);
        Ok(Self {
            generator: VideoGenerator::new(config.clone()),
            style: VisualStyle::new(config.clone()),
            motion: MotionEffects::new(config.clone())?,
            overlay: Overlay::new(config.clone())?,
            observer: Arc::new(NullObserver),
            state: PipelineState::Initialized,
            config,
        })
    }

    /// Take base frames from `source` instead of the procedural pattern.
    pub fn with_source(mut self, source: Box<dyn FrameSource>) -> Self {
        self.generator = VideoGenerator::with_source(self.config.clone(), source);
        self
    }

    /// Report state changes and emitted frames to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Register a caption; see [`Overlay::add_caption`].
    pub fn add_caption(&mut self, text: impl Into<String>, start_frame: u64) -> &Caption {
        self.overlay.add_caption(text, start_frame)
    }

    /// Caption and progress overlay.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Mutable overlay, for loading captions before a run.
    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }

    /// Shared generation settings.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Base clip generator.
    pub fn generator(&self) -> &VideoGenerator {
        &self.generator
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Compose output frame `frame_index` from a generated base clip.
    pub fn compose_frame(&self, base_clip: &[Frame], frame_index: u64) -> ReelResult<Frame> {
        self.compose(base_clip, frame_index).map(|(frame, _)| frame)
    }

    /// Compose a single output frame without running the whole pipeline.
    ///
    /// Only the base frame that tiles onto `frame_index` is generated.
    pub fn render_frame(&self, frame_index: u64) -> ReelResult<Frame> {
        self.check_index(frame_index)?;
        let base =
            self.generator
                .generate_base_frame(tile_index(frame_index, self.config.base_frames()))?;
        self.compose_tile(&base, frame_index).map(|(frame, _)| frame)
    }

    /// Generate the base clip and stream every output frame into `sink`.
    ///
    /// Any failure aborts the run and leaves the pipeline in [`PipelineState::Aborted`]; the
    /// sink is not closed and removing partial output is the caller's job.
    #[tracing::instrument(
        skip(self, sink, opts),
        fields(total_frames = self.config.total_frames(), parallel = opts.parallel)
    )]
    pub fn run(&mut self, sink: &mut dyn FrameSink, opts: &RunOpts) -> ReelResult<RenderStats> {
        let res = self.run_inner(sink, opts);
        match &res {
            Ok(stats) => {
                self.set_state(PipelineState::Finalized);
                tracing::info!(
                    frames = stats.frames_emitted,
                    minor_breaks = stats.minor_breaks,
                    major_breaks = stats.major_breaks,
                    "run finished"
                );
            }
            Err(e) => {
                self.set_state(PipelineState::Aborted);
                tracing::warn!(error = %e, "run aborted");
            }
        }
        res
    }

    fn run_inner(&mut self, sink: &mut dyn FrameSink, opts: &RunOpts) -> ReelResult<RenderStats> {
        opts.check_cancelled()?;

        self.set_state(PipelineState::Generating);
        let base_clip = self.generator.generate_base_clip()?;

        opts.check_cancelled()?;
        self.set_state(PipelineState::Compositing);

        let canvas = self.config.canvas();
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.config.fps(),
            total_frames: self.config.total_frames(),
        };

        let mut stats = if opts.parallel {
            self.emit_parallel(&base_clip, cfg, sink, opts)?
        } else {
            self.emit_sequential(&base_clip, cfg, sink, opts)?
        };
        stats.frames_total = self.config.total_frames();
        stats.base_frames = base_clip.len() as u64;
        Ok(stats)
    }

    fn emit_sequential(
        &self,
        base_clip: &[Frame],
        cfg: SinkConfig,
        sink: &mut dyn FrameSink,
        opts: &RunOpts,
    ) -> ReelResult<RenderStats> {
        let total = cfg.total_frames;
        sink.begin(cfg)?;

        let mut stats = RenderStats::default();
        for i in 0..total {
            opts.check_cancelled()?;
            let (frame, pattern_break) = self.compose(base_clip, i)?;
            sink.push_frame(FrameIndex(i), &frame)?;
            stats.record(pattern_break);
            self.observer.on_frame(FrameIndex(i), pattern_break);
        }

        sink.end()?;
        Ok(stats)
    }

    fn emit_parallel(
        &self,
        base_clip: &[Frame],
        cfg: SinkConfig,
        sink: &mut dyn FrameSink,
        opts: &RunOpts,
    ) -> ReelResult<RenderStats> {
        let total = cfg.total_frames;
        let cap = opts.channel_capacity.max(1);
        let bytes_per_frame = (cfg.width as u64)
            .saturating_mul(cfg.height as u64)
            .saturating_mul(3)
            .max(1);
        let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
        let chunk_size = (opts.chunk_size.max(1) as u64)
            .min(max_chunk_by_mem)
            .min(total.max(1));
        let pool = build_thread_pool(opts.threads)?;
        let observer = self.observer.as_ref();

        // Sink thread: frames finish in any order; deliver them in index order.
        std::thread::scope(|scope| -> ReelResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> ReelResult<RenderStats> {
                sink_ref.begin(cfg)?;

                let mut stats = RenderStats::default();
                let mut next = 0u64;
                let mut pending = HashMap::<u64, FrameMsg>::new();
                while next < total {
                    let msg = match pending.remove(&next) {
                        Some(msg) => msg,
                        None => {
                            let msg = rx.recv().map_err(|_| {
                                ReelError::encode("frame channel disconnected unexpectedly")
                            })?;
                            if msg.idx.0 != next {
                                pending.insert(msg.idx.0, msg);
                                continue;
                            }
                            msg
                        }
                    };
                    sink_ref.push_frame(msg.idx, &msg.frame)?;
                    stats.record(msg.pattern_break);
                    observer.on_frame(msg.idx, msg.pattern_break);
                    next += 1;
                }

                sink_ref.end()?;
                Ok(stats)
            });

            let sink_gone = AtomicBool::new(false);
            let produce_res = (|| -> ReelResult<()> {
                let mut chunk_start = 0u64;
                while chunk_start < total {
                    opts.check_cancelled()?;
                    let chunk_end = (chunk_start + chunk_size).min(total);
                    let tx = tx.clone();
                    let sink_gone = &sink_gone;
                    pool.install(|| {
                        (chunk_start..chunk_end)
                            .into_par_iter()
                            .try_for_each(move |i| -> ReelResult<()> {
                                opts.check_cancelled()?;
                                let (frame, pattern_break) = self.compose(base_clip, i)?;
                                tx.send(FrameMsg {
                                    idx: FrameIndex(i),
                                    frame,
                                    pattern_break,
                                })
                                .map_err(|_| {
                                    sink_gone.store(true, Ordering::Relaxed);
                                    ReelError::encode("sink thread is not accepting frames")
                                })
                            })
                    })?;
                    chunk_start = chunk_end;
                }
                Ok(())
            })();

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| ReelError::encode("sink thread panicked"))?;

            // Whichever side failed first disconnected the channel; report that side's error.
            match (produce_res, enc_res) {
                (Err(_), Err(e)) if sink_gone.load(Ordering::Relaxed) => Err(e),
                (Err(e), _) => Err(e),
                (Ok(()), res) => res,
            }
        })
    }

    fn compose(
        &self,
        base_clip: &[Frame],
        frame_index: u64,
    ) -> ReelResult<(Frame, Option<BreakKind>)> {
        self.check_index(frame_index)?;
        if base_clip.is_empty() {
            return Err(ReelError::shape("base clip is empty"));
        }
        let base = &base_clip[tile_index(frame_index, base_clip.len() as u64) as usize];
        self.compose_tile(base, frame_index)
    }

    fn compose_tile(
        &self,
        base: &Frame,
        frame_index: u64,
    ) -> ReelResult<(Frame, Option<BreakKind>)> {
        let canvas = self.config.canvas();
        base.ensure_canvas(canvas, "tile")?;

        let mut frame = self.motion.apply_micro_movement(base, frame_index);
        frame.ensure_canvas(canvas, "micro-movement")?;

        let pattern_break = self.motion.should_apply_pattern_break(frame_index);
        if let Some(kind) = pattern_break {
            self.motion.apply_pattern_break(&mut frame, kind, frame_index);
            frame.ensure_canvas(canvas, "pattern break")?;
            tracing::debug!(frame = frame_index, ?kind, "pattern break");
        }

        let mut frame = self.style.stylize(&frame, frame_index)?;
        frame.ensure_canvas(canvas, "stylize")?;

        let progress = progress_for(frame_index, self.config.total_frames());
        self.overlay.composite(&mut frame, frame_index, progress)?;
        frame.ensure_canvas(canvas, "overlay")?;

        Ok((frame, pattern_break))
    }

    fn check_index(&self, frame_index: u64) -> ReelResult<()> {
        let total = self.config.total_frames();
        if frame_index >= total {
            return Err(ReelError::config(format!(
                "frame index {frame_index} out of range (total_frames={total})"
            )));
        }
        Ok(())
    }

    fn set_state(&mut self, state: PipelineState) {
        tracing::debug!(from = ?self.state, to = ?state, "state transition");
        self.state = state;
        self.observer.on_state(state);
    }
}

/// Base-clip frame that tiles onto output frame `frame_index`.
pub fn tile_index(frame_index: u64, base_frames: u64) -> u64 {
    if base_frames == 0 {
        return 0;
    }
    frame_index % base_frames
}

/// Progress-bar fill for `frame_index` of `total_frames`: `0` on the first frame, `1` on the
/// last.
pub fn progress_for(frame_index: u64, total_frames: u64) -> f64 {
    if total_frames <= 1 {
        return 0.0;
    }
    (frame_index as f64 / (total_frames - 1) as f64).min(1.0)
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::config("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::encode(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/video_pipeline.rs"]
mod tests;
