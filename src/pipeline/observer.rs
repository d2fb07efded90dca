use crate::effects::motion::BreakKind;
use crate::foundation::core::FrameIndex;
use crate::pipeline::video_pipeline::PipelineState;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hooks invoked by [`crate::VideoPipeline`] during a run.
///
/// `on_frame` is called once per frame handed to the sink, in output order, from whichever
/// thread feeds the sink.
pub trait PipelineObserver: Send + Sync {
    /// Called on every pipeline state transition.
    fn on_state(&self, _state: PipelineState) {}

    /// Called after a frame is pushed; `pattern_break` is set on break frames.
    fn on_frame(&self, _idx: FrameIndex, _pattern_break: Option<BreakKind>) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {}

/// Observer that forwards events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_state(&self, state: PipelineState) {
        tracing::info!(?state, "pipeline state");
    }

    fn on_frame(&self, idx: FrameIndex, pattern_break: Option<BreakKind>) {
        match pattern_break {
            Some(kind) => tracing::debug!(frame = idx.0, ?kind, "frame emitted"),
            None => tracing::trace!(frame = idx.0, "frame emitted"),
        }
    }
}

/// Observer that counts frames and breaks and records state transitions.
#[derive(Debug, Default)]
pub struct CountingObserver {
    frames: AtomicU64,
    minor_breaks: AtomicU64,
    major_breaks: AtomicU64,
    last_frame: AtomicU64,
    states: Mutex<Vec<PipelineState>>,
}

impl CountingObserver {
    /// All counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames seen so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Minor breaks seen so far.
    pub fn minor_breaks(&self) -> u64 {
        self.minor_breaks.load(Ordering::Relaxed)
    }

    /// Major breaks seen so far.
    pub fn major_breaks(&self) -> u64 {
        self.major_breaks.load(Ordering::Relaxed)
    }

    /// Index of the most recent frame seen, if any.
    pub fn last_frame(&self) -> Option<FrameIndex> {
        match self.frames() {
            0 => None,
            _ => Some(FrameIndex(self.last_frame.load(Ordering::Relaxed))),
        }
    }

    /// Every state reported so far, in order.
    pub fn states(&self) -> Vec<PipelineState> {
        match self.states.lock() {
            Ok(states) => states.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PipelineObserver for CountingObserver {
    fn on_state(&self, state: PipelineState) {
        match self.states.lock() {
            Ok(mut states) => states.push(state),
            Err(poisoned) => poisoned.into_inner().push(state),
        }
    }

    fn on_frame(&self, idx: FrameIndex, pattern_break: Option<BreakKind>) {
        self.last_frame.store(idx.0, Ordering::Relaxed);
        self.frames.fetch_add(1, Ordering::Relaxed);
        match pattern_break {
            Some(BreakKind::Minor) => {
                self.minor_breaks.fetch_add(1, Ordering::Relaxed);
            }
            Some(BreakKind::Major) => {
                self.major_breaks.fetch_add(1, Ordering::Relaxed);
            }
            None => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/observer.rs"]
mod tests;
