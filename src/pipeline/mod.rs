/// Cooperative cancellation of a running pipeline.
pub mod cancel;
/// Caller-supplied hooks for state changes and emitted frames.
pub mod observer;
/// Orchestration: base clip, per-frame composition, ordered delivery to a sink.
pub mod video_pipeline;
