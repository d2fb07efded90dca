//! Frame sinks.
//!
//! Sinks consume finished frames in strictly increasing index order; they are the boundary to
//! whatever writes the final video.

/// `ffmpeg`-based MP4 output via the system `ffmpeg`.
pub mod ffmpeg;
/// PNG image-sequence output.
pub mod png;
/// Sink trait and built-in in-memory / digest sinks.
pub mod sink;
