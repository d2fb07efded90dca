/// Base-clip generation.
pub mod generator;
/// Frame sources for the base clip.
pub mod source;
