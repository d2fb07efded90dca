/// Blend and measurement helpers shared by the effect stages.
pub mod composite;
/// Micro-movement and pattern breaks.
pub mod motion;
/// Captions and progress bar.
pub mod overlay;
/// Dark-base tone mapping and neon edge accents.
pub mod style;
pub(crate) mod text;
