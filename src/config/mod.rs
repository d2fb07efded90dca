/// Validated generation settings.
pub mod generation;
/// Serde boundary types for config and caption files.
pub mod model;
