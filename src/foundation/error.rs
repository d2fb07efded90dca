/// Crate-wide result alias.
pub type ReelResult<T> = Result<T, ReelError>;

/// Errors produced while configuring or running a composition.
///
/// No variant is recovered locally: a failing stage aborts the whole run.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid configuration values or configuration documents.
    #[error("config error: {0}")]
    Config(String),

    /// A frame or mask does not match the configured resolution.
    #[error("shape error: {0}")]
    Shape(String),

    /// Missing or undecodable input assets (image sequences, fonts).
    #[error("resource error: {0}")]
    Resource(String),

    /// Frame sink / encoder failures.
    #[error("encode error: {0}")]
    Encode(String),

    /// The run was cancelled between frames.
    #[error("run cancelled")]
    Cancelled,

    /// Anything else, usually I/O with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ReelError::Shape`].
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    /// Build a [`ReelError::Resource`].
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`ReelError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
