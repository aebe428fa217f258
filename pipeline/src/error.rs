//! Error types for the tracking pipeline

use thiserror::Error;

/// Result type alias for the pipeline crate
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors surfaced by session and state operations
#[derive(Error, Debug)]
pub enum TrackError {
    /// Operation on a released or unknown tracking state
    #[error("invalid state handle: {0}")]
    InvalidHandle(u64),

    /// Out-of-range configuration, rejected before any state is created
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The detector or pose model failed; the affected state keeps its
    /// last-good tracks and the frame may be retried
    #[error("model inference failed: {0}")]
    Inference(String),

    /// Zero frames supplied where at least one is required
    #[error("empty input")]
    EmptyInput,
}

impl TrackError {
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }
}
