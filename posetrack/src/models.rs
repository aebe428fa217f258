//! Black-box model interfaces
//!
//! The tracker consumes the detector and pose estimator purely through
//! their result contracts; model loading, device selection and inference
//! internals live behind these traits.

use crate::bbox::Bbox;
use crate::types::{Detection, Frame, Keypoint};
use anyhow::Result;

/// Common interface for object detectors
pub trait Detector: Send {
    /// Detect objects in a single frame
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;

    /// Detector name (for logging/debugging)
    fn name(&self) -> &str;
}

/// Common interface for top-down pose estimators
pub trait PoseEstimator: Send {
    /// Estimate the pose of the subject inside `bbox`.
    ///
    /// The returned keypoint count is the model's fixed output cardinality
    /// and must be the same on every call.
    fn estimate(&mut self, frame: &Frame, bbox: &Bbox) -> Result<Vec<Keypoint>>;

    /// Estimator name (for logging/debugging)
    fn name(&self) -> &str;
}
