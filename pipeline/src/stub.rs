//! Scripted stand-ins for the black-box models
//!
//! Deterministic detector and pose-estimator implementations replaying
//! canned outputs, used by the scenario tests and the demo example.

use anyhow::Result;
use posetrack::{Bbox, Detection, Detector, Frame, Keypoint, PoseEstimator};

/// Replays one canned detection list per call; empty once the script runs
/// out. Call counting makes "the detector was skipped" assertions cheap.
pub struct ScriptedDetector {
    script: Vec<Vec<Detection>>,
    calls: usize,
    fail_on_call: Option<usize>,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Vec<Detection>>) -> Self {
        Self {
            script,
            calls: 0,
            fail_on_call: None,
        }
    }

    /// Fail with an inference error on the given call index (0-based)
    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// Number of times `detect` has been invoked
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Detector for ScriptedDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_on_call == Some(call) {
            anyhow::bail!("scripted detector failure on call {call}");
        }
        Ok(self.script.get(call).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scripted-detector"
    }
}

/// Emits a fixed number of keypoints along the diagonal of the query box.
///
/// With `shrink` set to the inverse of the tracker's crop expansion, the
/// candidate rebuilt from these keypoints lands exactly on the original
/// seed region, which keeps scenario assertions exact.
pub struct ScriptedPoseEstimator {
    n_keypoints: usize,
    score: f32,
    shrink: f32,
    calls: usize,
    fail_on_call: Option<usize>,
}

impl ScriptedPoseEstimator {
    pub fn new(n_keypoints: usize, score: f32) -> Self {
        Self {
            n_keypoints,
            score,
            shrink: 1.0,
            calls: 0,
            fail_on_call: None,
        }
    }

    pub fn with_shrink(mut self, shrink: f32) -> Self {
        self.shrink = shrink;
        self
    }

    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl PoseEstimator for ScriptedPoseEstimator {
    fn estimate(&mut self, _frame: &Frame, bbox: &Bbox) -> Result<Vec<Keypoint>> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_on_call == Some(call) {
            anyhow::bail!("scripted pose failure on call {call}");
        }

        let span = bbox.expand(self.shrink);
        let last = (self.n_keypoints.max(2) - 1) as f32;
        Ok((0..self.n_keypoints)
            .map(|i| {
                let t = i as f32 / last;
                Keypoint::new(
                    span.xmin + t * span.width(),
                    span.ymin + t * span.height(),
                    self.score,
                )
            })
            .collect())
    }

    fn name(&self) -> &str {
        "scripted-pose"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_scripted_detector_replays_then_goes_quiet() {
        let det = Detection {
            bbox: Bbox::new(0.0, 0.0, 10.0, 10.0),
            score: 0.9,
            label: 0,
        };
        let mut detector = ScriptedDetector::new(vec![vec![det.clone()]]);
        let frame = Frame::empty(64, 64);

        assert_eq!(detector.detect(&frame).unwrap(), vec![det]);
        assert!(detector.detect(&frame).unwrap().is_empty());
        assert_eq!(detector.calls(), 2);
    }

    #[test]
    fn test_pose_keypoints_span_shrunken_box() {
        let mut pose = ScriptedPoseEstimator::new(5, 0.9).with_shrink(0.8);
        let frame = Frame::empty(64, 64);
        let bbox = Bbox::new(0.0, 0.0, 100.0, 100.0);
        let keypoints = pose.estimate(&frame, &bbox).unwrap();
        assert_eq!(keypoints.len(), 5);
        assert_abs_diff_eq!(keypoints[0].x, 10.0, epsilon = 1e-4);
        assert_abs_diff_eq!(keypoints[4].x, 90.0, epsilon = 1e-4);
    }

    #[test]
    fn test_scripted_failure_fires_once() {
        let mut detector = ScriptedDetector::new(vec![Vec::new(); 3]).fail_on_call(1);
        let frame = Frame::empty(64, 64);
        assert!(detector.detect(&frame).is_ok());
        assert!(detector.detect(&frame).is_err());
        assert!(detector.detect(&frame).is_ok());
    }
}
