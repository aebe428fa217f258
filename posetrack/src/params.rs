//! Tracker configuration
//!
//! A flat, immutable parameter record fixed at state creation. Negative
//! sentinel values (`-1`) mean "no minimum" where documented.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Full parameter set for one tracking stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerParams {
    /// Run detection every N frames (`DetectMode::Auto`)
    pub det_interval: u32,
    /// Detection class to track; -1 tracks any label
    pub det_label: i32,
    /// Detection score threshold
    pub det_thr: f32,
    /// Minimum detection box side in pixels; -1 disables the check
    pub det_min_bbox_size: f32,
    /// Greedy IoU suppression threshold for raw detections
    pub det_nms_thr: f32,
    /// Maximum pose candidates surviving pose NMS; -1 means unlimited
    pub pose_max_num_bboxes: i32,
    /// Keypoint confidence threshold
    pub pose_kpt_thr: f32,
    /// Minimum keypoints above threshold for a valid candidate;
    /// -1 resolves to ceil(n_keypoints / 2)
    pub pose_min_keypoints: i32,
    /// Crop expansion about the region center before pose estimation
    pub pose_bbox_scale: f32,
    /// Minimum candidate box side in pixels; -1 disables the check
    pub pose_min_bbox_size: f32,
    /// Pose NMS similarity threshold
    pub pose_nms_thr: f32,
    /// Per-keypoint OKS sigmas; empty falls back to plain box IoU
    pub keypoint_sigmas: Vec<f32>,
    /// Minimum IoU for candidate-to-track association
    pub track_iou_thr: f32,
    /// Consecutive missed frames before a track is dropped
    pub track_max_missing: u32,
    /// Bounded per-track history buffer length
    pub track_history_size: usize,
    /// Motion model positional process noise weight
    pub std_weight_position: f32,
    /// Motion model velocity process noise weight
    pub std_weight_velocity: f32,
    /// One-euro minimum cutoff frequency
    pub smooth_min_cutoff: f32,
    /// One-euro speed coefficient (cutoff growth with signal speed)
    pub smooth_beta: f32,
    /// One-euro derivative cutoff frequency
    pub smooth_derivative_cutoff: f32,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            det_interval: 1,
            det_label: -1,
            det_thr: 0.5,
            det_min_bbox_size: -1.0,
            det_nms_thr: 0.7,
            pose_max_num_bboxes: -1,
            pose_kpt_thr: 0.5,
            pose_min_keypoints: -1,
            pose_bbox_scale: 1.25,
            pose_min_bbox_size: -1.0,
            pose_nms_thr: 0.5,
            keypoint_sigmas: Vec::new(),
            track_iou_thr: 0.4,
            track_max_missing: 10,
            track_history_size: 1,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
            smooth_min_cutoff: 1.0,
            smooth_beta: 0.007,
            smooth_derivative_cutoff: 1.0,
        }
    }
}

impl TrackerParams {
    /// Check the parameter set before any tracking state is built.
    ///
    /// Rejects out-of-range values so a bad configuration can never
    /// corrupt a running stream.
    pub fn validate(&self) -> Result<()> {
        if self.det_interval < 1 {
            bail!("det_interval must be >= 1, got {}", self.det_interval);
        }
        for (name, value) in [
            ("det_thr", self.det_thr),
            ("det_nms_thr", self.det_nms_thr),
            ("pose_kpt_thr", self.pose_kpt_thr),
            ("pose_nms_thr", self.pose_nms_thr),
            ("track_iou_thr", self.track_iou_thr),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be within [0, 1], got {value}");
            }
        }
        for (name, value) in [
            ("det_min_bbox_size", self.det_min_bbox_size),
            ("pose_min_bbox_size", self.pose_min_bbox_size),
        ] {
            if value < 0.0 && value != -1.0 {
                bail!("{name} must be >= 0 or the -1 sentinel, got {value}");
            }
        }
        if self.pose_max_num_bboxes < -1 {
            bail!(
                "pose_max_num_bboxes must be >= 0 or the -1 sentinel, got {}",
                self.pose_max_num_bboxes
            );
        }
        if self.pose_min_keypoints < -1 {
            bail!(
                "pose_min_keypoints must be >= 0 or the -1 sentinel, got {}",
                self.pose_min_keypoints
            );
        }
        if self.pose_bbox_scale <= 0.0 {
            bail!("pose_bbox_scale must be positive, got {}", self.pose_bbox_scale);
        }
        if self.keypoint_sigmas.iter().any(|s| *s <= 0.0) {
            bail!("keypoint_sigmas must all be positive");
        }
        if self.track_history_size < 1 {
            bail!("track_history_size must be >= 1");
        }
        if self.std_weight_position <= 0.0 || self.std_weight_velocity <= 0.0 {
            bail!("motion noise weights must be positive");
        }
        if self.smooth_min_cutoff <= 0.0 || self.smooth_derivative_cutoff <= 0.0 {
            bail!("smoothing cutoff frequencies must be positive");
        }
        if self.smooth_beta < 0.0 {
            bail!("smooth_beta must be non-negative, got {}", self.smooth_beta);
        }
        Ok(())
    }

    /// Resolve the `pose_min_keypoints` sentinel against the pose model's
    /// output cardinality
    pub fn min_keypoints(&self, n_keypoints: usize) -> usize {
        if self.pose_min_keypoints < 0 {
            n_keypoints.div_ceil(2)
        } else {
            self.pose_min_keypoints as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TrackerParams::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let params = TrackerParams {
            det_thr: 1.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_sentinel() {
        let params = TrackerParams {
            det_min_bbox_size: -2.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = TrackerParams {
            det_min_bbox_size: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let params = TrackerParams {
            det_interval: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_min_keypoints_sentinel() {
        let params = TrackerParams::default();
        assert_eq!(params.min_keypoints(17), 9);
        assert_eq!(params.min_keypoints(5), 3);

        let params = TrackerParams {
            pose_min_keypoints: 4,
            ..Default::default()
        };
        assert_eq!(params.min_keypoints(17), 4);
    }
}
