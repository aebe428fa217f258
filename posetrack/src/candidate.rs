//! Frame-scoped pose candidates and pose-specific NMS
//!
//! Candidates are the bridge between the raw model outputs and track
//! association: validated keypoint sets with a tight bounding box and an
//! aggregate score. They live for exactly one frame.

use crate::bbox::{iou, Bbox};
use crate::params::TrackerParams;
use crate::types::Keypoint;

/// One frame's validated detection + pose output, before association
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Tight box over keypoints at or above the keypoint threshold
    pub bbox: Bbox,
    /// Mean keypoint confidence, used for NMS ranking
    pub score: f32,
    pub keypoints: Vec<Keypoint>,
}

impl Candidate {
    /// Validate a pose result into a candidate.
    ///
    /// Returns `None` when too few keypoints clear the score threshold or
    /// the resulting box is degenerate or below the minimum size.
    pub fn from_keypoints(keypoints: Vec<Keypoint>, params: &TrackerParams) -> Option<Self> {
        let valid: Vec<&Keypoint> = keypoints
            .iter()
            .filter(|k| k.score >= params.pose_kpt_thr)
            .collect();
        if valid.len() < params.min_keypoints(keypoints.len()) || valid.is_empty() {
            return None;
        }

        let mut bbox = Bbox::new(f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for k in &valid {
            bbox.xmin = bbox.xmin.min(k.x);
            bbox.ymin = bbox.ymin.min(k.y);
            bbox.xmax = bbox.xmax.max(k.x);
            bbox.ymax = bbox.ymax.max(k.y);
        }
        if !bbox.is_valid() {
            return None;
        }
        if params.pose_min_bbox_size >= 0.0 && bbox.min_side() < params.pose_min_bbox_size {
            return None;
        }

        let score =
            keypoints.iter().map(|k| k.score).sum::<f32>() / keypoints.len().max(1) as f32;

        Some(Self {
            bbox,
            score,
            keypoints,
        })
    }
}

/// Object-keypoint-similarity between two candidates.
///
/// Mean over keypoint pairs of `exp(-d^2 / (2 s k^2))` with `s` the larger
/// of the two box areas and `k = 2 * sigma`. Falls back to plain box IoU
/// when no per-keypoint sigmas are configured or the cardinalities differ.
pub fn oks(a: &Candidate, b: &Candidate, sigmas: &[f32]) -> f32 {
    if sigmas.len() != a.keypoints.len() || a.keypoints.len() != b.keypoints.len() {
        return iou(&a.bbox, &b.bbox);
    }

    let scale = a.bbox.area().max(b.bbox.area()).max(1e-6);
    let mut sum = 0.0;
    for ((ka, kb), sigma) in a.keypoints.iter().zip(&b.keypoints).zip(sigmas) {
        let dx = ka.x - kb.x;
        let dy = ka.y - kb.y;
        let k = 2.0 * sigma;
        sum += (-(dx * dx + dy * dy) / (2.0 * scale * k * k)).exp();
    }
    sum / a.keypoints.len() as f32
}

/// Keypoint-similarity NMS: rank candidates by aggregate score, greedily
/// suppress any candidate whose similarity to a kept one exceeds
/// `pose_nms_thr`, and cap the survivors at `pose_max_num_bboxes`.
pub fn pose_nms(mut candidates: Vec<Candidate>, params: &TrackerParams) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let cap = if params.pose_max_num_bboxes < 0 {
        usize::MAX
    } else {
        params.pose_max_num_bboxes as usize
    };

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.len() >= cap {
            break;
        }
        let overlaps = kept
            .iter()
            .any(|k| oks(k, &candidate, &params.keypoint_sigmas) > params.pose_nms_thr);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}
