//! Persistent per-subject track state

use crate::bbox::Bbox;
use crate::candidate::Candidate;
use crate::motion::MotionModel;
use crate::params::TrackerParams;
use crate::smoothing::KeypointSmoother;
use crate::types::{Keypoint, TrackResult};
use std::collections::VecDeque;

/// One entry of a track's bounded history buffer
#[derive(Debug, Clone)]
pub struct TrackSnapshot {
    pub frame_id: u64,
    pub bbox: Bbox,
    pub keypoints: Vec<Keypoint>,
}

/// Identity assigned to one physical subject across frames.
///
/// The keypoint cardinality is fixed at birth by the pose model's output
/// and stays constant for the track's lifetime.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: u32,
    /// Current box estimate (posterior after a match, extrapolation while
    /// coasting)
    pub bbox: Bbox,
    /// Smoothed keypoints with the last observed confidences
    pub keypoints: Vec<Keypoint>,
    /// Consecutive frames without a matched candidate
    pub missing: u32,
    motion: MotionModel,
    smoothers: Vec<KeypointSmoother>,
    history: VecDeque<TrackSnapshot>,
}

impl Track {
    /// Promote an unmatched candidate into a fresh track
    pub fn new(id: u32, candidate: &Candidate, frame_id: u64, params: &TrackerParams) -> Self {
        let mut smoothers: Vec<KeypointSmoother> = (0..candidate.keypoints.len())
            .map(|_| {
                KeypointSmoother::new(
                    params.smooth_min_cutoff,
                    params.smooth_beta,
                    params.smooth_derivative_cutoff,
                )
            })
            .collect();
        // seed filter state; the first sample passes through unmodified
        let t = frame_id as f32;
        for (smoother, k) in smoothers.iter_mut().zip(&candidate.keypoints) {
            smoother.update(k.x, k.y, t);
        }

        let mut track = Self {
            id,
            bbox: candidate.bbox,
            keypoints: candidate.keypoints.clone(),
            missing: 0,
            motion: MotionModel::new(
                &candidate.bbox,
                params.std_weight_position,
                params.std_weight_velocity,
            ),
            smoothers,
            history: VecDeque::new(),
        };
        track.push_history(frame_id, params.track_history_size);
        track
    }

    /// Motion-model prediction for the upcoming frame; pure
    pub fn predicted(&self) -> Bbox {
        self.motion.predict()
    }

    pub fn num_keypoints(&self) -> usize {
        self.keypoints.len()
    }

    /// Fuse a matched candidate: motion correction plus per-keypoint
    /// smoothing at the current frame timestamp
    pub fn update(&mut self, candidate: &Candidate, frame_id: u64, params: &TrackerParams) {
        debug_assert_eq!(candidate.keypoints.len(), self.smoothers.len());

        self.motion.advance();
        self.motion.correct(&candidate.bbox);
        self.bbox = self.motion.estimate();

        let t = frame_id as f32;
        self.keypoints = candidate
            .keypoints
            .iter()
            .zip(&mut self.smoothers)
            .map(|(k, smoother)| {
                let (x, y) = smoother.update(k.x, k.y, t);
                Keypoint::new(x, y, k.score)
            })
            .collect();

        self.missing = 0;
        self.push_history(frame_id, params.track_history_size);
    }

    /// No candidate this frame: coast on the motion model and keep the last
    /// observed keypoints
    pub fn mark_missed(&mut self, frame_id: u64, params: &TrackerParams) {
        self.motion.advance();
        self.missing += 1;
        self.bbox = self.motion.estimate();
        self.push_history(frame_id, params.track_history_size);
    }

    pub fn result(&self) -> TrackResult {
        TrackResult {
            track_id: self.id,
            bbox: self.bbox,
            keypoints: self.keypoints.clone(),
        }
    }

    pub fn history(&self) -> &VecDeque<TrackSnapshot> {
        &self.history
    }

    fn push_history(&mut self, frame_id: u64, cap: usize) {
        while self.history.len() >= cap.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(TrackSnapshot {
            frame_id,
            bbox: self.bbox,
            keypoints: self.keypoints.clone(),
        });
    }
}
