//! Per-stream tracking state machine
//!
//! Owns all track state for one video stream and orchestrates the per-frame
//! pipeline: detect-or-propagate, candidate building, association, and
//! track lifecycle. `step` must be called once per incoming frame, in
//! strict temporal order.

use crate::associate::associate;
use crate::bbox::{greedy_nms, Bbox};
use crate::candidate::{pose_nms, Candidate};
use crate::models::{Detector, PoseEstimator};
use crate::params::TrackerParams;
use crate::track::Track;
use crate::types::{DetectMode, Detection, Frame, TrackResult};
use anyhow::Result;
use std::collections::BTreeMap;

/// Stateful frame-by-frame multi-target pose tracker for one stream
#[derive(Debug)]
pub struct PoseTracker {
    params: TrackerParams,
    tracks: BTreeMap<u32, Track>,
    frame_id: u64,
    next_track_id: u32,
}

impl PoseTracker {
    /// Build a tracker from a validated parameter set
    pub fn new(params: TrackerParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            tracks: BTreeMap::new(),
            frame_id: 0,
            next_track_id: 1,
        })
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    /// Frames processed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_id
    }

    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    fn should_detect(&self, mode: DetectMode) -> bool {
        match mode {
            DetectMode::Force => true,
            DetectMode::Skip => false,
            DetectMode::Auto => {
                self.frame_id % self.params.det_interval as u64 == 0 || self.tracks.is_empty()
            }
        }
    }

    /// Filter raw detections by label, score and size, then suppress
    /// overlaps; survivors become pose seed regions
    fn filter_detections(&self, detections: Vec<Detection>) -> Vec<Bbox> {
        let mut boxes = Vec::new();
        let mut scores = Vec::new();
        for det in detections {
            if self.params.det_label >= 0 && det.label != self.params.det_label {
                continue;
            }
            if det.score < self.params.det_thr || !det.bbox.is_valid() {
                continue;
            }
            if self.params.det_min_bbox_size >= 0.0
                && det.bbox.min_side() < self.params.det_min_bbox_size
            {
                continue;
            }
            boxes.push(det.bbox);
            scores.push(det.score);
        }

        greedy_nms(&boxes, &scores, self.params.det_nms_thr)
            .into_iter()
            .map(|i| boxes[i])
            .collect()
    }

    /// Advance the stream by one frame.
    ///
    /// All model calls complete before any track state is touched; if the
    /// detector or pose model fails the error propagates and the tracker
    /// stays in its last-good state, so the caller may retry the frame.
    pub fn step(
        &mut self,
        detector: &mut dyn Detector,
        pose_model: &mut dyn PoseEstimator,
        frame: &Frame,
        mode: DetectMode,
    ) -> Result<Vec<TrackResult>> {
        let run_detect = self.should_detect(mode);
        log::debug!(
            "frame {}: detect={}, live tracks={}",
            self.frame_id,
            run_detect,
            self.tracks.len()
        );

        let (track_ids, predicted_boxes): (Vec<u32>, Vec<Bbox>) = self
            .tracks
            .iter()
            .map(|(id, track)| (*id, track.predicted()))
            .unzip();

        let regions: Vec<Bbox> = if run_detect {
            self.filter_detections(detector.detect(frame)?)
        } else {
            predicted_boxes.clone()
        };

        let mut raw_candidates = Vec::new();
        for region in &regions {
            let crop = region.expand(self.params.pose_bbox_scale);
            let keypoints = pose_model.estimate(frame, &crop)?;
            if let Some(candidate) = Candidate::from_keypoints(keypoints, &self.params) {
                raw_candidates.push(candidate);
            }
        }
        let candidates = pose_nms(raw_candidates, &self.params);
        log::debug!(
            "frame {}: {} regions -> {} candidates",
            self.frame_id,
            regions.len(),
            candidates.len()
        );

        // model calls are done; mutate track state
        let frame_id = self.frame_id;
        let assoc = associate(
            &track_ids,
            &predicted_boxes,
            &candidates,
            self.params.track_iou_thr,
        );

        for (track_id, c_idx) in &assoc.matches {
            if let Some(track) = self.tracks.get_mut(track_id) {
                track.update(&candidates[*c_idx], frame_id, &self.params);
            }
        }
        for track_id in &assoc.unmatched_tracks {
            if let Some(track) = self.tracks.get_mut(track_id) {
                track.mark_missed(frame_id, &self.params);
            }
        }

        let max_missing = self.params.track_max_missing;
        self.tracks.retain(|id, track| {
            let keep = track.missing <= max_missing;
            if !keep {
                log::info!("track {} dropped after {} missed frames", id, track.missing);
            }
            keep
        });

        for c_idx in &assoc.unmatched_candidates {
            let id = self.next_track_id;
            self.next_track_id += 1;
            log::info!("track {} born at frame {}", id, frame_id);
            self.tracks
                .insert(id, Track::new(id, &candidates[*c_idx], frame_id, &self.params));
        }

        self.frame_id += 1;
        Ok(self.tracks.values().map(Track::result).collect())
    }
}
