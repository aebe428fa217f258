//! Shared type definitions for the pose tracking core

use crate::bbox::Bbox;
use serde::{Deserialize, Serialize};

/// One decoded video frame handed to the black-box models.
///
/// The tracking core never inspects pixels; decoding and color-space
/// handling happen upstream. `data` is whatever layout the models agreed on.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Frame carrier without pixel payload, enough for models that only
    /// need geometry (stubs, tests)
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: Vec::new(),
        }
    }
}

/// Raw detector output for one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: Bbox,
    pub score: f32,
    pub label: i32,
}

/// One pose keypoint with its confidence score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub score: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, score: f32) -> Self {
        Self { x, y, score }
    }
}

/// Per-frame detection policy for [`crate::PoseTracker::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectMode {
    /// Run detection on interval frames, or whenever no track is alive
    Auto,
    /// Always run detection this frame
    Force,
    /// Never run detection this frame, even if the interval elapsed;
    /// regions still come from motion-model predictions
    Skip,
}

/// Snapshot of one live track emitted by `step`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackResult {
    pub track_id: u32,
    pub bbox: Bbox,
    /// Smoothed keypoints; scores carry the last observed confidences
    pub keypoints: Vec<Keypoint>,
}
