//! Tracking sessions and per-stream states
//!
//! A [`Session`] owns one detector and one pose model; any number of
//! per-stream tracking states share them. States are addressed by opaque
//! [`StateId`]s instead of raw handles: destroying an unknown or
//! already-destroyed id is an error, never a crash, and dropping the
//! session releases everything.

use crate::error::{Result, TrackError};
use posetrack::{DetectMode, Detector, Frame, PoseEstimator, PoseTracker, TrackResult, TrackerParams};
use std::collections::BTreeMap;

/// Opaque identifier of one per-stream tracking state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u64);

impl StateId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// One (state, frame, mode) triple of a batched apply call
pub struct ApplyItem<'a> {
    pub state: StateId,
    pub frame: &'a Frame,
    pub mode: DetectMode,
}

/// One tracking session: loaded models plus the streams using them.
///
/// A session is a single-threaded state machine; advance distinct sessions
/// on separate workers, never one session from two threads at once.
pub struct Session {
    detector: Box<dyn Detector>,
    pose_model: Box<dyn PoseEstimator>,
    states: BTreeMap<StateId, PoseTracker>,
    next_state_id: u64,
}

impl Session {
    /// Create a session around the two black-box models
    pub fn new(detector: Box<dyn Detector>, pose_model: Box<dyn PoseEstimator>) -> Self {
        log::info!(
            "session created (detector: {}, pose model: {})",
            detector.name(),
            pose_model.name()
        );
        Self {
            detector,
            pose_model,
            states: BTreeMap::new(),
            next_state_id: 1,
        }
    }

    /// Create a tracking state for one independent video stream.
    ///
    /// The parameter set is validated first and copied into the state;
    /// later mutation of the caller's copy has no effect.
    pub fn create_state(&mut self, params: &TrackerParams) -> Result<StateId> {
        let tracker = PoseTracker::new(params.clone())
            .map_err(|e| TrackError::invalid_parameter(e.to_string()))?;
        let id = StateId(self.next_state_id);
        self.next_state_id += 1;
        self.states.insert(id, tracker);
        log::debug!("tracking state {} created", id.0);
        Ok(id)
    }

    /// Release one tracking state. Double release reports `InvalidHandle`
    /// and leaves every other state untouched.
    pub fn destroy_state(&mut self, id: StateId) -> Result<()> {
        match self.states.remove(&id) {
            Some(_) => {
                log::debug!("tracking state {} destroyed", id.0);
                Ok(())
            }
            None => Err(TrackError::InvalidHandle(id.0)),
        }
    }

    pub fn has_state(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Advance one stream by one frame
    pub fn step(
        &mut self,
        id: StateId,
        frame: &Frame,
        mode: DetectMode,
    ) -> Result<Vec<TrackResult>> {
        let tracker = self
            .states
            .get_mut(&id)
            .ok_or(TrackError::InvalidHandle(id.0))?;
        tracker
            .step(&mut *self.detector, &mut *self.pose_model, frame, mode)
            .map_err(|e| TrackError::inference(e.to_string()))
    }

    /// Batched step: exactly one result slot per input, in input order.
    ///
    /// Items succeed or fail independently; one failing frame never aborts
    /// its siblings. Zero items is a no-op, not an error.
    pub fn apply(&mut self, items: &[ApplyItem<'_>]) -> Vec<Result<Vec<TrackResult>>> {
        if items.is_empty() {
            log::debug!("apply called with zero frames");
            return Vec::new();
        }
        items
            .iter()
            .map(|item| self.step(item.state, item.frame, item.mode))
            .collect()
    }
}
