//! Frame-by-frame multi-target pose tracking core
//!
//! This crate fuses a periodic object detector and a per-candidate pose
//! estimator into one continuous tracking stream. The detector and pose
//! model are black boxes behind the traits in [`models`]; everything
//! algorithmic lives here: candidate filtering and NMS, IoU-based track
//! association, a constant-velocity motion model for frames where detection
//! is skipped, and adaptive per-keypoint smoothing.
//!
//! One [`PoseTracker`] corresponds to one independent video stream and must
//! be stepped once per incoming frame, in temporal order:
//!
//! ```rust,ignore
//! use posetrack::{PoseTracker, TrackerParams, DetectMode};
//!
//! let mut tracker = PoseTracker::new(TrackerParams::default())?;
//! let results = tracker.step(&mut detector, &mut pose_model, &frame, DetectMode::Auto)?;
//! for target in results {
//!     println!("track {} at {}", target.track_id, target.bbox);
//! }
//! ```

pub mod associate;
pub mod bbox;
pub mod candidate;
pub mod models;
pub mod motion;
pub mod params;
pub mod smoothing;
pub mod track;
pub mod tracker;
pub mod types;

pub use associate::{associate, Association};
pub use bbox::Bbox;
pub use candidate::Candidate;
pub use models::{Detector, PoseEstimator};
pub use motion::MotionModel;
pub use params::TrackerParams;
pub use smoothing::{KeypointSmoother, OneEuroFilter};
pub use track::Track;
pub use tracker::PoseTracker;
pub use types::{DetectMode, Detection, Frame, Keypoint, TrackResult};
