//! Session layer for multi-stream pose tracking
//!
//! Wraps the [`posetrack`] core with session and state management: one
//! [`Session`] owns a detector and a pose model, any number of per-stream
//! tracking states share them, and batched `apply` calls advance several
//! streams with per-item failure isolation.
//!
//! ```rust,ignore
//! use posetrack_pipeline::{Session, ApplyItem};
//! use posetrack::{DetectMode, TrackerParams};
//!
//! posetrack_pipeline::init();
//! let mut session = Session::new(detector, pose_model);
//! let state = session.create_state(&TrackerParams::default())?;
//! let targets = session.step(state, &frame, DetectMode::Auto)?;
//! ```

pub mod error;
pub mod session;
pub mod stub;

pub use error::{Result, TrackError};
pub use session::{ApplyItem, Session, StateId};

use std::sync::Once;

static INIT: Once = Once::new();

/// Process-wide initialization. Idempotent: only the first call has any
/// effect, later calls return immediately. There is deliberately no
/// load-time side effect anywhere in this crate.
pub fn init() {
    INIT.call_once(|| {
        log::info!("posetrack pipeline initialized (version {})", version());
    });
}

/// Crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
