//! Demo: track two scripted subjects across 30 frames
//!
//! Runs the full session loop over deterministic stub models and prints the
//! per-frame track snapshots. Run with `RUST_LOG=debug` to see the
//! detect-vs-propagate decisions.

use posetrack::{Bbox, DetectMode, Detection, Frame, TrackerParams};
use posetrack_pipeline::stub::{ScriptedDetector, ScriptedPoseEstimator};
use posetrack_pipeline::Session;

fn main() {
    env_logger::init();
    posetrack_pipeline::init();

    let n_frames = 30;

    // subject A walks right, subject B leaves the scene after frame 14
    let script: Vec<Vec<Detection>> = (0..n_frames)
        .map(|frame| {
            let offset = frame as f32 * 3.0;
            let mut detections = vec![Detection {
                bbox: Bbox::new(20.0 + offset, 40.0, 80.0 + offset, 180.0),
                score: 0.92,
                label: 0,
            }];
            if frame < 15 {
                detections.push(Detection {
                    bbox: Bbox::new(400.0, 60.0, 470.0, 200.0),
                    score: 0.85,
                    label: 0,
                });
            }
            detections
        })
        .collect();

    let detector = ScriptedDetector::new(script);
    let pose = ScriptedPoseEstimator::new(17, 0.9).with_shrink(1.0 / 1.25);
    let mut session = Session::new(Box::new(detector), Box::new(pose));

    let params = TrackerParams {
        det_interval: 5,
        track_max_missing: 3,
        ..Default::default()
    };
    let state = session.create_state(&params).expect("valid params");

    let frame = Frame::empty(640, 360);
    for i in 0..n_frames {
        match session.step(state, &frame, DetectMode::Auto) {
            Ok(targets) => {
                let summary: Vec<String> = targets
                    .iter()
                    .map(|t| format!("#{} {}", t.track_id, t.bbox))
                    .collect();
                println!("frame {:2}: {}", i, summary.join("  "));
            }
            Err(e) => eprintln!("frame {i} failed: {e}"),
        }
    }
}
