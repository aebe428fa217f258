//! End-to-end tracking scenarios over scripted models

use approx::assert_abs_diff_eq;
use posetrack::{Bbox, DetectMode, Detection, Frame, TrackerParams};
use posetrack_pipeline::{ApplyItem, Session, TrackError};
use posetrack_pipeline::stub::{ScriptedDetector, ScriptedPoseEstimator};

fn detection(bbox: Bbox) -> Detection {
    Detection {
        bbox,
        score: 0.9,
        label: 0,
    }
}

fn pose_stub() -> ScriptedPoseEstimator {
    ScriptedPoseEstimator::new(5, 0.9).with_shrink(1.0 / 1.25)
}

#[test]
fn stable_subject_keeps_one_track_across_frames() {
    let bbox = Bbox::new(10.0, 10.0, 50.0, 50.0);
    let detector = ScriptedDetector::new(vec![vec![detection(bbox)]; 6]);
    let mut session = Session::new(Box::new(detector), Box::new(pose_stub()));
    let state = session.create_state(&TrackerParams::default()).unwrap();
    let frame = Frame::empty(640, 480);

    let mut last = Vec::new();
    for _ in 0..6 {
        last = session.step(state, &frame, DetectMode::Auto).unwrap();
    }
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].track_id, 1);
    assert_abs_diff_eq!(last[0].bbox.center_x(), 30.0, epsilon = 0.5);
    assert_eq!(last[0].keypoints.len(), 5);
    // smoothed keypoints converge onto the static observation
    assert_abs_diff_eq!(last[0].keypoints[0].x, 10.0, epsilon = 0.1);
    assert_abs_diff_eq!(last[0].keypoints[4].y, 50.0, epsilon = 0.1);
}

#[test]
fn track_survives_short_occlusion_then_dies() {
    let bbox = Bbox::new(10.0, 10.0, 50.0, 50.0);
    let mut script = vec![vec![detection(bbox)]];
    script.extend(vec![Vec::new(); 4]);
    let detector = ScriptedDetector::new(script);
    let mut session = Session::new(Box::new(detector), Box::new(pose_stub()));
    let params = TrackerParams {
        track_max_missing: 2,
        ..Default::default()
    };
    let state = session.create_state(&params).unwrap();
    let frame = Frame::empty(640, 480);

    let born = session.step(state, &frame, DetectMode::Auto).unwrap();
    assert_eq!(born.len(), 1);

    // coasting on predictions for two frames, gone on the third
    let miss1 = session.step(state, &frame, DetectMode::Auto).unwrap();
    assert_eq!(miss1.len(), 1);
    let miss2 = session.step(state, &frame, DetectMode::Auto).unwrap();
    assert_eq!(miss2.len(), 1);
    let miss3 = session.step(state, &frame, DetectMode::Auto).unwrap();
    assert!(miss3.is_empty());
}

#[test]
fn skip_mode_suppresses_detection_entirely() {
    let bbox = Bbox::new(10.0, 10.0, 50.0, 50.0);
    let detector = ScriptedDetector::new(vec![vec![detection(bbox)]; 4]);
    let mut session = Session::new(Box::new(detector), Box::new(pose_stub()));
    let state = session.create_state(&TrackerParams::default()).unwrap();
    let frame = Frame::empty(640, 480);

    // establish a track, then skip: the track coasts on predictions
    session.step(state, &frame, DetectMode::Auto).unwrap();
    let skipped = session.step(state, &frame, DetectMode::Skip).unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].track_id, 1);
}

#[test]
fn interval_frames_emit_motion_predictions() {
    // subject moving +4 px per frame in x; detection runs on frames 0 and 4
    // only, so the script holds the subject's position at those frames
    let step_px = 4.0;
    let script: Vec<Vec<Detection>> = (0..2)
        .map(|call| {
            let offset = (call * 4) as f32 * step_px;
            vec![detection(Bbox::new(
                10.0 + offset,
                10.0,
                50.0 + offset,
                50.0,
            ))]
        })
        .collect();
    let detector = ScriptedDetector::new(script);
    let mut session = Session::new(Box::new(detector), Box::new(pose_stub()));
    let params = TrackerParams {
        det_interval: 4,
        ..Default::default()
    };
    let state = session.create_state(&params).unwrap();
    let frame = Frame::empty(640, 480);

    let mut centers = Vec::new();
    for _ in 0..8 {
        let results = session.step(state, &frame, DetectMode::Auto).unwrap();
        assert_eq!(results.len(), 1);
        centers.push(results[0].bbox.center_x());
    }
    // the track follows the moving subject even on propagated frames
    for pair in centers.windows(2) {
        assert!(pair[1] >= pair[0] - 0.5);
    }
    assert!(centers[7] > centers[0] + 3.0 * step_px);
}

#[test]
fn one_failing_frame_does_not_poison_the_batch() {
    let bbox = Bbox::new(10.0, 10.0, 50.0, 50.0);
    let detector = ScriptedDetector::new(vec![vec![detection(bbox)]; 4]).fail_on_call(0);
    let mut session = Session::new(Box::new(detector), Box::new(pose_stub()));
    let a = session.create_state(&TrackerParams::default()).unwrap();
    let b = session.create_state(&TrackerParams::default()).unwrap();
    let frame = Frame::empty(640, 480);

    let items = [
        ApplyItem {
            state: a,
            frame: &frame,
            mode: DetectMode::Auto,
        },
        ApplyItem {
            state: b,
            frame: &frame,
            mode: DetectMode::Auto,
        },
    ];
    let results = session.apply(&items);
    assert_eq!(results.len(), 2);
    assert!(matches!(results[0], Err(TrackError::Inference(_))));
    assert_eq!(results[1].as_ref().unwrap().len(), 1);

    // the failed state kept its last-good (empty) track set and can retry
    let retry = session.step(a, &frame, DetectMode::Auto).unwrap();
    assert_eq!(retry.len(), 1);
}

#[test]
fn params_round_trip_through_json() {
    let params = TrackerParams {
        det_interval: 3,
        keypoint_sigmas: vec![0.025, 0.035, 0.05],
        track_max_missing: 5,
        ..Default::default()
    };
    let json = serde_json::to_string(&params).unwrap();
    let back: TrackerParams = serde_json::from_str(&json).unwrap();
    assert_eq!(params, back);
}
