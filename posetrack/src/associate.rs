//! Candidate-to-track association
//!
//! Builds an IoU matrix between predicted track boxes and candidate boxes,
//! then matches greedily best-IoU-first, rejecting pairs below the
//! association threshold.

use crate::bbox::{ious, Bbox};
use crate::candidate::Candidate;

/// Outcome of one frame's association pass
#[derive(Debug, Clone)]
pub struct Association {
    /// Matched (track_id, candidate index) pairs
    pub matches: Vec<(u32, usize)>,
    /// Track ids with no candidate this frame
    pub unmatched_tracks: Vec<u32>,
    /// Candidate indices with no track, eligible for birth
    pub unmatched_candidates: Vec<usize>,
}

/// Match candidates to tracks by spatial overlap of the tracks' *predicted*
/// boxes. `track_ids` and `track_boxes` run in parallel.
pub fn associate(
    track_ids: &[u32],
    track_boxes: &[Bbox],
    candidates: &[Candidate],
    iou_thr: f32,
) -> Association {
    debug_assert_eq!(track_ids.len(), track_boxes.len());

    let candidate_boxes: Vec<Bbox> = candidates.iter().map(|c| c.bbox).collect();
    let overlap = ious(track_boxes, &candidate_boxes);

    // all pairs clearing the threshold, best overlap first
    let mut pairs: Vec<(f32, usize, usize)> = Vec::new();
    for t in 0..track_ids.len() {
        for c in 0..candidates.len() {
            let value = overlap[[t, c]];
            if value >= iou_thr {
                pairs.push((value, t, c));
            }
        }
    }
    pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut matches = Vec::new();
    let mut track_used = vec![false; track_ids.len()];
    let mut candidate_used = vec![false; candidates.len()];
    for (_, t, c) in pairs {
        if !track_used[t] && !candidate_used[c] {
            track_used[t] = true;
            candidate_used[c] = true;
            matches.push((track_ids[t], c));
        }
    }

    let unmatched_tracks = (0..track_ids.len())
        .filter(|&t| !track_used[t])
        .map(|t| track_ids[t])
        .collect();
    let unmatched_candidates = (0..candidates.len())
        .filter(|&c| !candidate_used[c])
        .collect();

    Association {
        matches,
        unmatched_tracks,
        unmatched_candidates,
    }
}
