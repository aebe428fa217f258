//! Bounding box operations, IoU calculations and greedy NMS

use ndarray::prelude::*;
use rayon::prelude::*;
use std::fmt;

/// Axis-aligned bounding box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bbox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl Bbox {
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center_x(&self) -> f32 {
        (self.xmin + self.xmax) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.ymin + self.ymax) / 2.0
    }

    /// Length of the shorter side, used for minimum-size filtering
    pub fn min_side(&self) -> f32 {
        self.width().min(self.height())
    }

    /// Box has positive extent and finite coordinates
    pub fn is_valid(&self) -> bool {
        self.xmin < self.xmax
            && self.ymin < self.ymax
            && [self.xmin, self.ymin, self.xmax, self.ymax]
                .iter()
                .all(|v| v.is_finite())
    }

    /// Scale the box about its center, e.g. to expand a pose crop region
    pub fn expand(&self, scale: f32) -> Self {
        let half_w = self.width() * scale / 2.0;
        let half_h = self.height() * scale / 2.0;
        Self {
            xmin: self.center_x() - half_w,
            ymin: self.center_y() - half_h,
            xmax: self.center_x() + half_w,
            ymax: self.center_y() + half_h,
        }
    }

    /// Convert to center format [center_x, center_y, aspect_ratio, height]
    /// used by the motion model's state vector
    pub fn to_cah(&self) -> [f32; 4] {
        let h = self.height();
        let aspect = if h != 0.0 { self.width() / h } else { 1.0 };
        [self.center_x(), self.center_y(), aspect, h]
    }

    /// Create from center format [center_x, center_y, aspect_ratio, height]
    pub fn from_cah(cah: &[f32; 4]) -> Self {
        let [cx, cy, aspect, h] = *cah;
        let w = aspect * h;
        Self {
            xmin: cx - w / 2.0,
            ymin: cy - h / 2.0,
            xmax: cx + w / 2.0,
            ymax: cy + h / 2.0,
        }
    }
}

impl fmt::Display for Bbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bbox({:.1}, {:.1}, {:.1}, {:.1})",
            self.xmin, self.ymin, self.xmax, self.ymax
        )
    }
}

/// Calculate IoU between two bounding boxes
pub fn iou(a: &Bbox, b: &Bbox) -> f32 {
    let x1 = a.xmin.max(b.xmin);
    let y1 = a.ymin.max(b.ymin);
    let x2 = a.xmax.min(b.xmax);
    let y2 = a.ymax.min(b.ymax);

    if x2 <= x1 || y2 <= y1 {
        return 0.0;
    }

    let intersection = (x2 - x1) * (y2 - y1);
    let union = a.area() + b.area() - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Compute the (rows.len(), cols.len()) IoU matrix with parallel processing
pub fn ious(rows: &[Bbox], cols: &[Bbox]) -> Array2<f32> {
    if rows.is_empty() || cols.is_empty() {
        return Array2::zeros((rows.len(), cols.len()));
    }

    let data: Vec<f32> = rows
        .par_iter()
        .flat_map(|r| cols.iter().map(|c| iou(r, c)).collect::<Vec<_>>())
        .collect();

    Array2::from_shape_vec((rows.len(), cols.len()), data).unwrap()
}

/// Classic greedy IoU suppression: highest score first, drop any box whose
/// IoU with an already kept box exceeds `iou_thr`. Returns kept indices.
pub fn greedy_nms(boxes: &[Bbox], scores: &[f32], iou_thr: f32) -> Vec<usize> {
    debug_assert_eq!(boxes.len(), scores.len());

    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; boxes.len()];

    for &i in &order {
        if suppressed[i] {
            continue;
        }
        keep.push(i);
        for &j in &order {
            if !suppressed[j] && j != i && iou(&boxes[i], &boxes[j]) > iou_thr {
                suppressed[j] = true;
            }
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bbox_properties() {
        let bbox = Bbox::new(0.0, 0.0, 10.0, 5.0);
        assert_eq!(bbox.width(), 10.0);
        assert_eq!(bbox.height(), 5.0);
        assert_eq!(bbox.area(), 50.0);
        assert_eq!(bbox.center_x(), 5.0);
        assert_eq!(bbox.center_y(), 2.5);
        assert_eq!(bbox.min_side(), 5.0);
        assert!(bbox.is_valid());
    }

    #[test]
    fn test_invalid_bbox() {
        assert!(!Bbox::new(10.0, 0.0, 0.0, 5.0).is_valid());
        assert!(!Bbox::new(0.0, 0.0, f32::NAN, 5.0).is_valid());
    }

    #[test]
    fn test_expand_preserves_center() {
        let bbox = Bbox::new(10.0, 10.0, 50.0, 50.0);
        let expanded = bbox.expand(1.25);
        assert_abs_diff_eq!(expanded.center_x(), bbox.center_x(), epsilon = 1e-5);
        assert_abs_diff_eq!(expanded.center_y(), bbox.center_y(), epsilon = 1e-5);
        assert_abs_diff_eq!(expanded.width(), 50.0, epsilon = 1e-5);
    }

    #[test]
    fn test_iou_calculation() {
        let a = Bbox::new(0.0, 0.0, 10.0, 10.0);
        let b = Bbox::new(5.0, 5.0, 15.0, 15.0);
        assert_abs_diff_eq!(iou(&a, &b), 25.0 / 175.0, epsilon = 0.001);
        assert_abs_diff_eq!(iou(&a, &a), 1.0, epsilon = 1e-6);

        let c = Bbox::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(iou(&a, &c), 0.0);
    }

    #[test]
    fn test_iou_matrix_shape() {
        let rows = vec![Bbox::new(0.0, 0.0, 10.0, 10.0)];
        let cols = vec![
            Bbox::new(0.0, 0.0, 10.0, 10.0),
            Bbox::new(100.0, 100.0, 110.0, 110.0),
        ];
        let m = ious(&rows, &cols);
        assert_eq!(m.shape(), &[1, 2]);
        assert_abs_diff_eq!(m[[0, 0]], 1.0, epsilon = 1e-6);
        assert_eq!(m[[0, 1]], 0.0);

        assert_eq!(ious(&[], &cols).shape(), &[0, 2]);
    }

    #[test]
    fn test_cah_round_trip() {
        let bbox = Bbox::new(10.0, 20.0, 30.0, 60.0);
        let back = Bbox::from_cah(&bbox.to_cah());
        assert_abs_diff_eq!(bbox.xmin, back.xmin, epsilon = 0.001);
        assert_abs_diff_eq!(bbox.ymin, back.ymin, epsilon = 0.001);
        assert_abs_diff_eq!(bbox.xmax, back.xmax, epsilon = 0.001);
        assert_abs_diff_eq!(bbox.ymax, back.ymax, epsilon = 0.001);
    }

    #[test]
    fn test_greedy_nms_suppresses_overlap() {
        let boxes = vec![
            Bbox::new(0.0, 0.0, 10.0, 10.0),
            Bbox::new(1.0, 1.0, 11.0, 11.0),
            Bbox::new(50.0, 50.0, 60.0, 60.0),
        ];
        let scores = vec![0.6, 0.9, 0.7];
        let keep = greedy_nms(&boxes, &scores, 0.5);
        // highest score wins, far-away box survives
        assert_eq!(keep, vec![1, 2]);
    }

    #[test]
    fn test_greedy_nms_empty() {
        assert!(greedy_nms(&[], &[], 0.5).is_empty());
    }
}
