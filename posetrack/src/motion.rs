//! Constant-velocity motion model for track boxes
//!
//! Kalman filter over `[cx, cy, aspect, h]` plus velocities, with process
//! and measurement noise scaled by box height through the configured
//! `std_weight_position` / `std_weight_velocity` weights. Time updates are
//! deferred: the model only counts elapsed frames until a correction
//! arrives, so `predict()` is a pure extrapolation and is idempotent
//! between observations.

use crate::bbox::Bbox;
use nalgebra::{SMatrix, SVector};

type State = SVector<f32, 8>;
type StateCov = SMatrix<f32, 8, 8>;
type Transition = SMatrix<f32, 8, 8>;
type Observation = SMatrix<f32, 4, 8>;
type Measurement = SVector<f32, 4>;
type MeasurementCov = SMatrix<f32, 4, 4>;

#[derive(Debug, Clone)]
pub struct MotionModel {
    /// State vector [cx, cy, aspect, h, vcx, vcy, va, vh]
    x: State,
    /// State covariance
    p: StateCov,
    std_weight_position: f32,
    std_weight_velocity: f32,
    /// Frames elapsed since the last correction
    steps_since_correct: u32,
}

impl MotionModel {
    /// Initialize from the first observed box: position taken directly,
    /// zero velocity with inflated initial uncertainty
    pub fn new(bbox: &Bbox, std_weight_position: f32, std_weight_velocity: f32) -> Self {
        let cah = bbox.to_cah();
        let mut x = State::zeros();
        x[0] = cah[0];
        x[1] = cah[1];
        x[2] = cah[2];
        x[3] = cah[3];

        let h = cah[3];
        let stds = [
            2.0 * std_weight_position * h,
            2.0 * std_weight_position * h,
            1e-2,
            2.0 * std_weight_position * h,
            10.0 * std_weight_velocity * h,
            10.0 * std_weight_velocity * h,
            1e-5,
            10.0 * std_weight_velocity * h,
        ];
        let mut p = StateCov::zeros();
        for (i, s) in stds.iter().enumerate() {
            p[(i, i)] = s * s;
        }

        Self {
            x,
            p,
            std_weight_position,
            std_weight_velocity,
            steps_since_correct: 0,
        }
    }

    fn transition() -> Transition {
        let mut f = Transition::identity();
        for i in 0..4 {
            f[(i, i + 4)] = 1.0;
        }
        f
    }

    /// Per-frame process noise, proportional to the current box scale
    fn process_noise(&self) -> StateCov {
        let h = self.x[3];
        let stds = [
            self.std_weight_position * h,
            self.std_weight_position * h,
            1e-2,
            self.std_weight_position * h,
            self.std_weight_velocity * h,
            self.std_weight_velocity * h,
            1e-5,
            self.std_weight_velocity * h,
        ];
        let mut q = StateCov::zeros();
        for (i, s) in stds.iter().enumerate() {
            q[(i, i)] = s * s;
        }
        q
    }

    fn time_update(&mut self) {
        let f = Self::transition();
        self.x = f * self.x;
        self.p = f * self.p * f.transpose() + self.process_noise();
    }

    /// Note one elapsed frame; called exactly once per `step`
    pub fn advance(&mut self) {
        self.steps_since_correct += 1;
    }

    pub fn steps_since_correct(&self) -> u32 {
        self.steps_since_correct
    }

    fn extrapolate(&self, horizon: f32) -> Bbox {
        // keep the height positive so the box stays well formed even after
        // long extrapolation
        let h = (self.x[3] + self.x[7] * horizon).max(1e-3);
        Bbox::from_cah(&[
            self.x[0] + self.x[4] * horizon,
            self.x[1] + self.x[5] * horizon,
            self.x[2] + self.x[6] * horizon,
            h,
        ])
    }

    /// Extrapolated box one frame past the elapsed count. Pure: repeated
    /// calls without an intervening `advance`/`correct` return the same box.
    pub fn predict(&self) -> Bbox {
        self.extrapolate((self.steps_since_correct + 1) as f32)
    }

    /// Box estimate at the current elapsed count: the posterior right after
    /// a correction, the extrapolation while the track is coasting
    pub fn estimate(&self) -> Bbox {
        self.extrapolate(self.steps_since_correct as f32)
    }

    /// Fuse an observed box: apply the deferred time updates for every
    /// elapsed frame, then the measurement update
    pub fn correct(&mut self, bbox: &Bbox) {
        for _ in 0..self.steps_since_correct {
            self.time_update();
        }
        self.steps_since_correct = 0;

        let cah = bbox.to_cah();
        let z = Measurement::from_column_slice(&cah);

        let mut h_mat = Observation::zeros();
        for i in 0..4 {
            h_mat[(i, i)] = 1.0;
        }

        let h = cah[3];
        let meas_stds = [
            self.std_weight_position * h,
            self.std_weight_position * h,
            1e-1,
            self.std_weight_position * h,
        ];
        let mut r = MeasurementCov::zeros();
        for (i, s) in meas_stds.iter().enumerate() {
            r[(i, i)] = s * s;
        }

        let s = h_mat * self.p * h_mat.transpose() + r;
        let Some(s_inv) = s.try_inverse() else {
            log::warn!("innovation covariance not invertible, skipping correction");
            return;
        };
        let k = self.p * h_mat.transpose() * s_inv;
        let y = z - h_mat * self.x;
        self.x += k * y;
        self.p = (StateCov::identity() - k * h_mat) * self.p;
    }
}
