//! Adaptive low-pass smoothing for keypoint trajectories
//!
//! One-euro style filter: exponential smoothing on both the signal and its
//! derivative, with the effective cutoff frequency rising with estimated
//! signal speed. Fast motion is tracked tightly, near-static jitter is
//! suppressed.

/// Internal state after at least one sample has been seen
#[derive(Debug, Clone, Copy)]
struct FilterState {
    x_prev: f32,
    dx_prev: f32,
    t_prev: f32,
}

/// Single-channel one-euro filter
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    min_cutoff: f32,
    beta: f32,
    derivative_cutoff: f32,
    state: Option<FilterState>,
}

fn smoothing_factor(dt: f32, cutoff: f32) -> f32 {
    let r = 2.0 * std::f32::consts::PI * cutoff * dt;
    r / (r + 1.0)
}

impl OneEuroFilter {
    pub fn new(min_cutoff: f32, beta: f32, derivative_cutoff: f32) -> Self {
        Self {
            min_cutoff,
            beta,
            derivative_cutoff,
            state: None,
        }
    }

    /// Filter one sample observed at time `t` (frame units).
    ///
    /// The first sample passes through unmodified and seeds the state with
    /// a zero derivative. Zero or negative elapsed time is treated as "no
    /// update": the previous filtered value is returned and no state
    /// changes, so the call is idempotent at a fixed timestamp.
    pub fn update(&mut self, raw: f32, t: f32) -> f32 {
        let state = match self.state {
            None => {
                self.state = Some(FilterState {
                    x_prev: raw,
                    dx_prev: 0.0,
                    t_prev: t,
                });
                return raw;
            }
            Some(state) => state,
        };

        let dt = t - state.t_prev;
        if dt <= 0.0 {
            return state.x_prev;
        }

        let dx = (raw - state.x_prev) / dt;
        let a_d = smoothing_factor(dt, self.derivative_cutoff);
        let dx_hat = a_d * dx + (1.0 - a_d) * state.dx_prev;

        let cutoff = self.min_cutoff + self.beta * dx_hat.abs();
        let a = smoothing_factor(dt, cutoff);
        let x_hat = a * raw + (1.0 - a) * state.x_prev;

        self.state = Some(FilterState {
            x_prev: x_hat,
            dx_prev: dx_hat,
            t_prev: t,
        });
        x_hat
    }
}

/// Paired x/y filters for one keypoint
#[derive(Debug, Clone)]
pub struct KeypointSmoother {
    fx: OneEuroFilter,
    fy: OneEuroFilter,
}

impl KeypointSmoother {
    pub fn new(min_cutoff: f32, beta: f32, derivative_cutoff: f32) -> Self {
        Self {
            fx: OneEuroFilter::new(min_cutoff, beta, derivative_cutoff),
            fy: OneEuroFilter::new(min_cutoff, beta, derivative_cutoff),
        }
    }

    pub fn update(&mut self, x: f32, y: f32, t: f32) -> (f32, f32) {
        (self.fx.update(x, t), self.fy.update(y, t))
    }
}
