//! Frame-driven timing primitives.
//!
//! Nothing here reads a clock. The host calls `tick(dt_ms)` from its frame
//! loop and every timer advances by that delta, which keeps the canvas
//! deterministic under test.

use std::f64::consts::TAU;

use floorplan_core::geometry::Point;
use floorplan_core::model::ViewState;

/// `1 − (1 − t)³`, with `t` clamped to `[0, 1]`.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// A one-shot delay that restarts whenever it is armed again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debounce {
    delay_ms: f64,
    remaining: Option<f64>,
}

impl Debounce {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            remaining: None,
        }
    }

    /// Start or restart the quiet period.
    pub fn arm(&mut self) {
        self.remaining = Some(self.delay_ms);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advance by `dt_ms`; returns true exactly once when the delay elapses.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        match self.remaining {
            Some(left) if left - dt_ms <= 0.0 => {
                self.remaining = None;
                true
            }
            Some(left) => {
                self.remaining = Some(left - dt_ms);
                false
            }
            None => false,
        }
    }
}

/// Animated transition of zoom and pan towards a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusAnimation {
    from: ViewState,
    to: ViewState,
    elapsed_ms: f64,
    duration_ms: f64,
}

impl FocusAnimation {
    pub fn new(from: ViewState, to: ViewState, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            elapsed_ms: 0.0,
            duration_ms,
        }
    }

    pub fn target(&self) -> ViewState {
        self.to
    }

    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance and return the interpolated view for this frame.
    pub fn advance(&mut self, dt_ms: f64) -> ViewState {
        self.elapsed_ms += dt_ms.max(0.0);
        let eased = ease_out_cubic(self.progress());
        let pan = Point::new(self.from.pan_x, self.from.pan_y)
            .lerp(&Point::new(self.to.pan_x, self.to.pan_y), eased);
        ViewState {
            scale: self.from.scale + (self.to.scale - self.from.scale) * eased,
            pan_x: pan.x,
            pan_y: pan.y,
        }
    }
}

/// Opacity oscillator for the focused-marker pulse, 1 s period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pulse {
    phase_ms: f64,
}

impl Pulse {
    pub const PERIOD_MS: f64 = 1000.0;

    pub fn tick(&mut self, dt_ms: f64) {
        self.phase_ms = (self.phase_ms + dt_ms).rem_euclid(Self::PERIOD_MS);
    }

    pub fn reset(&mut self) {
        self.phase_ms = 0.0;
    }

    /// `0.4 + 0.4 × sin(2π t)`, t in seconds.
    pub fn opacity(&self) -> f64 {
        pulse_opacity(self.phase_ms / 1000.0)
    }
}

pub fn pulse_opacity(t_seconds: f64) -> f64 {
    0.4 + 0.4 * (TAU * t_seconds).sin()
}
