use log::{debug, trace};
use serde::{Deserialize, Serialize};

use floorplan_core::geometry::{Point, Size};
use floorplan_core::model::ViewState;

use crate::config::CanvasConfig;
use crate::timing::{Debounce, FocusAnimation};

/// Wheel direction, one notch per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelDirection {
    In,
    Out,
}

impl WheelDirection {
    /// Browser convention: negative `delta_y` scrolls up, which zooms in.
    pub fn from_delta(delta_y: f64) -> Option<Self> {
        if delta_y < 0.0 {
            Some(WheelDirection::In)
        } else if delta_y > 0.0 {
            Some(WheelDirection::Out)
        } else {
            None
        }
    }
}

/// Result of advancing the viewport by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportTick {
    /// The transform moved this frame.
    pub moved: bool,
    /// View state that should be written to storage now.
    pub persist: Option<ViewState>,
}

/// Zoom and pan of the floor-plan canvas.
///
/// Screen pixels relate to canvas pixels by `screen = canvas × scale + pan`.
#[derive(Debug, Clone)]
pub struct ViewportController {
    scale: f64,
    pan: Point,
    min_zoom: f64,
    max_zoom: f64,
    wheel_step: f64,
    focus_zoom: f64,
    focus_duration_ms: f64,
    animation: Option<FocusAnimation>,
    persist: Debounce,
}

impl ViewportController {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            scale: 1.0,
            pan: Point::ORIGIN,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            wheel_step: config.wheel_step,
            focus_zoom: config.focus_zoom,
            focus_duration_ms: config.focus_duration_ms,
            animation: None,
            persist: Debounce::new(config.persist_debounce_ms),
        }
    }

    /// Apply a stored view without scheduling a write.
    pub fn restore(&mut self, state: ViewState) {
        self.scale = self.clamp_zoom(state.scale);
        self.pan = Point::new(finite_or_zero(state.pan_x), finite_or_zero(state.pan_y));
        self.animation = None;
        self.persist.cancel();
    }

    pub fn state(&self) -> ViewState {
        ViewState {
            scale: self.scale,
            pan_x: self.pan.x,
            pan_y: self.pan.y,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn has_pending_write(&self) -> bool {
        self.persist.is_pending()
    }

    fn clamp_zoom(&self, z: f64) -> f64 {
        if z.is_nan() {
            return 1.0_f64.clamp(self.min_zoom, self.max_zoom);
        }
        z.clamp(self.min_zoom, self.max_zoom)
    }

    fn touched(&mut self) {
        self.persist.arm();
    }

    /// One wheel notch anchored at a screen position.
    pub fn wheel(&mut self, pointer: Point, direction: WheelDirection) {
        let factor = match direction {
            WheelDirection::In => self.wheel_step,
            WheelDirection::Out => 1.0 / self.wheel_step,
        };
        self.zoom_at(pointer, factor);
    }

    /// Zoom by `factor` keeping the canvas point under `pointer` fixed.
    pub fn zoom_at(&mut self, pointer: Point, factor: f64) {
        if !(factor > 0.0) {
            return;
        }
        self.animation = None;
        let old_scale = self.scale;
        let new_scale = self.clamp_zoom(old_scale * factor);
        let anchor = Point::new(
            (pointer.x - self.pan.x) / old_scale,
            (pointer.y - self.pan.y) / old_scale,
        );
        self.pan = Point::new(
            pointer.x - anchor.x * new_scale,
            pointer.y - anchor.y * new_scale,
        );
        self.scale = new_scale;
        self.touched();
    }

    /// Set the zoom level directly; pan stays where it is.
    pub fn set_zoom(&mut self, z: f64) {
        self.animation = None;
        self.scale = self.clamp_zoom(z);
        self.touched();
    }

    /// Drag-to-pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.animation = None;
        self.pan = self.pan.translate(dx, dy);
        self.touched();
    }

    pub fn fit_to_view(&mut self) {
        self.animation = None;
        self.scale = self.clamp_zoom(1.0);
        self.pan = Point::ORIGIN;
        self.touched();
    }

    /// Like [`Self::fit_to_view`] but drops any pending write; the caller
    /// clears the stored state.
    pub fn reset_view(&mut self) {
        self.animation = None;
        self.scale = self.clamp_zoom(1.0);
        self.pan = Point::ORIGIN;
        self.persist.cancel();
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.scale,
            (screen.y - self.pan.y) / self.scale,
        )
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.scale + self.pan.x,
            canvas.y * self.scale + self.pan.y,
        )
    }

    /// View that puts `target` (canvas pixels) at the container center.
    pub fn centered_on(&self, target: Point, container: Size) -> ViewState {
        let scale = self.clamp_zoom(self.focus_zoom);
        ViewState {
            scale,
            pan_x: container.width / 2.0 - target.x * scale,
            pan_y: container.height / 2.0 - target.y * scale,
        }
    }

    /// Start animating towards `target`, replacing any running animation.
    pub fn focus_on(&mut self, target: Point, container: Size) {
        let to = self.centered_on(target, container);
        if self.animation.is_some() {
            debug!("focus animation superseded");
        }
        self.animation = Some(FocusAnimation::new(self.state(), to, self.focus_duration_ms));
        debug!(
            "focus on ({:.1}, {:.1}) -> scale {:.2}",
            target.x, target.y, to.scale
        );
    }

    pub fn cancel_animation(&mut self) {
        self.animation = None;
    }

    /// Advance animation and the persistence debounce by `dt_ms`.
    pub fn tick(&mut self, dt_ms: f64) -> ViewportTick {
        let mut out = ViewportTick::default();
        if let Some(anim) = self.animation.as_mut() {
            let view = anim.advance(dt_ms);
            let finished = anim.is_finished();
            self.scale = self.clamp_zoom(view.scale);
            self.pan = Point::new(view.pan_x, view.pan_y);
            out.moved = true;
            if finished {
                self.animation = None;
            }
            trace!("focus frame: scale {:.3}", self.scale);
            self.touched();
        }
        if self.persist.tick(dt_ms) {
            out.persist = Some(self.state());
        }
        out
    }

    /// Take a pending write immediately, e.g. on teardown.
    pub fn flush(&mut self) -> Option<ViewState> {
        if self.persist.is_pending() {
            self.persist.cancel();
            Some(self.state())
        } else {
            None
        }
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
