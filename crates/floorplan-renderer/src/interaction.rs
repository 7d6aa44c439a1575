//! Pointer gesture and hover state owned by the canvas.

use floorplan_core::geometry::Point;
use floorplan_core::model::PlacementId;
use floorplan_core::spatial::MarkerKey;

use crate::markers::Corner;
use crate::timing::Debounce;

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
}

/// The gesture in progress between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Dragging the background pans the view. `last` is in screen pixels and
    /// `travel` accumulates distance so a press without movement reads as a click.
    Pan { last: Point, travel: f64 },
    /// Moving a marker; `offset` is marker center minus grab point, canvas pixels.
    Move {
        key: MarkerKey,
        offset: Point,
        center: Point,
    },
    Rotate {
        key: MarkerKey,
        center: Point,
        angle: f64,
    },
    /// Resizing a rack; `rotation` maps pointer deltas onto the rack's axes.
    Resize {
        rack: PlacementId,
        corner: Corner,
        rotation: f64,
        origin: Point,
        start: (f64, f64),
        size: (f64, f64),
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// Marker being dragged, if any.
    pub fn dragged(&self) -> Option<MarkerKey> {
        match self {
            Gesture::Move { key, .. } | Gesture::Rotate { key, .. } => Some(*key),
            Gesture::Resize { rack, .. } => Some(MarkerKey::Rack(*rack)),
            _ => None,
        }
    }
}

/// What the hover tracker wants the host to know.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverSignal {
    Show { key: MarkerKey, screen: Point },
    End,
}

/// Delayed tooltip for the marker under the pointer.
#[derive(Debug, Clone)]
pub struct HoverTracker {
    target: Option<MarkerKey>,
    screen: Point,
    delay: Debounce,
    shown: bool,
}

impl HoverTracker {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            target: None,
            screen: Point::ORIGIN,
            delay: Debounce::new(delay_ms),
            shown: false,
        }
    }

    pub fn target(&self) -> Option<MarkerKey> {
        self.target
    }

    /// Feed the marker currently under the pointer.
    pub fn update(&mut self, hit: Option<MarkerKey>, screen: Point) -> Option<HoverSignal> {
        self.screen = screen;
        if hit == self.target {
            return None;
        }
        let ended = self.leave();
        self.target = hit;
        if hit.is_some() {
            self.delay.arm();
        }
        ended
    }

    /// Drop the current target; reports an end if a tooltip was showing.
    pub fn leave(&mut self) -> Option<HoverSignal> {
        self.delay.cancel();
        self.target = None;
        if std::mem::take(&mut self.shown) {
            Some(HoverSignal::End)
        } else {
            None
        }
    }

    pub fn tick(&mut self, dt_ms: f64) -> Option<HoverSignal> {
        if !self.delay.tick(dt_ms) {
            return None;
        }
        let key = self.target?;
        self.shown = true;
        Some(HoverSignal::Show {
            key,
            screen: self.screen,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_hover_fires_after_delay() {
        let key = MarkerKey::Equipment(Uuid::new_v4());
        let mut hover = HoverTracker::new(300.0);
        assert_eq!(hover.update(Some(key), Point::new(5.0, 5.0)), None);
        assert_eq!(hover.tick(200.0), None);
        hover.update(Some(key), Point::new(7.0, 6.0));
        assert_eq!(
            hover.tick(100.0),
            Some(HoverSignal::Show {
                key,
                screen: Point::new(7.0, 6.0)
            })
        );
        assert_eq!(hover.update(None, Point::new(90.0, 90.0)), Some(HoverSignal::End));
        assert_eq!(hover.tick(1000.0), None);
    }

    #[test]
    fn test_hover_cancelled_when_leaving_early() {
        let key = MarkerKey::Rack(Uuid::new_v4());
        let mut hover = HoverTracker::new(300.0);
        hover.update(Some(key), Point::ORIGIN);
        hover.tick(150.0);
        assert_eq!(hover.update(None, Point::ORIGIN), None);
        assert_eq!(hover.tick(500.0), None);
    }

    #[test]
    fn test_moving_between_markers_restarts_delay() {
        let a = MarkerKey::Equipment(Uuid::new_v4());
        let b = MarkerKey::Equipment(Uuid::new_v4());
        let mut hover = HoverTracker::new(300.0);
        hover.update(Some(a), Point::ORIGIN);
        assert!(hover.tick(300.0).is_some());
        assert_eq!(hover.update(Some(b), Point::ORIGIN), Some(HoverSignal::End));
        assert_eq!(hover.tick(299.0), None);
        assert!(matches!(hover.tick(1.0), Some(HoverSignal::Show { key, .. }) if key == b));
    }

    #[test]
    fn test_gesture_dragged_key() {
        let id = Uuid::new_v4();
        let g = Gesture::Resize {
            rack: id,
            corner: Corner::TopLeft,
            rotation: 0.0,
            origin: Point::ORIGIN,
            start: (40.0, 40.0),
            size: (40.0, 40.0),
        };
        assert_eq!(g.dragged(), Some(MarkerKey::Rack(id)));
        assert!(Gesture::default().is_idle());
        let pan = Gesture::Pan {
            last: Point::ORIGIN,
            travel: 0.0,
        };
        assert_eq!(pan.dragged(), None);
    }
}
