//! Polygon measurement tool.
//!
//! Points accumulate in canvas pixel space. The tool moves through three
//! phases: [`MeasurePhase::Empty`], [`MeasurePhase::Open`] and
//! [`MeasurePhase::Closed`]. Real-world values are derived on demand from a
//! pixels-per-meter scale, so the same point list can be re-evaluated against
//! the scale a saved [`Measurement`] was captured with.

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Point;
use crate::model::{FloorPlanId, Measurement};

/// Close-click radius in screen pixels; divided by the zoom to get canvas pixels.
pub const CLOSE_THRESHOLD_PX: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurePhase {
    Empty,
    Open,
    Closed,
}

/// What a click did to the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A point was appended at this index.
    Added(usize),
    /// The click landed on the first point and closed the polygon.
    Closed,
    /// The polygon is closed; nothing changed.
    Ignored,
}

/// What an undo did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UndoOutcome {
    /// The last point was removed; `reopened` is set when the polygon had been closed.
    Removed { point: Point, reopened: bool },
    Nothing,
}

/// One edge of the measured path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub pixels: f64,
    pub meters: f64,
    /// True for the edge from the last point back to the first.
    pub closing: bool,
}

impl Segment {
    pub fn midpoint(&self) -> Point {
        self.start.midpoint(&self.end)
    }
}

/// Interior angle at a vertex, in degrees within `[0, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexAngle {
    pub index: usize,
    pub vertex: Point,
    pub degrees: f64,
}

/// Everything derived from the current point list at a given scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureSummary {
    pub segments: Vec<Segment>,
    pub total_distance: f64,
    pub area: Option<f64>,
    pub angles: Vec<VertexAngle>,
}

/// The measurement state machine.
#[derive(Debug, Clone, Default)]
pub struct MeasureTool {
    points: Vec<Point>,
    closed: bool,
}

impl MeasureTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> MeasurePhase {
        if self.closed {
            MeasurePhase::Closed
        } else if self.points.is_empty() {
            MeasurePhase::Empty
        } else {
            MeasurePhase::Open
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Handle a measurement click at canvas position `p` under `zoom`.
    pub fn click(&mut self, p: Point, zoom: f64) -> ClickOutcome {
        self.click_within(p, CLOSE_THRESHOLD_PX / zoom.max(f64::MIN_POSITIVE))
    }

    /// Like [`MeasureTool::click`] with an explicit close radius in canvas pixels.
    pub fn click_within(&mut self, p: Point, threshold: f64) -> ClickOutcome {
        if self.closed {
            return ClickOutcome::Ignored;
        }
        if self.points.len() >= 3 && p.distance_to(&self.points[0]) <= threshold {
            self.closed = true;
            debug!("measurement polygon closed with {} points", self.points.len());
            return ClickOutcome::Closed;
        }
        self.points.push(p);
        ClickOutcome::Added(self.points.len() - 1)
    }

    /// Remove the most recently added point. A closed polygon reopens.
    pub fn undo(&mut self) -> UndoOutcome {
        let Some(point) = self.points.pop() else {
            return UndoOutcome::Nothing;
        };
        let reopened = std::mem::take(&mut self.closed);
        if reopened {
            debug!("measurement polygon reopened, {} points left", self.points.len());
        }
        UndoOutcome::Removed { point, reopened }
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.closed = false;
    }

    /// Replace the state with an externally supplied point list.
    ///
    /// A closed flag on fewer than three points is dropped; the returned value
    /// is the closed flag actually applied.
    pub fn set_points(&mut self, points: Vec<Point>, closed: bool) -> bool {
        self.closed = closed && points.len() >= 3;
        self.points = points;
        self.closed
    }

    /// Transient segment from the last point to the pointer, only while open.
    pub fn preview(&self, pointer: Point) -> Option<(Point, Point)> {
        if self.closed {
            return None;
        }
        self.points.last().map(|last| (*last, pointer))
    }

    pub fn summary(&self, pixels_per_meter: f64) -> MeasureSummary {
        summarize(&self.points, self.closed, pixels_per_meter)
    }

    /// Build a record for the host to persist.
    pub fn to_record(
        &self,
        floor_plan_id: FloorPlanId,
        pixels_per_meter: f64,
        category: &str,
    ) -> Option<Measurement> {
        if self.points.len() < 2 {
            return None;
        }
        let summary = self.summary(pixels_per_meter);
        Some(Measurement {
            id: Uuid::new_v4(),
            floor_plan_id,
            points: self.points.clone(),
            scale: pixels_per_meter,
            is_closed: self.closed,
            total_distance: summary.total_distance,
            area: summary.area,
            category: category.to_string(),
            label: None,
        })
    }

    /// Re-seed from a saved record.
    pub fn load(&mut self, record: &Measurement) {
        self.set_points(record.points.clone(), record.is_closed);
    }
}

/// Edges of the path, with the closing edge appended when `closed`.
pub fn segments(points: &[Point], closed: bool, pixels_per_meter: f64) -> Vec<Segment> {
    let mut out: Vec<Segment> = points
        .windows(2)
        .map(|w| make_segment(w[0], w[1], pixels_per_meter, false))
        .collect();
    if closed && points.len() >= 3 {
        if let (Some(last), Some(first)) = (points.last(), points.first()) {
            out.push(make_segment(*last, *first, pixels_per_meter, true));
        }
    }
    out
}

fn make_segment(start: Point, end: Point, pixels_per_meter: f64, closing: bool) -> Segment {
    let pixels = start.distance_to(&end);
    Segment {
        start,
        end,
        pixels,
        meters: pixels / pixels_per_meter,
        closing,
    }
}

/// Shoelace area in square canvas pixels.
pub fn shoelace_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum.abs() / 2.0
}

/// Polygon area in square meters.
pub fn polygon_area(points: &[Point], pixels_per_meter: f64) -> f64 {
    shoelace_area(points) / (pixels_per_meter * pixels_per_meter)
}

/// Interior angle at `v` between the rays towards `prev` and `next`.
pub fn interior_angle(prev: Point, v: Point, next: Point) -> f64 {
    let a = v.angle_to(&prev);
    let b = v.angle_to(&next);
    let diff = crate::geometry::normalize_degrees((a - b).to_degrees());
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Angles at every vertex of a closed polygon, or at interior vertices of an
/// open polyline.
pub fn vertex_angles(points: &[Point], closed: bool) -> Vec<VertexAngle> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    let angle_at = |i: usize, prev: usize, next: usize| VertexAngle {
        index: i,
        vertex: points[i],
        degrees: interior_angle(points[prev], points[i], points[next]),
    };
    if closed {
        (0..n).map(|i| angle_at(i, (i + n - 1) % n, (i + 1) % n)).collect()
    } else {
        (1..n - 1).map(|i| angle_at(i, i - 1, i + 1)).collect()
    }
}

pub fn summarize(points: &[Point], closed: bool, pixels_per_meter: f64) -> MeasureSummary {
    let segments = segments(points, closed, pixels_per_meter);
    let total_distance = segments.iter().map(|s| s.meters).sum();
    let area = (closed && points.len() >= 3).then(|| polygon_area(points, pixels_per_meter));
    MeasureSummary {
        segments,
        total_distance,
        area,
        angles: vertex_angles(points, closed),
    }
}

impl Measurement {
    /// Values derived from this record's own pinned scale.
    pub fn summary(&self) -> MeasureSummary {
        summarize(&self.points, self.is_closed, self.scale)
    }
}
