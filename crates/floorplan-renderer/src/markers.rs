//! Equipment and rack markers: sizing, handles, rotation, resize and the
//! per-marker visual state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use floorplan_core::coords::{normalized_to_pixel, percent_to_pixel};
use floorplan_core::geometry::{normalize_degrees, BBox, Bounds, Point};
use floorplan_core::model::{Connection, EquipmentId, EquipmentPosition, IconSize, RackPosition};

pub const MIN_COMPENSATION: f64 = 0.4;
pub const MAX_COMPENSATION: f64 = 2.5;

/// Gap between the top of a marker and its rotation handle, screen pixels.
pub const ROTATE_HANDLE_GAP: f64 = 18.0;
/// Radius of rotation and resize handles, screen pixels.
pub const HANDLE_RADIUS: f64 = 6.0;

/// Inverse-zoom factor applied to every decoration so it keeps a roughly
/// constant on-screen size: `clamp(1 / zoom, 0.4, 2.5)`.
pub fn compensated_scale(zoom: f64) -> f64 {
    if !(zoom > 0.0) {
        return MAX_COMPENSATION;
    }
    (1.0 / zoom).clamp(MIN_COMPENSATION, MAX_COMPENSATION)
}

/// Marker edge length in canvas pixels at the given zoom.
pub fn display_size(size: IconSize, zoom: f64) -> f64 {
    size.base_size() * compensated_scale(zoom)
}

/// Canvas position of an equipment marker's center.
pub fn equipment_center(bounds: &Bounds, pos: &EquipmentPosition) -> Point {
    normalized_to_pixel(bounds, pos.position_x, pos.position_y)
}

/// Canvas position of a rack's center.
pub fn rack_center(bounds: &Bounds, rack: &RackPosition) -> Point {
    percent_to_pixel(bounds, rack.position_x, rack.position_y)
}

pub fn equipment_footprint(center: Point, size: IconSize, zoom: f64) -> BBox {
    BBox::around(center, display_size(size, zoom) / 2.0)
}

/// Unrotated rack rectangle around its center.
pub fn rack_footprint(center: Point, width: f64, height: f64) -> BBox {
    BBox::new(
        Point::new(center.x - width / 2.0, center.y - height / 2.0),
        Point::new(center.x + width / 2.0, center.y + height / 2.0),
    )
}

/// Rotate `p` about `center` by `degrees`, clockwise on screen.
pub fn rotate_about(center: Point, p: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return p;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// Screen-space pointer delta expressed along a rotated rack's own axes.
pub fn local_delta(dx: f64, dy: f64, rotation: f64) -> (f64, f64) {
    if rotation == 0.0 {
        return (dx, dy);
    }
    let (sin, cos) = rotation.to_radians().sin_cos();
    (dx * cos + dy * sin, -dx * sin + dy * cos)
}

/// Rack corners with the rack's rotation applied about its center.
pub fn rack_corners(center: Point, width: f64, height: f64, rotation: f64) -> [(Corner, Point); 4] {
    let footprint = rack_footprint(center, width, height);
    Corner::ALL.map(|c| (c, rotate_about(center, c.position(&footprint), rotation)))
}

/// Axis-aligned box around the rotated rack; the hit area for pointer queries.
pub fn rack_bounds(center: Point, width: f64, height: f64, rotation: f64) -> BBox {
    let corners = rack_corners(center, width, height, rotation).map(|(_, p)| p);
    BBox::from_points(&corners).unwrap_or_else(|| rack_footprint(center, width, height))
}

/// Where the rotation handle sits for a marker of `half_height` (canvas px).
pub fn rotate_handle_position(center: Point, half_height: f64, zoom: f64) -> Point {
    Point::new(
        center.x,
        center.y - half_height - ROTATE_HANDLE_GAP * compensated_scale(zoom),
    )
}

/// Rotation implied by dragging the handle to `pointer`.
///
/// Zero degrees points straight up. With `snap` the angle rounds to the
/// nearest multiple of `snap_step`.
pub fn rotation_from_pointer(center: Point, pointer: Point, snap: bool, snap_step: f64) -> f64 {
    let dx = pointer.x - center.x;
    let dy = pointer.y - center.y;
    let mut angle = dy.atan2(dx).to_degrees() + 90.0;
    if snap && snap_step > 0.0 {
        angle = (angle / snap_step).round() * snap_step;
    }
    normalize_degrees(angle)
}

/// Rack corner grabbed for resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// How pointer deltas feed width and height for this corner.
    pub fn signs(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }

    pub fn position(self, footprint: &BBox) -> Point {
        match self {
            Corner::TopLeft => footprint.min,
            Corner::TopRight => Point::new(footprint.max.x, footprint.min.y),
            Corner::BottomLeft => Point::new(footprint.min.x, footprint.max.y),
            Corner::BottomRight => footprint.max,
        }
    }
}

/// New rack size after dragging `corner` by `(dx, dy)` canvas pixels.
pub fn resize_rack(
    width: f64,
    height: f64,
    corner: Corner,
    dx: f64,
    dy: f64,
    min_size: f64,
) -> (f64, f64) {
    let (sx, sy) = corner.signs();
    (
        (width + sx * dx).max(min_size),
        (height + sy * dy).max(min_size),
    )
}

/// Visual state of a marker, in ascending precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerVisual {
    Default,
    Hovered,
    Selected,
    Focused,
    Dragging,
}

impl MarkerVisual {
    pub fn resolve(hovered: bool, selected: bool, focused: bool, dragging: bool) -> Self {
        if dragging {
            MarkerVisual::Dragging
        } else if focused {
            MarkerVisual::Focused
        } else if selected {
            MarkerVisual::Selected
        } else if hovered {
            MarkerVisual::Hovered
        } else {
            MarkerVisual::Default
        }
    }
}

/// Stroke and opacity for a marker, before zoom compensation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub opacity: f64,
    /// Opacity of the outer pulse ring, only for focused markers.
    pub halo_opacity: Option<f64>,
}

pub fn marker_style(visual: MarkerVisual, pulse_opacity: f64) -> MarkerStyle {
    match visual {
        MarkerVisual::Default => MarkerStyle {
            stroke: "#475569",
            stroke_width: 1.5,
            opacity: 0.9,
            halo_opacity: None,
        },
        MarkerVisual::Hovered => MarkerStyle {
            stroke: "#0ea5e9",
            stroke_width: 2.0,
            opacity: 1.0,
            halo_opacity: None,
        },
        MarkerVisual::Selected => MarkerStyle {
            stroke: "#2563eb",
            stroke_width: 3.0,
            opacity: 1.0,
            halo_opacity: None,
        },
        MarkerVisual::Focused => MarkerStyle {
            stroke: "#f59e0b",
            stroke_width: 3.0,
            opacity: 1.0,
            halo_opacity: Some(pulse_opacity),
        },
        MarkerVisual::Dragging => MarkerStyle {
            stroke: "#2563eb",
            stroke_width: 2.0,
            opacity: 0.6,
            halo_opacity: None,
        },
    }
}

/// Connections touching each equipment item, built in one pass.
pub fn connection_counts(connections: &[Connection]) -> HashMap<EquipmentId, usize> {
    let mut counts = HashMap::with_capacity(connections.len() * 2);
    for c in connections {
        *counts.entry(c.source.id).or_insert(0) += 1;
        if c.target.id != c.source.id {
            *counts.entry(c.target.id).or_insert(0) += 1;
        }
    }
    counts
}
