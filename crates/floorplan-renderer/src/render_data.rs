use serde::Serialize;

use floorplan_core::geometry::{Bounds, Point};
use floorplan_core::measurement::{Segment, VertexAngle};
use floorplan_core::model::{IconSize, PlacementId, ViewState};

use crate::connections::ConnectionLayer;
use crate::markers::{Corner, MarkerStyle, MarkerVisual};

/// Floor-plan image placement; absent when the image is missing or failed.
#[derive(Debug, Clone, Serialize)]
pub struct ImageLayer {
    pub url: String,
    pub bounds: Bounds,
}

/// An equipment marker ready to draw, in canvas pixels.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentGlyph {
    pub id: PlacementId,
    pub center: Point,
    pub size: f64,
    pub icon_size: IconSize,
    pub rotation: f64,
    pub label: String,
    pub label_font_size: f64,
    pub icon: Option<String>,
    pub visual: MarkerVisual,
    pub style: MarkerStyle,
    /// Connection count badge, omitted for unconnected equipment.
    pub badge: Option<usize>,
    pub badge_radius: f64,
    /// Rotation handle, present in edit mode for the selected marker.
    pub rotate_handle: Option<Point>,
}

/// A rack rectangle ready to draw, in canvas pixels.
#[derive(Debug, Clone, Serialize)]
pub struct RackGlyph {
    pub id: PlacementId,
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub label: String,
    pub label_font_size: f64,
    pub visual: MarkerVisual,
    pub style: MarkerStyle,
    /// Resize handles, present in edit mode for the selected rack.
    pub handles: Vec<(Corner, Point)>,
    pub handle_radius: f64,
}

/// Segment label with its real-world length.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentLabel {
    pub segment: Segment,
    pub text: String,
}

/// Measurement overlay for the active tool.
#[derive(Debug, Clone, Serialize)]
pub struct MeasureOverlay {
    pub points: Vec<Point>,
    pub closed: bool,
    /// Highlighted first point once closing becomes possible.
    pub close_target: Option<Point>,
    pub close_radius: f64,
    pub segments: Vec<SegmentLabel>,
    pub angles: Vec<VertexAngle>,
    pub total_distance: Option<f64>,
    pub area: Option<f64>,
    /// Transient rubber-band segment to the pointer.
    pub preview: Option<(Point, Point)>,
    pub preview_text: Option<String>,
    pub stroke_width: f64,
    pub point_radius: f64,
}

/// Calibration reference points picked so far.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationOverlay {
    pub points: Vec<Point>,
    pub pixel_distance: Option<f64>,
    pub point_radius: f64,
}

/// Complete frame sent to the drawing surface.
#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame {
    pub view: ViewState,
    pub image: Option<ImageLayer>,
    pub grid_visible: bool,
    pub grid_spacing: f64,
    pub connections: ConnectionLayer,
    pub racks: Vec<RackGlyph>,
    pub equipment: Vec<EquipmentGlyph>,
    pub measurement: Option<MeasureOverlay>,
    pub calibration: Option<CalibrationOverlay>,
}

impl RenderFrame {
    pub fn empty(view: ViewState) -> Self {
        Self {
            view,
            image: None,
            grid_visible: false,
            grid_spacing: 20.0,
            connections: ConnectionLayer::default(),
            racks: Vec::new(),
            equipment: Vec::new(),
            measurement: None,
            calibration: None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// `"3.00 m"`.
pub fn format_meters(meters: f64) -> String {
    format!("{:.2} m", meters)
}

/// `"16.00 m²"`.
pub fn format_square_meters(area: f64) -> String {
    format!("{:.2} m²", area)
}
