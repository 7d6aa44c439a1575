//! Geometry and styling for cable lines between markers.

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_4;

use serde::Serialize;

use floorplan_core::geometry::Point;
use floorplan_core::model::{CableType, Connection, ConnectionId, ConnectionStatus, EquipmentId};

use crate::markers::compensated_scale;

/// Length of the stub drawn for a connection whose far end is off-plan.
pub const PARTIAL_LENGTH: f64 = 40.0;
pub const BASE_STROKE_WIDTH: f64 = 2.0;
pub const ARROW_LENGTH: f64 = 10.0;
pub const ARROW_SPREAD: f64 = std::f64::consts::PI / 7.0;
pub const BADGE_RADIUS: f64 = 5.0;

/// Stroke pattern keyed by connection status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    /// Dash lengths in canvas pixels; empty for solid.
    pub dash: Vec<f64>,
    pub opacity: f64,
}

pub fn cable_color(cable: CableType) -> &'static str {
    match cable {
        CableType::Ethernet => "#3b82f6",
        CableType::Fiber => "#f97316",
        CableType::Power => "#ef4444",
        CableType::Console => "#8b5cf6",
        CableType::Coaxial => "#14b8a6",
        CableType::Other => "#6b7280",
    }
}

/// Unscaled dash pattern and opacity for a status.
pub fn status_pattern(status: ConnectionStatus) -> (&'static [f64], f64) {
    match status {
        ConnectionStatus::Active => (&[], 0.9),
        ConnectionStatus::Inactive => (&[12.0, 6.0], 0.4),
        ConnectionStatus::Testing => (&[6.0, 4.0], 0.8),
        ConnectionStatus::Faulty => (&[2.0, 3.0], 0.9),
        ConnectionStatus::Reserved => (&[12.0, 6.0], 0.6),
    }
}

pub fn line_style(connection: &Connection, zoom: f64) -> LineStyle {
    let k = compensated_scale(zoom);
    let (dash, opacity) = status_pattern(connection.status);
    LineStyle {
        color: connection
            .color
            .clone()
            .unwrap_or_else(|| cable_color(connection.cable_type).to_string()),
        width: BASE_STROKE_WIDTH * k,
        dash: dash.iter().map(|d| d * k).collect(),
        opacity,
    }
}

/// A connection with both endpoints on the plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullLine {
    pub connection_id: ConnectionId,
    pub from: Point,
    pub to: Point,
    pub style: LineStyle,
    /// Triangle `[tip, left wing, right wing]` at the destination end.
    pub arrow: [Point; 3],
    pub badge_center: Point,
    pub badge_radius: f64,
}

/// A connection with only one endpoint on the plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialLine {
    pub connection_id: ConnectionId,
    pub anchor: Point,
    pub end: Point,
    pub style: LineStyle,
    /// Name of the equipment that is not on this plan.
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectionLayer {
    pub full: Vec<FullLine>,
    pub partial: Vec<PartialLine>,
}

/// Arrowhead triangle pointing from `from` towards `to`, tip at `to`.
pub fn arrowhead(from: Point, to: Point, length: f64) -> [Point; 3] {
    let angle = from.angle_to(&to);
    let wing = |offset: f64| {
        Point::new(
            to.x - length * (angle - offset).cos(),
            to.y - length * (angle - offset).sin(),
        )
    };
    [to, wing(ARROW_SPREAD), wing(-ARROW_SPREAD)]
}

/// End of the 45° stub for an off-plan connection, up and to the right.
pub fn partial_end(anchor: Point, zoom: f64) -> Point {
    let len = PARTIAL_LENGTH * compensated_scale(zoom);
    Point::new(
        anchor.x + len * FRAC_PI_4.cos(),
        anchor.y - len * FRAC_PI_4.sin(),
    )
}

/// Split connections by how many endpoints are placed and build their geometry.
///
/// `positions` maps equipment ids to canvas-pixel marker centers on this plan.
pub fn layout_connections(
    connections: &[Connection],
    positions: &HashMap<EquipmentId, Point>,
    zoom: f64,
) -> ConnectionLayer {
    let k = compensated_scale(zoom);
    let mut layer = ConnectionLayer::default();
    for c in connections {
        let from = positions.get(&c.source.id).copied();
        let to = positions.get(&c.target.id).copied();
        match (from, to) {
            (Some(from), Some(to)) => layer.full.push(FullLine {
                connection_id: c.id,
                from,
                to,
                style: line_style(c, zoom),
                arrow: arrowhead(from, to, ARROW_LENGTH * k),
                badge_center: from.midpoint(&to),
                badge_radius: BADGE_RADIUS * k,
            }),
            (Some(anchor), None) | (None, Some(anchor)) => {
                let off_plan = if from.is_some() { &c.target } else { &c.source };
                layer.partial.push(PartialLine {
                    connection_id: c.id,
                    anchor,
                    end: partial_end(anchor, zoom),
                    style: line_style(c, zoom),
                    label: off_plan.name.clone(),
                });
            }
            (None, None) => {}
        }
    }
    layer
}
