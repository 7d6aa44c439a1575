//! # Floorplan Core
//!
//! Geometry kernel of the floor-plan canvas: coordinate mapping between stored
//! marker positions and canvas pixels, the host-facing records, the polygon
//! measurement tool, two-point scale calibration and marker hit testing.
//!
//! Nothing in this crate knows about zoom animation or drawing; it is plain
//! data and pure functions so it can be tested without a rendering surface.

pub mod geometry;
pub mod coords;
pub mod model;
pub mod measurement;
pub mod calibration;
pub mod spatial;

pub use geometry::{BBox, Bounds, Point, Size};
pub use coords::SnapGrid;
pub use model::{
    AssetRef, CableType, Connection, ConnectionStatus, EquipmentPosition, FloorPlan, IconSize,
    Measurement, RackPosition, ViewState,
};
pub use measurement::{ClickOutcome, MeasurePhase, MeasureSummary, MeasureTool, UndoOutcome};
pub use calibration::{Calibration, CalibrationError, CalibrationTool};
pub use spatial::{MarkerKey, SpatialIndex};
