use serde::{Deserialize, Serialize};

use floorplan_core::coords::SnapGrid;
use floorplan_core::measurement::CLOSE_THRESHOLD_PX;

/// Tunables for the canvas. Defaults match the dashboard's behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub snap: SnapGrid,
    /// Multiplicative zoom step per wheel notch.
    pub wheel_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom the focus animation settles on.
    pub focus_zoom: f64,
    pub focus_duration_ms: f64,
    /// Quiet period before view state is written.
    pub persist_debounce_ms: f64,
    pub hover_delay_ms: f64,
    /// Measurement close radius in screen pixels.
    pub close_threshold_px: f64,
    pub rotation_snap_deg: f64,
    pub min_rack_size: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            snap: SnapGrid::default(),
            wheel_step: 1.1,
            min_zoom: 0.25,
            max_zoom: 5.0,
            focus_zoom: 1.8,
            focus_duration_ms: 500.0,
            persist_debounce_ms: 500.0,
            hover_delay_ms: 300.0,
            close_threshold_px: CLOSE_THRESHOLD_PX,
            rotation_snap_deg: 15.0,
            min_rack_size: 20.0,
        }
    }
}

impl CanvasConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
