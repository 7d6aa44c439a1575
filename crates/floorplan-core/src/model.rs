use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point, Size};

pub type FloorPlanId = Uuid;
pub type PlacementId = Uuid;
pub type EquipmentId = Uuid;
pub type RackId = Uuid;
pub type ConnectionId = Uuid;
pub type MeasurementId = Uuid;

/// A floor-plan image with its architectural scale and drawing calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorPlan {
    pub id: FloorPlanId,
    pub name: String,
    pub image_url: String,
    /// Intrinsic image size once the image has loaded.
    #[serde(default)]
    pub image_size: Option<Size>,
    /// Architectural ratio, 100 for 1:100.
    pub scale_ratio: f64,
    /// Canvas pixels per drawing centimeter, set by calibration.
    #[serde(default)]
    pub pixels_per_cm: Option<f64>,
    pub is_active: bool,
    pub version: u32,
}

impl FloorPlan {
    pub fn new(name: &str, image_url: &str, scale_ratio: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            image_url: image_url.to_string(),
            image_size: None,
            scale_ratio,
            pixels_per_cm: None,
            is_active: true,
            version: 1,
        }
    }

    /// Canvas pixels per real-world meter, if the plan has been calibrated.
    pub fn pixels_per_meter(&self) -> Option<f64> {
        let ppcm = self.pixels_per_cm?;
        if self.scale_ratio > 0.0 && ppcm > 0.0 {
            Some(ppcm * 100.0 / self.scale_ratio)
        } else {
            None
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.pixels_per_meter().is_some()
    }
}

/// Reference to an equipment item or rack owned by the host inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: Uuid,
    pub name: String,
}

impl AssetRef {
    pub fn new(id: Uuid, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl IconSize {
    /// Marker edge length in canvas pixels at zoom 1.
    pub fn base_size(self) -> f64 {
        match self {
            IconSize::Small => 24.0,
            IconSize::Medium => 32.0,
            IconSize::Large => 44.0,
        }
    }
}

/// Placement of an equipment item on a floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentPosition {
    pub id: PlacementId,
    pub equipment: AssetRef,
    /// Normalized to the image width, `[0, 1]`.
    pub position_x: f64,
    /// Normalized to the image height, `[0, 1]`.
    pub position_y: f64,
    /// Degrees in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub icon_size: IconSize,
    #[serde(default)]
    pub custom_label: Option<String>,
    #[serde(default)]
    pub custom_icon: Option<String>,
}

impl EquipmentPosition {
    pub fn new(equipment: AssetRef, position_x: f64, position_y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            equipment,
            position_x: position_x.clamp(0.0, 1.0),
            position_y: position_y.clamp(0.0, 1.0),
            rotation: 0.0,
            icon_size: IconSize::default(),
            custom_label: None,
            custom_icon: None,
        }
    }

    pub fn with_size(mut self, size: IconSize) -> Self {
        self.icon_size = size;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = crate::geometry::normalize_degrees(rotation);
        self
    }

    pub fn label(&self) -> &str {
        self.custom_label.as_deref().unwrap_or(&self.equipment.name)
    }

    pub fn normalized(&self) -> Point {
        Point::new(self.position_x, self.position_y)
    }
}

/// Placement of a rack on a floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackPosition {
    pub id: PlacementId,
    pub rack: AssetRef,
    /// Percentage of the image width, `[0, 100]`.
    pub position_x: f64,
    /// Percentage of the image height, `[0, 100]`.
    pub position_y: f64,
    /// Footprint in canvas pixels.
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl RackPosition {
    pub fn new(rack: AssetRef, position_x: f64, position_y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            rack,
            position_x: position_x.clamp(0.0, 100.0),
            position_y: position_y.clamp(0.0, 100.0),
            width,
            height,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CableType {
    Ethernet,
    Fiber,
    Power,
    Console,
    Coaxial,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Active,
    Inactive,
    Testing,
    Faulty,
    Reserved,
}

/// A cable between two equipment items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: AssetRef,
    pub target: AssetRef,
    pub cable_type: CableType,
    pub status: ConnectionStatus,
    /// Explicit stroke color, `#rrggbb`.
    #[serde(default)]
    pub color: Option<String>,
}

impl Connection {
    pub fn new(source: AssetRef, target: AssetRef, cable_type: CableType) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            target,
            cable_type,
            status: ConnectionStatus::Active,
            color: None,
        }
    }

    pub fn with_status(mut self, status: ConnectionStatus) -> Self {
        self.status = status;
        self
    }
}

/// A saved measurement. Points are canvas pixels; `scale` is pixels per meter
/// at capture time and stays pinned to the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: MeasurementId,
    pub floor_plan_id: FloorPlanId,
    pub points: Vec<Point>,
    pub scale: f64,
    pub is_closed: bool,
    /// Meters, including the closing edge when closed.
    pub total_distance: f64,
    /// Square meters, only for closed polygons.
    #[serde(default)]
    pub area: Option<f64>,
    pub category: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Per-plan viewport state persisted between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}
