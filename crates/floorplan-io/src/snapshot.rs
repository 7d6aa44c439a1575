use std::io::Read;

use log::warn;
use serde::{Deserialize, Serialize};

use floorplan_core::geometry::normalize_degrees;
use floorplan_core::model::{Connection, EquipmentPosition, FloorPlan, Measurement, RackPosition};

/// Everything the host hands the canvas for one floor plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorPlanSnapshot {
    pub floor_plan: FloorPlan,
    #[serde(default)]
    pub equipment: Vec<EquipmentPosition>,
    #[serde(default)]
    pub racks: Vec<RackPosition>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

impl FloorPlanSnapshot {
    pub fn new(floor_plan: FloorPlan) -> Self {
        Self {
            floor_plan,
            equipment: Vec::new(),
            racks: Vec::new(),
            connections: Vec::new(),
            measurements: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and sanitize a snapshot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut snapshot: Self = serde_json::from_str(json)?;
        snapshot.sanitize();
        Ok(snapshot)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        let mut snapshot: Self = serde_json::from_reader(reader)?;
        snapshot.sanitize();
        Ok(snapshot)
    }

    /// Clamp stored positions into their domains and drop measurements that
    /// belong to another plan or cannot be closed.
    fn sanitize(&mut self) {
        for pos in &mut self.equipment {
            pos.position_x = clamp_or_zero(pos.position_x, 1.0);
            pos.position_y = clamp_or_zero(pos.position_y, 1.0);
            pos.rotation = normalize_degrees(pos.rotation);
        }
        for rack in &mut self.racks {
            rack.position_x = clamp_or_zero(rack.position_x, 100.0);
            rack.position_y = clamp_or_zero(rack.position_y, 100.0);
            rack.rotation = normalize_degrees(rack.rotation);
        }

        let plan_id = self.floor_plan.id;
        let before = self.measurements.len();
        self.measurements
            .retain(|m| m.floor_plan_id == plan_id && m.scale > 0.0);
        for m in &mut self.measurements {
            if m.is_closed && m.points.len() < 3 {
                warn!("measurement {} marked closed with {} points", m.id, m.points.len());
                m.is_closed = false;
                m.area = None;
            }
        }
        if self.measurements.len() != before {
            warn!(
                "dropped {} measurements not usable on plan {}",
                before - self.measurements.len(),
                plan_id
            );
        }
    }
}

fn clamp_or_zero(v: f64, max: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_core::geometry::Point;
    use floorplan_core::model::AssetRef;
    use uuid::Uuid;

    fn measurement(plan: Uuid, points: Vec<Point>, closed: bool) -> Measurement {
        Measurement {
            id: Uuid::new_v4(),
            floor_plan_id: plan,
            points,
            scale: 100.0,
            is_closed: closed,
            total_distance: 0.0,
            area: closed.then_some(1.0),
            category: "general".to_string(),
            label: None,
        }
    }

    #[test]
    fn test_snapshot_roundtrip_and_sanitize() {
        let plan = FloorPlan::new("Hall B", "hall-b.png", 50.0);
        let plan_id = plan.id;
        let mut snapshot = FloorPlanSnapshot::new(plan);

        let mut pos = EquipmentPosition::new(AssetRef::new(Uuid::new_v4(), "core-sw"), 0.5, 0.5);
        pos.position_x = 3.0;
        pos.rotation = -45.0;
        snapshot.equipment.push(pos);

        let mut rack = RackPosition::new(AssetRef::new(Uuid::new_v4(), "R01"), 10.0, 10.0, 60.0, 90.0);
        rack.position_y = 140.0;
        snapshot.racks.push(rack);

        snapshot
            .measurements
            .push(measurement(plan_id, vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)], true));
        snapshot
            .measurements
            .push(measurement(Uuid::new_v4(), vec![Point::new(0.0, 0.0)], false));

        let json = snapshot.to_json().unwrap();
        let loaded = FloorPlanSnapshot::from_json(&json).unwrap();

        assert_eq!(loaded.equipment[0].position_x, 1.0);
        assert!((loaded.equipment[0].rotation - 315.0).abs() < 1e-10);
        assert_eq!(loaded.racks[0].position_y, 100.0);
        assert_eq!(loaded.measurements.len(), 1);
        assert!(!loaded.measurements[0].is_closed);
        assert!(loaded.measurements[0].area.is_none());
    }

    #[test]
    fn test_minimal_snapshot_from_reader() {
        let plan = FloorPlan::new("Cage 4", "cage4.svg", 100.0);
        let json = format!(r#"{{"floor_plan": {}}}"#, serde_json::to_string(&plan).unwrap());
        let loaded = FloorPlanSnapshot::from_reader(json.as_bytes()).unwrap();
        assert_eq!(loaded.floor_plan.id, plan.id);
        assert!(loaded.equipment.is_empty());
        assert!(loaded.connections.is_empty());
    }
}
