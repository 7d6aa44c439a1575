//! The floor-plan canvas: owns the viewport, markers, measurement and
//! calibration tools, turns pointer input into intent events for the host and
//! produces a [`RenderFrame`] on demand.
//!
//! The canvas never writes positions or measurements anywhere. It updates its
//! local copy optimistically and queues a [`CanvasEvent`]; the host drains the
//! queue with [`FloorPlanCanvas::drain_events`] and owns persistence. Only the
//! viewport state goes to a [`ViewStateStore`] directly.

use std::collections::HashMap;

use log::{debug, warn};
use serde::Serialize;

use floorplan_core::calibration::{Calibration, CalibrationError, CalibrationTool};
use floorplan_core::coords::{
    image_fit_bounds, is_inside, pixel_to_normalized, pixel_to_normalized_raw, pixel_to_percent,
};
use floorplan_core::geometry::{Bounds, Point, Size};
use floorplan_core::measurement::{ClickOutcome, MeasureTool, UndoOutcome};
use floorplan_core::model::{
    Connection, EquipmentId, EquipmentPosition, FloorPlan, Measurement, MeasurementId,
    PlacementId, RackPosition,
};
use floorplan_core::spatial::{MarkerKey, SpatialEntry, SpatialIndex};
use floorplan_io::{FloorPlanSnapshot, ViewStateStore};

use crate::config::CanvasConfig;
use crate::connections::layout_connections;
use crate::interaction::{Gesture, HoverSignal, HoverTracker, Modifiers};
use crate::markers::{
    compensated_scale, connection_counts, display_size, equipment_center, equipment_footprint,
    local_delta, marker_style, rack_bounds, rack_center, rack_corners, resize_rack,
    rotate_handle_position, rotation_from_pointer, MarkerVisual, HANDLE_RADIUS,
};
use crate::render_data::{
    format_meters, CalibrationOverlay, EquipmentGlyph, ImageLayer, MeasureOverlay, RackGlyph,
    RenderFrame, SegmentLabel,
};
use crate::timing::Pulse;
use crate::viewport::{ViewportController, WheelDirection};

/// Screen distance a press may travel and still count as a click.
pub const CLICK_SLOP_PX: f64 = 4.0;
pub const LABEL_FONT_SIZE: f64 = 11.0;
pub const BADGE_RADIUS: f64 = 8.0;
pub const MEASURE_POINT_RADIUS: f64 = 5.0;
pub const MEASURE_STROKE_WIDTH: f64 = 2.0;

/// What canvas clicks do. Measurement, calibration and placement are
/// mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CanvasMode {
    #[default]
    View,
    Edit,
    Measure,
    Calibrate,
    AddEquipment,
}

/// Intent emitted to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CanvasEvent {
    PositionChanged {
        id: PlacementId,
        x: f64,
        y: f64,
    },
    RotationChanged {
        id: PlacementId,
        rotation: f64,
    },
    RackPositionChanged {
        id: PlacementId,
        x: f64,
        y: f64,
    },
    RackResized {
        id: PlacementId,
        width: f64,
        height: f64,
    },
    RackDeleted {
        id: PlacementId,
    },
    /// Normalized image position for a new placement.
    AddClick {
        x: f64,
        y: f64,
    },
    /// Canvas pixel of a calibration reference point.
    CalibrationClick {
        x: f64,
        y: f64,
    },
    /// Both reference points picked; the host should ask for the true distance.
    CalibrationMeasured {
        pixel_distance: f64,
    },
    Hover {
        id: PlacementId,
        screen_x: f64,
        screen_y: f64,
    },
    HoverEnd,
    MeasurementChanged {
        points: Vec<Point>,
        closed: bool,
    },
}

fn key_id(key: MarkerKey) -> PlacementId {
    match key {
        MarkerKey::Equipment(id) | MarkerKey::Rack(id) => id,
    }
}

#[derive(Debug)]
pub struct FloorPlanCanvas {
    config: CanvasConfig,
    plan: FloorPlan,
    container: Size,
    image_ok: bool,
    equipment: Vec<EquipmentPosition>,
    racks: Vec<RackPosition>,
    connections: Vec<Connection>,
    counts: HashMap<EquipmentId, usize>,
    measurements: Vec<Measurement>,
    viewport: ViewportController,
    store: Box<dyn ViewStateStore>,
    mode: CanvasMode,
    measure: MeasureTool,
    calibration: CalibrationTool,
    gesture: Gesture,
    hover: HoverTracker,
    pulse: Pulse,
    selected: Option<MarkerKey>,
    focused: Option<MarkerKey>,
    pointer: Option<Point>,
    index: SpatialIndex,
    index_zoom: Option<f64>,
    events: Vec<CanvasEvent>,
}

impl FloorPlanCanvas {
    /// Create the canvas and restore the plan's stored view before the first frame.
    pub fn mount(
        plan: FloorPlan,
        container: Size,
        store: Box<dyn ViewStateStore>,
        config: CanvasConfig,
    ) -> Self {
        let mut viewport = ViewportController::new(&config);
        match store.load(plan.id) {
            Ok(Some(state)) => viewport.restore(state),
            Ok(None) => {}
            Err(e) => warn!("could not load view state for plan {}: {}", plan.id, e),
        }
        debug!("mounted floor plan {} ({})", plan.name, plan.id);
        Self {
            hover: HoverTracker::new(config.hover_delay_ms),
            image_ok: plan.image_size.is_some(),
            config,
            plan,
            container,
            equipment: Vec::new(),
            racks: Vec::new(),
            connections: Vec::new(),
            counts: HashMap::new(),
            measurements: Vec::new(),
            viewport,
            store,
            mode: CanvasMode::default(),
            measure: MeasureTool::new(),
            calibration: CalibrationTool::new(),
            gesture: Gesture::Idle,
            pulse: Pulse::default(),
            selected: None,
            focused: None,
            pointer: None,
            index: SpatialIndex::new(),
            index_zoom: None,
            events: Vec::new(),
        }
    }

    /// Mount from a host snapshot.
    pub fn mount_snapshot(
        snapshot: FloorPlanSnapshot,
        container: Size,
        store: Box<dyn ViewStateStore>,
        config: CanvasConfig,
    ) -> Self {
        let mut canvas = Self::mount(snapshot.floor_plan, container, store, config);
        canvas.set_equipment(snapshot.equipment);
        canvas.set_racks(snapshot.racks);
        canvas.set_connections(snapshot.connections);
        canvas.set_measurements(snapshot.measurements);
        canvas
    }

    /// Stop animations and write any view state still waiting on its debounce.
    pub fn unmount(&mut self) {
        self.viewport.cancel_animation();
        if let Some(state) = self.viewport.flush() {
            if let Err(e) = self.store.save(self.plan.id, &state) {
                warn!("could not save view state for plan {}: {}", self.plan.id, e);
            }
        }
        if let Some(HoverSignal::End) = self.hover.leave() {
            self.events.push(CanvasEvent::HoverEnd);
        }
        self.gesture = Gesture::Idle;
    }

    // ── Inputs ───────────────────────────────────────────────────────

    pub fn plan(&self) -> &FloorPlan {
        &self.plan
    }

    pub fn set_equipment(&mut self, equipment: Vec<EquipmentPosition>) {
        self.equipment = equipment;
        self.invalidate_index();
    }

    pub fn set_racks(&mut self, racks: Vec<RackPosition>) {
        self.racks = racks;
        self.invalidate_index();
    }

    pub fn set_connections(&mut self, connections: Vec<Connection>) {
        self.counts = connection_counts(&connections);
        self.connections = connections;
    }

    /// Saved measurements for this plan; records for other plans are ignored.
    pub fn set_measurements(&mut self, measurements: Vec<Measurement>) {
        let plan_id = self.plan.id;
        self.measurements = measurements
            .into_iter()
            .filter(|m| m.floor_plan_id == plan_id)
            .collect();
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn equipment(&self) -> &[EquipmentPosition] {
        &self.equipment
    }

    pub fn racks(&self) -> &[RackPosition] {
        &self.racks
    }

    pub fn connection_count(&self, equipment: EquipmentId) -> usize {
        self.counts.get(&equipment).copied().unwrap_or(0)
    }

    pub fn resize(&mut self, container: Size) {
        self.container = container;
        self.invalidate_index();
    }

    /// The image finished loading with this intrinsic size.
    pub fn image_loaded(&mut self, size: Size) {
        self.plan.image_size = Some(size);
        self.image_ok = true;
        self.invalidate_index();
    }

    /// The image could not be loaded; markers fall back to the container.
    pub fn image_failed(&mut self) {
        warn!("floor plan image failed to load: {}", self.plan.image_url);
        self.image_ok = false;
        self.invalidate_index();
    }

    pub fn bounds(&self) -> Bounds {
        let image = if self.image_ok {
            self.plan.image_size
        } else {
            None
        };
        image_fit_bounds(self.container, image)
    }

    pub fn store(&self) -> &dyn ViewStateStore {
        self.store.as_ref()
    }

    pub fn drain_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Modes ────────────────────────────────────────────────────────

    pub fn mode(&self) -> CanvasMode {
        self.mode
    }

    /// Switch modes. Leaving measurement or calibration drops their points.
    pub fn set_mode(&mut self, mode: CanvasMode) {
        if mode == self.mode {
            return;
        }
        match self.mode {
            CanvasMode::Measure => {
                if !self.measure.is_empty() {
                    self.measure.clear();
                    self.emit_measurement();
                }
            }
            CanvasMode::Calibrate => self.calibration.reset(),
            _ => {}
        }
        debug!("canvas mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.gesture = Gesture::Idle;
        self.pointer = None;
        if mode != CanvasMode::Edit && mode != CanvasMode::View {
            self.selected = None;
        }
    }

    /// Escape: abandon the current tool and gesture.
    pub fn escape(&mut self) {
        match self.mode {
            CanvasMode::Measure | CanvasMode::Calibrate | CanvasMode::AddEquipment => {
                self.set_mode(CanvasMode::View)
            }
            CanvasMode::View | CanvasMode::Edit => {
                self.gesture = Gesture::Idle;
                self.selected = None;
            }
        }
    }

    pub fn selected(&self) -> Option<MarkerKey> {
        self.selected
    }

    pub fn select(&mut self, key: Option<MarkerKey>) {
        self.selected = key;
    }

    /// Delete the selected rack placement (edit mode only).
    pub fn delete_selected(&mut self) -> bool {
        if self.mode != CanvasMode::Edit {
            return false;
        }
        let Some(MarkerKey::Rack(id)) = self.selected else {
            return false;
        };
        self.racks.retain(|r| r.id != id);
        self.selected = None;
        self.invalidate_index();
        self.events.push(CanvasEvent::RackDeleted { id });
        true
    }

    // ── Viewport control ─────────────────────────────────────────────

    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn set_zoom(&mut self, z: f64) {
        self.viewport.set_zoom(z);
    }

    pub fn fit_to_view(&mut self) {
        self.viewport.fit_to_view();
    }

    /// Reset zoom and pan and forget the stored view.
    pub fn reset_view(&mut self) {
        self.viewport.reset_view();
        if let Err(e) = self.store.clear(self.plan.id) {
            warn!("could not clear view state for plan {}: {}", self.plan.id, e);
        }
    }

    /// Animate towards a marker and mark it focused.
    pub fn focus_on(&mut self, key: MarkerKey) -> bool {
        let Some(center) = self.marker_center(key) else {
            return false;
        };
        self.focused = Some(key);
        self.pulse.reset();
        self.viewport.focus_on(center, self.container);
        true
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    pub fn wheel(&mut self, screen: Point, delta_y: f64) {
        if let Some(direction) = WheelDirection::from_delta(delta_y) {
            self.viewport.wheel(screen, direction);
        }
    }

    /// Advance animations, hover delay and view persistence by one frame.
    pub fn tick(&mut self, dt_ms: f64) {
        let vt = self.viewport.tick(dt_ms);
        if let Some(state) = vt.persist {
            if let Err(e) = self.store.save(self.plan.id, &state) {
                warn!("could not save view state for plan {}: {}", self.plan.id, e);
            }
        }
        if let Some(HoverSignal::Show { key, screen }) = self.hover.tick(dt_ms) {
            self.events.push(CanvasEvent::Hover {
                id: key_id(key),
                screen_x: screen.x,
                screen_y: screen.y,
            });
        }
        if self.focused.is_some() {
            self.pulse.tick(dt_ms);
        }
    }

    // ── Measurement surface ──────────────────────────────────────────

    pub fn measure_points(&self) -> &[Point] {
        self.measure.points()
    }

    pub fn is_polygon_closed(&self) -> bool {
        self.measure.is_closed()
    }

    pub fn undo_last_measure_point(&mut self) -> UndoOutcome {
        let outcome = self.measure.undo();
        if outcome != UndoOutcome::Nothing {
            self.emit_measurement();
        }
        outcome
    }

    pub fn clear_measurement(&mut self) {
        let had_points = !self.measure.is_empty();
        self.measure.clear();
        if had_points {
            self.emit_measurement();
        }
    }

    /// Seed the tool from outside, e.g. to show a saved measurement.
    pub fn set_measure_points_external(&mut self, points: Vec<Point>, closed: bool) -> bool {
        let applied = self.measure.set_points(points, closed);
        self.emit_measurement();
        applied
    }

    /// Load a saved measurement into the tool.
    pub fn open_measurement(&mut self, id: MeasurementId) -> bool {
        let Some(record) = self.measurements.iter().find(|m| m.id == id).cloned() else {
            return false;
        };
        self.set_mode(CanvasMode::Measure);
        self.measure.load(&record);
        self.emit_measurement();
        true
    }

    /// Turn the current points into a record for the host to persist.
    ///
    /// Needs a calibrated plan and at least two points. The tool is cleared on
    /// success.
    pub fn save_measurement(&mut self, category: &str, label: Option<&str>) -> Option<Measurement> {
        let scale = self.plan.pixels_per_meter()?;
        let mut record = self.measure.to_record(self.plan.id, scale, category)?;
        record.label = label.map(str::to_string);
        debug!(
            "measurement saved: {} points, {:.2} m",
            record.points.len(),
            record.total_distance
        );
        self.measurements.push(record.clone());
        self.measure.clear();
        self.emit_measurement();
        Some(record)
    }

    pub fn delete_measurement(&mut self, id: MeasurementId) -> bool {
        let before = self.measurements.len();
        self.measurements.retain(|m| m.id != id);
        self.measurements.len() != before
    }

    fn emit_measurement(&mut self) {
        self.events.push(CanvasEvent::MeasurementChanged {
            points: self.measure.points().to_vec(),
            closed: self.measure.is_closed(),
        });
    }

    // ── Calibration surface ──────────────────────────────────────────

    pub fn calibration_points(&self) -> Vec<Point> {
        self.calibration.points()
    }

    /// Finish calibration with the true length of the picked segment.
    ///
    /// On success the plan's `pixels_per_cm` and `scale_ratio` are updated in
    /// place; the host is expected to persist the returned calibration.
    pub fn complete_calibration(
        &mut self,
        true_distance_cm: f64,
        scale_ratio: f64,
    ) -> Result<Calibration, CalibrationError> {
        let calibration = self.calibration.complete(true_distance_cm, scale_ratio)?;
        self.plan.pixels_per_cm = Some(calibration.pixels_per_cm);
        self.plan.scale_ratio = calibration.scale_ratio;
        Ok(calibration)
    }

    // ── Pointer input (screen pixels) ────────────────────────────────

    pub fn pointer_down(&mut self, screen: Point, _modifiers: Modifiers) {
        let canvas = self.viewport.screen_to_canvas(screen);
        self.pointer = Some(canvas);

        if self.mode == CanvasMode::Edit {
            if let Some(gesture) = self.handle_at(canvas) {
                self.gesture = gesture;
                return;
            }
        }

        let hit = match self.mode {
            CanvasMode::View | CanvasMode::Edit => self.hit_test(canvas),
            _ => None,
        };
        match hit {
            Some(key) => {
                self.selected = Some(key);
                if self.mode == CanvasMode::Edit {
                    let center = self.marker_center(key).unwrap_or(canvas);
                    self.gesture = Gesture::Move {
                        key,
                        offset: Point::new(center.x - canvas.x, center.y - canvas.y),
                        center,
                    };
                    if let Some(HoverSignal::End) = self.hover.leave() {
                        self.events.push(CanvasEvent::HoverEnd);
                    }
                }
            }
            None => {
                if matches!(self.mode, CanvasMode::View | CanvasMode::Edit) {
                    self.selected = None;
                }
                self.gesture = Gesture::Pan {
                    last: screen,
                    travel: 0.0,
                };
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Point, modifiers: Modifiers) {
        let canvas = self.viewport.screen_to_canvas(screen);
        self.pointer = Some(canvas);
        if self.gesture.is_idle() {
            let hit = match self.mode {
                CanvasMode::View | CanvasMode::Edit => self.hit_test(canvas),
                _ => None,
            };
            if let Some(HoverSignal::End) = self.hover.update(hit, screen) {
                self.events.push(CanvasEvent::HoverEnd);
            }
            return;
        }

        let step = self.config.rotation_snap_deg;
        let min_rack = self.config.min_rack_size;
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Pan { last, travel } => {
                let dx = screen.x - last.x;
                let dy = screen.y - last.y;
                *travel += dx.hypot(dy);
                *last = screen;
                self.viewport.pan_by(dx, dy);
            }
            Gesture::Move { offset, center, .. } => {
                *center = canvas.translate(offset.x, offset.y);
            }
            Gesture::Rotate { center, angle, .. } => {
                *angle = rotation_from_pointer(*center, canvas, modifiers.shift, step);
            }
            Gesture::Resize {
                corner,
                rotation,
                origin,
                start,
                size,
                ..
            } => {
                let (dx, dy) = local_delta(canvas.x - origin.x, canvas.y - origin.y, *rotation);
                *size = resize_rack(start.0, start.1, *corner, dx, dy, min_rack);
            }
        }
    }

    pub fn pointer_up(&mut self, screen: Point, modifiers: Modifiers) {
        let gesture = std::mem::take(&mut self.gesture);
        match gesture {
            Gesture::Idle => {}
            Gesture::Pan { travel, .. } => {
                if travel < CLICK_SLOP_PX {
                    self.click(screen, modifiers);
                }
            }
            Gesture::Move { key, center, .. } => self.finish_move(key, center),
            Gesture::Rotate { key, angle, .. } => {
                let MarkerKey::Equipment(id) = key else {
                    return;
                };
                let Some(pos) = self.equipment.iter_mut().find(|p| p.id == id) else {
                    return;
                };
                if pos.rotation == angle {
                    return;
                }
                pos.rotation = angle;
                self.events.push(CanvasEvent::RotationChanged { id, rotation: angle });
            }
            Gesture::Resize {
                rack, start, size, ..
            } => {
                if size == start {
                    return;
                }
                if let Some(r) = self.racks.iter_mut().find(|r| r.id == rack) {
                    r.width = size.0;
                    r.height = size.1;
                }
                self.invalidate_index();
                self.events.push(CanvasEvent::RackResized {
                    id: rack,
                    width: size.0,
                    height: size.1,
                });
            }
        }
    }

    /// Pointer left the canvas.
    pub fn pointer_leave(&mut self) {
        self.pointer = None;
        if let Some(HoverSignal::End) = self.hover.leave() {
            self.events.push(CanvasEvent::HoverEnd);
        }
    }

    fn finish_move(&mut self, key: MarkerKey, center: Point) {
        if self.marker_center(key) == Some(center) {
            return;
        }
        let bounds = self.bounds();
        let snap = self.config.snap;
        match key {
            MarkerKey::Equipment(id) => {
                let n = pixel_to_normalized(&bounds, center, &snap);
                if let Some(pos) = self.equipment.iter_mut().find(|p| p.id == id) {
                    pos.position_x = n.x;
                    pos.position_y = n.y;
                }
                self.events.push(CanvasEvent::PositionChanged { id, x: n.x, y: n.y });
            }
            MarkerKey::Rack(id) => {
                let pct = pixel_to_percent(&bounds, center, &snap);
                if let Some(r) = self.racks.iter_mut().find(|r| r.id == id) {
                    r.position_x = pct.x;
                    r.position_y = pct.y;
                }
                self.events.push(CanvasEvent::RackPositionChanged {
                    id,
                    x: pct.x,
                    y: pct.y,
                });
            }
        }
        self.invalidate_index();
    }

    /// A click on the canvas background, routed by mode.
    pub fn click(&mut self, screen: Point, _modifiers: Modifiers) {
        let canvas = self.viewport.screen_to_canvas(screen);
        match self.mode {
            CanvasMode::Measure => {
                let threshold = self.config.close_threshold_px / self.viewport.scale();
                if self.measure.click_within(canvas, threshold) != ClickOutcome::Ignored {
                    self.emit_measurement();
                }
            }
            CanvasMode::Calibrate => {
                self.events.push(CanvasEvent::CalibrationClick {
                    x: canvas.x,
                    y: canvas.y,
                });
                if let Some(pixel_distance) = self.calibration.click(canvas) {
                    self.events
                        .push(CanvasEvent::CalibrationMeasured { pixel_distance });
                }
            }
            CanvasMode::AddEquipment => {
                let n = pixel_to_normalized_raw(&self.bounds(), canvas);
                if is_inside(n) {
                    self.events.push(CanvasEvent::AddClick { x: n.x, y: n.y });
                } else {
                    debug!("add click outside image at ({:.3}, {:.3})", n.x, n.y);
                }
            }
            CanvasMode::View | CanvasMode::Edit => {}
        }
    }

    // ── Hit testing ──────────────────────────────────────────────────

    fn invalidate_index(&mut self) {
        self.index_zoom = None;
    }

    fn marker_center(&self, key: MarkerKey) -> Option<Point> {
        let bounds = self.bounds();
        match key {
            MarkerKey::Equipment(id) => self
                .equipment
                .iter()
                .find(|p| p.id == id)
                .map(|p| equipment_center(&bounds, p)),
            MarkerKey::Rack(id) => self
                .racks
                .iter()
                .find(|r| r.id == id)
                .map(|r| rack_center(&bounds, r)),
        }
    }

    fn rebuild_index(&mut self) {
        let zoom = self.viewport.scale();
        let bounds = self.bounds();
        let mut entries = Vec::with_capacity(self.racks.len() + self.equipment.len());
        for (z, r) in self.racks.iter().enumerate() {
            entries.push(SpatialEntry {
                key: MarkerKey::Rack(r.id),
                bbox: rack_bounds(rack_center(&bounds, r), r.width, r.height, r.rotation),
                z,
            });
        }
        let offset = self.racks.len();
        for (i, p) in self.equipment.iter().enumerate() {
            entries.push(SpatialEntry {
                key: MarkerKey::Equipment(p.id),
                bbox: equipment_footprint(equipment_center(&bounds, p), p.icon_size, zoom),
                z: offset + i,
            });
        }
        self.index = SpatialIndex::build(entries);
        self.index_zoom = Some(zoom);
    }

    /// Topmost marker under a canvas point.
    pub fn hit_test(&mut self, canvas: Point) -> Option<MarkerKey> {
        if self.index_zoom != Some(self.viewport.scale()) {
            self.rebuild_index();
        }
        self.index.topmost_at(&canvas)
    }

    /// Rotation or resize handle of the selected marker under `canvas`.
    fn handle_at(&self, canvas: Point) -> Option<Gesture> {
        let key = self.selected?;
        let zoom = self.viewport.scale();
        let reach = HANDLE_RADIUS * compensated_scale(zoom) * 1.5;
        let bounds = self.bounds();
        match key {
            MarkerKey::Equipment(id) => {
                let pos = self.equipment.iter().find(|p| p.id == id)?;
                let center = equipment_center(&bounds, pos);
                let half = display_size(pos.icon_size, zoom) / 2.0;
                let handle = rotate_handle_position(center, half, zoom);
                (handle.distance_to(&canvas) <= reach).then_some(Gesture::Rotate {
                    key,
                    center,
                    angle: pos.rotation,
                })
            }
            MarkerKey::Rack(id) => {
                let rack = self.racks.iter().find(|r| r.id == id)?;
                let center = rack_center(&bounds, rack);
                rack_corners(center, rack.width, rack.height, rack.rotation)
                    .into_iter()
                    .find(|(_, p)| p.distance_to(&canvas) <= reach)
                    .map(|(corner, _)| Gesture::Resize {
                        rack: id,
                        corner,
                        rotation: rack.rotation,
                        origin: canvas,
                        start: (rack.width, rack.height),
                        size: (rack.width, rack.height),
                    })
            }
        }
    }

    // ── Frame ────────────────────────────────────────────────────────

    fn visual_for(&self, key: MarkerKey) -> MarkerVisual {
        MarkerVisual::resolve(
            self.hover.target() == Some(key),
            self.selected == Some(key),
            self.focused == Some(key),
            self.gesture.dragged() == Some(key),
        )
    }

    pub fn render_frame(&self) -> RenderFrame {
        let zoom = self.viewport.scale();
        let k = compensated_scale(zoom);
        let bounds = self.bounds();
        let editing = self.mode == CanvasMode::Edit;

        let mut frame = RenderFrame::empty(self.viewport.state());
        frame.grid_visible = self.config.snap.enabled;
        frame.grid_spacing = self.config.snap.size;
        if self.image_ok && self.plan.image_size.is_some() {
            frame.image = Some(ImageLayer {
                url: self.plan.image_url.clone(),
                bounds,
            });
        }

        let mut centers: HashMap<EquipmentId, Point> = HashMap::with_capacity(self.equipment.len());
        for pos in &self.equipment {
            let key = MarkerKey::Equipment(pos.id);
            let (center, rotation) = match self.gesture {
                Gesture::Move { key: g, center, .. } if g == key => (center, pos.rotation),
                Gesture::Rotate { key: g, angle, .. } if g == key => {
                    (equipment_center(&bounds, pos), angle)
                }
                _ => (equipment_center(&bounds, pos), pos.rotation),
            };
            centers.insert(pos.equipment.id, center);
            let size = display_size(pos.icon_size, zoom);
            let visual = self.visual_for(key);
            let selected = self.selected == Some(key);
            frame.equipment.push(EquipmentGlyph {
                id: pos.id,
                center,
                size,
                icon_size: pos.icon_size,
                rotation,
                label: pos.label().to_string(),
                label_font_size: LABEL_FONT_SIZE * k,
                icon: pos.custom_icon.clone(),
                visual,
                style: marker_style(visual, self.pulse.opacity()),
                badge: self.counts.get(&pos.equipment.id).copied().filter(|n| *n > 0),
                badge_radius: BADGE_RADIUS * k,
                rotate_handle: (editing && selected)
                    .then(|| rotate_handle_position(center, size / 2.0, zoom)),
            });
        }

        for rack in &self.racks {
            let key = MarkerKey::Rack(rack.id);
            let (center, width, height) = match self.gesture {
                Gesture::Move { key: g, center, .. } if g == key => (center, rack.width, rack.height),
                Gesture::Resize { rack: id, size, .. } if id == rack.id => {
                    (rack_center(&bounds, rack), size.0, size.1)
                }
                _ => (rack_center(&bounds, rack), rack.width, rack.height),
            };
            let visual = self.visual_for(key);
            let handles = if editing && self.selected == Some(key) {
                rack_corners(center, width, height, rack.rotation).to_vec()
            } else {
                Vec::new()
            };
            frame.racks.push(RackGlyph {
                id: rack.id,
                center,
                width,
                height,
                rotation: rack.rotation,
                label: rack.rack.name.clone(),
                label_font_size: LABEL_FONT_SIZE * k,
                visual,
                style: marker_style(visual, self.pulse.opacity()),
                handles,
                handle_radius: HANDLE_RADIUS * k,
            });
        }

        frame.connections = layout_connections(&self.connections, &centers, zoom);
        frame.measurement = self.measure_overlay(k);
        if self.mode == CanvasMode::Calibrate {
            let pixel_distance = match self.calibration.points().as_slice() {
                [a, b] => Some(a.distance_to(b)),
                _ => None,
            };
            frame.calibration = Some(CalibrationOverlay {
                points: self.calibration.points(),
                pixel_distance,
                point_radius: MEASURE_POINT_RADIUS * k,
            });
        }
        frame
    }

    fn measure_overlay(&self, k: f64) -> Option<MeasureOverlay> {
        if self.mode != CanvasMode::Measure && self.measure.is_empty() {
            return None;
        }
        let points = self.measure.points().to_vec();
        let closed = self.measure.is_closed();
        let ppm = self.plan.pixels_per_meter();
        // Uncalibrated plans still show geometry, labelled in pixels.
        let summary = self.measure.summary(ppm.unwrap_or(1.0));
        let label = |meters: f64, pixels: f64| match ppm {
            Some(_) => format_meters(meters),
            None => format!("{:.0} px", pixels),
        };

        let segments = summary
            .segments
            .iter()
            .map(|s| SegmentLabel {
                segment: *s,
                text: label(s.meters, s.pixels),
            })
            .collect();

        let preview = match (self.mode, self.pointer) {
            (CanvasMode::Measure, Some(pointer)) => self.measure.preview(pointer),
            _ => None,
        };
        let preview_text = preview.map(|(a, b)| {
            let pixels = a.distance_to(&b);
            label(pixels / ppm.unwrap_or(1.0), pixels)
        });

        Some(MeasureOverlay {
            close_target: (!closed && points.len() >= 3).then(|| points[0]),
            close_radius: self.config.close_threshold_px / self.viewport.scale(),
            points,
            closed,
            segments,
            angles: summary.angles,
            total_distance: ppm.map(|_| summary.total_distance),
            area: ppm.and(summary.area),
            preview,
            preview_text,
            stroke_width: MEASURE_STROKE_WIDTH * k,
            point_radius: MEASURE_POINT_RADIUS * k,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use floorplan_core::coords::SnapGrid;
    use floorplan_core::model::{AssetRef, CableType, FloorPlanId, ViewState};
    use floorplan_io::{MemoryViewStateStore, StoreError};
    use uuid::Uuid;

    /// Store handle the test keeps a second reference to after mounting.
    #[derive(Debug, Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryViewStateStore>>);

    impl ViewStateStore for SharedStore {
        fn load(&self, plan: FloorPlanId) -> Result<Option<ViewState>, StoreError> {
            self.0.borrow().load(plan)
        }

        fn save(&mut self, plan: FloorPlanId, state: &ViewState) -> Result<(), StoreError> {
            self.0.borrow_mut().save(plan, state)
        }

        fn clear(&mut self, plan: FloorPlanId) -> Result<(), StoreError> {
            self.0.borrow_mut().clear(plan)
        }
    }

    fn plan() -> FloorPlan {
        let mut plan = FloorPlan::new("Level 1", "plans/level-1.png", 100.0);
        plan.image_size = Some(Size::new(2000.0, 1000.0));
        plan
    }

    fn mount_with(plan: FloorPlan, store: MemoryViewStateStore) -> FloorPlanCanvas {
        let _ = env_logger::builder().is_test(true).try_init();
        FloorPlanCanvas::mount(
            plan,
            Size::new(1000.0, 500.0),
            Box::new(store),
            CanvasConfig::default(),
        )
    }

    fn mount_config(config: CanvasConfig) -> FloorPlanCanvas {
        FloorPlanCanvas::mount(
            plan(),
            Size::new(1000.0, 500.0),
            Box::new(MemoryViewStateStore::new()),
            config,
        )
    }

    fn canvas() -> FloorPlanCanvas {
        mount_with(plan(), MemoryViewStateStore::new())
    }

    fn tap(canvas: &mut FloorPlanCanvas, x: f64, y: f64) {
        let p = Point::new(x, y);
        canvas.pointer_down(p, Modifiers::default());
        canvas.pointer_up(p, Modifiers::default());
    }

    fn drag(canvas: &mut FloorPlanCanvas, from: Point, to: Point, modifiers: Modifiers) {
        canvas.pointer_down(from, modifiers);
        canvas.pointer_move(to, modifiers);
        canvas.pointer_up(to, modifiers);
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn switch(name: &str) -> AssetRef {
        AssetRef::new(Uuid::new_v4(), name)
    }

    #[test]
    fn test_measure_square_room() {
        let mut c = canvas();
        c.plan.pixels_per_cm = Some(100.0);
        c.set_mode(CanvasMode::Measure);
        for (x, y) in [(0.0, 0.0), (200.0, 0.0), (200.0, 200.0), (0.0, 200.0)] {
            tap(&mut c, x, y);
        }
        assert!(!c.is_polygon_closed());
        tap(&mut c, 5.0, 3.0);
        assert!(c.is_polygon_closed());
        assert_eq!(c.measure_points().len(), 4);

        let events = c.drain_events();
        assert_eq!(events.len(), 5);
        assert!(matches!(
            events.last(),
            Some(CanvasEvent::MeasurementChanged { closed: true, .. })
        ));

        let frame = c.render_frame();
        let overlay = frame.measurement.unwrap();
        assert_eq!(overlay.segments.len(), 4);
        assert_eq!(overlay.segments[0].text, "2.00 m");
        assert_close(overlay.area.unwrap(), 4.0);

        let record = c.save_measurement("room", Some("Server room")).unwrap();
        assert_close(record.total_distance, 8.0);
        assert_close(record.area.unwrap(), 4.0);
        assert_eq!(record.label.as_deref(), Some("Server room"));
        assert!(c.measure_points().is_empty());
        assert_eq!(c.measurements().len(), 1);
    }

    #[test]
    fn test_save_requires_calibration() {
        let mut c = canvas();
        c.set_mode(CanvasMode::Measure);
        tap(&mut c, 0.0, 0.0);
        tap(&mut c, 100.0, 0.0);
        assert!(c.save_measurement("cable", None).is_none());
        assert_eq!(c.measure_points().len(), 2);
        let overlay = c.render_frame().measurement.unwrap();
        assert_eq!(overlay.segments[0].text, "100 px");
        assert!(overlay.total_distance.is_none());
    }

    #[test]
    fn test_undo_on_closed_polygon_drops_last_point() {
        let mut c = canvas();
        c.set_mode(CanvasMode::Measure);
        for (x, y) in [(0.0, 0.0), (400.0, 0.0), (400.0, 400.0), (0.0, 400.0), (2.0, 1.0)] {
            tap(&mut c, x, y);
        }
        assert!(c.is_polygon_closed());
        c.drain_events();

        assert_eq!(
            c.undo_last_measure_point(),
            UndoOutcome::Removed {
                point: Point::new(0.0, 400.0),
                reopened: true
            }
        );
        assert!(!c.is_polygon_closed());
        assert_eq!(c.measure_points().len(), 3);
        assert_eq!(
            c.drain_events(),
            vec![CanvasEvent::MeasurementChanged {
                points: vec![
                    Point::new(0.0, 0.0),
                    Point::new(400.0, 0.0),
                    Point::new(400.0, 400.0)
                ],
                closed: false
            }]
        );

        c.clear_measurement();
        assert_eq!(c.undo_last_measure_point(), UndoOutcome::Nothing);
    }

    #[test]
    fn test_leaving_measure_mode_clears_points() {
        let mut c = canvas();
        c.set_mode(CanvasMode::Measure);
        tap(&mut c, 10.0, 10.0);
        tap(&mut c, 50.0, 10.0);
        c.escape();
        assert_eq!(c.mode(), CanvasMode::View);
        assert!(c.measure_points().is_empty());
        assert!(c.render_frame().measurement.is_none());
    }

    #[test]
    fn test_drag_far_outside_clamps_position() {
        let mut c = canvas();
        let pos = EquipmentPosition::new(switch("core-1"), 0.5, 0.5);
        let id = pos.id;
        c.set_equipment(vec![pos]);
        c.set_mode(CanvasMode::Edit);
        drag(
            &mut c,
            Point::new(500.0, 250.0),
            Point::new(5000.0, -300.0),
            Modifiers::default(),
        );
        let events = c.drain_events();
        assert_eq!(events, vec![CanvasEvent::PositionChanged { id, x: 1.0, y: 0.0 }]);
        assert_eq!(c.equipment()[0].normalized(), Point::new(1.0, 0.0));
    }

    #[test]
    fn test_view_mode_does_not_move_markers() {
        let mut c = canvas();
        c.set_equipment(vec![EquipmentPosition::new(switch("core-1"), 0.5, 0.5)]);
        drag(
            &mut c,
            Point::new(500.0, 250.0),
            Point::new(600.0, 250.0),
            Modifiers::default(),
        );
        assert!(c.drain_events().is_empty());
        assert_eq!(c.equipment()[0].normalized(), Point::new(0.5, 0.5));
        assert!(c.selected().is_some());
    }

    #[test]
    fn test_rotate_with_shift_snaps() {
        let mut c = canvas();
        let pos = EquipmentPosition::new(switch("edge-1"), 0.5, 0.5);
        let id = pos.id;
        c.set_equipment(vec![pos]);
        c.set_mode(CanvasMode::Edit);
        tap(&mut c, 500.0, 250.0);
        assert_eq!(c.selected(), Some(MarkerKey::Equipment(id)));
        assert!(c.drain_events().is_empty());

        let handle = c.render_frame().equipment[0].rotate_handle.unwrap();
        assert_close(handle.x, 500.0);
        assert_close(handle.y, 250.0 - 16.0 - 18.0);

        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        // 80 degrees clockwise from up snaps to 75
        let angle = 80f64.to_radians();
        let to = Point::new(500.0 + 100.0 * angle.sin(), 250.0 - 100.0 * angle.cos());
        drag(&mut c, handle, to, shift);
        match c.drain_events().as_slice() {
            [CanvasEvent::RotationChanged { id: got, rotation }] => {
                assert_eq!(*got, id);
                assert_close(*rotation, 75.0);
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_rack_resize_and_delete() {
        let mut c = canvas();
        let rack = RackPosition::new(switch("rack-a"), 50.0, 50.0, 100.0, 60.0);
        let id = rack.id;
        c.set_racks(vec![rack]);
        c.set_mode(CanvasMode::Edit);
        tap(&mut c, 500.0, 250.0);
        assert_eq!(c.selected(), Some(MarkerKey::Rack(id)));
        assert_eq!(c.render_frame().racks[0].handles.len(), 4);

        drag(
            &mut c,
            Point::new(550.0, 280.0),
            Point::new(570.0, 290.0),
            Modifiers::default(),
        );
        assert_eq!(
            c.drain_events(),
            vec![CanvasEvent::RackResized {
                id,
                width: 120.0,
                height: 70.0
            }]
        );

        assert!(c.delete_selected());
        assert!(c.racks().is_empty());
        assert_eq!(c.drain_events(), vec![CanvasEvent::RackDeleted { id }]);
    }

    #[test]
    fn test_equipment_hit_above_rack() {
        let mut c = canvas();
        let pos = EquipmentPosition::new(switch("ups"), 0.5, 0.5);
        let key = MarkerKey::Equipment(pos.id);
        c.set_racks(vec![RackPosition::new(switch("rack"), 50.0, 50.0, 200.0, 200.0)]);
        c.set_equipment(vec![pos]);
        assert_eq!(c.hit_test(Point::new(500.0, 250.0)), Some(key));
        assert!(matches!(
            c.hit_test(Point::new(580.0, 250.0)),
            Some(MarkerKey::Rack(_))
        ));
        assert_eq!(c.hit_test(Point::new(50.0, 50.0)), None);
    }

    #[test]
    fn test_add_click_outside_image_suppressed() {
        let mut p = plan();
        p.image_size = Some(Size::new(2000.0, 500.0));
        let mut c = mount_with(p, MemoryViewStateStore::new());
        c.set_mode(CanvasMode::AddEquipment);
        tap(&mut c, 500.0, 50.0);
        assert!(c.drain_events().is_empty());
        tap(&mut c, 500.0, 250.0);
        assert_eq!(c.drain_events(), vec![CanvasEvent::AddClick { x: 0.5, y: 0.5 }]);
    }

    #[test]
    fn test_calibration_flow() {
        let mut c = canvas();
        c.set_mode(CanvasMode::Calibrate);
        tap(&mut c, 0.0, 0.0);
        tap(&mut c, 300.0, 0.0);
        let events = c.drain_events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[2],
            CanvasEvent::CalibrationMeasured {
                pixel_distance: 300.0
            }
        );
        assert_eq!(c.render_frame().calibration.unwrap().pixel_distance, Some(300.0));

        let calibration = c.complete_calibration(300.0, 100.0).unwrap();
        assert_close(calibration.pixels_per_cm, 1.0);
        assert_close(c.plan().pixels_per_meter().unwrap(), 1.0);
        assert!(c.calibration_points().is_empty());
    }

    #[test]
    fn test_calibration_rejects_zero_distance() {
        let mut c = canvas();
        c.set_mode(CanvasMode::Calibrate);
        tap(&mut c, 0.0, 0.0);
        tap(&mut c, 300.0, 0.0);
        assert!(matches!(
            c.complete_calibration(0.0, 100.0),
            Err(CalibrationError::InvalidDistance(_))
        ));
        assert!(c.calibration_points().is_empty());
        assert!(!c.plan().is_calibrated());
    }

    #[test]
    fn test_view_state_written_after_quiet_period() {
        let mut c = canvas();
        let id = c.plan().id;
        c.wheel(Point::new(100.0, 100.0), -1.0);
        c.tick(400.0);
        assert_eq!(c.store().load(id).unwrap(), None);
        c.tick(100.0);
        let stored = c.store().load(id).unwrap().unwrap();
        assert_close(stored.scale, 1.1);
    }

    #[test]
    fn test_view_state_restored_on_mount() {
        let p = plan();
        let mut store = MemoryViewStateStore::new();
        let saved = ViewState {
            scale: 2.5,
            pan_x: -120.0,
            pan_y: 40.0,
        };
        store.save(p.id, &saved).unwrap();
        let c = mount_with(p, store);
        assert_eq!(c.viewport().state(), saved);
        assert!(!c.viewport().has_pending_write());
    }

    #[test]
    fn test_unmount_flushes_pending_write() {
        let mut c = canvas();
        let id = c.plan().id;
        c.set_zoom(3.0);
        c.unmount();
        assert_close(c.store().load(id).unwrap().unwrap().scale, 3.0);
    }

    #[test]
    fn test_reset_view_clears_store() {
        let mut c = canvas();
        let id = c.plan().id;
        c.set_zoom(2.0);
        c.tick(500.0);
        assert!(c.store().load(id).unwrap().is_some());
        c.reset_view();
        assert_eq!(c.store().load(id).unwrap(), None);
        assert_eq!(c.viewport().state(), ViewState::default());
    }

    #[test]
    fn test_background_drag_pans() {
        let mut c = canvas();
        drag(
            &mut c,
            Point::new(100.0, 100.0),
            Point::new(160.0, 80.0),
            Modifiers::default(),
        );
        assert_eq!(c.viewport().pan(), Point::new(60.0, -20.0));
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_hover_event_after_delay() {
        let mut c = canvas();
        let pos = EquipmentPosition::new(switch("ap-3"), 0.5, 0.5);
        let id = pos.id;
        c.set_equipment(vec![pos]);
        c.pointer_move(Point::new(502.0, 251.0), Modifiers::default());
        c.tick(299.0);
        assert!(c.drain_events().is_empty());
        c.tick(1.0);
        assert_eq!(
            c.drain_events(),
            vec![CanvasEvent::Hover {
                id,
                screen_x: 502.0,
                screen_y: 251.0
            }]
        );
        c.pointer_move(Point::new(900.0, 450.0), Modifiers::default());
        assert_eq!(c.drain_events(), vec![CanvasEvent::HoverEnd]);
    }

    #[test]
    fn test_focus_centers_marker() {
        let mut c = canvas();
        let pos = EquipmentPosition::new(switch("fw-1"), 0.2, 0.8);
        let key = MarkerKey::Equipment(pos.id);
        c.set_equipment(vec![pos]);
        assert!(c.focus_on(key));
        for _ in 0..40 {
            c.tick(16.0);
        }
        assert_close(c.scale(), 1.8);
        let screen = c.viewport().canvas_to_screen(Point::new(200.0, 400.0));
        assert_close(screen.x, 500.0);
        assert_close(screen.y, 250.0);
        assert_eq!(c.render_frame().equipment[0].visual, MarkerVisual::Focused);
        assert!(!c.focus_on(MarkerKey::Rack(Uuid::new_v4())));
    }

    #[test]
    fn test_frame_badges_and_connections() {
        let mut c = canvas();
        let a = switch("core-1");
        let b = switch("edge-1");
        let remote = switch("remote");
        c.set_equipment(vec![
            EquipmentPosition::new(a.clone(), 0.1, 0.1),
            EquipmentPosition::new(b.clone(), 0.9, 0.9),
        ]);
        c.set_connections(vec![
            Connection::new(a.clone(), b.clone(), CableType::Ethernet),
            Connection::new(a.clone(), remote, CableType::Fiber),
        ]);
        assert_eq!(c.connection_count(a.id), 2);
        let frame = c.render_frame();
        assert_eq!(frame.connections.full.len(), 1);
        assert_eq!(frame.connections.partial.len(), 1);
        assert_eq!(frame.equipment[0].badge, Some(2));
        assert_eq!(frame.equipment[1].badge, Some(1));
        assert!(frame.image.is_some());

        c.set_zoom(5.0);
        let zoomed = c.render_frame();
        assert!(zoomed.equipment[0].size < frame.equipment[0].size);
    }

    #[test]
    fn test_failed_image_falls_back_to_container() {
        let mut p = plan();
        p.image_size = Some(Size::new(2000.0, 500.0));
        let mut c = mount_with(p, MemoryViewStateStore::new());
        assert_close(c.bounds().height, 250.0);
        c.image_failed();
        assert_eq!(c.bounds(), Bounds::new(0.0, 0.0, 1000.0, 500.0));
        assert!(c.render_frame().image.is_none());
    }

    #[test]
    fn test_handle_press_without_motion_emits_nothing() {
        let mut c = canvas();
        let pos = EquipmentPosition::new(switch("edge-2"), 0.5, 0.5);
        let rack = RackPosition::new(switch("rack-b"), 20.0, 20.0, 60.0, 60.0);
        let rack_id = rack.id;
        c.set_equipment(vec![pos]);
        c.set_racks(vec![rack]);
        c.set_mode(CanvasMode::Edit);

        tap(&mut c, 500.0, 250.0);
        let handle = c.render_frame().equipment[0].rotate_handle.unwrap();
        tap(&mut c, handle.x, handle.y);
        assert!(c.drain_events().is_empty());
        assert_eq!(c.equipment()[0].rotation, 0.0);

        tap(&mut c, 200.0, 100.0);
        assert_eq!(c.selected(), Some(MarkerKey::Rack(rack_id)));
        tap(&mut c, 230.0, 130.0);
        assert!(c.drain_events().is_empty());
        assert_eq!((c.racks()[0].width, c.racks()[0].height), (60.0, 60.0));
    }

    #[test]
    fn test_rack_drag_clamps_percent() {
        let mut c = canvas();
        let rack = RackPosition::new(switch("rack-c"), 50.0, 50.0, 100.0, 60.0);
        let id = rack.id;
        c.set_racks(vec![rack]);
        c.set_mode(CanvasMode::Edit);
        drag(
            &mut c,
            Point::new(500.0, 250.0),
            Point::new(-9000.0, 250.0),
            Modifiers::default(),
        );
        assert_eq!(
            c.drain_events(),
            vec![CanvasEvent::RackPositionChanged { id, x: 0.0, y: 50.0 }]
        );
        assert_eq!((c.racks()[0].position_x, c.racks()[0].position_y), (0.0, 50.0));

        drag(
            &mut c,
            Point::new(0.0, 250.0),
            Point::new(1200.0, 9000.0),
            Modifiers::default(),
        );
        assert_eq!(
            c.drain_events(),
            vec![CanvasEvent::RackPositionChanged { id, x: 100.0, y: 100.0 }]
        );
    }

    #[test]
    fn test_drag_snaps_to_grid() {
        let mut c = mount_config(CanvasConfig {
            snap: SnapGrid {
                enabled: true,
                size: 20.0,
            },
            ..CanvasConfig::default()
        });
        let pos = EquipmentPosition::new(switch("pdu-1"), 0.5, 0.5);
        c.set_equipment(vec![pos]);
        c.set_mode(CanvasMode::Edit);
        drag(
            &mut c,
            Point::new(500.0, 250.0),
            Point::new(613.0, 347.0),
            Modifiers::default(),
        );
        match c.drain_events().as_slice() {
            [CanvasEvent::PositionChanged { x, y, .. }] => {
                assert_close(*x, 0.62);
                assert_close(*y, 0.68);
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert!(c.render_frame().grid_visible);
    }

    #[test]
    fn test_wheel_burst_writes_once() {
        let shared = SharedStore::default();
        let mut c = FloorPlanCanvas::mount(
            plan(),
            Size::new(1000.0, 500.0),
            Box::new(shared.clone()),
            CanvasConfig::default(),
        );
        for _ in 0..10 {
            c.wheel(Point::new(300.0, 200.0), -1.0);
            c.tick(100.0);
        }
        assert_eq!(shared.0.borrow().write_count(), 0);
        c.tick(399.0);
        assert_eq!(shared.0.borrow().write_count(), 0);
        c.tick(1.0);
        assert_eq!(shared.0.borrow().write_count(), 1);
        c.tick(1000.0);
        assert_eq!(shared.0.borrow().write_count(), 1);
        let stored = shared.0.borrow().load(c.plan().id).unwrap().unwrap();
        assert_close(stored.scale, c.scale());
    }

    #[test]
    fn test_rotated_rack_hit_and_resize() {
        let mut c = canvas();
        let mut rack = RackPosition::new(switch("rack-d"), 50.0, 50.0, 100.0, 40.0);
        rack.rotation = 90.0;
        let id = rack.id;
        c.set_racks(vec![rack]);
        c.set_mode(CanvasMode::Edit);

        assert_eq!(c.hit_test(Point::new(500.0, 295.0)), Some(MarkerKey::Rack(id)));
        assert_eq!(c.hit_test(Point::new(545.0, 250.0)), None);

        tap(&mut c, 500.0, 250.0);
        let frame = c.render_frame();
        let (_, top_left) = frame.racks[0].handles[0];
        assert_close(top_left.x, 520.0);
        assert_close(top_left.y, 200.0);

        // bottom-right corner sits at the lower left once turned
        drag(
            &mut c,
            Point::new(480.0, 300.0),
            Point::new(480.0, 320.0),
            Modifiers::default(),
        );
        match c.drain_events().as_slice() {
            [CanvasEvent::RackResized { id: got, width, height }] => {
                assert_eq!(*got, id);
                assert_close(*width, 120.0);
                assert_close(*height, 40.0);
            }
            other => panic!("unexpected events {other:?}"),
        }
    }
}
