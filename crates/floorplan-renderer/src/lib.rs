//! # Floorplan Renderer
//!
//! Interactive canvas over a floor-plan image: zoom and pan, equipment and
//! rack markers, connection lines, the measurement and calibration overlays.
//!
//! The host feeds pointer input and a frame clock into [`FloorPlanCanvas`],
//! drains [`CanvasEvent`]s for anything it must persist, and draws the
//! JSON-serializable [`RenderFrame`] the canvas produces.

pub mod config;
pub mod timing;
pub mod viewport;
pub mod markers;
pub mod interaction;
pub mod connections;
pub mod render_data;
pub mod canvas;

pub use canvas::{CanvasEvent, CanvasMode, FloorPlanCanvas};
pub use config::CanvasConfig;
pub use interaction::Modifiers;
pub use render_data::RenderFrame;
pub use viewport::{ViewportController, WheelDirection};
