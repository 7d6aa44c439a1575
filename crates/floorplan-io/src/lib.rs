//! # Floorplan I/O
//!
//! Durable storage for per-plan viewport state and JSON loading of the
//! records a host feeds into the canvas. Position and measurement writes are
//! the host's business; nothing here talks to a database.

pub mod view_state;
pub mod snapshot;

pub use view_state::{JsonFileViewStateStore, MemoryViewStateStore, StoreError, ViewStateStore};
pub use snapshot::FloorPlanSnapshot;
