//! Per-plan viewport state storage.
//!
//! The canvas writes `{scale, pan_x, pan_y}` after interaction settles and
//! reads it back once on mount. Stores are keyed by floor-plan id.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use floorplan_core::model::{FloorPlanId, ViewState};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed view state for plan {plan}: {source}")]
    Malformed {
        plan: FloorPlanId,
        source: serde_json::Error,
    },

    #[error("Failed to encode view state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Client-local durable storage for viewport state.
pub trait ViewStateStore: std::fmt::Debug {
    fn load(&self, plan: FloorPlanId) -> Result<Option<ViewState>, StoreError>;
    fn save(&mut self, plan: FloorPlanId, state: &ViewState) -> Result<(), StoreError>;
    fn clear(&mut self, plan: FloorPlanId) -> Result<(), StoreError>;
}

/// Store that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryViewStateStore {
    entries: HashMap<FloorPlanId, ViewState>,
    writes: usize,
}

impl MemoryViewStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves, useful for checking write debouncing.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl ViewStateStore for MemoryViewStateStore {
    fn load(&self, plan: FloorPlanId) -> Result<Option<ViewState>, StoreError> {
        Ok(self.entries.get(&plan).copied())
    }

    fn save(&mut self, plan: FloorPlanId, state: &ViewState) -> Result<(), StoreError> {
        self.entries.insert(plan, *state);
        self.writes += 1;
        Ok(())
    }

    fn clear(&mut self, plan: FloorPlanId) -> Result<(), StoreError> {
        self.entries.remove(&plan);
        Ok(())
    }
}

/// One pretty-printed JSON file per plan under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileViewStateStore {
    dir: PathBuf,
}

impl JsonFileViewStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, plan: FloorPlanId) -> PathBuf {
        self.dir.join(format!("floorplan-view-{}.json", plan))
    }
}

impl ViewStateStore for JsonFileViewStateStore {
    fn load(&self, plan: FloorPlanId) -> Result<Option<ViewState>, StoreError> {
        let path = self.path_for(plan);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let state = serde_json::from_str(&json)
            .map_err(|source| StoreError::Malformed { plan, source })?;
        Ok(Some(state))
    }

    fn save(&mut self, plan: FloorPlanId, state: &ViewState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(self.path_for(plan), json)?;
        debug!("view state for {} written to {}", plan, self.dir.display());
        Ok(())
    }

    fn clear(&mut self, plan: FloorPlanId) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(plan)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("floorplan-io-test-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryViewStateStore::new();
        let plan = Uuid::new_v4();
        assert!(store.load(plan).unwrap().is_none());

        let state = ViewState {
            scale: 2.0,
            pan_x: -40.0,
            pan_y: 12.5,
        };
        store.save(plan, &state).unwrap();
        assert_eq!(store.load(plan).unwrap(), Some(state));
        assert_eq!(store.write_count(), 1);

        store.clear(plan).unwrap();
        assert!(store.load(plan).unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_roundtrip() {
        let dir = scratch_dir();
        let mut store = JsonFileViewStateStore::new(&dir).unwrap();
        let plan = Uuid::new_v4();
        assert!(store.load(plan).unwrap().is_none());

        let state = ViewState {
            scale: 0.5,
            pan_x: 100.0,
            pan_y: 200.0,
        };
        store.save(plan, &state).unwrap();
        assert_eq!(store.load(plan).unwrap(), Some(state));

        store.clear(plan).unwrap();
        store.clear(plan).unwrap();
        assert!(store.load(plan).unwrap().is_none());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_json_file_store_malformed() {
        let dir = scratch_dir();
        let store = JsonFileViewStateStore::new(&dir).unwrap();
        let plan = Uuid::new_v4();
        fs::write(store.path_for(plan), "{ not json").unwrap();

        let err = store.load(plan).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));

        let _ = fs::remove_dir_all(dir);
    }
}
