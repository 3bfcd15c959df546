//! Plant directory: the set of active plants and their published snapshots.
//!
//! The directory observes plants; it never creates or evaluates them.
//! Aggregators register their [`SharedSnapshot`] here and the global
//! registry reads through the [`PlantDirectory`] trait.

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

use crate::error::CoreError;
use crate::plant::aggregator::{read_snapshot, SharedSnapshot};
use crate::problem::PlantSnapshot;
use crate::types::{DeviceId, PlantId};

/// Read-only view of the active plants.
pub trait PlantDirectory: Send + Sync {
    fn list_active_plants(&self) -> BTreeSet<PlantId>;
    fn snapshot(&self, plant_id: &PlantId) -> Option<PlantSnapshot>;
    /// User override name if set, otherwise the configured name.
    fn display_name(&self, plant_id: &PlantId) -> Option<String>;
    fn device_id(&self, plant_id: &PlantId) -> Option<DeviceId>;
}

/// Internal bookkeeping for one registered plant.
struct PlantEntry {
    name: String,
    name_override: Option<String>,
    device_id: Option<DeviceId>,
    snapshot: SharedSnapshot,
}

/// In-memory [`PlantDirectory`] guarded by a single `RwLock`.
///
/// Designed to be wrapped in `Arc` and shared between the code that
/// registers plants and the global registry that observes them.
#[derive(Default)]
pub struct PlantCatalog {
    plants: RwLock<HashMap<PlantId, PlantEntry>>,
}

impl PlantCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plant's published snapshot.
    pub fn register(
        &self,
        plant_id: impl Into<PlantId>,
        name: impl Into<String>,
        device_id: Option<DeviceId>,
        snapshot: SharedSnapshot,
    ) -> Result<(), CoreError> {
        let plant_id = plant_id.into();
        let mut plants = self.plants.write().unwrap_or_else(PoisonError::into_inner);
        if plants.contains_key(&plant_id) {
            return Err(CoreError::Conflict(format!(
                "Plant '{plant_id}' is already registered"
            )));
        }
        tracing::info!(plant_id = %plant_id, "Plant registered");
        plants.insert(
            plant_id,
            PlantEntry {
                name: name.into(),
                name_override: None,
                device_id,
                snapshot,
            },
        );
        Ok(())
    }

    /// Remove a plant from the directory.
    pub fn unregister(&self, plant_id: &PlantId) -> Result<(), CoreError> {
        let mut plants = self.plants.write().unwrap_or_else(PoisonError::into_inner);
        match plants.remove(plant_id) {
            Some(_) => {
                tracing::info!(plant_id = %plant_id, "Plant unregistered");
                Ok(())
            }
            None => Err(CoreError::NotFound(plant_id.clone())),
        }
    }

    /// Set or clear the user-assigned display name.
    pub fn rename(&self, plant_id: &PlantId, name: Option<String>) -> Result<(), CoreError> {
        let mut plants = self.plants.write().unwrap_or_else(PoisonError::into_inner);
        let entry = plants
            .get_mut(plant_id)
            .ok_or_else(|| CoreError::NotFound(plant_id.clone()))?;
        entry.name_override = name.filter(|n| !n.trim().is_empty());
        Ok(())
    }

    pub fn contains(&self, plant_id: &PlantId) -> bool {
        self.plants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(plant_id)
    }

    pub fn len(&self) -> usize {
        self.plants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlantDirectory for PlantCatalog {
    fn list_active_plants(&self) -> BTreeSet<PlantId> {
        self.plants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn snapshot(&self, plant_id: &PlantId) -> Option<PlantSnapshot> {
        let plants = self.plants.read().unwrap_or_else(PoisonError::into_inner);
        plants.get(plant_id).map(|e| read_snapshot(&e.snapshot))
    }

    fn display_name(&self, plant_id: &PlantId) -> Option<String> {
        let plants = self.plants.read().unwrap_or_else(PoisonError::into_inner);
        plants
            .get(plant_id)
            .map(|e| e.name_override.clone().unwrap_or_else(|| e.name.clone()))
    }

    fn device_id(&self, plant_id: &PlantId) -> Option<DeviceId> {
        let plants = self.plants.read().unwrap_or_else(PoisonError::into_inner);
        plants.get(plant_id).and_then(|e| e.device_id.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
