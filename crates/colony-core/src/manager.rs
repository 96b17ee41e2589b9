//! The settlement's ordered building list.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::building::Building;
use crate::error::BuildingError;
use crate::function::FunctionKind;
use crate::id::BuildingId;

/// Owns a settlement's buildings in canonical order.
///
/// Iteration order is insertion order and is stable across removals. The
/// power grid sheds load in this order, so it must stay deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingManager {
    buildings: SlotMap<BuildingId, Building>,
    order: Vec<BuildingId>,
}

impl BuildingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a building at the end of the settlement order and return its ID.
    pub fn add_building(&mut self, building: Building) -> BuildingId {
        let id = self.buildings.insert_with_key(|id| {
            let mut building = building;
            building.set_id(id);
            building
        });
        self.order.push(id);
        id
    }

    /// Remove a building. Returns it if it was present.
    pub fn remove_building(&mut self, id: BuildingId) -> Option<Building> {
        let removed = self.buildings.remove(id)?;
        self.order.retain(|b| *b != id);
        Some(removed)
    }

    pub fn get(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id)
    }

    pub fn get_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(id)
    }

    /// Like [`get_mut`](Self::get_mut), but an unknown ID is an error.
    pub fn require_mut(&mut self, id: BuildingId) -> Result<&mut Building, BuildingError> {
        self.buildings
            .get_mut(id)
            .ok_or(BuildingError::UnknownBuilding(id))
    }

    pub fn contains(&self, id: BuildingId) -> bool {
        self.buildings.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Building IDs in settlement order.
    pub fn ids(&self) -> &[BuildingId] {
        &self.order
    }

    /// Buildings in settlement order.
    pub fn iter(&self) -> impl Iterator<Item = &Building> + '_ {
        self.order.iter().filter_map(|id| self.buildings.get(*id))
    }

    /// Mutable access to every building, in settlement order.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Building)) {
        for id in &self.order {
            if let Some(building) = self.buildings.get_mut(*id) {
                f(building);
            }
        }
    }

    /// Buildings providing the given function, in settlement order.
    pub fn buildings_with(&self, kind: FunctionKind) -> impl Iterator<Item = &Building> + '_ {
        self.iter().filter(move |b| b.has_function(kind))
    }
}
