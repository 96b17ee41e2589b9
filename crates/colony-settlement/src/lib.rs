//! Colony Settlement -- owns one settlement's buildings, power grid, clock
//! and event bus, and drives them one step at a time.
//!
//! # Quick Start
//!
//! ```
//! use colony_core::building::Building;
//! use colony_core::fixed::f64_to_fixed64 as kw;
//! use colony_core::id::SettlementId;
//! use colony_settlement::Settlement;
//!
//! let mut settlement = Settlement::new(SettlementId(1), "Schiaparelli Point");
//! settlement.add_building(Building::new("Lab", "Laboratory", kw(6.0), kw(2.0)).unwrap());
//!
//! let report = settlement.time_passing(kw(10.0)).unwrap();
//! assert!(!settlement.power_grid().is_sufficient_power());
//! assert_eq!(report.steps.len(), 2);
//! ```

pub mod snapshot;

pub use snapshot::{DeserializeError, FORMAT_VERSION, SNAPSHOT_MAGIC, SerializeError};

use colony_core::building::Building;
use colony_core::clock::{MarsClock, StateHash};
use colony_core::error::BuildingError;
use colony_core::event::{Event, EventBus};
use colony_core::fixed::{Fixed64, Ticks};
use colony_core::function::FunctionKind;
use colony_core::id::{BuildingId, SettlementId};
use colony_core::manager::BuildingManager;
use colony_core::mode::GridMode;
use colony_data::SettlementTemplate;
use colony_power::{LoadShedReport, PowerGrid};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// A settlement and everything its power grid balances over.
#[derive(Debug)]
pub struct Settlement {
    id: SettlementId,
    name: String,
    buildings: BuildingManager,
    grid: PowerGrid,
    clock: MarsClock,
    /// Sunlight factor pushed into every solar source each step, 0..=1.
    sunlight: Fixed64,
    events: EventBus,
}

impl Settlement {
    /// An empty settlement in power-up mode under full sunlight.
    pub fn new(id: SettlementId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            buildings: BuildingManager::new(),
            grid: PowerGrid::new(id),
            clock: MarsClock::new(),
            sunlight: Fixed64::ONE,
            events: EventBus::default(),
        }
    }

    /// Instantiate a loaded template. The settlement starts with no pending
    /// events.
    pub fn from_template(id: SettlementId, template: SettlementTemplate) -> Self {
        let mut settlement = Self::new(id, template.name);
        settlement.set_power_mode(template.grid_mode);
        settlement.set_sunlight(template.sunlight);
        for building in template.buildings {
            settlement.add_building(building);
        }
        settlement.events.clear();
        settlement
    }

    pub fn id(&self) -> SettlementId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of completed steps.
    pub fn tick(&self) -> Ticks {
        self.clock.tick
    }

    pub fn clock(&self) -> &MarsClock {
        &self.clock
    }

    // -----------------------------------------------------------------------
    // Buildings
    // -----------------------------------------------------------------------

    /// Add a building at the end of the settlement order. The event bus grows
    /// so one step's mode changes fit in its buffers.
    pub fn add_building(&mut self, building: Building) -> BuildingId {
        let name = building.name.clone();
        let id = self.buildings.add_building(building);
        self.events.reserve(self.buildings.len());
        log::debug!("{}: added building '{}' ({:?})", self.id, name, id);
        self.events.emit(Event::BuildingAdded {
            settlement: self.id,
            building: id,
            tick: self.clock.tick,
        });
        id
    }

    pub fn remove_building(&mut self, id: BuildingId) -> Option<Building> {
        let removed = self.buildings.remove_building(id)?;
        log::debug!("{}: removed building '{}' ({:?})", self.id, removed.name, id);
        self.events.emit(Event::BuildingRemoved {
            settlement: self.id,
            building: id,
            tick: self.clock.tick,
        });
        Some(removed)
    }

    pub fn buildings(&self) -> &BuildingManager {
        &self.buildings
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id)
    }

    /// Mark a generator as broken. Every step fails until it is repaired.
    pub fn report_malfunction(
        &mut self,
        id: BuildingId,
        reason: impl Into<String>,
    ) -> Result<(), BuildingError> {
        let reason = reason.into();
        let building = self.buildings.require_mut(id)?;
        log::warn!("{}: '{}' malfunction: {}", self.id, building.name, reason);
        building.require_generation_mut()?.set_malfunction(reason);
        Ok(())
    }

    pub fn repair(&mut self, id: BuildingId) -> Result<(), BuildingError> {
        let building = self.buildings.require_mut(id)?;
        log::info!("{}: '{}' repaired", self.id, building.name);
        building.require_generation_mut()?.repair();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Grid
    // -----------------------------------------------------------------------

    pub fn power_grid(&self) -> &PowerGrid {
        &self.grid
    }

    /// Change the settlement-wide target mode; takes effect next step.
    pub fn set_power_mode(&mut self, mode: GridMode) -> bool {
        self.grid.set_mode(mode, &mut self.events, self.clock.tick)
    }

    pub fn sunlight(&self) -> Fixed64 {
        self.sunlight
    }

    /// Set the sunlight factor, clamped to 0..=1. Solar sources pick it up
    /// on the next step.
    pub fn set_sunlight(&mut self, sunlight: Fixed64) {
        self.sunlight = sunlight.clamp(Fixed64::ZERO, Fixed64::ONE);
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register listeners here; they run at the end of every step.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Advance the settlement by `elapsed` millisols.
    ///
    /// Pushes the sunlight factor into solar generators, rebalances the power
    /// grid, and delivers buffered events to listeners. A building fault is
    /// returned and leaves every building, sunlight included, and the grid as
    /// they were after the previous step. Buffered events stay queued for the
    /// next delivery.
    pub fn time_passing(&mut self, elapsed: Fixed64) -> Result<LoadShedReport, BuildingError> {
        self.clock.advance(elapsed);

        let previous_sunlight = self.push_sunlight();
        let report = match self.grid.time_passing(
            elapsed,
            &mut self.buildings,
            &mut self.events,
            self.clock.tick,
        ) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("{}: power grid step failed: {}", self.id, e);
                for (id, sunlight) in previous_sunlight {
                    if let Some(generation) =
                        self.buildings.get_mut(id).and_then(Building::generation_mut)
                    {
                        generation.set_sunlight(sunlight);
                    }
                }
                return Err(e);
            }
        };

        self.events.deliver();
        Ok(report)
    }

    /// Set every generator's sunlight factor, returning the old factor of
    /// each one that changed.
    fn push_sunlight(&mut self) -> Vec<(BuildingId, Fixed64)> {
        let sunlight = self.sunlight;
        let mut previous = Vec::new();
        self.buildings.for_each_mut(|building| {
            let id = building.id();
            if let Some(generation) = building.generation_mut() {
                if generation.sunlight() != sunlight {
                    previous.push((id, generation.sunlight()));
                    generation.set_sunlight(sunlight);
                }
            }
        });
        previous
    }

    /// Deterministic hash of the grid state and every building's power mode.
    pub fn state_hash(&self) -> u64 {
        let mut hash = StateHash::new();
        hash.write_u64(u64::from(self.id.0));
        hash.write_u64(self.clock.tick);
        hash.write_u8(self.grid.mode() as u8);

        let snapshot = self.grid.snapshot();
        hash.write_fixed64(snapshot.generated_power);
        hash.write_fixed64(snapshot.required_power);
        hash.write_u8(u8::from(snapshot.sufficient_power));

        for building in self.buildings.iter() {
            hash.write_u8(building.power_mode().tag());
            hash.write_fixed64(building.full_power_required());
            hash.write_fixed64(building.powered_down_power_required());
            hash.write_u8(u8::from(building.has_function(FunctionKind::LifeSupport)));
        }
        hash.finish()
    }
}

// ---------------------------------------------------------------------------
// Multi-settlement stepping
// ---------------------------------------------------------------------------

/// Step every settlement by `elapsed` millisols. Settlements share no state,
/// so with the `parallel` feature they are stepped on the rayon pool.
///
/// Returns one result per settlement, in input order.
pub fn tick_all(
    settlements: &mut [Settlement],
    elapsed: Fixed64,
) -> Vec<Result<LoadShedReport, BuildingError>> {
    #[cfg(feature = "parallel")]
    let settlements = settlements.par_iter_mut();
    #[cfg(not(feature = "parallel"))]
    let settlements = settlements.iter_mut();

    settlements.map(|s| s.time_passing(elapsed)).collect()
}

// ===========================================================================
// Tests
// ===========================================================================
