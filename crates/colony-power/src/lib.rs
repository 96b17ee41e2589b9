//! Settlement power grid.
//!
//! Each tick the grid sums generation across the settlement's generators,
//! plans every building at the grid's target mode, and compares demand with
//! supply. When supply falls short it sheds load in a strict priority order:
//! first powering down full-power consumers, then cutting power to buildings
//! without life support, and only then to life-support buildings.
//!
//! # Design
//!
//! - Buildings come from a [`BuildingManager`] in canonical settlement order;
//!   that order decides who is shed first within a pass.
//! - Everything is recomputed from scratch each tick. Nothing carries over
//!   except the previous snapshot, used to detect changes.
//! - The new snapshot and building modes are computed first and only applied
//!   once the whole tick succeeded, so a failed tick leaves the previous state
//!   in place.
//! - Change notifications go to the settlement's [`EventBus`]; shortage and
//!   restore events fire only on *transitions*, not every tick.

mod shedding;

pub use shedding::{LoadShedReport, ShedStep};

use colony_core::error::BuildingError;
use colony_core::event::{Event, EventBus};
use colony_core::fixed::{Fixed64, Ticks, fixed64_to_f64, saturating_sum};
use colony_core::function::FunctionKind;
use colony_core::id::SettlementId;
use colony_core::manager::BuildingManager;
use colony_core::mode::GridMode;
use serde::{Deserialize, Serialize};

use shedding::BuildingLoad;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Grid figures from the most recent successful tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Total generation in kW.
    pub generated_power: Fixed64,
    /// Total demand in kW with every building at the grid's target mode.
    pub required_power: Fixed64,
    /// `required_power <= generated_power`.
    pub sufficient_power: bool,
}

impl Default for GridSnapshot {
    fn default() -> Self {
        Self {
            generated_power: Fixed64::ZERO,
            required_power: Fixed64::ZERO,
            sufficient_power: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Power grid
// ---------------------------------------------------------------------------

/// A settlement's building power grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerGrid {
    settlement: SettlementId,
    mode: GridMode,
    snapshot: GridSnapshot,
}

impl PowerGrid {
    /// A grid in power-up mode with nothing generated or required.
    pub fn new(settlement: SettlementId) -> Self {
        Self {
            settlement,
            mode: GridMode::PowerUp,
            snapshot: GridSnapshot::default(),
        }
    }

    pub fn settlement(&self) -> SettlementId {
        self.settlement
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    /// Change the settlement-wide target mode. Emits
    /// [`Event::PowerModeChanged`] and returns `true` only if it changed.
    /// Buildings pick up the new mode on the next tick.
    pub fn set_mode(&mut self, mode: GridMode, events: &mut EventBus, tick: Ticks) -> bool {
        if self.mode == mode {
            return false;
        }
        log::info!("{}: power grid mode {} -> {}", self.settlement, self.mode, mode);
        self.mode = mode;
        events.emit(Event::PowerModeChanged {
            settlement: self.settlement,
            mode,
            tick,
        });
        true
    }

    /// Generated power in kW.
    pub fn generated_power(&self) -> Fixed64 {
        self.snapshot.generated_power
    }

    /// Required power in kW.
    pub fn required_power(&self) -> Fixed64 {
        self.snapshot.required_power
    }

    /// Whether generation covers every building at the grid's target mode.
    pub fn is_sufficient_power(&self) -> bool {
        self.snapshot.sufficient_power
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.snapshot
    }

    /// Rebalance the grid for one simulation step.
    ///
    /// 1. Sum the output of every generator.
    /// 2. Plan every building at the grid's target mode and sum its demand.
    /// 3. If demand is covered, every building runs at the target mode.
    /// 4. Otherwise shed load (see [`LoadShedReport`]) and mark the grid
    ///    insufficient.
    /// 5. Apply the planned modes, emit change events, swap in the snapshot.
    ///
    /// `elapsed` (millisols) does not affect the balance; the grid is
    /// recomputed from scratch every step. A building fault aborts the tick
    /// before anything is changed.
    pub fn time_passing(
        &mut self,
        _elapsed: Fixed64,
        buildings: &mut BuildingManager,
        events: &mut EventBus,
        tick: Ticks,
    ) -> Result<LoadShedReport, BuildingError> {
        let target = self.mode.target_building_mode();

        let mut loads = Vec::with_capacity(buildings.len());
        for building in buildings.iter() {
            let generated = building.generated_power()?;
            loads.push(BuildingLoad {
                id: building.id(),
                full: building.full_power_required(),
                down: building.powered_down_power_required(),
                generated,
                life_support: building.has_function(FunctionKind::LifeSupport),
                previous: building.power_mode(),
                planned: target,
            });
            if log::log_enabled!(log::Level::Debug) {
                log::debug!(
                    "{}: '{}' generates {:.3} kW, needs {:.3} kW at {}",
                    self.settlement,
                    building.name,
                    fixed64_to_f64(generated),
                    fixed64_to_f64(building.power_required(target)),
                    target,
                );
            }
        }

        let generated_power = saturating_sum(loads.iter().map(|l| l.generated));
        let required_power = saturating_sum(loads.iter().map(|l| l.demand(target)));
        let sufficient_power = required_power <= generated_power;

        let report = if sufficient_power {
            LoadShedReport::default()
        } else {
            shedding::shed_load(
                &mut loads,
                self.mode,
                required_power.saturating_sub(generated_power),
            )
        };

        log::debug!(
            "{}: generated {:.3} kW, required {:.3} kW, shed {} building(s)",
            self.settlement,
            fixed64_to_f64(generated_power),
            fixed64_to_f64(required_power),
            report.steps.len(),
        );

        // Everything below is infallible: apply the plan and publish it.
        for load in &loads {
            if let Some(building) = buildings.get_mut(load.id) {
                building.set_power_mode(load.planned);
            }
            if load.previous != load.planned {
                events.emit(Event::BuildingPowerModeChanged {
                    building: load.id,
                    from: load.previous,
                    to: load.planned,
                    tick,
                });
            }
        }

        let next = GridSnapshot {
            generated_power,
            required_power,
            sufficient_power,
        };
        self.publish(next, &report, events, tick);
        self.snapshot = next;

        Ok(report)
    }

    /// Emit one event per field that differs from the current snapshot.
    fn publish(
        &self,
        next: GridSnapshot,
        report: &LoadShedReport,
        events: &mut EventBus,
        tick: Ticks,
    ) {
        let prev = self.snapshot;
        if next.generated_power != prev.generated_power {
            events.emit(Event::GeneratedPowerChanged {
                settlement: self.settlement,
                power: next.generated_power,
                tick,
            });
        }
        if next.required_power != prev.required_power {
            events.emit(Event::RequiredPowerChanged {
                settlement: self.settlement,
                power: next.required_power,
                tick,
            });
        }
        if prev.sufficient_power && !next.sufficient_power {
            log::info!(
                "{}: power shortage of {:.3} kW, {} building(s) shed",
                self.settlement,
                fixed64_to_f64(report.initial_deficit),
                report.steps.len(),
            );
            events.emit(Event::PowerShortage {
                settlement: self.settlement,
                deficit: report.initial_deficit,
                tick,
            });
        } else if !prev.sufficient_power && next.sufficient_power {
            log::info!("{}: power restored", self.settlement);
            events.emit(Event::PowerRestored {
                settlement: self.settlement,
                tick,
            });
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
