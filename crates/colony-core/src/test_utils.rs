//! Shared building constructors for unit tests, integration tests and
//! benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::building::Building;
use crate::fixed::Fixed64;
use crate::function::{LifeSupport, PowerGeneration, PowerSource};
use crate::id::BuildingId;
use crate::manager::BuildingManager;
use crate::mode::PowerMode;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

/// kW (or millisols) from an f64 literal.
pub fn kw(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Building constructors
// ===========================================================================

/// A plain consumer with no functions the grid cares about.
pub fn consumer(name: &str, full: f64, down: f64) -> Building {
    Building::new(name, "Workshop", kw(full), kw(down)).unwrap()
}

/// A consumer with life support.
pub fn habitat(name: &str, full: f64, down: f64) -> Building {
    Building::new(name, "Residential Quarters", kw(full), kw(down))
        .unwrap()
        .with_life_support(LifeSupport {
            occupant_capacity: 8,
        })
}

/// A generator with a constant output that consumes nothing itself.
pub fn generator(name: &str, output: f64) -> Building {
    generator_consumer(name, output, 0.0, 0.0)
}

/// A generator with a constant output and its own demand.
pub fn generator_consumer(name: &str, output: f64, full: f64, down: f64) -> Building {
    Building::new(name, "Power Plant", kw(full), kw(down))
        .unwrap()
        .with_generation(PowerGeneration::new(vec![PowerSource::standard(kw(output))]))
}

/// A solar array with its peak output and no demand.
pub fn solar_array(name: &str, peak: f64) -> Building {
    Building::new(name, "Solar Array", kw(0.0), kw(0.0))
        .unwrap()
        .with_generation(PowerGeneration::new(vec![PowerSource::solar(kw(peak))]))
}

// ===========================================================================
// Manager helpers
// ===========================================================================

/// Build a manager from buildings in order, returning their IDs in the same order.
pub fn manager_with(buildings: Vec<Building>) -> (BuildingManager, Vec<BuildingId>) {
    let mut manager = BuildingManager::new();
    let ids = buildings
        .into_iter()
        .map(|b| manager.add_building(b))
        .collect();
    (manager, ids)
}

/// Current power mode of each ID, in the given order.
pub fn modes(manager: &BuildingManager, ids: &[BuildingId]) -> Vec<PowerMode> {
    ids.iter()
        .map(|id| manager.get(*id).unwrap().power_mode())
        .collect()
}
