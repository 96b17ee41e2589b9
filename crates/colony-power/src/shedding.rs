//! Shortfall resolution: demote buildings in priority order until the
//! deficit is covered or nothing sheddable is left.

use colony_core::fixed::Fixed64;
use colony_core::id::BuildingId;
use colony_core::mode::{GridMode, PowerMode};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// One demotion performed while resolving a shortfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShedStep {
    pub building: BuildingId,
    pub from: PowerMode,
    pub to: PowerMode,
    /// Deficit remaining right after this demotion.
    pub deficit_after: Fixed64,
}

/// What the grid shed during one tick. Empty when supply met demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadShedReport {
    /// `required - generated` before any shedding; zero if sufficient.
    pub initial_deficit: Fixed64,
    /// Demotions in the order they were applied.
    pub steps: Vec<ShedStep>,
    /// Deficit left after all passes. May be negative when the last
    /// demotion saved more than was needed.
    pub remaining_deficit: Fixed64,
}

impl LoadShedReport {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of buildings demoted to `to` this tick.
    pub fn count_to(&self, to: PowerMode) -> usize {
        self.steps.iter().filter(|s| s.to == to).count()
    }

    /// Whether shedding covered the whole deficit.
    pub fn is_resolved(&self) -> bool {
        self.remaining_deficit <= Fixed64::ZERO
    }
}

// ---------------------------------------------------------------------------
// Per-building load
// ---------------------------------------------------------------------------

/// A building's power figures captured at the start of a tick, plus the mode
/// planned for it. Shedding works on these so nothing is mutated until the
/// whole tick has been computed.
#[derive(Debug, Clone)]
pub(crate) struct BuildingLoad {
    pub id: BuildingId,
    pub full: Fixed64,
    pub down: Fixed64,
    pub generated: Fixed64,
    pub life_support: bool,
    /// Mode at the end of the previous tick.
    pub previous: PowerMode,
    pub planned: PowerMode,
}

impl BuildingLoad {
    pub fn demand(&self, mode: PowerMode) -> Fixed64 {
        match mode {
            PowerMode::FullPower => self.full,
            PowerMode::PowerDown => self.down,
            PowerMode::NoPower => Fixed64::ZERO,
        }
    }

    /// The building consumes more than it generates at `mode`.
    pub fn is_net_consumer(&self, mode: PowerMode) -> bool {
        self.generated < self.demand(mode)
    }
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

/// Resolve `deficit` by demoting planned modes in `loads`.
///
/// Three passes, each in settlement order and each stopping once the deficit
/// is covered:
/// 1. FullPower -> PowerDown for every net consumer (PowerUp grids only).
/// 2. PowerDown -> NoPower for net consumers without life support.
/// 3. PowerDown -> NoPower for net consumers with life support.
pub(crate) fn shed_load(
    loads: &mut [BuildingLoad],
    grid_mode: GridMode,
    deficit: Fixed64,
) -> LoadShedReport {
    let mut report = LoadShedReport {
        initial_deficit: deficit,
        steps: Vec::new(),
        remaining_deficit: deficit,
    };
    let mut deficit = deficit;

    if grid_mode == GridMode::PowerUp {
        demote(
            loads,
            &mut deficit,
            &mut report.steps,
            PowerMode::FullPower,
            PowerMode::PowerDown,
            |_| true,
        );
    }
    demote(
        loads,
        &mut deficit,
        &mut report.steps,
        PowerMode::PowerDown,
        PowerMode::NoPower,
        |load| !load.life_support,
    );
    demote(
        loads,
        &mut deficit,
        &mut report.steps,
        PowerMode::PowerDown,
        PowerMode::NoPower,
        |load| load.life_support,
    );

    report.remaining_deficit = deficit;
    report
}

fn demote(
    loads: &mut [BuildingLoad],
    deficit: &mut Fixed64,
    steps: &mut Vec<ShedStep>,
    from: PowerMode,
    to: PowerMode,
    eligible: impl Fn(&BuildingLoad) -> bool,
) {
    for load in loads.iter_mut() {
        if *deficit <= Fixed64::ZERO {
            return;
        }
        if load.planned != from || !eligible(load) || !load.is_net_consumer(from) {
            continue;
        }
        // Non-negative: building figures are validated so down <= full.
        let saving = load.demand(from) - load.demand(to);
        load.planned = to;
        *deficit = deficit.saturating_sub(saving);
        steps.push(ShedStep {
            building: load.id,
            from,
            to,
            deficit_after: *deficit,
        });
    }
}
