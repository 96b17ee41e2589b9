//! Building functions that the power grid cares about.
//!
//! A building's capabilities are resolved when it is constructed: each
//! function is an `Option` field on [`Building`](crate::building::Building),
//! and [`FunctionKind`] names them for capability queries.

use serde::{Deserialize, Serialize};

use crate::fixed::Fixed64;

/// Names a building capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    PowerGeneration,
    LifeSupport,
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionKind::PowerGeneration => f.write_str("power generation"),
            FunctionKind::LifeSupport => f.write_str("life support"),
        }
    }
}

// ---------------------------------------------------------------------------
// Power generation
// ---------------------------------------------------------------------------

/// How a power source's output responds to surface conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerSourceKind {
    /// Constant output (reactor, RTG).
    Standard,
    /// Output scales with the sunlight factor.
    Solar,
}

/// A single generator inside a building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSource {
    pub kind: PowerSourceKind,
    /// Output in kW at full sunlight (or always, for standard sources).
    pub max_power: Fixed64,
}

impl PowerSource {
    pub fn standard(max_power: Fixed64) -> Self {
        Self {
            kind: PowerSourceKind::Standard,
            max_power,
        }
    }

    pub fn solar(max_power: Fixed64) -> Self {
        Self {
            kind: PowerSourceKind::Solar,
            max_power,
        }
    }

    /// Output in kW for the given sunlight factor.
    pub fn output(&self, sunlight: Fixed64) -> Fixed64 {
        match self.kind {
            PowerSourceKind::Standard => self.max_power,
            PowerSourceKind::Solar => self.max_power.saturating_mul(sunlight),
        }
    }
}

/// The power-generation function of a building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerGeneration {
    pub sources: Vec<PowerSource>,
    /// Sunlight factor in `0..=1`, pushed in by the settlement each tick.
    sunlight: Fixed64,
    /// Set while the generator is broken; reading its output is a fault.
    malfunction: Option<String>,
}

impl PowerGeneration {
    pub fn new(sources: Vec<PowerSource>) -> Self {
        Self {
            sources,
            sunlight: Fixed64::ONE,
            malfunction: None,
        }
    }

    pub fn sunlight(&self) -> Fixed64 {
        self.sunlight
    }

    /// Clamped to `0..=1`.
    pub fn set_sunlight(&mut self, sunlight: Fixed64) {
        self.sunlight = sunlight.clamp(Fixed64::ZERO, Fixed64::ONE);
    }

    pub fn malfunction(&self) -> Option<&str> {
        self.malfunction.as_deref()
    }

    pub fn set_malfunction(&mut self, reason: impl Into<String>) {
        self.malfunction = Some(reason.into());
    }

    pub fn repair(&mut self) {
        self.malfunction = None;
    }

    /// Combined output of every source, ignoring malfunctions.
    pub fn output(&self) -> Fixed64 {
        crate::fixed::saturating_sum(self.sources.iter().map(|s| s.output(self.sunlight)))
    }
}

// ---------------------------------------------------------------------------
// Life support
// ---------------------------------------------------------------------------

/// Breathable air and thermal support for occupants. Buildings with this
/// function are shed last during a power shortage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeSupport {
    pub occupant_capacity: u32,
}
