//! Grid-wide and per-building power postures.

use serde::{Deserialize, Serialize};

/// Settlement-wide target power posture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMode {
    /// Maximize comfort and output: buildings are planned at full power.
    #[default]
    PowerUp,
    /// Conserve: buildings are planned at their powered-down demand.
    PowerDown,
}

impl GridMode {
    /// The building power mode every building is planned at before any
    /// shortage handling.
    pub fn target_building_mode(self) -> PowerMode {
        match self {
            GridMode::PowerUp => PowerMode::FullPower,
            GridMode::PowerDown => PowerMode::PowerDown,
        }
    }

    /// Human-readable label, as shown by monitoring panels.
    pub fn label(self) -> &'static str {
        match self {
            GridMode::PowerUp => "Power up",
            GridMode::PowerDown => "Power down",
        }
    }
}

impl std::fmt::Display for GridMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Effective power state of a single building.
///
/// Variants are ordered from least to most powered, so `a < b` means `a`
/// is a downgrade of `b`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PowerMode {
    NoPower,
    PowerDown,
    #[default]
    FullPower,
}

impl PowerMode {
    pub fn label(self) -> &'static str {
        match self {
            PowerMode::FullPower => "Full power",
            PowerMode::PowerDown => "Power down",
            PowerMode::NoPower => "No power",
        }
    }

    /// Stable numeric tag used for hashing.
    pub fn tag(self) -> u8 {
        match self {
            PowerMode::NoPower => 0,
            PowerMode::PowerDown => 1,
            PowerMode::FullPower => 2,
        }
    }
}

impl std::fmt::Display for PowerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
