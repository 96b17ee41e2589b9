//! Buildings as seen by the power grid.

use serde::{Deserialize, Serialize};

use crate::error::BuildingError;
use crate::fixed::Fixed64;
use crate::function::{FunctionKind, LifeSupport, PowerGeneration};
use crate::id::BuildingId;
use crate::mode::PowerMode;

/// A settlement building: its power demand figures, its current power mode,
/// and the functions it provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Assigned by the building manager on insertion.
    id: BuildingId,
    pub name: String,
    pub building_type: String,
    full_power_required: Fixed64,
    powered_down_power_required: Fixed64,
    power_mode: PowerMode,
    generation: Option<PowerGeneration>,
    life_support: Option<LifeSupport>,
}

impl Building {
    /// Create a building with its demand at full power and when powered down.
    ///
    /// Both figures must be non-negative, and the powered-down figure may not
    /// exceed the full-power figure.
    pub fn new(
        name: impl Into<String>,
        building_type: impl Into<String>,
        full_power_required: Fixed64,
        powered_down_power_required: Fixed64,
    ) -> Result<Self, BuildingError> {
        let name = name.into();
        if full_power_required < Fixed64::ZERO || powered_down_power_required < Fixed64::ZERO {
            return Err(BuildingError::InvalidPowerFigures {
                name,
                detail: format!(
                    "negative demand (full {full_power_required} kW, powered down {powered_down_power_required} kW)"
                ),
            });
        }
        if powered_down_power_required > full_power_required {
            return Err(BuildingError::InvalidPowerFigures {
                name,
                detail: format!(
                    "powered-down demand {powered_down_power_required} kW exceeds full demand {full_power_required} kW"
                ),
            });
        }
        Ok(Self {
            id: BuildingId::default(),
            name,
            building_type: building_type.into(),
            full_power_required,
            powered_down_power_required,
            power_mode: PowerMode::FullPower,
            generation: None,
            life_support: None,
        })
    }

    pub fn with_generation(mut self, generation: PowerGeneration) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn with_life_support(mut self, life_support: LifeSupport) -> Self {
        self.life_support = Some(life_support);
        self
    }

    pub fn id(&self) -> BuildingId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: BuildingId) {
        self.id = id;
    }

    // -----------------------------------------------------------------------
    // Power demand
    // -----------------------------------------------------------------------

    pub fn full_power_required(&self) -> Fixed64 {
        self.full_power_required
    }

    pub fn powered_down_power_required(&self) -> Fixed64 {
        self.powered_down_power_required
    }

    /// Demand in kW when running in `mode`.
    pub fn power_required(&self, mode: PowerMode) -> Fixed64 {
        match mode {
            PowerMode::FullPower => self.full_power_required,
            PowerMode::PowerDown => self.powered_down_power_required,
            PowerMode::NoPower => Fixed64::ZERO,
        }
    }

    pub fn power_mode(&self) -> PowerMode {
        self.power_mode
    }

    /// Only the power grid should call this during its tick pass.
    pub fn set_power_mode(&mut self, mode: PowerMode) {
        self.power_mode = mode;
    }

    /// Fraction of nominal function output available in the current mode.
    pub fn power_factor(&self) -> Fixed64 {
        match self.power_mode {
            PowerMode::FullPower => Fixed64::ONE,
            PowerMode::PowerDown if self.full_power_required > Fixed64::ZERO => {
                self.powered_down_power_required / self.full_power_required
            }
            PowerMode::PowerDown => Fixed64::ONE,
            PowerMode::NoPower => Fixed64::ZERO,
        }
    }

    // -----------------------------------------------------------------------
    // Capabilities
    // -----------------------------------------------------------------------

    pub fn has_function(&self, kind: FunctionKind) -> bool {
        match kind {
            FunctionKind::PowerGeneration => self.generation.is_some(),
            FunctionKind::LifeSupport => self.life_support.is_some(),
        }
    }

    pub fn generation(&self) -> Option<&PowerGeneration> {
        self.generation.as_ref()
    }

    pub fn generation_mut(&mut self) -> Option<&mut PowerGeneration> {
        self.generation.as_mut()
    }

    pub fn life_support(&self) -> Option<&LifeSupport> {
        self.life_support.as_ref()
    }

    /// The generation function, for callers that already know this building
    /// is a generator. Asking a non-generator is a contract violation.
    pub fn require_generation_mut(&mut self) -> Result<&mut PowerGeneration, BuildingError> {
        debug_assert!(
            self.generation.is_some(),
            "building '{}' queried for a generation function it does not have",
            self.name
        );
        let (building, name) = (self.id, &self.name);
        self.generation
            .as_mut()
            .ok_or_else(|| BuildingError::MissingFunction {
                building,
                name: name.clone(),
                function: FunctionKind::PowerGeneration,
            })
    }

    /// Power currently produced by this building; zero for non-generators.
    /// Fails if the generation function is malfunctioning.
    pub fn generated_power(&self) -> Result<Fixed64, BuildingError> {
        let Some(generation) = self.generation.as_ref() else {
            return Ok(Fixed64::ZERO);
        };
        if let Some(reason) = generation.malfunction() {
            return Err(BuildingError::Malfunction {
                building: self.id,
                name: self.name.clone(),
                reason: reason.to_string(),
            });
        }
        Ok(generation.output())
    }
}
