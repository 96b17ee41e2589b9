use crate::function::FunctionKind;
use crate::id::BuildingId;

/// Faults raised by buildings and their functions.
///
/// Any of these aborts the current grid tick. They point at an inconsistency
/// in the settlement's building list and carry the offending building.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildingError {
    #[error("building '{name}' ({building:?}) has no {function} function")]
    MissingFunction {
        building: BuildingId,
        name: String,
        function: FunctionKind,
    },

    #[error("building '{name}' ({building:?}) malfunction: {reason}")]
    Malfunction {
        building: BuildingId,
        name: String,
        reason: String,
    },

    #[error("building '{name}' has invalid power figures: {detail}")]
    InvalidPowerFigures { name: String, detail: String },

    #[error("unknown building {0:?}")]
    UnknownBuilding(BuildingId),
}

impl BuildingError {
    /// The building this fault is attributed to, when it has one.
    pub fn building(&self) -> Option<BuildingId> {
        match self {
            BuildingError::MissingFunction { building, .. }
            | BuildingError::Malfunction { building, .. }
            | BuildingError::UnknownBuilding(building) => Some(*building),
            BuildingError::InvalidPowerFigures { .. } => None,
        }
    }
}
