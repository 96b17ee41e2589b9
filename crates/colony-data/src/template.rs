//! Resolution pipeline: reads building types and a settlement layout from a
//! data directory and resolves them into core buildings.
//!
//! A data directory holds two files, each in any one of the supported formats:
//!
//! - `buildings.{ron,toml,json}`: the building types (TOML key `buildings`).
//! - `settlement.{ron,toml,json}`: the settlement name, grid mode, sunlight,
//!   and its buildings by type name, in settlement order.

use colony_core::building::Building;
use colony_core::fixed::Fixed64;
use colony_core::function::{LifeSupport, PowerGeneration, PowerSource, PowerSourceKind};
use colony_core::mode::GridMode;
use std::collections::HashMap;
use std::path::Path;

use crate::loader::{DataLoadError, locate, read_document, read_list};
use crate::schema::*;

/// A settlement ready to be instantiated: buildings are fully built but not
/// yet owned by a building manager.
#[derive(Debug, Clone)]
pub struct SettlementTemplate {
    pub name: String,
    pub grid_mode: GridMode,
    pub sunlight: Fixed64,
    /// In settlement order.
    pub buildings: Vec<Building>,
}

// ===========================================================================
// Loading
// ===========================================================================

/// Load every building type from `path`, keyed by type name. Each value is a
/// prototype building named after its type.
pub fn load_building_types(path: &Path) -> Result<HashMap<String, Building>, DataLoadError> {
    let types: Vec<BuildingTypeData> = read_list(path, "buildings")?;

    let mut resolved = HashMap::with_capacity(types.len());
    for data in &types {
        if resolved.contains_key(&data.name) {
            return Err(DataLoadError::DuplicateName {
                file: path.to_path_buf(),
                name: data.name.clone(),
            });
        }
        resolved.insert(data.name.clone(), build_type(data, path)?);
    }
    Ok(resolved)
}

/// Load a settlement template from a data directory.
pub fn load_settlement_template(dir: &Path) -> Result<SettlementTemplate, DataLoadError> {
    let types_path = locate(dir, "buildings")?;
    let settlement_path = locate(dir, "settlement")?;

    let types = load_building_types(&types_path)?;
    let data: SettlementData = read_document(&settlement_path)?;

    if !(0.0..=1.0).contains(&data.sunlight) {
        return Err(DataLoadError::parse(
            &settlement_path,
            format!("sunlight {} is outside 0..=1", data.sunlight),
        ));
    }

    let mut counts: HashMap<&str, u32> = HashMap::new();
    let mut buildings = Vec::with_capacity(data.buildings.len());
    for instance in &data.buildings {
        let prototype = types.get(&instance.building_type).ok_or_else(|| {
            DataLoadError::UnresolvedRef {
                file: settlement_path.clone(),
                name: instance.building_type.clone(),
            }
        })?;
        let count = counts.entry(instance.building_type.as_str()).or_insert(0);
        *count += 1;

        let mut building = prototype.clone();
        building.name = match &instance.name {
            Some(name) => name.clone(),
            None => format!("{} {}", instance.building_type, count),
        };
        buildings.push(building);
    }

    log::info!(
        "loaded settlement '{}' ({} building types, {} buildings) from {}",
        data.name,
        types.len(),
        buildings.len(),
        dir.display()
    );

    Ok(SettlementTemplate {
        name: data.name,
        grid_mode: match data.grid_mode {
            GridModeData::PowerUp => GridMode::PowerUp,
            GridModeData::PowerDown => GridMode::PowerDown,
        },
        sunlight: Fixed64::from_num(data.sunlight),
        buildings,
    })
}

// ===========================================================================
// Building type resolution
// ===========================================================================

fn build_type(data: &BuildingTypeData, path: &Path) -> Result<Building, DataLoadError> {
    let invalid = |detail: String| DataLoadError::InvalidBuilding {
        file: path.to_path_buf(),
        name: data.name.clone(),
        detail,
    };

    let full = power_figure(data.full_power, "full_power").map_err(invalid)?;
    let down = power_figure(data.power_down_power, "power_down_power").map_err(invalid)?;

    let mut building = Building::new(data.name.clone(), data.name.clone(), full, down)
        .map_err(|e| invalid(e.to_string()))?;

    if let Some(generation) = &data.generation {
        let mut sources = Vec::with_capacity(generation.sources.len());
        for source in &generation.sources {
            let max_power = power_figure(source.max_power, "max_power").map_err(invalid)?;
            if max_power < Fixed64::ZERO {
                return Err(invalid(format!("negative max_power {}", source.max_power)));
            }
            let kind = match source.kind {
                PowerSourceKindData::Standard => PowerSourceKind::Standard,
                PowerSourceKindData::Solar => PowerSourceKind::Solar,
            };
            sources.push(PowerSource { kind, max_power });
        }
        building = building.with_generation(PowerGeneration::new(sources));
    }

    if let Some(life_support) = &data.life_support {
        building = building.with_life_support(LifeSupport {
            occupant_capacity: life_support.occupant_capacity,
        });
    }

    Ok(building)
}

/// Convert a kW figure from a data file, rejecting values that are not
/// finite or do not fit the fixed-point range.
fn power_figure(value: f64, field: &str) -> Result<Fixed64, String> {
    if !value.is_finite() {
        return Err(format!("{field} is not finite"));
    }
    Fixed64::checked_from_num(value).ok_or_else(|| format!("{field} {value} is out of range"))
}

// ===========================================================================
// Tests
// ===========================================================================
