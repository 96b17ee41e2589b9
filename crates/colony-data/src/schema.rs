//! Serde data file structs for settlement content.
//!
//! These structs define the on-disk format for building types and settlement
//! layouts. They are deserialized from RON, JSON, or TOML files and then
//! resolved into core types by the template loader.

use serde::Deserialize;

// ===========================================================================
// Building types
// ===========================================================================

/// A building type definition in `buildings.{ron,toml,json}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildingTypeData {
    pub name: String,
    /// Demand in kW at full power.
    pub full_power: f64,
    /// Demand in kW when powered down.
    pub power_down_power: f64,
    #[serde(default)]
    pub generation: Option<GenerationData>,
    #[serde(default)]
    pub life_support: Option<LifeSupportData>,
}

/// Power generation provided by a building type.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationData {
    pub sources: Vec<PowerSourceData>,
}

/// One power source inside a generating building.
#[derive(Debug, Clone, Deserialize)]
pub struct PowerSourceData {
    #[serde(default)]
    pub kind: PowerSourceKindData,
    /// Peak output in kW.
    pub max_power: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerSourceKindData {
    #[default]
    Standard,
    Solar,
}

/// Life support provided by a building type.
#[derive(Debug, Clone, Deserialize)]
pub struct LifeSupportData {
    pub occupant_capacity: u32,
}

// ===========================================================================
// Settlement layout
// ===========================================================================

/// A settlement template in `settlement.{ron,toml,json}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementData {
    pub name: String,
    #[serde(default)]
    pub grid_mode: GridModeData,
    /// Initial sunlight factor for solar sources, 0..=1.
    #[serde(default = "default_sunlight")]
    pub sunlight: f64,
    /// Buildings in settlement order.
    pub buildings: Vec<BuildingInstanceData>,
}

fn default_sunlight() -> f64 {
    1.0
}

/// Initial grid mode of a settlement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridModeData {
    #[default]
    PowerUp,
    PowerDown,
}

/// One building placed in a settlement.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildingInstanceData {
    /// Name of a type in the building type file.
    #[serde(rename = "type")]
    pub building_type: String,
    /// Instance name. Defaults to the type name with a running number.
    #[serde(default)]
    pub name: Option<String>,
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // RON
    // -----------------------------------------------------------------------

    #[test]
    fn building_type_defaults_from_ron() {
        let ron = r#"(name: "Workshop", full_power: 6.0, power_down_power: 1.5)"#;
        let data: BuildingTypeData = ron::from_str(ron).unwrap();
        assert_eq!(data.name, "Workshop");
        assert!(data.generation.is_none());
        assert!(data.life_support.is_none());
    }

    #[test]
    fn generating_building_type_from_ron() {
        let ron = r#"
            (
                name: "Solar Farm",
                full_power: 0.5,
                power_down_power: 0.1,
                generation: Some((
                    sources: [
                        (kind: solar, max_power: 40.0),
                        (max_power: 2.0),
                    ],
                )),
            )
        "#;
        let data: BuildingTypeData = ron::from_str(ron).unwrap();
        let generation = data.generation.unwrap();
        assert_eq!(generation.sources.len(), 2);
        assert_eq!(generation.sources[0].kind, PowerSourceKindData::Solar);
        assert_eq!(generation.sources[1].kind, PowerSourceKindData::Standard);
    }

    #[test]
    fn settlement_from_ron() {
        let ron = r#"
            (
                name: "Schiaparelli Point",
                grid_mode: power_down,
                buildings: [
                    (type: "Lander Hab", name: Some("Lander Hab 1")),
                    (type: "Workshop"),
                ],
            )
        "#;
        let data: SettlementData = ron::from_str(ron).unwrap();
        assert_eq!(data.grid_mode, GridModeData::PowerDown);
        assert!((data.sunlight - 1.0).abs() < f64::EPSILON);
        assert_eq!(data.buildings[0].name.as_deref(), Some("Lander Hab 1"));
        assert_eq!(data.buildings[1].building_type, "Workshop");
        assert!(data.buildings[1].name.is_none());
    }

    // -----------------------------------------------------------------------
    // JSON
    // -----------------------------------------------------------------------

    #[test]
    fn life_support_building_type_from_json() {
        let json = r#"{
            "name": "Lander Hab",
            "full_power": 10.0,
            "power_down_power": 4.0,
            "life_support": {"occupant_capacity": 8}
        }"#;
        let data: BuildingTypeData = serde_json::from_str(json).unwrap();
        assert_eq!(data.life_support.unwrap().occupant_capacity, 8);
    }

    // -----------------------------------------------------------------------
    // TOML
    // -----------------------------------------------------------------------

    #[test]
    fn settlement_from_toml() {
        let toml_str = r#"
name = "Mangala Station"
sunlight = 0.5

[[buildings]]
type = "Workshop"
"#;
        let data: SettlementData = toml::from_str(toml_str).unwrap();
        assert_eq!(data.name, "Mangala Station");
        assert_eq!(data.grid_mode, GridModeData::PowerUp);
        assert!((data.sunlight - 0.5).abs() < f64::EPSILON);
        assert_eq!(data.buildings.len(), 1);
    }
}
