//! Binary settlement snapshots via `bitcode` with a versioned header.

use colony_core::clock::MarsClock;
use colony_core::event::EventBus;
use colony_core::fixed::{Fixed64, Ticks};
use colony_core::id::SettlementId;
use colony_core::manager::BuildingManager;
use colony_power::PowerGrid;
use serde::{Deserialize, Serialize};

use crate::Settlement;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a settlement snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x4D41_5253;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur during deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header prepended to every serialized snapshot so the format and version
/// can be checked before the payload is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Settlement tick at the time the snapshot was taken.
    pub tick: Ticks,
}

impl SnapshotHeader {
    /// Create a header for the current format version.
    pub fn new(tick: Ticks) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Serializable settlement state
// ---------------------------------------------------------------------------

/// Everything in a [`Settlement`] except the event bus, which holds closures.
#[derive(Debug, Serialize, Deserialize)]
struct SettlementSnapshot {
    header: SnapshotHeader,
    id: SettlementId,
    name: String,
    buildings: BuildingManager,
    grid: PowerGrid,
    clock: MarsClock,
    sunlight: Fixed64,
}

impl Settlement {
    /// Serialize the settlement to a binary blob.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let snapshot = SettlementSnapshot {
            header: SnapshotHeader::new(self.clock.tick),
            id: self.id,
            name: self.name.clone(),
            buildings: self.buildings.clone(),
            grid: self.grid.clone(),
            clock: self.clock.clone(),
            sunlight: self.sunlight,
        };

        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Restore a settlement from [`Settlement::serialize`] output.
    ///
    /// The event bus is recreated empty. Listeners must be registered again.
    pub fn deserialize(data: &[u8]) -> Result<Self, DeserializeError> {
        let snapshot: SettlementSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;

        log::debug!(
            "{}: restored '{}' at tick {} with {} buildings",
            snapshot.id,
            snapshot.name,
            snapshot.header.tick,
            snapshot.buildings.len()
        );

        let mut events = EventBus::default();
        events.reserve(snapshot.buildings.len());

        Ok(Settlement {
            id: snapshot.id,
            name: snapshot.name,
            buildings: snapshot.buildings,
            grid: snapshot.grid,
            clock: snapshot.clock,
            sunlight: snapshot.sunlight,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_core::mode::{GridMode, PowerMode};
    use colony_core::test_utils::*;

    fn strained_settlement() -> Settlement {
        let mut settlement = Settlement::new(SettlementId(3), "Mangala Station");
        settlement.add_building(generator("Reactor", 5.0));
        settlement.add_building(consumer("Workshop", 4.0, 2.0));
        settlement.add_building(habitat("Hab", 4.0, 2.0));
        settlement.time_passing(kw(25.0)).unwrap();
        settlement
    }

    #[test]
    fn round_trip_preserves_grid_and_modes() {
        let settlement = strained_settlement();
        let data = settlement.serialize().unwrap();
        let restored = Settlement::deserialize(&data).unwrap();

        assert_eq!(restored.id(), SettlementId(3));
        assert_eq!(restored.name(), "Mangala Station");
        assert_eq!(restored.power_grid().snapshot(), settlement.power_grid().snapshot());
        assert_eq!(restored.tick(), settlement.tick());
        assert_eq!(restored.state_hash(), settlement.state_hash());

        let modes: Vec<PowerMode> = restored.buildings().iter().map(|b| b.power_mode()).collect();
        assert_eq!(modes, vec![PowerMode::FullPower, PowerMode::PowerDown, PowerMode::PowerDown]);
    }

    #[test]
    fn restored_settlement_keeps_ticking_identically() {
        let mut original = strained_settlement();
        original.set_power_mode(GridMode::PowerDown);
        let mut restored = Settlement::deserialize(&original.serialize().unwrap()).unwrap();

        for _ in 0..5 {
            original.time_passing(kw(25.0)).unwrap();
            restored.time_passing(kw(25.0)).unwrap();
        }
        assert_eq!(original.state_hash(), restored.state_hash());
    }

    #[test]
    fn restored_bus_fits_every_building() {
        let mut settlement = Settlement::new(SettlementId(5), "Tharsis Yard");
        for i in 0..400 {
            settlement.add_building(consumer(&format!("Depot {i}"), 1.0, 0.5));
        }
        let restored = Settlement::deserialize(&settlement.serialize().unwrap()).unwrap();
        assert!(restored.events().capacity() >= 400);
    }

    #[test]
    fn header_validation() {
        assert!(SnapshotHeader::new(0).validate().is_ok());

        let mut header = SnapshotHeader::new(0);
        header.magic = 0xDEAD_BEEF;
        assert!(matches!(header.validate(), Err(DeserializeError::InvalidMagic(0xDEAD_BEEF))));

        let mut header = SnapshotHeader::new(0);
        header.version = FORMAT_VERSION + 1;
        assert!(matches!(header.validate(), Err(DeserializeError::FutureVersion(_))));

        let mut header = SnapshotHeader::new(0);
        header.version = 0;
        assert!(matches!(header.validate(), Err(DeserializeError::UnsupportedVersion(0))));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let result = Settlement::deserialize(&[0xFF, 0x00, 0x13]);
        assert!(matches!(result, Err(DeserializeError::Decode(_))));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let settlement = strained_settlement();
        let snapshot = SettlementSnapshot {
            header: SnapshotHeader {
                magic: 0x1234_5678,
                version: FORMAT_VERSION,
                tick: 0,
            },
            id: settlement.id,
            name: settlement.name.clone(),
            buildings: settlement.buildings.clone(),
            grid: settlement.grid.clone(),
            clock: settlement.clock.clone(),
            sunlight: settlement.sunlight,
        };
        let data = bitcode::serialize(&snapshot).unwrap();

        let result = Settlement::deserialize(&data);
        assert!(matches!(result, Err(DeserializeError::InvalidMagic(0x1234_5678))));
    }

    #[test]
    fn error_display_messages() {
        let msg = DeserializeError::InvalidMagic(0xDEAD_BEEF).to_string();
        assert!(msg.contains("0x4D415253"));
        assert!(msg.contains("0xDEADBEEF"));
        assert!(DeserializeError::FutureVersion(9).to_string().contains('9'));
    }
}
