//! Simulation clock and state hashing.
//!
//! A master clock outside the settlement decides how much Martian time passes
//! per step; the [`MarsClock`] here only counts steps and accumulates elapsed
//! millisols into sols.

use serde::{Deserialize, Serialize};

use crate::fixed::{Fixed64, Ticks};

/// Millisols in one sol.
pub const MILLISOLS_PER_SOL: i32 = 1000;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarsClock {
    /// Number of completed steps.
    pub tick: Ticks,
    /// Completed sols since the settlement was founded.
    pub sol: u32,
    /// Time into the current sol, in `0..1000` millisols.
    pub millisol: Fixed64,
}

impl MarsClock {
    pub fn new() -> Self {
        Self {
            tick: 0,
            sol: 0,
            millisol: Fixed64::ZERO,
        }
    }

    /// Advance by one step covering `elapsed` millisols. Negative elapsed
    /// time is treated as zero.
    pub fn advance(&mut self, elapsed: Fixed64) {
        self.tick += 1;
        let sol_length = Fixed64::from_num(MILLISOLS_PER_SOL);
        let mut millisol = self.millisol.saturating_add(elapsed.max(Fixed64::ZERO));
        while millisol >= sol_length {
            millisol -= sol_length;
            self.sol += 1;
        }
        self.millisol = millisol;
    }
}

impl Default for MarsClock {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A deterministic hash of settlement state for reproducibility checks.
///
/// FNV-1a (64-bit). Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u8(&mut self, v: u8) {
        self.write(&[v]);
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
