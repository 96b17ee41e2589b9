//! Colony Core -- the building model shared by every settlement subsystem.
//!
//! This crate holds the types the power grid balances over and the plumbing
//! around it: deterministic fixed-point power units, building IDs, buildings
//! with their power modes and functions, the ordered building manager, the
//! settlement event bus and the simulation clock.
//!
//! # Key Types
//!
//! - [`building::Building`] -- demand at full power and powered down, current
//!   [`mode::PowerMode`], optional generation and life-support functions.
//! - [`manager::BuildingManager`] -- buildings in canonical settlement order.
//! - [`mode::GridMode`] -- settlement-wide target posture.
//! - [`event::EventBus`] -- buffered, kind-indexed event delivery.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.
//! - [`error::BuildingError`] -- faults that abort a grid tick.

pub mod building;
pub mod clock;
pub mod error;
pub mod event;
pub mod fixed;
pub mod function;
pub mod id;
pub mod manager;
pub mod mode;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
