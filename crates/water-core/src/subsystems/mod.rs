//! Subsystems
//!
//! The per-tick collaborators the orchestrator delegates to: nature releases
//! water, society allocates and uses it.

pub mod human;
pub mod nature;

use bevy_ecs::prelude::*;

use crate::error::SimError;

pub use human::{allocate, Society};
pub use nature::{Basin, SEASONAL_FACTORS};

/// One side of the coupled model, stepped once per tick.
///
/// Subsystems share state only through resources and components in the
/// world they are handed.
pub trait Subsystem {
    fn name(&self) -> &str;

    fn step(&mut self, world: &mut World) -> Result<(), SimError>;
}
