//! World Resources
//!
//! Shared environmental state passed between subsystems through the ECS world.

use bevy_ecs::prelude::*;
use water_events::SimClock;

/// The live simulation clock
#[derive(Resource, Debug, Clone, Copy)]
pub struct Clock(pub SimClock);

/// Water released by nature for the current month, consumed by society
#[derive(Resource, Debug, Clone, Default)]
pub struct WaterSupply {
    /// Volume available this month
    pub available: f64,
    /// Clock tick the supply was produced at
    pub produced_at: Option<u64>,
}

impl WaterSupply {
    pub fn new() -> Self {
        Self::default()
    }
}
