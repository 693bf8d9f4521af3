//! Nature Subsystem
//!
//! Monthly runoff for the basin.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::components::{Clock, WaterSupply};
use crate::config::NatureConfig;
use crate::error::SimError;

use super::Subsystem;

/// Share of mean annual runoff arriving in each month, January first.
///
/// Sums to 12 so the annual mean equals `mean_runoff * 12`.
pub const SEASONAL_FACTORS: [f64; 12] = [
    0.5, 0.5, 0.7, 0.9, 1.0, 1.1, 1.6, 1.8, 1.6, 1.2, 0.6, 0.5,
];

/// Stochastic runoff generator.
pub struct Basin {
    rng: SmallRng,
    mean_runoff: f64,
    variability: f64,
}

impl Basin {
    pub fn new(config: &NatureConfig, seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            mean_runoff: config.mean_runoff,
            variability: config.variability.clamp(0.0, 1.0),
        }
    }

    fn runoff(&mut self, month: u8) -> f64 {
        let seasonal = SEASONAL_FACTORS[usize::from(month - 1)];
        let noise = if self.variability > 0.0 {
            1.0 + self.rng.gen_range(-self.variability..=self.variability)
        } else {
            1.0
        };
        (self.mean_runoff * seasonal * noise).max(0.0)
    }
}

impl Subsystem for Basin {
    fn name(&self) -> &str {
        "nature"
    }

    fn step(&mut self, world: &mut World) -> Result<(), SimError> {
        let clock = world.resource::<Clock>().0;
        let available = self.runoff(clock.month());
        debug!(date = %clock.date, available, "runoff");

        let mut supply = world.resource_mut::<WaterSupply>();
        supply.available = available;
        supply.produced_at = Some(clock.tick);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use water_events::SimClock;

    fn world_at(month: u8) -> World {
        let mut world = World::new();
        world.insert_resource(Clock(SimClock::new(1990, month).unwrap()));
        world.insert_resource(WaterSupply::new());
        world
    }

    #[test]
    fn test_seasonal_factors_average_one() {
        let total: f64 = SEASONAL_FACTORS.iter().sum();
        assert!((total - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_variability_is_deterministic_mean() {
        let config = NatureConfig {
            mean_runoff: 100.0,
            variability: 0.0,
        };
        let mut basin = Basin::new(&config, 1);
        let mut world = world_at(8);
        basin.step(&mut world).unwrap();

        let supply = world.resource::<WaterSupply>();
        assert!((supply.available - 180.0).abs() < 1e-9);
        assert_eq!(supply.produced_at, Some(0));
    }

    #[test]
    fn test_same_seed_same_runoff() {
        let config = NatureConfig::default();
        let mut a = Basin::new(&config, 42);
        let mut b = Basin::new(&config, 42);
        let ra: Vec<f64> = (1..=12).map(|m| a.runoff(m)).collect();
        let rb: Vec<f64> = (1..=12).map(|m| b.runoff(m)).collect();
        assert_eq!(ra, rb);
        assert!(ra.iter().all(|r| *r >= 0.0));
    }
}
