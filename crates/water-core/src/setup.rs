//! Population Setup
//!
//! Spawns the initial farmers and provincial authorities.

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::components::{AgentBundle, Attribute, Attributes, Role};
use crate::config::AgentConfig;

/// Counts of what was spawned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnSummary {
    pub farmers: u32,
    pub provinces: u32,
}

impl SpawnSummary {
    pub fn total(&self) -> u32 {
        self.farmers + self.provinces
    }
}

fn draw<R: Rng>(rng: &mut R, (a, b): (f64, f64)) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    rng.gen_range(lo..=hi)
}

/// Spawns farmers (ids first) then provinces.
///
/// Farmers start with `demand` and `e`; `s` and `payoff` stay undefined
/// until the subsystems write them.
pub fn spawn_population<R: Rng>(world: &mut World, config: &AgentConfig, rng: &mut R) -> SpawnSummary {
    for id in 0..config.farmers {
        let attributes = Attributes::new()
            .with(Attribute::Demand, draw(rng, config.farmer_demand))
            .with(Attribute::E, draw(rng, config.farmer_efficiency));
        world.spawn(AgentBundle::new(id, Role::Farmer, attributes));
    }

    for offset in 0..config.provinces {
        let attributes = Attributes::new().with(Attribute::Demand, config.province_demand);
        world.spawn(AgentBundle::new(config.farmers + offset, Role::Province, attributes));
    }

    SpawnSummary {
        farmers: config.farmers,
        provinces: config.provinces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::AgentSubset;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_counts_and_ranges() {
        let mut world = World::new();
        let mut rng = SmallRng::seed_from_u64(3);
        let config = AgentConfig {
            farmers: 20,
            provinces: 3,
            farmer_demand: (5.0, 15.0),
            farmer_efficiency: (1.0, 0.5),
            province_demand: 80.0,
        };
        let summary = spawn_population(&mut world, &config, &mut rng);
        assert_eq!(summary.total(), 23);

        let farmers = AgentSubset::select(&mut world, Role::Farmer).unwrap();
        assert_eq!(farmers.len(), 20);
        let demand = farmers.read(&world, Attribute::Demand).unwrap();
        assert!(demand.values().all(|d| (5.0..=15.0).contains(d)));
        let e = farmers.read(&world, Attribute::E).unwrap();
        assert!(e.values().all(|v| (0.5..=1.0).contains(v)));
        assert!(farmers.read(&world, Attribute::S).is_err());

        let provinces = AgentSubset::select(&mut world, Role::Province).unwrap();
        let ids: Vec<u32> = provinces.ids().map(|id| id.0).collect();
        assert_eq!(ids, vec![20, 21, 22]);
    }
}
