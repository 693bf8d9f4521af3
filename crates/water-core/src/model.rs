//! Step Orchestration
//!
//! [`WaterModel`] owns the ECS world and drives one monthly tick at a time:
//! nature, then society, then any conditional updates whose time has come.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info};
use water_events::{PopulationSnapshot, Regime, SimClock, YearMonth, MONTHS_PER_YEAR};

use crate::components::{Clock, WaterSupply};
use crate::config::Config;
use crate::error::SimError;
use crate::horizon::{current_regime, RegimeHorizon};
use crate::population::snapshot_agents;
use crate::schedule::ConditionalUpdate;
use crate::setup::spawn_population;
use crate::subsystems::{Basin, Society, Subsystem};

/// Offset between the runoff and population RNG streams.
const POPULATION_SEED_OFFSET: u64 = 0x9E37_79B9;

/// What happened during one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub clock: SimClock,
    pub regime: Regime,
    /// Names of the conditional updates that fired, in registration order
    pub fired: Vec<String>,
}

/// The coupled water-allocation model.
pub struct WaterModel {
    world: World,
    nature: Box<dyn Subsystem>,
    human: Box<dyn Subsystem>,
    updates: Vec<ConditionalUpdate>,
}

impl WaterModel {
    /// Creates a model with an empty population.
    pub fn new(
        clock: SimClock,
        horizon: RegimeHorizon,
        nature: Box<dyn Subsystem>,
        human: Box<dyn Subsystem>,
    ) -> Self {
        let mut world = World::new();
        world.insert_resource(Clock(clock));
        world.insert_resource(horizon);
        world.insert_resource(WaterSupply::new());
        Self {
            world,
            nature,
            human,
            updates: Vec::new(),
        }
    }

    /// Builds the default Yellow River model: basin runoff, farmer society,
    /// a seeded population and the end-of-year scoring update.
    pub fn from_config(config: &Config) -> Result<Self, SimError> {
        let sim = &config.simulation;
        let clock = SimClock::new(sim.start_year, sim.start_month)?;
        let horizon = config.regime_horizon()?;
        let condition = config.scoring.condition()?;

        let mut model = Self::new(
            clock,
            horizon,
            Box::new(Basin::new(&config.nature, sim.seed)),
            Box::new(Society::new(&config.society)),
        );

        let mut rng = SmallRng::seed_from_u64(sim.seed.wrapping_add(POPULATION_SEED_OFFSET));
        let summary = spawn_population(&mut model.world, &config.agents, &mut rng);
        info!(
            farmers = summary.farmers,
            provinces = summary.provinces,
            total = summary.total(),
            "population spawned"
        );

        model.register(config.scoring.rule().into_update(condition));
        Ok(model)
    }

    /// Adds a conditional update; updates fire in registration order.
    pub fn register(&mut self, update: ConditionalUpdate) {
        debug!(update = update.name(), condition = %update.condition(), "registered");
        self.updates.push(update);
    }

    pub fn clock(&self) -> SimClock {
        self.world.resource::<Clock>().0
    }

    pub fn horizon(&self) -> RegimeHorizon {
        *self.world.resource::<RegimeHorizon>()
    }

    /// The regime in force at the live clock, resolved on every call.
    pub fn institution(&self) -> Result<Regime, SimError> {
        current_regime(&self.world)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Runs one step at the current clock without advancing it.
    ///
    /// Fails before touching any subsystem if the clock is past the study
    /// horizon.
    pub fn step(&mut self) -> Result<StepReport, SimError> {
        let clock = self.clock();
        let regime = self.institution()?;
        debug!(date = %clock.date, %regime, "step");

        self.nature.step(&mut self.world)?;
        self.human.step(&mut self.world)?;

        let mut fired = Vec::new();
        for update in &mut self.updates {
            if update.maybe_fire(&clock, &mut self.world)? {
                fired.push(update.name().to_string());
            }
        }

        Ok(StepReport {
            clock,
            regime,
            fired,
        })
    }

    /// Moves the clock forward one month.
    pub fn advance_clock(&mut self) {
        self.world.resource_mut::<Clock>().0.advance();
    }

    /// Steps at the current month, then advances the clock.
    ///
    /// The clock stays put if the step fails.
    pub fn tick(&mut self) -> Result<StepReport, SimError> {
        let report = self.step()?;
        self.advance_clock();
        Ok(report)
    }

    /// Ticks up to `max_ticks` times, stopping at the first error.
    ///
    /// Returns the number of ticks completed.
    pub fn run(&mut self, max_ticks: u64) -> Result<u64, SimError> {
        info!(start = %self.clock().date, max_ticks, "run starting");
        for done in 0..max_ticks {
            let report = self.tick()?;
            if report.clock.is_year_end() {
                info!(year = report.clock.year(), regime = %report.regime, "year complete");
            }
            debug!(completed = done + 1, "tick done");
        }
        info!(end = %self.clock().date, "run finished");
        Ok(max_ticks)
    }

    /// Ticks left before the clock leaves the study horizon.
    pub fn remaining_ticks(&self) -> u64 {
        let last = YearMonth {
            year: self.horizon().study_end(),
            month: MONTHS_PER_YEAR,
        };
        let now = self.clock().date;
        if now > last {
            0
        } else {
            now.months_until(last) + 1
        }
    }

    /// Point-in-time view of the population.
    pub fn snapshot(&mut self) -> PopulationSnapshot {
        PopulationSnapshot {
            clock: self.clock(),
            regime: self.institution().ok(),
            agents: snapshot_agents(&mut self.world),
        }
    }
}
