//! Human Subsystem
//!
//! Allocates the month's water among farmers under the regime in force and
//! tracks how much of their demand was met.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;
use water_events::Regime;

use crate::components::{AgentId, Attribute, Clock, Role, WaterSupply};
use crate::config::SocietyConfig;
use crate::error::SimError;
use crate::horizon::current_regime;
use crate::population::AgentSubset;

use super::Subsystem;

/// Splits `supply` among `demands` according to `regime`.
///
/// Never hands out more than `supply` in total or more than an agent's
/// demand to any agent.
pub fn allocate(
    regime: Regime,
    supply: f64,
    demands: &BTreeMap<AgentId, f64>,
    min_share: f64,
) -> BTreeMap<AgentId, f64> {
    let supply = supply.max(0.0);
    match regime {
        Regime::Unregulated => upstream_first(supply, demands),
        Regime::Was87 => proportional(supply, demands),
        Regime::Ubr98 => guaranteed_minimum(supply, demands, min_share.clamp(0.0, 1.0)),
    }
}

/// Lower ids sit upstream and take their full demand first.
fn upstream_first(supply: f64, demands: &BTreeMap<AgentId, f64>) -> BTreeMap<AgentId, f64> {
    let mut remaining = supply;
    demands
        .iter()
        .map(|(&id, &demand)| {
            let take = demand.max(0.0).min(remaining);
            remaining -= take;
            (id, take)
        })
        .collect()
}

/// Everyone receives the same fraction of their demand.
fn proportional(supply: f64, demands: &BTreeMap<AgentId, f64>) -> BTreeMap<AgentId, f64> {
    let total: f64 = demands.values().map(|d| d.max(0.0)).sum();
    let ratio = if total <= supply || total == 0.0 {
        1.0
    } else {
        supply / total
    };
    demands
        .iter()
        .map(|(&id, &demand)| (id, demand.max(0.0) * ratio))
        .collect()
}

/// Each agent is first guaranteed `min_share` of its demand, then the rest
/// is split proportionally over unmet demand.
fn guaranteed_minimum(
    supply: f64,
    demands: &BTreeMap<AgentId, f64>,
    min_share: f64,
) -> BTreeMap<AgentId, f64> {
    let floors: BTreeMap<AgentId, f64> = demands
        .iter()
        .map(|(&id, &demand)| (id, demand.max(0.0) * min_share))
        .collect();
    let floor_total: f64 = floors.values().sum();
    if floor_total >= supply {
        return proportional(supply, &floors);
    }

    let residual: BTreeMap<AgentId, f64> = demands
        .iter()
        .map(|(&id, &demand)| (id, demand.max(0.0) - floors[&id]))
        .collect();
    let top_up = proportional(supply - floor_total, &residual);
    floors
        .into_iter()
        .map(|(id, floor)| (id, floor + top_up[&id]))
        .collect()
}

/// Farmers drawing water from the basin.
///
/// Keeps a per-farmer running sum of monthly satisfaction so that `s` is the
/// mean over the months of the current year. A repeated step at the same tick
/// replaces that month's contribution instead of adding a second one.
pub struct Society {
    role: Role,
    min_share: f64,
    year: Option<i32>,
    months: u32,
    satisfaction_sums: BTreeMap<AgentId, f64>,
    last_tick: Option<u64>,
    last_contribution: BTreeMap<AgentId, f64>,
}

impl Society {
    pub fn new(config: &SocietyConfig) -> Self {
        Self {
            role: config.role,
            min_share: config.ubr_min_share,
            year: None,
            months: 0,
            satisfaction_sums: BTreeMap::new(),
            last_tick: None,
            last_contribution: BTreeMap::new(),
        }
    }

    fn roll_year(&mut self, year: i32) {
        if self.year != Some(year) {
            self.year = Some(year);
            self.months = 0;
            self.satisfaction_sums.clear();
            self.last_tick = None;
            self.last_contribution.clear();
        }
    }

    /// Removes the month recorded at `tick`, if that is the last one counted.
    fn forget_tick(&mut self, tick: u64) {
        if self.last_tick != Some(tick) {
            return;
        }
        debug!(tick, "repeated step, replacing this month's satisfaction");
        for (id, previous) in std::mem::take(&mut self.last_contribution) {
            if let Some(sum) = self.satisfaction_sums.get_mut(&id) {
                *sum -= previous;
            }
        }
        self.months = self.months.saturating_sub(1);
        self.last_tick = None;
    }
}

impl Subsystem for Society {
    fn name(&self) -> &str {
        "human"
    }

    fn step(&mut self, world: &mut World) -> Result<(), SimError> {
        let regime = current_regime(world)?;
        let clock = world.resource::<Clock>().0;
        let supply = world.resource::<WaterSupply>().clone();
        if supply.produced_at != Some(clock.tick) {
            debug!(date = %clock.date, "no fresh supply this tick, using what is left");
        }

        let users = AgentSubset::select(world, self.role)?;
        let demands = users.read(world, Attribute::Demand)?;
        let allocation = allocate(regime, supply.available, &demands, self.min_share);

        self.roll_year(clock.year());
        self.forget_tick(clock.tick);
        let contribution: BTreeMap<AgentId, f64> = demands
            .iter()
            .map(|(&id, &demand)| {
                let satisfaction = if demand > 0.0 {
                    (allocation[&id] / demand).min(1.0)
                } else {
                    1.0
                };
                (id, satisfaction)
            })
            .collect();

        let months = self.months + 1;
        let s: BTreeMap<AgentId, f64> = users
            .ids()
            .map(|id| {
                let sum = self.satisfaction_sums.get(&id).copied().unwrap_or(0.0)
                    + contribution.get(&id).copied().unwrap_or(0.0);
                (id, sum / f64::from(months))
            })
            .collect();
        users.write(world, Attribute::S, &s)?;

        self.months = months;
        for (&id, &satisfaction) in &contribution {
            *self.satisfaction_sums.entry(id).or_insert(0.0) += satisfaction;
        }
        self.last_tick = Some(clock.tick);
        self.last_contribution = contribution;

        let used: f64 = allocation.values().sum();
        world.resource_mut::<WaterSupply>().available = (supply.available - used).max(0.0);
        debug!(date = %clock.date, %regime, used, users = users.len(), "water allocated");
        Ok(())
    }
}
