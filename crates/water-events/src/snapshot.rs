//! Population snapshots.
//!
//! Point-in-time views of the agent population for reporting by the host.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::clock::SimClock;
use crate::regime::Regime;

/// One agent's role and defined attribute values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: u32,
    pub role: String,
    /// Attribute name to value; undefined attributes are omitted.
    pub attributes: BTreeMap<String, f64>,
}

/// The whole population at a given clock instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub clock: SimClock,
    /// `None` once the clock has run past the study horizon.
    pub regime: Option<Regime>,
    pub agents: Vec<AgentSnapshot>,
}

impl PopulationSnapshot {
    /// Agents carrying the given role.
    pub fn agents_with_role<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a AgentSnapshot> + 'a {
        self.agents.iter().filter(move |a| a.role == role)
    }

    /// Mean of an attribute over the agents that define it.
    pub fn mean_attribute(&self, role: &str, attribute: &str) -> Option<f64> {
        let values: Vec<f64> = self
            .agents_with_role(role)
            .filter_map(|a| a.attributes.get(attribute).copied())
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
