//! Scoring Update
//!
//! End-of-year payoff: the per-agent product of two attributes, written back
//! as a third.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::components::{AgentId, Attribute, Role};
use crate::error::SimError;
use crate::population::AgentSubset;
use crate::schedule::{ConditionalUpdate, TimeCondition};

/// Which agents are scored and from which attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub role: Role,
    pub lhs: Attribute,
    pub rhs: Attribute,
    pub output: Attribute,
}

impl Default for ScoringRule {
    fn default() -> Self {
        Self {
            role: Role::Farmer,
            lhs: Attribute::S,
            rhs: Attribute::E,
            output: Attribute::Payoff,
        }
    }
}

impl ScoringRule {
    /// Scores every agent holding `role`. Returns how many were scored.
    ///
    /// Both source attributes are read in full before anything is written.
    pub fn apply(&self, world: &mut World) -> Result<usize, SimError> {
        let subset = AgentSubset::select(world, self.role)?;
        let lhs = subset.read(world, self.lhs)?;
        let rhs = subset.read(world, self.rhs)?;

        let scores: BTreeMap<AgentId, f64> = lhs
            .iter()
            .map(|(id, l)| {
                let r = rhs
                    .get(id)
                    .ok_or(SimError::AttributeMissing { attribute: self.rhs, agent: *id })?;
                Ok((*id, l * r))
            })
            .collect::<Result<_, SimError>>()?;

        subset.write(world, self.output, &scores)?;
        info!(role = %self.role, scored = scores.len(), output = %self.output, "scores updated");
        Ok(scores.len())
    }

    /// Wraps this rule as an update gated on `condition`.
    pub fn into_update(self, condition: TimeCondition) -> ConditionalUpdate {
        ConditionalUpdate::new("update_scores", condition, move |world| {
            self.apply(world).map(|_| ())
        })
    }
}
