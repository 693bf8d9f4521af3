//! Population Aggregation
//!
//! Role-based agent selection with bulk attribute reads and writes keyed by
//! agent identity.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;
use water_events::AgentSnapshot;

use crate::components::{AgentId, Attribute, Attributes, Role};
use crate::error::SimError;

/// Agents sharing a role tag, captured at selection time.
///
/// Membership does not change after selection: agents spawned later are not
/// included, and despawned members surface as [`SimError::AgentNotFound`].
#[derive(Debug, Clone)]
pub struct AgentSubset {
    role: Role,
    members: BTreeMap<AgentId, Entity>,
}

impl AgentSubset {
    /// Selects every agent currently tagged with `role`.
    ///
    /// Fails if two members share an `AgentId`, since reads and writes are
    /// keyed by id.
    pub fn select(world: &mut World, role: Role) -> Result<Self, SimError> {
        let mut query = world.query::<(Entity, &AgentId, &Role)>();
        let mut members = BTreeMap::new();
        for (entity, id, _) in query.iter(world).filter(|(_, _, r)| **r == role) {
            if members.insert(*id, entity).is_some() {
                return Err(SimError::DuplicateAgentId { agent: *id });
            }
        }
        Ok(Self { role, members })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.members.keys().copied()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.members.contains_key(&id)
    }

    /// Reads `attribute` for every member.
    ///
    /// Fails on the first member (by id) with no value for it.
    pub fn read(&self, world: &World, attribute: Attribute) -> Result<BTreeMap<AgentId, f64>, SimError> {
        self.members
            .iter()
            .map(|(&id, &entity)| {
                let attrs = world
                    .get::<Attributes>(entity)
                    .ok_or(SimError::AgentNotFound(id))?;
                attrs
                    .get(attribute)
                    .map(|value| (id, value))
                    .ok_or(SimError::AttributeMissing { attribute, agent: id })
            })
            .collect()
    }

    /// Writes `attribute` for every member.
    ///
    /// `values` must cover exactly the subset. The write is validated before
    /// any agent is touched, so a rejected write changes nothing.
    pub fn write(
        &self,
        world: &mut World,
        attribute: Attribute,
        values: &BTreeMap<AgentId, f64>,
    ) -> Result<(), SimError> {
        if let Some(stray) = values.keys().find(|id| !self.contains(**id)) {
            return Err(SimError::UnknownAgent {
                agent: *stray,
                role: self.role.to_string(),
            });
        }
        for (&id, &entity) in &self.members {
            if !values.contains_key(&id) {
                return Err(SimError::IncompleteWrite { attribute, agent: id });
            }
            if world.get::<Attributes>(entity).is_none() {
                return Err(SimError::AgentNotFound(id));
            }
        }

        for (id, entity) in &self.members {
            if let (Some(mut attrs), Some(&value)) = (world.get_mut::<Attributes>(*entity), values.get(id)) {
                attrs.set(attribute, value);
            }
        }
        Ok(())
    }
}

/// Snapshot of every agent in the world, ordered by id.
pub fn snapshot_agents(world: &mut World) -> Vec<AgentSnapshot> {
    let mut query = world.query::<(&AgentId, &Role, &Attributes)>();
    let mut agents: Vec<AgentSnapshot> = query
        .iter(world)
        .map(|(id, role, attrs)| AgentSnapshot {
            agent_id: id.0,
            role: role.to_string(),
            attributes: attrs
                .defined()
                .map(|(attr, value)| (attr.name().to_string(), value))
                .collect(),
        })
        .collect();
    agents.sort_by_key(|a| a.agent_id);
    agents
}
