//! Agent Components
//!
//! Identity, role tag and the typed numeric attribute store.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an agent
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Role tag used to select agent subsets
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Irrigating water user, the unit that gets scored
    Farmer,
    /// Provincial water authority
    Province,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Farmer => write!(f, "farmer"),
            Role::Province => write!(f, "province"),
        }
    }
}

/// Numeric agent attributes known at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    /// Share of water demand satisfied, averaged over the year so far
    #[serde(rename = "s")]
    S,
    /// Water-use efficiency
    #[serde(rename = "e")]
    E,
    /// End-of-year score
    #[serde(rename = "payoff")]
    Payoff,
    /// Monthly water demand
    #[serde(rename = "demand")]
    Demand,
}

impl Attribute {
    pub const COUNT: usize = 4;
    pub const ALL: [Attribute; Attribute::COUNT] = [Attribute::S, Attribute::E, Attribute::Payoff, Attribute::Demand];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::S => "s",
            Attribute::E => "e",
            Attribute::Payoff => "payoff",
            Attribute::Demand => "demand",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-agent attribute values; a slot is `None` until first written
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: [Option<f64>; Attribute::COUNT],
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter used when spawning agents
    pub fn with(mut self, attribute: Attribute, value: f64) -> Self {
        self.set(attribute, value);
        self
    }

    pub fn get(&self, attribute: Attribute) -> Option<f64> {
        self.values[attribute.index()]
    }

    pub fn set(&mut self, attribute: Attribute, value: f64) {
        self.values[attribute.index()] = Some(value);
    }

    /// Defined attributes in declaration order
    pub fn defined(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        Attribute::ALL
            .iter()
            .filter_map(|&attr| self.get(attr).map(|v| (attr, v)))
    }
}

/// Bundle for spawning a complete agent
#[derive(Bundle)]
pub struct AgentBundle {
    pub id: AgentId,
    pub role: Role,
    pub attributes: Attributes,
}

impl AgentBundle {
    pub fn new(id: u32, role: Role, attributes: Attributes) -> Self {
        Self {
            id: AgentId(id),
            role,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_start_undefined() {
        let attrs = Attributes::new();
        for attr in Attribute::ALL {
            assert_eq!(attrs.get(attr), None);
        }
    }

    #[test]
    fn test_attributes_set_and_defined() {
        let attrs = Attributes::new().with(Attribute::E, 0.5).with(Attribute::S, 2.0);
        assert_eq!(attrs.get(Attribute::S), Some(2.0));
        assert_eq!(attrs.get(Attribute::Payoff), None);
        let defined: Vec<_> = attrs.defined().collect();
        assert_eq!(defined, vec![(Attribute::S, 2.0), (Attribute::E, 0.5)]);
    }

    #[test]
    fn test_attribute_names_match_serialization() {
        for attr in Attribute::ALL {
            let json = serde_json::to_string(&attr).unwrap();
            assert_eq!(json, format!("\"{}\"", attr.name()));
        }
        let role: Role = serde_json::from_str("\"farmer\"").unwrap();
        assert_eq!(role, Role::Farmer);
    }
}
