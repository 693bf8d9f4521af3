//! Error types for the simulation core.

use water_events::{ClockError, ClockField};

use crate::components::{AgentId, Attribute};
use crate::config::ConfigError;

/// Errors surfaced by the simulation core.
///
/// The core never retries on its own; a host may repair the world and
/// tick again.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The clock has run past the last year of the study horizon.
    #[error("{year} exceeds the study period (last year {last_year})")]
    OutOfHorizon { year: i32, last_year: i32 },

    /// Regime boundaries are not strictly ascending.
    #[error("invalid regime horizon: {reason}")]
    InvalidHorizon { reason: String },

    /// An agent lacks a source attribute required by an update.
    #[error("agent {agent} has no value for attribute '{attribute}'")]
    AttributeMissing { attribute: Attribute, agent: AgentId },

    /// A time condition is malformed.
    #[error("invalid time condition on '{field}': {reason}")]
    ConditionEvaluation { field: String, reason: String },

    /// A selected agent no longer exists in the world.
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    /// A write targeted an agent outside the selected subset.
    #[error("agent {agent} is not a member of the selected {role} subset")]
    UnknownAgent { agent: AgentId, role: String },

    /// Two agents in one role share an id.
    #[error("agent id {agent} is used by more than one agent")]
    DuplicateAgentId { agent: AgentId },

    /// A write left a subset member without a value.
    #[error("write of '{attribute}' has no value for agent {agent}")]
    IncompleteWrite { attribute: Attribute, agent: AgentId },

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn condition(field: ClockField, reason: impl Into<String>) -> Self {
        SimError::ConditionEvaluation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_failure_converts() {
        // JSON object keys must be strings
        fn render() -> Result<String, SimError> {
            let keyed_by_pair = std::collections::BTreeMap::from([((1u8, 2u8), 3u8)]);
            Ok(serde_json::to_string_pretty(&keyed_by_pair)?)
        }
        let err = render().unwrap_err();
        assert!(matches!(err, SimError::Serialize(_)));
        assert!(err.to_string().starts_with("could not serialize state"));
    }
}
