//! Conditional Scheduling
//!
//! Update routines gated on an exact-match predicate over the simulation clock.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};
use water_events::{ClockField, SimClock};

use crate::error::SimError;

/// Accepted value(s) for one clock field, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    One(i64),
    Many(Vec<i64>),
}

impl ConditionValue {
    fn into_set(self) -> BTreeSet<i64> {
        match self {
            ConditionValue::One(v) => BTreeSet::from([v]),
            ConditionValue::Many(vs) => vs.into_iter().collect(),
        }
    }
}

/// A predicate over clock fields.
///
/// Every listed field must equal one of its accepted values. Fields that are
/// not listed are not checked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeCondition {
    constraints: BTreeMap<ClockField, BTreeSet<i64>>,
}

impl TimeCondition {
    /// Condition that matches every tick.
    pub fn always() -> Self {
        Self::default()
    }

    /// Shorthand for a single `field == value` constraint.
    pub fn when(field: ClockField, value: i64) -> Self {
        Self::always().and(field, value)
    }

    /// Adds an accepted value for `field`.
    pub fn and(mut self, field: ClockField, value: i64) -> Self {
        self.constraints.entry(field).or_default().insert(value);
        self
    }

    /// Builds a condition from field names, failing on unknown fields or
    /// empty value lists.
    pub fn parse<'a, I>(spec: I) -> Result<Self, SimError>
    where
        I: IntoIterator<Item = (&'a str, ConditionValue)>,
    {
        let mut condition = Self::always();
        for (name, value) in spec {
            let field: ClockField = name.parse().map_err(|e| SimError::ConditionEvaluation {
                field: name.to_string(),
                reason: format!("{e}"),
            })?;
            let values = value.into_set();
            if values.is_empty() {
                return Err(SimError::condition(field, "no accepted values"));
            }
            condition.constraints.entry(field).or_default().extend(values);
        }
        Ok(condition)
    }

    /// Returns true if the clock satisfies every constraint.
    pub fn matches(&self, clock: &SimClock) -> bool {
        self.constraints
            .iter()
            .all(|(field, accepted)| accepted.contains(&field.value(clock)))
    }

    /// Constraint values that no clock can ever produce.
    fn unreachable_values(&self) -> Vec<(ClockField, i64)> {
        self.constraints
            .iter()
            .flat_map(|(&field, values)| values.iter().map(move |&v| (field, v)))
            .filter(|&(field, v)| !field.admits(v))
            .collect()
    }
}

impl fmt::Display for TimeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            return write!(f, "always");
        }
        let parts: Vec<String> = self
            .constraints
            .iter()
            .map(|(field, values)| {
                let list: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!("{} in [{}]", field, list.join(", "))
            })
            .collect();
        write!(f, "{}", parts.join(" and "))
    }
}

/// Routine run when a condition fires.
pub type UpdateRoutine = Box<dyn FnMut(&mut World) -> Result<(), SimError>>;

/// An update routine wrapped with the condition that gates it.
pub struct ConditionalUpdate {
    name: String,
    condition: TimeCondition,
    routine: UpdateRoutine,
    last_fired: Option<u64>,
}

impl ConditionalUpdate {
    pub fn new<F>(name: impl Into<String>, condition: TimeCondition, routine: F) -> Self
    where
        F: FnMut(&mut World) -> Result<(), SimError> + 'static,
    {
        let name = name.into();
        for (field, value) in condition.unreachable_values() {
            warn!(update = %name, %field, value, "time condition can never match");
        }
        Self {
            name,
            condition,
            routine: Box::new(routine),
            last_fired: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> &TimeCondition {
        &self.condition
    }

    /// Tick of the most recent successful firing.
    pub fn last_fired(&self) -> Option<u64> {
        self.last_fired
    }

    /// Runs the routine if the clock matches and it has not already run on
    /// this tick. Returns whether the routine ran.
    ///
    /// Routine errors propagate unchanged and leave the tick unrecorded, so
    /// the host can repair the world and retry the same tick.
    pub fn maybe_fire(&mut self, clock: &SimClock, world: &mut World) -> Result<bool, SimError> {
        if !self.condition.matches(clock) {
            return Ok(false);
        }
        if self.last_fired == Some(clock.tick) {
            debug!(update = %self.name, tick = clock.tick, "already fired this tick");
            return Ok(false);
        }

        info!(update = %self.name, date = %clock.date, "conditional update firing");
        (self.routine)(world)?;
        self.last_fired = Some(clock.tick);
        Ok(true)
    }
}

impl fmt::Debug for ConditionalUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalUpdate")
            .field("name", &self.name)
            .field("condition", &self.condition)
            .field("last_fired", &self.last_fired)
            .finish_non_exhaustive()
    }
}
