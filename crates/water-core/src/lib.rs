//! Yellow River Water-Quota Model
//!
//! Public API for the simulation core: regime resolution, conditional
//! scheduling, the agent population and the monthly step orchestrator.

pub mod components;
pub mod config;
pub mod error;
pub mod horizon;
pub mod model;
pub mod population;
pub mod schedule;
pub mod scoring;
pub mod setup;
pub mod subsystems;

pub use components::*;
pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH};
pub use error::SimError;
pub use horizon::{current_regime, RegimeHorizon};
pub use model::{StepReport, WaterModel};
pub use population::AgentSubset;
pub use schedule::{ConditionValue, ConditionalUpdate, TimeCondition};
pub use scoring::ScoringRule;
pub use subsystems::Subsystem;
