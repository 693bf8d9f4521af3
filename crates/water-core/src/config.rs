//! Configuration System
//!
//! Loads model parameters from `water.toml` so runs can be tuned without
//! recompiling. Every section falls back to its defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::components::{Attribute, Role};
use crate::error::SimError;
use crate::horizon::RegimeHorizon;
use crate::schedule::{ConditionValue, TimeCondition};
use crate::scoring::ScoringRule;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "water.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub horizon: HorizonConfig,
    #[serde(default)]
    pub agents: AgentConfig,
    #[serde(default)]
    pub nature: NatureConfig,
    #[serde(default)]
    pub society: SocietyConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Renders this configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Builds the validated regime horizon.
    pub fn regime_horizon(&self) -> Result<RegimeHorizon, SimError> {
        RegimeHorizon::new(
            self.horizon.unregulated_until,
            self.horizon.was87_until,
            self.horizon.study_end,
        )
    }
}

/// Simulation run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub start_year: i32,
    pub start_month: u8,
    /// Number of monthly ticks; `None` runs to the end of the study period
    pub ticks: Option<u64>,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_year: 1979,
            start_month: 1,
            ticks: None,
            seed: 42,
        }
    }
}

/// Last year of each regime band
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonConfig {
    pub unregulated_until: i32,
    pub was87_until: i32,
    pub study_end: i32,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            unregulated_until: 1987,
            was87_until: 1998,
            study_end: 2008,
        }
    }
}

/// Agent spawning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub farmers: u32,
    pub provinces: u32,
    /// Monthly water demand range for farmers
    pub farmer_demand: (f64, f64),
    /// Water-use efficiency range for farmers
    pub farmer_efficiency: (f64, f64),
    /// Monthly water demand of a province authority
    pub province_demand: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            farmers: 50,
            provinces: 9,
            farmer_demand: (5.0, 15.0),
            farmer_efficiency: (0.4, 1.0),
            province_demand: 100.0,
        }
    }
}

/// Runoff generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NatureConfig {
    /// Mean monthly runoff before seasonal adjustment
    pub mean_runoff: f64,
    /// Relative noise amplitude, 0.0 to 1.0
    pub variability: f64,
}

impl Default for NatureConfig {
    fn default() -> Self {
        Self {
            mean_runoff: 450.0,
            variability: 0.3,
        }
    }
}

/// Water allocation among users
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocietyConfig {
    /// Role of the agents drawing water
    pub role: Role,
    /// Share of demand guaranteed to every user under the 1998 regulation
    pub ubr_min_share: f64,
}

impl Default for SocietyConfig {
    fn default() -> Self {
        Self {
            role: Role::Farmer,
            ubr_min_share: 0.3,
        }
    }
}

/// End-of-year scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub role: Role,
    pub lhs: Attribute,
    pub rhs: Attribute,
    pub output: Attribute,
    /// Clock fields that must match for scoring to run, e.g. `{ month = 12 }`
    pub when: BTreeMap<String, ConditionValue>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let rule = ScoringRule::default();
        Self {
            role: rule.role,
            lhs: rule.lhs,
            rhs: rule.rhs,
            output: rule.output,
            when: BTreeMap::from([("month".to_string(), ConditionValue::One(12))]),
        }
    }
}

impl ScoringConfig {
    pub fn rule(&self) -> ScoringRule {
        ScoringRule {
            role: self.role,
            lhs: self.lhs,
            rhs: self.rhs,
            output: self.output,
        }
    }

    /// Parses the `when` table into a condition, validating field names.
    pub fn condition(&self) -> Result<TimeCondition, SimError> {
        TimeCondition::parse(
            self.when
                .iter()
                .map(|(field, value)| (field.as_str(), value.clone())),
        )
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
