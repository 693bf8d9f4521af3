//! Regime Resolution
//!
//! Maps a simulated year onto the institutional regime in force, bounded by
//! the validated study horizon.

use bevy_ecs::prelude::*;
use water_events::Regime;

use crate::components::Clock;
use crate::error::SimError;

/// Year boundaries partitioning the study period into regimes.
///
/// Each band is exclusive below and inclusive above:
///
/// | year                         | regime        |
/// |------------------------------|---------------|
/// | `year <= unregulated_until`  | `Unregulated` |
/// | `.. <= was87_until`          | `Was87`       |
/// | `.. <= study_end`            | `Ubr98`       |
/// | `year > study_end`           | error         |
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegimeHorizon {
    unregulated_until: i32,
    was87_until: i32,
    study_end: i32,
}

impl Default for RegimeHorizon {
    fn default() -> Self {
        Self {
            unregulated_until: 1987,
            was87_until: 1998,
            study_end: 2008,
        }
    }
}

impl RegimeHorizon {
    /// Creates a horizon, requiring strictly ascending boundaries.
    pub fn new(unregulated_until: i32, was87_until: i32, study_end: i32) -> Result<Self, SimError> {
        if unregulated_until >= was87_until || was87_until >= study_end {
            return Err(SimError::InvalidHorizon {
                reason: format!(
                    "boundaries must ascend strictly, got {unregulated_until}, {was87_until}, {study_end}"
                ),
            });
        }
        Ok(Self {
            unregulated_until,
            was87_until,
            study_end,
        })
    }

    /// Last year of the study period.
    pub fn study_end(&self) -> i32 {
        self.study_end
    }

    /// Resolves the regime in force during `year`.
    pub fn resolve(&self, year: i32) -> Result<Regime, SimError> {
        if year <= self.unregulated_until {
            Ok(Regime::Unregulated)
        } else if year <= self.was87_until {
            Ok(Regime::Was87)
        } else if year <= self.study_end {
            Ok(Regime::Ubr98)
        } else {
            Err(SimError::OutOfHorizon {
                year,
                last_year: self.study_end,
            })
        }
    }
}

/// Resolves the regime for the live clock stored in `world`.
///
/// Subsystems call this instead of caching a regime so they always see the
/// current year.
pub fn current_regime(world: &World) -> Result<Regime, SimError> {
    let year = world.resource::<Clock>().0.year();
    world.resource::<RegimeHorizon>().resolve(year)
}
