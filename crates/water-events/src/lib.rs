//! Shared clock, regime and snapshot types for the Yellow River model.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod clock;
pub mod regime;
pub mod snapshot;

// Re-export clock types
pub use clock::{ClockError, ClockField, ParseClockError, SimClock, YearMonth, MONTHS_PER_YEAR};

pub use regime::Regime;

// Re-export snapshot types
pub use snapshot::{AgentSnapshot, PopulationSnapshot};
