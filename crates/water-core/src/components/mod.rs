//! ECS Components
//!
//! Agent components and shared world resources.

pub mod agent;
pub mod environment;

pub use agent::*;
pub use environment::*;
