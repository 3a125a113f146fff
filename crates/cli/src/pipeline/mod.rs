//! In-process simulation of a distributed run.

mod orchestrator;
mod stats;

pub use orchestrator::{Simulation, SimulationConfig};
pub use stats::RunStats;
