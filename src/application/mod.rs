//! Application Layer - Drivers that wire config to the domain

pub mod simulator;

pub use simulator::{run as run_simulation, SimulationReport};
