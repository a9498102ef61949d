//! Domain Layer - Core threshold logic for the spreadband engine
//!
//! This module contains pure domain types and logic with no external
//! dependencies. Reporting and persistence go through the ports layer.
//!
//! - `window`: fixed-capacity ring buffers over recent spread observations
//! - `stats`: population moments over window contents
//! - `controller`: the adaptive threshold controller itself

pub mod controller;
pub mod stats;
pub mod window;

pub use controller::{
    LifecycleStatus, StatsSnapshot, ThresholdConfig, ThresholdConfigError, ThresholdController,
    ThresholdError, ThresholdState,
};
pub use stats::{moments, SideStats};
pub use window::SampleWindow;
