//! Spreadband - Adaptive Spread Threshold Engine
//!
//! Maintains a continuously updated pair of open/close decision thresholds
//! from a bounded history of observed spread values, for use by an external
//! cross-exchange arbitrage loop.
//!
//! # Modules
//!
//! - `domain`: Sample window, statistics, and the adaptive controller
//! - `ports`: Event-sink interface toward the persistence collaborator
//! - `config`: Configuration loading and validation
//! - `application`: Simulation driver for the CLI
//!
//! # Example
//!
//! ```
//! use spreadband::domain::{ThresholdConfig, ThresholdController};
//!
//! let mut controller = ThresholdController::new(ThresholdConfig::default())?;
//! controller.record(0.014, 0.011);
//! // ... keep feeding; adjust() yields thresholds once warm-up completes
//! assert!(controller.adjust(0.0, 0.0).is_err());
//! # Ok::<(), spreadband::domain::ThresholdConfigError>(())
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{
    LifecycleStatus, StatsSnapshot, ThresholdConfig, ThresholdConfigError, ThresholdController,
    ThresholdError,
};
pub use ports::{EventSink, LogSink, NoopSink};
