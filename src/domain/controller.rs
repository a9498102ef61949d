//! Adaptive Threshold Controller
//!
//! Maintains the open/close decision thresholds from a bounded window of
//! recent spread observations. Each adjustment pass combines fresh window
//! moments with a persisted multiplier `k` (`threshold = mean + k * std`)
//! and self-corrects `k` whenever the combined threshold drifts outside the
//! target band around `min_total_threshold`:
//!
//! - below the band, `k` is re-solved to land the sum exactly on the floor
//!   (clamped to the configured multiplier range);
//! - above 1.2x the band floor, `k` is re-solved toward 1.1x, but only ever
//!   downward;
//! - inside the band, nothing moves.
//!
//! The controller is the single writer of both the sample window and the
//! threshold state. It performs no synchronization and no I/O of its own;
//! reporting goes through the [`EventSink`] port after each mutation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::stats::{moments, SideStats};
use crate::domain::window::SampleWindow;
use crate::ports::events::{AdjustmentEvent, EventSink, NoopSink, SampleEvent, SnapshotEvent};

/// Narrow branch trigger: the sum must exceed this factor of the floor.
const NARROW_TRIGGER_FACTOR: f64 = 1.2;

/// Narrow branch target: re-solve the multiplier toward this factor.
const NARROW_TARGET_FACTOR: f64 = 1.1;

/// Emit a periodic snapshot row every this many adjustments.
const SNAPSHOT_EVERY_ADJUSTMENTS: u64 = 100;

/// Controller construction parameters, immutable after validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Fixed capacity of the sample window
    pub sample_capacity: usize,
    /// Observations required before any threshold is produced
    pub min_samples: usize,
    /// Starting value of the adaptive multiplier
    pub initial_multiplier: f64,
    /// Floor for open + close threshold, in spread percent
    pub min_total_threshold: f64,
    /// Upper clamp for the multiplier
    pub max_multiplier: f64,
    /// Lower clamp for the multiplier
    pub min_multiplier: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            sample_capacity: 1000,
            min_samples: 200,
            initial_multiplier: 1.0,
            min_total_threshold: 0.02,
            max_multiplier: 4.0,
            min_multiplier: 0.25,
        }
    }
}

impl ThresholdConfig {
    /// Validate construction parameters. Invalid configuration is fatal and
    /// is never silently corrected.
    pub fn validate(&self) -> Result<(), ThresholdConfigError> {
        if self.sample_capacity == 0 {
            return Err(ThresholdConfigError::ZeroCapacity);
        }
        if self.min_samples > self.sample_capacity {
            return Err(ThresholdConfigError::MinSamplesExceedCapacity {
                min_samples: self.min_samples,
                capacity: self.sample_capacity,
            });
        }
        if self.min_multiplier > self.max_multiplier {
            return Err(ThresholdConfigError::MultiplierBoundsInverted {
                min: self.min_multiplier,
                max: self.max_multiplier,
            });
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, Error)]
pub enum ThresholdConfigError {
    #[error("sample_capacity must be > 0")]
    ZeroCapacity,
    #[error("min_samples {min_samples} exceeds sample_capacity {capacity}")]
    MinSamplesExceedCapacity { min_samples: usize, capacity: usize },
    #[error("min_multiplier {min} exceeds max_multiplier {max}")]
    MultiplierBoundsInverted { min: f64, max: f64 },
}

/// Non-fatal adjustment failures.
#[derive(Debug, Clone, Error)]
pub enum ThresholdError {
    /// Expected steady state during warm-up: keep feeding samples and treat
    /// as "no decision available".
    #[error("insufficient samples: open {open_samples}/{min_samples}, close {close_samples}/{min_samples}")]
    InsufficientSamples {
        open_samples: usize,
        close_samples: usize,
        min_samples: usize,
    },
}

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    /// Fewer than `min_samples` observations so far; no thresholds produced
    Collecting,
    /// Enough samples exist; permanent once entered
    Active,
}

/// Live controller state, mutated only by `record` and a successful
/// adjustment pass. The multiplier persists and evolves across calls for
/// the lifetime of the owning controller instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdState {
    pub open_threshold: Option<f64>,
    pub close_threshold: Option<f64>,
    pub multiplier: f64,
    pub adjustment_count: u64,
    pub total_samples_added: u64,
    /// Epoch millis of the very first observation
    pub window_start_time: Option<i64>,
    /// Epoch millis of the observation that filled the window
    pub window_saturated_time: Option<i64>,
}

impl ThresholdState {
    fn new(initial_multiplier: f64) -> Self {
        Self {
            open_threshold: None,
            close_threshold: None,
            multiplier: initial_multiplier,
            adjustment_count: 0,
            total_samples_added: 0,
            window_start_time: None,
            window_saturated_time: None,
        }
    }
}

/// Structured statistics summary, keyed by lifecycle status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatsSnapshot {
    Collecting {
        samples_so_far: usize,
        min_samples: usize,
        total_samples: u64,
        adjustment_count: u64,
    },
    Active {
        open: SideStats,
        close: SideStats,
        current_open_threshold: Option<f64>,
        current_close_threshold: Option<f64>,
        adjustment_count: u64,
        multiplier: f64,
        total_samples: u64,
    },
}

/// The narrow branch may only ever tighten the persisted multiplier.
fn adopt_narrowed(solved: f64, current: f64) -> bool {
    solved < current
}

/// Adaptive threshold controller over a bounded spread history.
#[derive(Debug)]
pub struct ThresholdController<S: EventSink = NoopSink> {
    config: ThresholdConfig,
    window: SampleWindow,
    state: ThresholdState,
    sink: S,
}

impl ThresholdController<NoopSink> {
    /// Build a controller with no event reporting.
    pub fn new(config: ThresholdConfig) -> Result<Self, ThresholdConfigError> {
        Self::with_sink(config, NoopSink)
    }
}

impl<S: EventSink> ThresholdController<S> {
    /// Build a controller that reports activity through `sink`.
    pub fn with_sink(config: ThresholdConfig, sink: S) -> Result<Self, ThresholdConfigError> {
        config.validate()?;
        tracing::info!(
            sample_capacity = config.sample_capacity,
            min_samples = config.min_samples,
            initial_multiplier = config.initial_multiplier,
            min_total_threshold = config.min_total_threshold,
            "adaptive threshold controller enabled"
        );
        Ok(Self {
            window: SampleWindow::new(config.sample_capacity),
            state: ThresholdState::new(config.initial_multiplier),
            config,
            sink,
        })
    }

    /// Record one spread observation, timestamped with the current wall
    /// clock. Both values are spread percentages and must be finite.
    pub fn record(&mut self, open_spread: f64, close_spread: f64) {
        self.record_at(open_spread, close_spread, Utc::now().timestamp_millis());
    }

    /// Record one observation with an explicit epoch-millis timestamp.
    ///
    /// The trading loop normally uses [`record`](Self::record); replay
    /// tooling and tests supply their own clock here.
    pub fn record_at(&mut self, open_spread: f64, close_spread: f64, timestamp: i64) {
        let previously_added = self.state.total_samples_added;
        if previously_added == 0 {
            self.state.window_start_time = Some(timestamp);
        }
        // This insert fills the window; collection duration becomes
        // observable from here on.
        if previously_added == self.config.sample_capacity as u64 - 1 {
            self.state.window_saturated_time = Some(timestamp);
            tracing::info!(
                capacity = self.config.sample_capacity,
                collection_ms = timestamp - self.state.window_start_time.unwrap_or(timestamp),
                "sample window saturated"
            );
        }

        self.window.record(open_spread, close_spread, timestamp);
        self.state.total_samples_added += 1;

        self.sink.on_sample(&SampleEvent {
            timestamp,
            open_spread,
            close_spread,
            sample_count: self.state.total_samples_added,
            current_open_threshold: self.state.open_threshold,
            current_close_threshold: self.state.close_threshold,
        });
    }

    /// Run one adjustment pass and return the new `(open, close)` pair.
    ///
    /// `current_position` and `max_position` are accepted for forward
    /// compatibility; the decision logic does not consult them yet.
    ///
    /// Returns [`ThresholdError::InsufficientSamples`] during warm-up, in
    /// which case no state is mutated and no events are emitted.
    pub fn adjust(
        &mut self,
        current_position: f64,
        max_position: f64,
    ) -> Result<(f64, f64), ThresholdError> {
        let _ = (current_position, max_position);

        let open_samples = self.window.open_values().len();
        let close_samples = self.window.close_values().len();
        if open_samples < self.config.min_samples || close_samples < self.config.min_samples {
            tracing::debug!(
                open_samples,
                close_samples,
                min_samples = self.config.min_samples,
                "adjustment skipped: insufficient samples"
            );
            return Err(ThresholdError::InsufficientSamples {
                open_samples,
                close_samples,
                min_samples: self.config.min_samples,
            });
        }

        let (open_mean, open_std) = moments(self.window.open_values());
        let (close_mean, close_std) = moments(self.window.close_values());

        // Baseline: mean + k*std on each side with the persisted multiplier.
        let mut multiplier = self.state.multiplier;
        let mut new_open = open_mean + multiplier * open_std;
        let mut new_close = close_mean + multiplier * close_std;
        let mut threshold_sum = new_open + new_close;

        let mean_sum = open_mean + close_mean;
        let std_sum = open_std + close_std;
        // Zero std on either side disables both corrective branches; the
        // threshold for that side degrades to its mean.
        let variance_ok = open_std > 0.0 && close_std > 0.0;

        if threshold_sum < self.config.min_total_threshold && variance_ok && std_sum > 0.0 {
            // Widen: solve k so the sum lands on the floor. Clamping may
            // leave the sum short of the floor; that is expected.
            let solved = (self.config.min_total_threshold - mean_sum) / std_sum;
            multiplier = solved.clamp(self.config.min_multiplier, self.config.max_multiplier);
            new_open = open_mean + multiplier * open_std;
            new_close = close_mean + multiplier * close_std;
            threshold_sum = new_open + new_close;
            tracing::info!(
                solved,
                multiplier,
                threshold_sum,
                floor = self.config.min_total_threshold,
                "widened multiplier to defend threshold floor"
            );
        } else if threshold_sum > NARROW_TRIGGER_FACTOR * self.config.min_total_threshold
            && variance_ok
        {
            // Narrow: re-solve toward 1.1x the floor, but never upward.
            let target_sum = NARROW_TARGET_FACTOR * self.config.min_total_threshold;
            let solved = (target_sum - mean_sum) / std_sum;
            if adopt_narrowed(solved, multiplier) {
                multiplier = solved.clamp(self.config.min_multiplier, self.config.max_multiplier);
                new_open = open_mean + multiplier * open_std;
                new_close = close_mean + multiplier * close_std;
                threshold_sum = new_open + new_close;
                tracing::info!(
                    solved,
                    multiplier,
                    threshold_sum,
                    target_sum,
                    "narrowed multiplier toward target band"
                );
            }
        }

        let old_open = self.state.open_threshold;
        let old_close = self.state.close_threshold;
        let was_collecting = old_open.is_none();

        self.state.open_threshold = Some(new_open);
        self.state.close_threshold = Some(new_close);
        self.state.multiplier = multiplier;
        self.state.adjustment_count += 1;

        if was_collecting {
            tracing::info!(
                open_threshold = new_open,
                close_threshold = new_close,
                multiplier,
                "threshold controller active"
            );
        }

        let timestamp = Utc::now().timestamp_millis();
        self.sink.on_adjustment(&AdjustmentEvent {
            timestamp,
            adjustment_index: self.state.adjustment_count,
            open_mean,
            open_std,
            close_mean,
            close_std,
            multiplier,
            old_open,
            new_open,
            old_close,
            new_close,
            threshold_sum,
            open_sample_count: open_samples,
            close_sample_count: close_samples,
            total_samples: self.state.total_samples_added,
        });

        if self.state.adjustment_count % SNAPSHOT_EVERY_ADJUSTMENTS == 0 {
            let snapshot = self.snapshot();
            self.sink.on_snapshot(&SnapshotEvent { timestamp, snapshot });
        }

        Ok((new_open, new_close))
    }

    /// The persisted threshold pair, or `None` before the first successful
    /// adjustment.
    pub fn current_thresholds(&self) -> Option<(f64, f64)> {
        match (self.state.open_threshold, self.state.close_threshold) {
            (Some(open), Some(close)) => Some((open, close)),
            _ => None,
        }
    }

    /// Current lifecycle phase. `Active` is permanent: the window never
    /// shrinks once samples are added.
    pub fn status(&self) -> LifecycleStatus {
        if self.window.occupancy() >= self.config.min_samples {
            LifecycleStatus::Active
        } else {
            LifecycleStatus::Collecting
        }
    }

    /// Structured statistics summary for callers and persistence.
    ///
    /// Pure read; identical results on repeated calls absent new samples.
    pub fn snapshot(&self) -> StatsSnapshot {
        if self.status() == LifecycleStatus::Collecting {
            return StatsSnapshot::Collecting {
                samples_so_far: self.window.occupancy(),
                min_samples: self.config.min_samples,
                total_samples: self.state.total_samples_added,
                adjustment_count: self.state.adjustment_count,
            };
        }

        // Empty only in the min_samples == 0 corner, where the window can
        // be active without data yet.
        let open = SideStats::compute(self.window.open_values()).unwrap_or_else(SideStats::empty);
        let close = SideStats::compute(self.window.close_values()).unwrap_or_else(SideStats::empty);

        StatsSnapshot::Active {
            open,
            close,
            current_open_threshold: self.state.open_threshold,
            current_close_threshold: self.state.close_threshold,
            adjustment_count: self.state.adjustment_count,
            multiplier: self.state.multiplier,
            total_samples: self.state.total_samples_added,
        }
    }

    /// Elapsed milliseconds covered by the window; 0 before saturation.
    pub fn window_span_ms(&self) -> i64 {
        self.window.window_span_ms()
    }

    /// Observations currently held, never above `sample_capacity`.
    pub fn occupancy(&self) -> usize {
        self.window.occupancy()
    }

    /// Read-only view of the live state record.
    pub fn state(&self) -> &ThresholdState {
        &self.state
    }

    /// The immutable construction parameters.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// The attached event sink (for testing/inspection).
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
