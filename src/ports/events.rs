//! Event Sink Port
//!
//! Interface through which the threshold controller reports activity to a
//! persistence collaborator (CSV writer, metrics bridge, ...). The core
//! invokes the sink after each state mutation and never performs I/O on the
//! threshold-computation path; file format, location, and rotation are the
//! collaborator's concern.
//!
//! All event rows derive `Serialize` so collaborators can dump them as
//! CSV or JSON without reaching into controller internals.

use serde::Serialize;

use crate::domain::controller::StatsSnapshot;

/// Row emitted for every recorded observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleEvent {
    /// Epoch milliseconds of the observation
    pub timestamp: i64,
    pub open_spread: f64,
    pub close_spread: f64,
    /// Lifetime sample count, including this observation
    pub sample_count: u64,
    pub current_open_threshold: Option<f64>,
    pub current_close_threshold: Option<f64>,
}

/// Row emitted after every successful adjustment pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentEvent {
    /// Epoch milliseconds of the adjustment
    pub timestamp: i64,
    /// 1-based index of this adjustment
    pub adjustment_index: u64,
    pub open_mean: f64,
    pub open_std: f64,
    pub close_mean: f64,
    pub close_std: f64,
    /// Multiplier after this pass
    pub multiplier: f64,
    pub old_open: Option<f64>,
    pub new_open: f64,
    pub old_close: Option<f64>,
    pub new_close: f64,
    pub threshold_sum: f64,
    pub open_sample_count: usize,
    pub close_sample_count: usize,
    pub total_samples: u64,
}

/// Periodic snapshot row, emitted every 100 adjustments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotEvent {
    pub timestamp: i64,
    pub snapshot: StatsSnapshot,
}

/// Destination for controller activity rows.
///
/// Implementations must not block the caller; anything slower than an
/// in-memory append belongs behind a channel owned by the collaborator.
pub trait EventSink {
    fn on_sample(&mut self, event: &SampleEvent);
    fn on_adjustment(&mut self, event: &AdjustmentEvent);
    fn on_snapshot(&mut self, event: &SnapshotEvent);
}

/// Sink that discards everything; the default for deterministic unit tests
/// and for callers that do their own reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn on_sample(&mut self, _event: &SampleEvent) {}
    fn on_adjustment(&mut self, _event: &AdjustmentEvent) {}
    fn on_snapshot(&mut self, _event: &SnapshotEvent) {}
}

/// Sink that forwards rows through `tracing` as structured fields.
///
/// Reference implementation for operators who want the event stream in the
/// process log; real persistence lives outside the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn on_sample(&mut self, event: &SampleEvent) {
        tracing::debug!(
            timestamp = event.timestamp,
            open_spread = event.open_spread,
            close_spread = event.close_spread,
            sample_count = event.sample_count,
            "sample recorded"
        );
    }

    fn on_adjustment(&mut self, event: &AdjustmentEvent) {
        tracing::info!(
            adjustment_index = event.adjustment_index,
            open_mean = event.open_mean,
            open_std = event.open_std,
            close_mean = event.close_mean,
            close_std = event.close_std,
            multiplier = event.multiplier,
            new_open = event.new_open,
            new_close = event.new_close,
            threshold_sum = event.threshold_sum,
            total_samples = event.total_samples,
            "thresholds adjusted"
        );
    }

    fn on_snapshot(&mut self, event: &SnapshotEvent) {
        match serde_json::to_string(&event.snapshot) {
            Ok(json) => tracing::info!(timestamp = event.timestamp, snapshot = %json, "periodic snapshot"),
            Err(e) => tracing::warn!(error = %e, "failed to serialize periodic snapshot"),
        }
    }
}

/// Sink that records every event in memory.
///
/// Test double in the spirit of the usual mock ports: tests feed the
/// controller, then assert against the captured rows.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub samples: Vec<SampleEvent>,
    pub adjustments: Vec<AdjustmentEvent>,
    pub snapshots: Vec<SnapshotEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn on_sample(&mut self, event: &SampleEvent) {
        self.samples.push(event.clone());
    }

    fn on_adjustment(&mut self, event: &AdjustmentEvent) {
        self.adjustments.push(event.clone());
    }

    fn on_snapshot(&mut self, event: &SnapshotEvent) {
        self.snapshots.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> SampleEvent {
        SampleEvent {
            timestamp: 1_700_000_000_000,
            open_spread: 0.012,
            close_spread: 0.008,
            sample_count: 1,
            current_open_threshold: None,
            current_close_threshold: None,
        }
    }

    #[test]
    fn test_recording_sink_captures_events() {
        let mut sink = RecordingSink::new();
        sink.on_sample(&sample_event());
        sink.on_sample(&sample_event());
        assert_eq!(sink.samples.len(), 2);
        assert!(sink.adjustments.is_empty());
        assert!(sink.snapshots.is_empty());
    }

    #[test]
    fn test_sample_event_serializes() {
        let json = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(json["open_spread"], 0.012);
        assert_eq!(json["sample_count"], 1);
        assert!(json["current_open_threshold"].is_null());
    }
}
