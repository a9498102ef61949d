//! Ports Layer - Interfaces toward external collaborators
//!
//! The core computes thresholds; everything that leaves the process goes
//! through a port. The only port this crate defines is the event sink the
//! persistence collaborator implements.

pub mod events;

pub use events::{
    AdjustmentEvent, EventSink, LogSink, NoopSink, RecordingSink, SampleEvent, SnapshotEvent,
};
