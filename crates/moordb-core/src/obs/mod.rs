//! Observability: tracking telemetry (counters) and sink abstractions.
//!
//! Counter state is owned by each `StateManager`, never by ambient process
//! globals, so independent units of work report independently.

pub(crate) mod metrics;
pub(crate) mod sink;

pub use metrics::{EntityCounters, EventOps, EventState};
pub use sink::{MetricsSink, TrackEvent};
