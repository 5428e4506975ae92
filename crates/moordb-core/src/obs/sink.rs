//! Metrics sink boundary.
//!
//! Tracking logic MUST NOT touch counter state directly.
//! All instrumentation flows through TrackEvent and MetricsSink.

///
/// TrackEvent
///

#[derive(Clone, Copy, Debug)]
pub enum TrackEvent {
    Attached {
        entity_path: &'static str,
    },
    Detached {
        entity_path: &'static str,
    },
    DetectSweep {
        entries: u64,
    },
    PropertyFlagged {
        entity_path: &'static str,
    },
    KeyRemapped {
        entity_path: &'static str,
    },
    Linked {
        entity_path: &'static str,
    },
    Unlinked {
        entity_path: &'static str,
    },
    UniqueSteal {
        entity_path: &'static str,
    },
    CascadeRewrite {
        entity_path: &'static str,
    },
    ValueGenerated {
        entity_path: &'static str,
        temporary: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: TrackEvent);
}
