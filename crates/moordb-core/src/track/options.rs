///
/// TrackingOptions
///
/// Unit-of-work policy knobs, fixed at manager construction.
///

#[derive(Clone, Copy, Debug)]
pub struct TrackingOptions {
    /// When original values are captured for dirty diffing.
    pub snapshot_mode: SnapshotMode,
    /// Verbose diagnostics in error messages.
    pub debug: bool,
}

impl TrackingOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            snapshot_mode: SnapshotMode::Eager,
            debug: false,
        }
    }

    /// Defer original-value capture to the first observed write. Cheaper
    /// for workloads where every mutation goes through the manager, but
    /// out-of-band property changes become invisible to the batch sweep.
    #[must_use]
    pub const fn lazy(mut self) -> Self {
        self.snapshot_mode = SnapshotMode::Lazy;
        self
    }

    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self::new()
    }
}

///
/// SnapshotMode
///
/// Relationship-relevant slots (keys, foreign keys, navigations) are always
/// snapshotted at attach; this mode governs the full original-value store
/// only.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SnapshotMode {
    /// Capture all original values when tracking starts.
    Eager,
    /// Capture each original value on the first observed write.
    Lazy,
}
