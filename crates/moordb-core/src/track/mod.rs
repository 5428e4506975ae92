//! Module: track
//! Responsibility: the change-tracking runtime — entries, the identity map,
//! snapshot diffing, relationship fixup, value generation, and the save
//! boundary.
//! Does not own: entity metadata (model collaborator) or physical writes
//! (save collaborator).
//!
//! Invariants (whenever no fixup cascade is mid-flight):
//! - Tracked dependents' foreign-key values equal the snapshot-recorded
//!   principal key they point at.
//! - Inverse navigations mirror each other: A referencing B implies B's
//!   inverse holds A.
//! - At most one tracked entry per (entity type, non-null key).

mod detect;
mod entry;
mod fixup;
mod flags;
mod generate;
mod manager;
mod options;
mod prepare;
mod sidecar;
mod state;

#[cfg(test)]
mod tests;

use derive_more::Display;

pub use entry::StateEntry;
pub use generate::{
    AsyncValueGenerator, GeneratedValue, TempIntGenerator, UlidGenerator, ValueGenerator,
};
pub use manager::StateManager;
pub use options::{SnapshotMode, TrackingOptions};
pub use prepare::{PreparedWrite, WriteOpKind};
pub use sidecar::{Sidecar, SidecarKind};
pub use state::EntityState;

///
/// EntryId
///
/// Opaque handle to one tracked entry within a unit of work. Navigation
/// cells hold these instead of entity references, so the object graph has
/// no ownership cycles. Handles are never reused within one manager.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("#{_0}")]
pub struct EntryId(u64);

impl EntryId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}
