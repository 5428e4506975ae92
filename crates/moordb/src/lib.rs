//! ## Crate layout
//! - `core`: the tracking runtime — entries, identity map, change detection,
//!   navigation fixup, value generation, and the save boundary.
//!
//! The `prelude` module mirrors the runtime surface used by application
//! code; everything else is reachable through `moordb::core`.

pub use moordb_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// the runtime surface application code actually touches
///

pub mod prelude {
    pub use crate::core::{
        key::EntityKey,
        model::{Model, entity::EntityModel},
        track::{
            EntityState, EntryId, PreparedWrite, SnapshotMode, StateEntry, StateManager,
            TrackingOptions, WriteOpKind,
        },
        traits::{EntityObject, NavigationCell},
        value::Value,
    };
}
