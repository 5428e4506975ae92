//! Core runtime for MoorDB: the change-tracking and relationship-consistency
//! engine — entries, the identity map, snapshot diffing, navigation fixup,
//! and value generation.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod error;
pub mod key;
pub mod model;
pub mod obs;
pub mod serialize;
pub mod track;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, serializers, or internal plumbing are re-exported here.
///

pub mod prelude {
    pub use crate::{
        key::EntityKey,
        model::{Model, entity::EntityModel},
        track::{EntityState, EntryId, StateEntry, StateManager, TrackingOptions},
        traits::{EntityObject, NavigationCell},
        value::Value,
    };
}
