//! Module: model
//! Responsibility: read-only entity metadata consumed by the tracking runtime.
//! Does not own: entity instances, lifecycle state, or snapshot storage.
//! Boundary: descriptors are supplied fully-built by the model collaborator;
//! nothing in this module is mutated after construction.

pub mod entity;
pub mod foreign_key;
pub mod key;
pub mod navigation;
pub mod property;

use crate::{
    error::InternalError,
    model::{entity::EntityModel, foreign_key::ForeignKeyModel},
};

///
/// Model
///
/// The closed set of entity descriptors for one unit of work. Cross-entity
/// references (foreign keys, navigations) name their target by path and are
/// resolved through this registry.
///

#[derive(Clone, Copy)]
pub struct Model {
    pub entities: &'static [&'static EntityModel],
}

impl Model {
    #[must_use]
    pub fn try_entity(&self, path: &str) -> Option<&'static EntityModel> {
        self.entities.iter().copied().find(|e| e.path == path)
    }

    /// Resolve an entity descriptor by path.
    pub fn entity(&self, path: &str) -> Result<&'static EntityModel, InternalError> {
        self.try_entity(path)
            .ok_or_else(|| InternalError::unknown_entity_path(path))
    }

    /// Foreign keys declared anywhere in the model that reference `principal_path`.
    ///
    /// Yields the declaring (dependent) entity, the foreign key's position in
    /// its `foreign_keys` slice, and the descriptor itself.
    pub fn referencing_foreign_keys(
        &self,
        principal_path: &str,
    ) -> impl Iterator<Item = (&'static EntityModel, usize, &'static ForeignKeyModel)> {
        self.entities.iter().copied().flat_map(move |entity| {
            entity
                .foreign_keys
                .iter()
                .enumerate()
                .filter(move |(_, fk)| fk.principal_path == principal_path)
                .map(move |(index, fk)| (entity, index, fk))
        })
    }

    /// Whether `property` on `entity` participates in the principal key of
    /// any relationship in the model.
    #[must_use]
    pub fn is_principal_key_property(&self, entity: &EntityModel, property: usize) -> bool {
        self.referencing_foreign_keys(entity.path)
            .any(|(_, _, fk)| fk.principal_key.contains(&property))
    }
}
