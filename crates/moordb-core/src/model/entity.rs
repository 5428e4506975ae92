use crate::{
    model::{
        foreign_key::ForeignKeyModel, key::KeyModel, navigation::NavigationModel,
        property::PropertyModel,
    },
    traits::EntityObject,
};

///
/// EntityModel
/// Runtime model for one entity type, built once by the model collaborator.
///

pub struct EntityModel {
    /// Fully-qualified type path (for dispatch and diagnostics).
    pub path: &'static str,
    /// Stable external name.
    pub entity_name: &'static str,
    /// Ordered property list (authoritative for slot addressing).
    pub properties: &'static [PropertyModel],
    /// Primary key over `properties`.
    pub primary_key: KeyModel,
    /// Relationships declared on this (dependent) side.
    pub foreign_keys: &'static [ForeignKeyModel],
    /// Navigation slots declared on this type.
    pub navigations: &'static [NavigationModel],
    /// How mutations on instances of this type are observed.
    pub change_tracking: ChangeTrackingStrategy,
    /// Materialization hook: a default instance for the row-buffer path.
    pub new_instance: fn() -> Box<dyn EntityObject>,
}

impl EntityModel {
    #[must_use]
    pub const fn property_count(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub const fn navigation_count(&self) -> usize {
        self.navigations.len()
    }

    #[must_use]
    pub fn property(&self, index: usize) -> &'static PropertyModel {
        &self.properties[index]
    }

    #[must_use]
    pub fn property_by_name(&self, name: &str) -> Option<&'static PropertyModel> {
        self.properties.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn is_primary_key(&self, property: usize) -> bool {
        self.primary_key.contains(property)
    }

    /// Foreign keys on this type that include `property`, with their
    /// positions in `foreign_keys`.
    pub fn foreign_keys_containing(
        &self,
        property: usize,
    ) -> impl Iterator<Item = (usize, &'static ForeignKeyModel)> {
        self.foreign_keys
            .iter()
            .enumerate()
            .filter(move |(_, fk)| fk.contains(property))
    }

    /// Reference navigations on this type pointing at the principal of the
    /// foreign key at `foreign_key`.
    #[must_use]
    pub fn principal_navigation(&self, foreign_key: usize) -> Option<&'static NavigationModel> {
        self.navigations
            .iter()
            .find(|nav| nav.points_to_principal && nav.foreign_key == foreign_key)
    }
}

///
/// ChangeTrackingStrategy
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChangeTrackingStrategy {
    /// Mutations are found by diffing live values against snapshots.
    Snapshot,
    /// The type raises its own mutation events through the manager's write
    /// surface; the batch sweep skips it entirely.
    Notifications,
}
