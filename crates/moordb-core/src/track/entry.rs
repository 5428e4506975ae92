use crate::{
    error::InternalError,
    key::{EntityKey, factory::EntityKeyFactory},
    model::{entity::EntityModel, foreign_key::ForeignKeyModel},
    track::{
        EntryId,
        flags::PropertyFlags,
        sidecar::{Sidecar, SidecarKind},
        state::EntityState,
    },
    traits::{EntityObject, NavigationCell},
    value::Value,
};

///
/// StateEntry
///
/// The per-object tracking unit: exclusively owns the entity instance while
/// tracked and carries its lifecycle state, per-property modified/temporary
/// bitsets, and the sidecar slot array.
///
/// Entries only flip their own flags and slots here; every transition with
/// registry-wide effects (identity map, generation, fixup) is orchestrated
/// by the `StateManager`.
///

pub struct StateEntry {
    id: EntryId,
    model: &'static EntityModel,
    entity: Box<dyn EntityObject>,
    state: EntityState,
    modified: PropertyFlags,
    temporary: PropertyFlags,
    sidecars: [Option<Sidecar>; SidecarKind::COUNT],
    /// The key this entry is currently filed under in the identity map.
    /// Manager bookkeeping; `None` while unindexed.
    indexed_key: Option<EntityKey>,
}

impl StateEntry {
    pub(crate) fn new(id: EntryId, model: &'static EntityModel, entity: Box<dyn EntityObject>) -> Self {
        let properties = model.property_count();

        Self {
            id,
            model,
            entity,
            state: EntityState::Unknown,
            modified: PropertyFlags::new(properties),
            temporary: PropertyFlags::new(properties),
            sidecars: [None, None, None],
            indexed_key: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> EntryId {
        self.id
    }

    #[must_use]
    pub const fn state(&self) -> EntityState {
        self.state
    }

    #[must_use]
    pub const fn model(&self) -> &'static EntityModel {
        self.model
    }

    #[must_use]
    pub fn entity(&self) -> &dyn EntityObject {
        self.entity.as_ref()
    }

    pub(crate) fn entity_mut(&mut self) -> &mut dyn EntityObject {
        self.entity.as_mut()
    }

    pub(crate) const fn set_state_raw(&mut self, state: EntityState) {
        self.state = state;
    }

    // ---------------------------------------------------------------------
    // Property access (transparent sidecar redirect)
    // ---------------------------------------------------------------------

    /// Read one property. An attached transparent sidecar holding the slot
    /// shadows the real storage.
    #[must_use]
    pub fn get(&self, property: usize) -> Value {
        for sidecar in self.sidecars.iter().flatten() {
            if sidecar.kind().transparent() && sidecar.has_value(property) {
                if let Some(value) = sidecar.value(property) {
                    return value.clone();
                }
            }
        }

        self.entity.get(property)
    }

    /// Write one property, honoring the transparent redirect. No change
    /// notifications; the manager's write surface wraps this.
    pub(crate) fn set_raw(&mut self, property: usize, value: Value) {
        for sidecar in self.sidecars.iter_mut().flatten() {
            if sidecar.kind().transparent() && sidecar.has_value(property) {
                sidecar.set_value(property, value);
                return;
            }
        }

        self.entity.set(property, value);
    }

    #[must_use]
    pub fn navigation(&self, navigation: usize) -> NavigationCell {
        self.entity.navigation(navigation)
    }

    pub(crate) fn set_navigation_raw(&mut self, navigation: usize, cell: NavigationCell) {
        self.entity.set_navigation(navigation, cell);
    }

    // ---------------------------------------------------------------------
    // Sidecars
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn sidecar(&self, kind: SidecarKind) -> Option<&Sidecar> {
        self.sidecars[kind.slot()].as_ref()
    }

    /// Get or lazily create the sidecar of `kind`.
    pub(crate) fn ensure_sidecar(&mut self, kind: SidecarKind) -> &mut Sidecar {
        let slot = kind.slot();
        if self.sidecars[slot].is_none() {
            self.sidecars[slot] = Some(Sidecar::new(
                kind,
                self.model.property_count(),
                self.model.navigation_count(),
            ));
        }

        self.sidecars[slot].as_mut().expect("sidecar slot just filled")
    }

    pub(crate) fn remove_sidecar(&mut self, kind: SidecarKind) -> Option<Sidecar> {
        self.sidecars[kind.slot()].take()
    }

    pub(crate) fn clear_sidecars(&mut self) {
        self.sidecars = [None, None, None];
    }

    // ---------------------------------------------------------------------
    // Dirty / temporary flags
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn is_modified(&self, property: usize) -> bool {
        self.modified.get(property)
    }

    /// Flag one property modified; promotes an unchanged entry to modified.
    ///
    /// Read-only properties reject the flag as a configuration error;
    /// store-computed properties swallow it (the store owns their value).
    pub(crate) fn mark_modified(&mut self, property: usize) -> Result<(), InternalError> {
        let descriptor = self.model.property(property);

        if descriptor.read_only {
            return Err(InternalError::read_only_modified(
                self.model.path,
                descriptor.name,
            ));
        }
        if descriptor.store_computed {
            return Ok(());
        }

        self.modified.set(property);
        if self.state == EntityState::Unchanged {
            self.state = EntityState::Modified;
        }

        Ok(())
    }

    /// Flag every mutable property modified (transition into `Modified`).
    pub(crate) fn mark_all_modified(&mut self) {
        for property in self.model.properties {
            if property.mutable() && !self.model.is_primary_key(property.index) {
                self.modified.set(property.index);
            }
        }
    }

    #[must_use]
    pub fn modified_properties(&self) -> Vec<usize> {
        self.modified.iter_set().collect()
    }

    #[must_use]
    pub fn has_modified_values(&self) -> bool {
        self.modified.any()
    }

    #[must_use]
    pub fn is_temporary(&self, property: usize) -> bool {
        self.temporary.get(property)
    }

    pub(crate) fn set_temporary(&mut self, property: usize, flag: bool) {
        self.temporary.assign(property, flag);
    }

    #[must_use]
    pub fn has_temporary_values(&self) -> bool {
        self.temporary.any()
    }

    /// First property still flagged temporary, for error reporting.
    pub(crate) fn first_temporary_property(&self) -> Option<usize> {
        self.temporary.iter_set().next()
    }

    pub(crate) fn clear_flags(&mut self) {
        self.modified.clear_all();
        self.temporary.clear_all();
    }

    // ---------------------------------------------------------------------
    // Identity
    // ---------------------------------------------------------------------

    /// Current primary-key component values in declaration order.
    #[must_use]
    pub fn primary_key_values(&self) -> Vec<Value> {
        self.model
            .primary_key
            .properties
            .iter()
            .map(|&property| self.get(property))
            .collect()
    }

    /// The entry's identity value; `EntityKey::Null` while any component is
    /// unset.
    #[must_use]
    pub fn entity_key(&self) -> EntityKey {
        EntityKeyFactory::create(self.model, self.primary_key_values())
    }

    /// Whether every primary-key property holds a non-default value.
    #[must_use]
    pub fn is_key_set(&self) -> bool {
        !self.entity_key().is_null()
    }

    /// Current foreign-key component values for `fk`, in declaration order.
    #[must_use]
    pub fn foreign_key_values(&self, fk: &ForeignKeyModel) -> Vec<Value> {
        fk.properties.iter().map(|&property| self.get(property)).collect()
    }

    pub(crate) const fn indexed_key(&self) -> Option<&EntityKey> {
        self.indexed_key.as_ref()
    }

    pub(crate) fn set_indexed_key(&mut self, key: Option<EntityKey>) {
        self.indexed_key = key;
    }

    pub(crate) fn take_indexed_key(&mut self) -> Option<EntityKey> {
        self.indexed_key.take()
    }

    // ---------------------------------------------------------------------
    // Original values
    // ---------------------------------------------------------------------

    /// Record the pre-change value of `property` if not yet recorded.
    pub(crate) fn record_original(&mut self, property: usize, old: Value) {
        self.ensure_sidecar(SidecarKind::OriginalValues)
            .record_value(property, old);
    }

    /// Capture all property values as the original baseline (eager mode).
    pub(crate) fn take_original_snapshot(&mut self) {
        let values: Vec<Value> = (0..self.model.property_count())
            .map(|property| self.get(property))
            .collect();

        let sidecar = self.ensure_sidecar(SidecarKind::OriginalValues);
        for (property, value) in values.into_iter().enumerate() {
            sidecar.record_value(property, value);
        }
    }

    /// The recorded original value of `property`, falling back to the live
    /// value when no change has been observed.
    #[must_use]
    pub fn original_value(&self, property: usize) -> Value {
        self.sidecar(SidecarKind::OriginalValues)
            .and_then(|sidecar| sidecar.value(property).cloned())
            .unwrap_or_else(|| self.get(property))
    }

    // ---------------------------------------------------------------------
    // Relationship snapshot
    // ---------------------------------------------------------------------

    /// Property slots the relationship snapshot covers: primary-key and
    /// foreign-key participants.
    pub(crate) fn relationship_properties(&self) -> Vec<usize> {
        let mut properties: Vec<usize> = self.model.primary_key.properties.to_vec();
        for fk in self.model.foreign_keys {
            for &property in fk.properties {
                if !properties.contains(&property) {
                    properties.push(property);
                }
            }
        }

        properties
    }

    /// Refresh one relationship-snapshot property slot from the live value.
    pub(crate) fn snapshot_relationship_property(&mut self, property: usize) {
        let value = self.get(property);
        self.ensure_sidecar(SidecarKind::RelationshipsSnapshot)
            .set_value(property, value);
    }

    /// Refresh one relationship-snapshot navigation cell from the live cell.
    pub(crate) fn snapshot_relationship_navigation(&mut self, navigation: usize) {
        let cell = self.navigation(navigation);
        self.ensure_sidecar(SidecarKind::RelationshipsSnapshot)
            .set_navigation(navigation, cell);
    }

    /// Capture the full relationship snapshot (keys, foreign keys, every
    /// navigation cell). Runs at attach; fixup and detection keep it fresh
    /// afterward.
    pub(crate) fn take_relationship_snapshot(&mut self) {
        for property in self.relationship_properties() {
            self.snapshot_relationship_property(property);
        }
        for navigation in 0..self.model.navigation_count() {
            self.snapshot_relationship_navigation(navigation);
        }
    }

    #[must_use]
    pub(crate) fn relationship_snapshot_value(&self, property: usize) -> Option<Value> {
        self.sidecar(SidecarKind::RelationshipsSnapshot)
            .and_then(|sidecar| sidecar.value(property).cloned())
    }

    #[must_use]
    pub(crate) fn relationship_snapshot_navigation(&self, navigation: usize) -> Option<NavigationCell> {
        self.sidecar(SidecarKind::RelationshipsSnapshot)
            .and_then(|sidecar| sidecar.navigation(navigation).cloned())
    }

    /// Snapshot-recorded foreign-key values for `fk`, used to find the old
    /// principal during fixup. Slots never snapshotted fall back to live
    /// values.
    #[must_use]
    pub(crate) fn relationship_snapshot_foreign_key(&self, fk: &ForeignKeyModel) -> Vec<Value> {
        fk.properties
            .iter()
            .map(|&property| {
                self.relationship_snapshot_value(property)
                    .unwrap_or_else(|| self.get(property))
            })
            .collect()
    }
}
