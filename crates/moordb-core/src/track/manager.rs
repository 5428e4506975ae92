use crate::{
    error::InternalError,
    key::EntityKey,
    model::Model,
    obs::{metrics::EventState, sink::MetricsSink, sink::TrackEvent},
    serialize,
    track::{
        EntryId, detect,
        entry::StateEntry,
        fixup::{self, NavigationFixer},
        generate::{
            AsyncValueGenerator, GeneratedValue, GeneratorSlot, ValueGenerator, GeneratorRegistry,
        },
        options::{SnapshotMode, TrackingOptions},
        sidecar::SidecarKind,
        state::EntityState,
    },
    traits::{EntityObject, NavigationCell},
    value::Value,
};
use std::collections::{BTreeMap, HashMap};

///
/// StateManager
///
/// The identity map and registry for one unit of work: owns every
/// `StateEntry`, resolves keys to entries, and routes every observed
/// mutation through detection and fixup synchronously.
///
/// Single logical thread of control; callers serialize access externally.
///

pub struct StateManager {
    model: Model,
    options: TrackingOptions,
    entries: BTreeMap<EntryId, StateEntry>,
    identity_map: HashMap<(&'static str, EntityKey), EntryId>,
    generators: GeneratorRegistry,
    pub(crate) fixer: NavigationFixer,
    metrics: EventState,
    sink: Option<&'static dyn MetricsSink>,
    next_id: u64,
}

impl StateManager {
    #[must_use]
    pub fn new(model: Model) -> Self {
        Self::with_options(model, TrackingOptions::new())
    }

    #[must_use]
    pub fn with_options(model: Model, options: TrackingOptions) -> Self {
        Self {
            model,
            options,
            entries: BTreeMap::new(),
            identity_map: HashMap::new(),
            generators: GeneratorRegistry::default(),
            fixer: NavigationFixer::new(),
            metrics: EventState::default(),
            sink: None,
            next_id: 1,
        }
    }

    #[must_use]
    pub const fn metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub const fn model(&self) -> Model {
        self.model
    }

    #[must_use]
    pub const fn options(&self) -> TrackingOptions {
        self.options
    }

    #[must_use]
    pub const fn metrics(&self) -> &EventState {
        &self.metrics
    }

    pub fn register_generator(
        &mut self,
        entity_path: &'static str,
        property: &'static str,
        generator: Box<dyn ValueGenerator>,
    ) {
        self.generators
            .register(entity_path, property, GeneratorSlot::Sync(generator));
    }

    pub fn register_async_generator(
        &mut self,
        entity_path: &'static str,
        property: &'static str,
        generator: Box<dyn AsyncValueGenerator>,
    ) {
        self.generators
            .register(entity_path, property, GeneratorSlot::Async(generator));
    }

    // ---------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------

    /// Register an entity instance and return its handle. The entry starts
    /// in `Unknown` state (not yet tracked); ownership of the instance makes
    /// this the get-or-create operation — an already-registered instance
    /// cannot be handed in twice.
    pub fn create_entry(&mut self, entity: Box<dyn EntityObject>) -> Result<EntryId, InternalError> {
        let model = entity.model();
        // The instance's model must belong to this unit of work's registry.
        self.model.entity(model.path)?;

        let id = EntryId::new(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, StateEntry::new(id, model, entity));

        Ok(id)
    }

    /// Register and immediately transition to `state`.
    pub fn attach(
        &mut self,
        entity: Box<dyn EntityObject>,
        state: EntityState,
    ) -> Result<EntryId, InternalError> {
        let id = self.create_entry(entity)?;
        self.set_entity_state(id, state)?;

        Ok(id)
    }

    /// Materialize an entity from a CBOR row buffer handed over by the
    /// query collaborator, then attach it in `state`.
    pub fn attach_row(
        &mut self,
        entity_path: &str,
        bytes: &[u8],
        state: EntityState,
    ) -> Result<EntryId, InternalError> {
        let model = self.model.entity(entity_path)?;
        let row = serialize::decode_row(bytes)?;

        let mut entity = (model.new_instance)();
        for (name, value) in row {
            let Some(descriptor) = model.property_by_name(&name) else {
                return Err(InternalError::new(
                    crate::error::ErrorClass::Unsupported,
                    crate::error::ErrorOrigin::Serialize,
                    format!("row field '{name}' is not declared on {}", model.path),
                ));
            };
            entity.set(descriptor.index, value);
        }

        self.attach(entity, state)
    }

    /// Identity-map lookup. `None` covers both "never tracked" and
    /// "key unknown", so callers can attach on demand.
    #[must_use]
    pub fn try_get_entry(&self, entity_path: &str, key: &EntityKey) -> Option<EntryId> {
        let model = self.model.try_entity(entity_path)?;
        self.lookup_identity(model.path, key)
    }

    pub fn entry(&self, id: EntryId) -> Result<&StateEntry, InternalError> {
        self.entry_internal(id)
    }

    pub fn entry_state(&self, id: EntryId) -> Result<EntityState, InternalError> {
        Ok(self.entry_internal(id)?.state())
    }

    pub fn entity(&self, id: EntryId) -> Result<&dyn EntityObject, InternalError> {
        Ok(self.entry_internal(id)?.entity())
    }

    /// Mutable access to the wrapped instance for out-of-band mutation.
    /// Changes made here are invisible until the next `detect_changes` /
    /// `detect_all` sweep.
    pub fn entity_mut(&mut self, id: EntryId) -> Result<&mut dyn EntityObject, InternalError> {
        Ok(self.entry_mut_internal(id)?.entity_mut())
    }

    /// Entries participating in the unit of work (state not `Unknown`).
    pub fn entries(&self) -> impl Iterator<Item = &StateEntry> {
        self.entries.values().filter(|entry| entry.state().is_tracked())
    }

    /// Entries the save collaborator must write (not `Unchanged`, not
    /// `Unknown`).
    pub fn dirty_entries(&self) -> impl Iterator<Item = &StateEntry> {
        self.entries.values().filter(|entry| entry.state().is_dirty())
    }

    // ---------------------------------------------------------------------
    // Lifecycle state machine
    // ---------------------------------------------------------------------

    /// Transition an entry, running value generation, identity indexing,
    /// and initial fixup as the transition demands. Asynchronous generators
    /// are rejected here; use [`Self::set_entity_state_async`].
    pub fn set_entity_state(
        &mut self,
        id: EntryId,
        state: EntityState,
    ) -> Result<(), InternalError> {
        let current = self.entry_state(id)?;
        if current == state {
            return Ok(());
        }

        if current == EntityState::Unknown && state == EntityState::Added {
            // Two-phase: the entry stays untracked while generated values
            // are assigned, so key and read-only constraints cannot block
            // the assignments; tracking starts only once values exist.
            let actions = crate::track::generate::plan(self, id)?;
            crate::track::generate::run_sync(self, id, actions)?;
            return self.start_tracking(id, EntityState::Added);
        }

        self.set_entity_state_generated(id, current, state)
    }

    /// [`Self::set_entity_state`] with support for asynchronous value
    /// generation — the engine's only suspension point. Dropping the future
    /// cancels cooperatively.
    pub async fn set_entity_state_async(
        &mut self,
        id: EntryId,
        state: EntityState,
    ) -> Result<(), InternalError> {
        let current = self.entry_state(id)?;
        if current == state {
            return Ok(());
        }

        if current == EntityState::Unknown && state == EntityState::Added {
            let actions = crate::track::generate::plan(self, id)?;
            crate::track::generate::run_async(self, id, actions).await?;
            return self.start_tracking(id, EntityState::Added);
        }

        self.set_entity_state_generated(id, current, state)
    }

    // All transitions that never invoke value generation.
    fn set_entity_state_generated(
        &mut self,
        id: EntryId,
        current: EntityState,
        state: EntityState,
    ) -> Result<(), InternalError> {
        match (current, state) {
            (EntityState::Unknown, EntityState::Unchanged | EntityState::Modified | EntityState::Deleted) => {
                {
                    let entry = self.entry_internal(id)?;
                    if !entry.is_key_set() {
                        return Err(InternalError::entry_invariant(format!(
                            "cannot track {} as {state} without a set primary key",
                            entry.model().path
                        )));
                    }
                }
                self.start_tracking(id, state)?;
                if state == EntityState::Modified {
                    self.entry_mut_internal(id)?.mark_all_modified();
                }

                Ok(())
            }

            // Leaving the added state towards persistence requires every
            // generated placeholder to have been resolved first.
            (EntityState::Added, EntityState::Unchanged | EntityState::Modified) => {
                self.ensure_no_temporary(id)?;
                let entry = self.entry_mut_internal(id)?;
                entry.clear_flags();
                entry.remove_sidecar(SidecarKind::OriginalValues);
                entry.set_state_raw(state);
                if state == EntityState::Modified {
                    entry.mark_all_modified();
                }

                Ok(())
            }

            // Deleting a never-persisted entity just stops tracking it.
            (EntityState::Added, EntityState::Deleted) => self.stop_tracking(id),

            (EntityState::Modified | EntityState::Deleted, EntityState::Unchanged) => {
                let entry = self.entry_mut_internal(id)?;
                entry.clear_flags();
                entry.remove_sidecar(SidecarKind::OriginalValues);
                entry.set_state_raw(EntityState::Unchanged);

                Ok(())
            }

            (EntityState::Unchanged, EntityState::Modified) => {
                let entry = self.entry_mut_internal(id)?;
                entry.set_state_raw(EntityState::Modified);
                entry.mark_all_modified();

                Ok(())
            }

            (EntityState::Unchanged | EntityState::Modified, EntityState::Deleted) => {
                self.entry_mut_internal(id)?.set_state_raw(EntityState::Deleted);

                Ok(())
            }

            (_, EntityState::Unknown) => self.stop_tracking(id),

            (from, to) => {
                let path = self.entry_internal(id)?.model().path;
                Err(InternalError::invalid_transition(path, from.label(), to.label()))
            }
        }
    }

    fn start_tracking(&mut self, id: EntryId, state: EntityState) -> Result<(), InternalError> {
        let eager = self.options.snapshot_mode == SnapshotMode::Eager;
        let entity_path = {
            let entry = self.entry_mut_internal(id)?;
            entry.set_state_raw(state);
            entry.model().path
        };

        if let Err(err) = self.index_identity(id) {
            // Failed identity claims must not leave a half-tracked entry.
            self.entry_mut_internal(id)?.set_state_raw(EntityState::Unknown);
            return Err(err);
        }

        {
            let entry = self.entry_mut_internal(id)?;
            entry.take_relationship_snapshot();
            if eager && state != EntityState::Added {
                entry.take_original_snapshot();
            }
        }

        self.record(TrackEvent::Attached { entity_path });

        fixup::initial_attach(self, id)
    }

    fn stop_tracking(&mut self, id: EntryId) -> Result<(), InternalError> {
        self.unindex_identity(id)?;

        let entry = self.entry_mut_internal(id)?;
        let entity_path = entry.model().path;
        entry.clear_sidecars();
        entry.clear_flags();
        entry.set_state_raw(EntityState::Unknown);

        self.record(TrackEvent::Detached { entity_path });

        Ok(())
    }

    pub(crate) fn ensure_no_temporary(&self, id: EntryId) -> Result<(), InternalError> {
        let entry = self.entry_internal(id)?;
        if let Some(property) = entry.first_temporary_property() {
            let model = entry.model();
            return Err(InternalError::temporary_value_retained(
                model.path,
                model.property(property).name,
            ));
        }

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Identity map
    // ---------------------------------------------------------------------

    pub(crate) fn lookup_identity(&self, path: &'static str, key: &EntityKey) -> Option<EntryId> {
        self.identity_map.get(&(path, key.clone())).copied()
    }

    fn index_identity(&mut self, id: EntryId) -> Result<(), InternalError> {
        let (path, key) = {
            let entry = self.entry_internal(id)?;
            (entry.model().path, entry.entity_key())
        };
        if key.is_null() {
            return Ok(());
        }

        if let Some(&existing) = self.identity_map.get(&(path, key.clone())) {
            if existing != id {
                return Err(InternalError::identity_conflict(path, &key));
            }
            return Ok(());
        }

        self.identity_map.insert((path, key.clone()), id);
        self.entry_mut_internal(id)?.set_indexed_key(Some(key));

        Ok(())
    }

    fn unindex_identity(&mut self, id: EntryId) -> Result<(), InternalError> {
        let path = self.entry_internal(id)?.model().path;
        if let Some(key) = self.entry_mut_internal(id)?.take_indexed_key() {
            self.identity_map.remove(&(path, key));
        }

        Ok(())
    }

    // Re-file an entry after a primary-key property changed; the triggering
    // write and this update are one atomic step in the single-threaded
    // model.
    fn reindex_identity(&mut self, id: EntryId) -> Result<(), InternalError> {
        let (path, new_key) = {
            let entry = self.entry_internal(id)?;
            (entry.model().path, entry.entity_key())
        };
        let before = self.entry_internal(id)?.indexed_key().cloned();
        if before.as_ref() == Some(&new_key) {
            return Ok(());
        }

        self.unindex_identity(id)?;
        self.index_identity(id)?;

        if self.entry_internal(id)?.indexed_key() != before.as_ref() {
            self.record(TrackEvent::KeyRemapped { entity_path: path });
        }

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Property writes (observed mutation path)
    // ---------------------------------------------------------------------

    /// Write one property through the tracked surface: snapshot the old
    /// value, apply the write, then run detection and fixup for it. The
    /// whole cascade settles before this returns.
    pub fn set_property(
        &mut self,
        id: EntryId,
        property: usize,
        value: Value,
    ) -> Result<(), InternalError> {
        let (old, state) = {
            let entry = self.entry_internal(id)?;
            let model = entry.model();
            let descriptor = model.property(property);

            if !descriptor.kind.admits(&value) {
                return Err(InternalError::new(
                    crate::error::ErrorClass::Unsupported,
                    crate::error::ErrorOrigin::Manager,
                    format!(
                        "{} value does not fit property '{}' on {}",
                        value.label(),
                        descriptor.name,
                        model.path
                    ),
                ));
            }

            let old = entry.get(property);
            if old == value {
                return Ok(());
            }

            let state = entry.state();
            if state.is_tracked() && state != EntityState::Added && descriptor.read_only {
                return Err(InternalError::read_only_modified(model.path, descriptor.name));
            }

            (old, state)
        };

        {
            let entry = self.entry_mut_internal(id)?;
            // "Changing" phase: the original-value sidecar snapshots the
            // pre-change value before the mutation lands.
            if state.is_tracked() && state != EntityState::Added {
                entry.record_original(property, old.clone());
            }
            entry.set_raw(property, value.clone());
        }

        self.property_changed(id, property, old, value)
    }

    /// Name-based convenience over [`Self::set_property`].
    pub fn set_property_by_name(
        &mut self,
        id: EntryId,
        property: &str,
        value: Value,
    ) -> Result<(), InternalError> {
        let model = self.entry_internal(id)?.model();
        let descriptor = model.property_by_name(property).ok_or_else(|| {
            InternalError::new(
                crate::error::ErrorClass::NotFound,
                crate::error::ErrorOrigin::Model,
                format!("property '{property}' is not declared on {}", model.path),
            )
        })?;

        self.set_property(id, descriptor.index, value)
    }

    // "Changed" phase shared by the write surface and the batch detector:
    // dirty flag, identity remap, key cascades, foreign-key fixup, and the
    // snapshot refresh that makes re-detection a no-op.
    pub(crate) fn property_changed(
        &mut self,
        id: EntryId,
        property: usize,
        old: Value,
        new: Value,
    ) -> Result<(), InternalError> {
        let (state, is_pk, is_principal, fk_positions) = {
            let entry = self.entry_internal(id)?;
            let model = entry.model();
            let fk_positions: Vec<usize> = model
                .foreign_keys_containing(property)
                .map(|(position, _)| position)
                .collect();

            (
                entry.state(),
                model.is_primary_key(property),
                self.model.is_principal_key_property(model, property),
                fk_positions,
            )
        };

        if state.is_tracked() && state != EntityState::Added {
            self.flag_property_modified(id, property)?;
        }

        if state.is_tracked() {
            if is_pk {
                self.reindex_identity(id)?;
            }
            if is_principal {
                fixup::principal_key_changed(self, id, property, &old, &new)?;
            }
            for foreign_key in fk_positions {
                fixup::foreign_key_changed(self, id, foreign_key)?;
            }
        }

        self.entry_mut_internal(id)?
            .snapshot_relationship_property(property);

        Ok(())
    }

    /// Explicitly flag one property modified, promoting an `Unchanged`
    /// entry to `Modified`. Read-only properties reject the flag.
    pub fn mark_property_modified(
        &mut self,
        id: EntryId,
        property: usize,
    ) -> Result<(), InternalError> {
        self.flag_property_modified(id, property)
    }

    pub(crate) fn flag_property_modified(
        &mut self,
        id: EntryId,
        property: usize,
    ) -> Result<(), InternalError> {
        let (newly, entity_path) = {
            let entry = self.entry_mut_internal(id)?;
            let newly = !entry.is_modified(property);
            entry.mark_modified(property)?;

            (newly && entry.is_modified(property), entry.model().path)
        };

        if newly {
            self.record(TrackEvent::PropertyFlagged { entity_path });
        }

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Navigation writes (observed mutation path)
    // ---------------------------------------------------------------------

    /// Point a reference navigation at `target` (or clear it) and fix up
    /// both relationship sides. An untracked target joins as `Added`.
    pub fn set_navigation_reference(
        &mut self,
        id: EntryId,
        navigation: usize,
        target: Option<EntryId>,
    ) -> Result<(), InternalError> {
        let old = self.entry_internal(id)?.navigation(navigation);
        let new = NavigationCell::Reference(target);
        if old == new {
            return Ok(());
        }

        self.entry_mut_internal(id)?
            .set_navigation_raw(navigation, new.clone());

        if let Some(target) = target {
            if self.entry_state(target)? == EntityState::Unknown {
                self.set_entity_state(target, EntityState::Added)?;
            }
        }

        self.navigation_changed(id, navigation, old, new)
    }

    /// Add `member` to a collection navigation and fix up both sides. An
    /// untracked member joins as `Added`.
    pub fn add_to_collection(
        &mut self,
        id: EntryId,
        navigation: usize,
        member: EntryId,
    ) -> Result<(), InternalError> {
        let old = self.entry_internal(id)?.navigation(navigation);
        if old.contains(member) {
            return Ok(());
        }

        let mut members = old.ids();
        members.push(member);
        let new = NavigationCell::Collection(members);
        self.entry_mut_internal(id)?
            .set_navigation_raw(navigation, new.clone());

        if self.entry_state(member)? == EntityState::Unknown {
            self.set_entity_state(member, EntityState::Added)?;
        }

        self.navigation_changed(id, navigation, old, new)
    }

    /// Remove `member` from a collection navigation and fix up both sides.
    pub fn remove_from_collection(
        &mut self,
        id: EntryId,
        navigation: usize,
        member: EntryId,
    ) -> Result<(), InternalError> {
        let old = self.entry_internal(id)?.navigation(navigation);
        if !old.contains(member) {
            return Ok(());
        }

        let members: Vec<EntryId> = old.ids().into_iter().filter(|&m| m != member).collect();
        let new = NavigationCell::Collection(members);
        self.entry_mut_internal(id)?
            .set_navigation_raw(navigation, new.clone());

        self.navigation_changed(id, navigation, old, new)
    }

    // Shared by the write surface and the batch detector.
    pub(crate) fn navigation_changed(
        &mut self,
        id: EntryId,
        navigation: usize,
        old: NavigationCell,
        new: NavigationCell,
    ) -> Result<(), InternalError> {
        match (&old, &new) {
            (NavigationCell::Reference(o), NavigationCell::Reference(n)) => {
                fixup::navigation_reference_changed(self, id, navigation, *o, *n)?;
            }
            (NavigationCell::Collection(o), NavigationCell::Collection(n)) => {
                let removed: Vec<EntryId> =
                    o.iter().copied().filter(|m| !n.contains(m)).collect();
                let added: Vec<EntryId> = n.iter().copied().filter(|m| !o.contains(m)).collect();
                fixup::navigation_collection_changed(self, id, navigation, &added, &removed)?;
            }
            _ => {
                return Err(InternalError::manager_internal(format!(
                    "navigation {navigation} changed shape between snapshots on entry {id}"
                )));
            }
        }

        self.entry_mut_internal(id)?
            .snapshot_relationship_navigation(navigation);

        Ok(())
    }

    // Fixup-internal navigation write: no cascade dispatch, but the
    // relationship snapshot stays fresh so detection sees no residual delta.
    pub(crate) fn set_navigation_silent(
        &mut self,
        id: EntryId,
        navigation: usize,
        cell: NavigationCell,
    ) -> Result<(), InternalError> {
        let entry = self.entry_mut_internal(id)?;
        entry.set_navigation_raw(navigation, cell);
        entry.snapshot_relationship_navigation(navigation);

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Change detection
    // ---------------------------------------------------------------------

    /// Diff one entry against its snapshots and dispatch every delta.
    pub fn detect_changes(&mut self, id: EntryId) -> Result<(), InternalError> {
        detect::detect_entry(self, id)?;
        self.record(TrackEvent::DetectSweep { entries: 1 });

        Ok(())
    }

    /// Batch sweep over every tracked entry. Sweep order across entries is
    /// unspecified; entries are independent once snapshotted.
    pub fn detect_all(&mut self) -> Result<(), InternalError> {
        let ids = self.tracked_ids();
        let entries = ids.len() as u64;
        for id in ids {
            detect::detect_entry(self, id)?;
        }
        self.record(TrackEvent::DetectSweep { entries });

        if self.options.debug {
            self.audit_consistency()?;
        }

        Ok(())
    }

    /// Paranoid invariant audit over the settled graph: every dependent's
    /// foreign key must agree with its principal reference, and every
    /// reference must be mirrored by the principal's inverse. Runs after
    /// each batch sweep when the debug option is set.
    pub fn audit_consistency(&self) -> Result<(), InternalError> {
        for entry in self.entries() {
            let model = entry.model();
            for (foreign_key, fk) in model.foreign_keys.iter().enumerate() {
                let Some(nav) = model.principal_navigation(foreign_key) else {
                    continue;
                };
                let NavigationCell::Reference(Some(principal)) = entry.navigation(nav.index)
                else {
                    continue;
                };
                let principal_entry = self.entry_internal(principal)?;
                if !principal_entry.state().is_tracked() {
                    continue;
                }

                let key_values: Vec<Value> = fk
                    .principal_key
                    .iter()
                    .map(|&p| principal_entry.get(p))
                    .collect();
                if entry.foreign_key_values(fk) != key_values {
                    return Err(InternalError::fixup_invariant(format!(
                        "foreign key '{}' on {} diverged from its principal reference",
                        fk.name, model.path
                    )));
                }

                if let Some(inverse) = nav.inverse {
                    if !principal_entry.navigation(inverse).contains(entry.id()) {
                        return Err(InternalError::fixup_invariant(format!(
                            "inverse of '{}' on {} does not mirror the reference",
                            nav.name,
                            principal_entry.model().path
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Relationship lookups
    // ---------------------------------------------------------------------

    /// The tracked principal the given foreign key currently points at.
    pub fn get_principal(
        &self,
        dependent: EntryId,
        foreign_key: usize,
    ) -> Result<Option<EntryId>, InternalError> {
        let entry = self.entry_internal(dependent)?;
        let model = entry.model();
        let fk = &model.foreign_keys[foreign_key];
        let values = entry.foreign_key_values(fk);

        let principal_model = self.model.entity(fk.principal_path)?;
        let key = crate::key::factory::EntityKeyFactory::create_principal(
            principal_model,
            fk.principal_key,
            values,
        );
        if key.is_null() {
            return Ok(None);
        }

        Ok(self.lookup_identity(principal_model.path, &key))
    }

    /// All tracked dependents whose foreign key matches the principal's
    /// current key, in registry order.
    pub fn get_dependents(
        &self,
        principal: EntryId,
        dependent_path: &str,
        foreign_key: usize,
    ) -> Result<Vec<EntryId>, InternalError> {
        let dependent_model = self.model.entity(dependent_path)?;
        let fk = &dependent_model.foreign_keys[foreign_key];

        fixup::dependents_matching(self, principal, dependent_model, fk)
    }

    // ---------------------------------------------------------------------
    // Internal plumbing
    // ---------------------------------------------------------------------

    pub(crate) fn entry_internal(&self, id: EntryId) -> Result<&StateEntry, InternalError> {
        self.entries
            .get(&id)
            .ok_or_else(|| InternalError::entry_not_found(id))
    }

    pub(crate) fn entry_mut_internal(
        &mut self,
        id: EntryId,
    ) -> Result<&mut StateEntry, InternalError> {
        self.entries
            .get_mut(&id)
            .ok_or_else(|| InternalError::entry_not_found(id))
    }

    pub(crate) fn is_tracked(&self, id: EntryId) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|entry| entry.state().is_tracked())
    }

    pub(crate) fn tracked_ids(&self) -> Vec<EntryId> {
        self.entries
            .values()
            .filter(|entry| entry.state().is_tracked())
            .map(StateEntry::id)
            .collect()
    }

    pub(crate) fn tracked_ids_of(&self, path: &str) -> Vec<EntryId> {
        self.entries
            .values()
            .filter(|entry| entry.state().is_tracked() && entry.model().path == path)
            .map(StateEntry::id)
            .collect()
    }

    pub(crate) fn record(&mut self, event: TrackEvent) {
        self.metrics.apply(event);
        if let Some(sink) = self.sink {
            sink.record(event);
        }
    }

    pub(crate) fn generate_value_sync(
        &mut self,
        id: EntryId,
        property: usize,
    ) -> Result<GeneratedValue, InternalError> {
        let (entity_path, property_name) = self.generator_slot_names(id, property)?;

        match self.generators.slot_mut(entity_path, property_name) {
            Some(GeneratorSlot::Sync(generator)) => Ok(generator.next()),
            Some(GeneratorSlot::Async(_)) => Err(InternalError::generator_unsupported(format!(
                "property '{property_name}' on {entity_path} uses an async generator; \
                 transition through set_entity_state_async"
            ))),
            None => Err(InternalError::generator_missing(entity_path, property_name)),
        }
    }

    pub(crate) async fn generate_value(
        &mut self,
        id: EntryId,
        property: usize,
    ) -> Result<GeneratedValue, InternalError> {
        let (entity_path, property_name) = self.generator_slot_names(id, property)?;

        match self.generators.slot_mut(entity_path, property_name) {
            Some(GeneratorSlot::Sync(generator)) => Ok(generator.next()),
            Some(GeneratorSlot::Async(generator)) => generator.next().await,
            None => Err(InternalError::generator_missing(entity_path, property_name)),
        }
    }

    fn generator_slot_names(
        &self,
        id: EntryId,
        property: usize,
    ) -> Result<(&'static str, &'static str), InternalError> {
        let model = self.entry_internal(id)?.model();

        Ok((model.path, model.property(property).name))
    }
}
