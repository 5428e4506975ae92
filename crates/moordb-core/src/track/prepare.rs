//! Module: prepare
//! Responsibility: the boundary handed to the save collaborator — dirty-set
//! extraction, late store-generated value placeholders, and the
//! accept/reject endpoints that settle a unit of work after a save.

use crate::{
    error::InternalError,
    key::EntityKey,
    model::property::GenerationMode,
    track::{EntryId, manager::StateManager, sidecar::SidecarKind, state::EntityState},
    value::Value,
};

///
/// WriteOpKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WriteOpKind {
    Insert,
    Update,
    Delete,
}

///
/// PreparedWrite
///
/// One physical write the save collaborator must perform, snapshotted from
/// a dirty entry: the operation kind, the entry's identity, the values to
/// write, and the originals an optimistic store may want to compare
/// against. Properties still holding temporary placeholders are listed so
/// the store knows which slots to substitute.
///

#[derive(Clone, Debug)]
pub struct PreparedWrite {
    pub entry: EntryId,
    pub entity_path: &'static str,
    pub op: WriteOpKind,
    pub key: EntityKey,
    pub values: Vec<(&'static str, Value)>,
    pub original_values: Vec<(&'static str, Value)>,
    pub temporary: Vec<&'static str>,
}

impl StateManager {
    /// Run a final detection sweep, snapshot the dirty set into prepared
    /// writes, and attach the transparent store-generated sidecar to every
    /// entry expecting late store values.
    pub fn prepare_to_save(&mut self) -> Result<Vec<PreparedWrite>, InternalError> {
        self.detect_all()?;

        let ids: Vec<EntryId> = self
            .dirty_entries()
            .map(crate::track::entry::StateEntry::id)
            .collect();

        let mut writes = Vec::with_capacity(ids.len());
        for id in ids {
            writes.push(self.prepare_entry(id)?);
        }

        Ok(writes)
    }

    fn prepare_entry(&mut self, id: EntryId) -> Result<PreparedWrite, InternalError> {
        let (write, wants_store_slots) = {
            let entry = self.entry_internal(id)?;
            let model = entry.model();

            let write = match entry.state() {
                EntityState::Added => PreparedWrite {
                    entry: id,
                    entity_path: model.path,
                    op: WriteOpKind::Insert,
                    key: entry.entity_key(),
                    values: model
                        .properties
                        .iter()
                        .map(|p| (p.name, entry.get(p.index)))
                        .collect(),
                    original_values: Vec::new(),
                    temporary: model
                        .properties
                        .iter()
                        .filter(|p| entry.is_temporary(p.index))
                        .map(|p| p.name)
                        .collect(),
                },
                EntityState::Modified => PreparedWrite {
                    entry: id,
                    entity_path: model.path,
                    op: WriteOpKind::Update,
                    key: entry.entity_key(),
                    values: entry
                        .modified_properties()
                        .into_iter()
                        .map(|property| (model.property(property).name, entry.get(property)))
                        .collect(),
                    original_values: entry
                        .modified_properties()
                        .into_iter()
                        .map(|property| {
                            (model.property(property).name, entry.original_value(property))
                        })
                        .collect(),
                    temporary: Vec::new(),
                },
                EntityState::Deleted => PreparedWrite {
                    entry: id,
                    entity_path: model.path,
                    op: WriteOpKind::Delete,
                    key: entry.entity_key(),
                    values: Vec::new(),
                    original_values: Vec::new(),
                    temporary: Vec::new(),
                },
                state => {
                    return Err(InternalError::manager_invariant(format!(
                        "entry {id} in state {state} has no prepared write"
                    )));
                }
            };

            let wants_store_slots = match entry.state() {
                EntityState::Added => model
                    .properties
                    .iter()
                    .any(|p| p.generated == GenerationMode::OnAddStore || p.store_computed),
                EntityState::Modified => model.properties.iter().any(|p| p.store_computed),
                _ => false,
            };

            (write, wants_store_slots)
        };

        if wants_store_slots {
            self.entry_mut_internal(id)?
                .ensure_sidecar(SidecarKind::StoreGeneratedValues);
        }

        Ok(write)
    }

    /// Substitute the real store value for a temporary placeholder. The
    /// value lands in the transparent sidecar (shadowing the live property)
    /// and the slot stops being temporary; it is written through at
    /// accept-changes.
    pub fn resolve_store_value(
        &mut self,
        id: EntryId,
        property: usize,
        value: Value,
    ) -> Result<(), InternalError> {
        let entry = self.entry_mut_internal(id)?;
        if !entry.state().is_tracked() {
            return Err(InternalError::entry_invariant(format!(
                "cannot resolve a store value on untracked entry {id}"
            )));
        }

        entry
            .ensure_sidecar(SidecarKind::StoreGeneratedValues)
            .set_value(property, value);
        entry.set_temporary(property, false);

        Ok(())
    }

    /// Settle the unit of work after a successful save: write resolved
    /// store values through (cascading final key values into dependents),
    /// then `Added`/`Modified` become `Unchanged` and `Deleted` detaches.
    ///
    /// A temporary placeholder that was never resolved fails the whole
    /// operation before any state flips.
    pub fn accept_changes(&mut self) -> Result<(), InternalError> {
        let ids = self.tracked_ids();

        for &id in &ids {
            self.apply_store_values(id)?;
        }
        for &id in &ids {
            if self.entry_state(id)? == EntityState::Added {
                self.ensure_no_temporary(id)?;
            }
        }

        for id in ids {
            match self.entry_state(id)? {
                EntityState::Added | EntityState::Modified => {
                    self.set_entity_state(id, EntityState::Unchanged)?;
                }
                EntityState::Deleted => {
                    self.set_entity_state(id, EntityState::Unknown)?;
                }
                EntityState::Unchanged | EntityState::Unknown => {}
            }
        }

        Ok(())
    }

    // Write sidecar-held store results through the tracked surface so
    // identity remaps and principal-key cascades run for final key values.
    fn apply_store_values(&mut self, id: EntryId) -> Result<(), InternalError> {
        let pairs: Vec<(usize, Value)> = {
            let entry = self.entry_mut_internal(id)?;
            match entry.remove_sidecar(SidecarKind::StoreGeneratedValues) {
                Some(sidecar) => sidecar.into_values().collect(),
                None => return Ok(()),
            }
        };

        for (property, value) in pairs {
            self.set_property(id, property, value)?;
            self.entry_mut_internal(id)?.set_temporary(property, false);
        }

        Ok(())
    }

    /// Throw away pending changes: restore recorded original values
    /// (cascading foreign-key restores through fixup), return `Modified`
    /// and `Deleted` entries to `Unchanged`, and detach `Added` entries.
    pub fn reject_changes(&mut self) -> Result<(), InternalError> {
        let ids = self.tracked_ids();

        for id in ids {
            match self.entry_state(id)? {
                EntityState::Added => {
                    self.set_entity_state(id, EntityState::Unknown)?;
                }
                EntityState::Modified | EntityState::Deleted => {
                    self.entry_mut_internal(id)?
                        .remove_sidecar(SidecarKind::StoreGeneratedValues);

                    let originals: Vec<(usize, Value)> = self
                        .entry_internal(id)?
                        .sidecar(SidecarKind::OriginalValues)
                        .map(|sidecar| {
                            sidecar
                                .recorded()
                                .map(|(property, value)| (property, value.clone()))
                                .collect()
                        })
                        .unwrap_or_default();

                    for (property, value) in originals {
                        self.set_property(id, property, value)?;
                    }

                    self.set_entity_state(id, EntityState::Unchanged)?;
                }
                EntityState::Unchanged | EntityState::Unknown => {}
            }
        }

        Ok(())
    }
}
