//! Module: detect
//! Responsibility: diff an entry's live values against its snapshots and
//! raise the minimal set of change notifications.
//!
//! Detection is idempotent: dirty flags are sticky and relationship
//! snapshots are refreshed as each delta is handled, so a repeated sweep
//! over an unchanged entry raises nothing.

use crate::{
    error::InternalError,
    model::entity::ChangeTrackingStrategy,
    track::{EntryId, manager::StateManager, state::EntityState},
    traits::NavigationCell,
    value::Value,
};

/// Run snapshot diffing for one entry.
pub(crate) fn detect_entry(manager: &mut StateManager, id: EntryId) -> Result<(), InternalError> {
    let entry = manager.entry_internal(id)?;
    let model = entry.model();

    // Push-based types report their own mutations synchronously; a batch
    // diff over them would only rediscover what was already dispatched.
    if model.change_tracking == ChangeTrackingStrategy::Notifications {
        return Ok(());
    }
    if !entry.state().is_tracked() {
        return Ok(());
    }

    detect_property_changes(manager, id)?;
    detect_relationship_changes(manager, id)?;
    detect_navigation_changes(manager, id)
}

// Dirty-flag sweep against recorded original values.
fn detect_property_changes(manager: &mut StateManager, id: EntryId) -> Result<(), InternalError> {
    let entry = manager.entry_internal(id)?;
    if entry.state() == EntityState::Added {
        // Added entries have no persisted baseline to be dirty against.
        return Ok(());
    }

    let model = entry.model();
    let mut changed: Vec<usize> = Vec::new();
    for descriptor in model.properties {
        let property = descriptor.index;
        let Some(original) = entry
            .sidecar(crate::track::sidecar::SidecarKind::OriginalValues)
            .and_then(|sidecar| sidecar.value(property).cloned())
        else {
            continue;
        };
        if entry.get(property) != original {
            changed.push(property);
        }
    }

    for property in changed {
        manager.flag_property_modified(id, property)?;
    }

    Ok(())
}

// Key and foreign-key sweep against the relationship snapshot. Each delta
// runs the full key-change handling (identity remap, cascade, fixup) and
// re-snapshots the slot.
fn detect_relationship_changes(
    manager: &mut StateManager,
    id: EntryId,
) -> Result<(), InternalError> {
    let entry = manager.entry_internal(id)?;
    let properties = entry.relationship_properties();

    let mut deltas: Vec<(usize, Value, Value)> = Vec::new();
    for property in properties {
        let Some(snapshot) = entry.relationship_snapshot_value(property) else {
            continue;
        };
        let live = entry.get(property);
        if live != snapshot {
            deltas.push((property, snapshot, live));
        }
    }

    for (property, old, new) in deltas {
        manager.property_changed(id, property, old, new)?;
    }

    Ok(())
}

// Navigation sweep: reference-identity set difference, removals first.
fn detect_navigation_changes(manager: &mut StateManager, id: EntryId) -> Result<(), InternalError> {
    let entry = manager.entry_internal(id)?;
    let model = entry.model();

    let mut deltas: Vec<(usize, NavigationCell, NavigationCell)> = Vec::new();
    for navigation in 0..model.navigation_count() {
        let nav = &model.navigations[navigation];
        let old = entry
            .relationship_snapshot_navigation(navigation)
            .unwrap_or_else(|| NavigationCell::empty(nav.collection));
        let new = entry.navigation(navigation);
        if old != new {
            deltas.push((navigation, old, new));
        }
    }

    for (navigation, old, new) in deltas {
        // Anything newly referenced but not yet tracked joins the unit of
        // work as added before the link is fixed up.
        for target in newly_referenced(&old, &new) {
            if manager.entry_state(target)? == EntityState::Unknown {
                manager.set_entity_state(target, EntityState::Added)?;
            }
        }

        manager.navigation_changed(id, navigation, old, new)?;
    }

    Ok(())
}

// Handles present in the new cell but absent from the old one.
fn newly_referenced(old: &NavigationCell, new: &NavigationCell) -> Vec<EntryId> {
    new.ids()
        .into_iter()
        .filter(|&target| !old.contains(target))
        .collect()
}
