//! Module: fixup
//! Responsibility: propagate every relationship-side change to its mirrored
//! representation so the relational view (foreign keys) and the object view
//! (navigations) never observably diverge.
//!
//! Reentrancy: the guarded entry points no-op while a cascade is already
//! running; writes made inside a cascade therefore settle without spawning
//! nested cascades. Principal-key propagation is deliberately unguarded —
//! a principal-key edit legitimately fans out through multiple foreign keys,
//! and each rewritten dependent runs its own guarded relink.

use crate::{
    error::InternalError,
    key::factory::EntityKeyFactory,
    model::{entity::EntityModel, foreign_key::ForeignKeyModel, navigation::NavigationModel},
    obs::sink::TrackEvent,
    track::{EntryId, manager::StateManager},
    traits::NavigationCell,
    value::Value,
};

///
/// NavigationFixer
///
/// The per-unit-of-work cascade state. Held by the manager, never ambient,
/// so independent units of work fix up concurrently in one process.
///

pub(crate) struct NavigationFixer {
    pub(crate) in_fixup: bool,
}

impl NavigationFixer {
    pub(crate) const fn new() -> Self {
        Self { in_fixup: false }
    }
}

// Run one guarded cascade: nested invocations triggered by the cascade's own
// writes observe the flag and return immediately.
fn guarded(
    manager: &mut StateManager,
    cascade: impl FnOnce(&mut StateManager) -> Result<(), InternalError>,
) -> Result<(), InternalError> {
    if manager.fixer.in_fixup {
        return Ok(());
    }

    manager.fixer.in_fixup = true;
    let result = cascade(manager);
    manager.fixer.in_fixup = false;

    result
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// A dependent's foreign-key value changed: unlink from the principal the
/// snapshot still names, then link to whichever principal the new value
/// resolves to.
pub(crate) fn foreign_key_changed(
    manager: &mut StateManager,
    dependent: EntryId,
    foreign_key: usize,
) -> Result<(), InternalError> {
    guarded(manager, |manager| {
        let entry = manager.entry_internal(dependent)?;
        let model = entry.model();
        let fk = &model.foreign_keys[foreign_key];

        let old_values = entry.relationship_snapshot_foreign_key(fk);
        let new_values = entry.foreign_key_values(fk);

        let old_principal = principal_lookup(manager, fk, old_values)?;
        let new_principal = principal_lookup(manager, fk, new_values)?;
        if old_principal == new_principal {
            return Ok(());
        }

        if let Some(principal) = old_principal {
            unlink(manager, principal, dependent, foreign_key)?;
        }

        if let Some(principal) = new_principal {
            steal_if_unique(manager, principal, dependent, foreign_key)?;
            link(manager, principal, dependent, foreign_key)?;
        }

        Ok(())
    })
}

/// A single-valued navigation changed on either side of a relationship.
pub(crate) fn navigation_reference_changed(
    manager: &mut StateManager,
    id: EntryId,
    navigation: usize,
    old: Option<EntryId>,
    new: Option<EntryId>,
) -> Result<(), InternalError> {
    if old == new {
        return Ok(());
    }

    guarded(manager, |manager| {
        let model = manager.entry_internal(id)?.model();
        let nav = &model.navigations[navigation];

        if nav.points_to_principal {
            reference_to_principal_changed(manager, id, nav, old, new)
        } else {
            reference_to_dependent_changed(manager, id, nav, old, new)
        }
    })
}

/// A collection navigation's membership changed on the principal side.
pub(crate) fn navigation_collection_changed(
    manager: &mut StateManager,
    principal: EntryId,
    navigation: usize,
    added: &[EntryId],
    removed: &[EntryId],
) -> Result<(), InternalError> {
    guarded(manager, |manager| {
        let model = manager.entry_internal(principal)?.model();
        let nav = &model.navigations[navigation];
        let foreign_key = nav.foreign_key;

        for &dependent in removed {
            if !manager.is_tracked(dependent) {
                continue;
            }
            clear_foreign_key_if_matches(manager, dependent, foreign_key, principal)?;
            clear_principal_navigation_if(manager, dependent, foreign_key, principal)?;
            record_unlinked(manager, dependent)?;
        }

        for &dependent in added {
            if !manager.is_tracked(dependent) {
                continue;
            }
            set_foreign_key_from_principal(manager, dependent, foreign_key, principal)?;
            set_principal_navigation(manager, dependent, foreign_key, Some(principal))?;
            record_linked(manager, dependent)?;
        }

        Ok(())
    })
}

/// A principal-key property changed: rewrite the foreign key of every
/// tracked dependent that still matches the old key value.
///
/// Deliberately unguarded (see module docs); each dependent write below
/// triggers its own guarded foreign-key relink.
pub(crate) fn principal_key_changed(
    manager: &mut StateManager,
    principal: EntryId,
    property: usize,
    old: &Value,
    new: &Value,
) -> Result<(), InternalError> {
    let principal_entry = manager.entry_internal(principal)?;
    let principal_model = principal_entry.model();
    let principal_path = principal_model.path;

    let targets: Vec<(&'static EntityModel, usize, &'static ForeignKeyModel)> = manager
        .model()
        .referencing_foreign_keys(principal_path)
        .filter(|(_, _, fk)| fk.principal_key.contains(&property))
        .collect();

    for (dependent_model, _, fk) in targets {
        let position = fk
            .principal_key
            .iter()
            .position(|&p| p == property)
            .expect("filtered foreign key must reference the property");
        let dependent_property = fk.properties[position];

        // The key as the dependents last saw it: current components with
        // the edited slot rolled back.
        let principal_entry = manager.entry_internal(principal)?;
        let old_values: Vec<Value> = fk
            .principal_key
            .iter()
            .map(|&p| {
                if p == property {
                    old.clone()
                } else {
                    principal_entry.get(p)
                }
            })
            .collect();
        let temporary = principal_entry.is_temporary(property);

        // A null old key never had dependents pointing at it.
        if EntityKeyFactory::create_principal(principal_model, fk.principal_key, old_values.clone())
            .is_null()
        {
            continue;
        }

        for dependent in manager.tracked_ids_of(dependent_model.path) {
            let entry = manager.entry_internal(dependent)?;
            if entry.foreign_key_values(fk) != old_values {
                continue;
            }

            manager.set_property(dependent, dependent_property, new.clone())?;
            manager
                .entry_mut_internal(dependent)?
                .set_temporary(dependent_property, temporary);
            manager.record(TrackEvent::CascadeRewrite {
                entity_path: dependent_model.path,
            });
        }
    }

    Ok(())
}

/// One-time fixup pass when a never-seen entry starts tracking. Attach
/// order is arbitrary, so both directions are scanned: the new entry is
/// linked to already-tracked relatives, and every tracked entry pointing at
/// the new one (by value or by navigation) is linked back.
pub(crate) fn initial_attach(manager: &mut StateManager, id: EntryId) -> Result<(), InternalError> {
    guarded(manager, |manager| {
        let model = manager.entry_internal(id)?.model();

        // Dependent side: resolve own foreign keys and principal references.
        for foreign_key in 0..model.foreign_keys.len() {
            let entry = manager.entry_internal(id)?;
            let fk = &model.foreign_keys[foreign_key];
            let values = entry.foreign_key_values(fk);

            if let Some(principal) = principal_lookup(manager, fk, values)? {
                steal_if_unique(manager, principal, id, foreign_key)?;
                link(manager, principal, id, foreign_key)?;
            } else if let Some(nav) = model.principal_navigation(foreign_key) {
                // No FK value yet, but the reference was assigned pre-attach.
                if let NavigationCell::Reference(Some(principal)) =
                    manager.entry_internal(id)?.navigation(nav.index)
                {
                    if manager.is_tracked(principal) {
                        steal_if_unique(manager, principal, id, foreign_key)?;
                        set_foreign_key_from_principal(manager, id, foreign_key, principal)?;
                        link(manager, principal, id, foreign_key)?;
                    }
                }
            }
        }

        // Principal side: own navigation cells naming tracked dependents.
        for navigation in 0..model.navigation_count() {
            let nav = &model.navigations[navigation];
            if nav.points_to_principal {
                continue;
            }

            let members = manager.entry_internal(id)?.navigation(navigation).ids();
            for dependent in members {
                if !manager.is_tracked(dependent) {
                    continue;
                }
                set_foreign_key_from_principal(manager, dependent, nav.foreign_key, id)?;
                set_principal_navigation(manager, dependent, nav.foreign_key, Some(id))?;
                record_linked(manager, dependent)?;
            }
        }

        // Reverse scan: tracked dependents already pointing at the new entry
        // by foreign-key value or by principal reference.
        let referencing: Vec<(&'static EntityModel, usize, &'static ForeignKeyModel)> =
            manager.model().referencing_foreign_keys(model.path).collect();

        for (dependent_model, foreign_key, fk) in referencing {
            let principal_entry = manager.entry_internal(id)?;
            let key_values: Vec<Value> = fk
                .principal_key
                .iter()
                .map(|&p| principal_entry.get(p))
                .collect();
            let key_resolves = !EntityKeyFactory::create_principal(
                model,
                fk.principal_key,
                key_values.clone(),
            )
            .is_null();

            let mut claimed = false;
            for dependent in manager.tracked_ids_of(dependent_model.path) {
                if dependent == id {
                    continue;
                }

                let entry = manager.entry_internal(dependent)?;
                let matches_by_value =
                    key_resolves && entry.foreign_key_values(fk) == key_values;
                let matches_by_navigation = dependent_model
                    .principal_navigation(foreign_key)
                    .is_some_and(|nav| {
                        entry.navigation(nav.index) == NavigationCell::Reference(Some(id))
                    });

                if !matches_by_value && !matches_by_navigation {
                    continue;
                }
                if fk.unique && claimed {
                    // Known simplification: only the first competing
                    // dependent is adopted for a unique relationship.
                    continue;
                }
                claimed = true;

                if matches_by_navigation && !matches_by_value {
                    set_foreign_key_from_principal(manager, dependent, foreign_key, id)?;
                }
                link(manager, id, dependent, foreign_key)?;
            }
        }

        // Reverse scan: tracked principals whose navigation cells already
        // name the new entry.
        let principal_ids = manager.tracked_ids();
        for principal in principal_ids {
            if principal == id {
                continue;
            }

            let principal_model = manager.entry_internal(principal)?.model();
            for nav in principal_model.navigations {
                if nav.points_to_principal || nav.target_path != model.path {
                    continue;
                }
                if !manager
                    .entry_internal(principal)?
                    .navigation(nav.index)
                    .contains(id)
                {
                    continue;
                }

                set_foreign_key_from_principal(manager, id, nav.foreign_key, principal)?;
                set_principal_navigation(manager, id, nav.foreign_key, Some(principal))?;
                record_linked(manager, id)?;
            }
        }

        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Reference-navigation cascades
// ---------------------------------------------------------------------------

// The dependent repointed (or cleared) its principal reference.
fn reference_to_principal_changed(
    manager: &mut StateManager,
    dependent: EntryId,
    nav: &'static NavigationModel,
    old: Option<EntryId>,
    new: Option<EntryId>,
) -> Result<(), InternalError> {
    let foreign_key = nav.foreign_key;

    if let Some(principal) = old {
        if manager.is_tracked(principal) {
            remove_from_inverse(manager, principal, dependent, foreign_key)?;
            clear_foreign_key_if_matches(manager, dependent, foreign_key, principal)?;
            record_unlinked(manager, dependent)?;
        }
    }

    if let Some(principal) = new {
        if manager.is_tracked(principal) {
            steal_if_unique(manager, principal, dependent, foreign_key)?;
            set_foreign_key_from_principal(manager, dependent, foreign_key, principal)?;
            add_to_inverse(manager, principal, dependent, foreign_key)?;
            record_linked(manager, dependent)?;
        }
    }

    Ok(())
}

// The principal repointed (or cleared) its unique dependent reference.
fn reference_to_dependent_changed(
    manager: &mut StateManager,
    principal: EntryId,
    nav: &'static NavigationModel,
    old: Option<EntryId>,
    new: Option<EntryId>,
) -> Result<(), InternalError> {
    let foreign_key = nav.foreign_key;

    if let Some(dependent) = old {
        if manager.is_tracked(dependent) {
            clear_foreign_key_if_matches(manager, dependent, foreign_key, principal)?;
            clear_principal_navigation_if(manager, dependent, foreign_key, principal)?;
            record_unlinked(manager, dependent)?;
        }
    }

    if let Some(dependent) = new {
        if manager.is_tracked(dependent) {
            steal_if_unique(manager, principal, dependent, foreign_key)?;
            set_foreign_key_from_principal(manager, dependent, foreign_key, principal)?;
            set_principal_navigation(manager, dependent, foreign_key, Some(principal))?;
            record_linked(manager, dependent)?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Linking primitives
// ---------------------------------------------------------------------------

// Resolve the tracked principal a set of foreign-key values points at.
fn principal_lookup(
    manager: &StateManager,
    fk: &ForeignKeyModel,
    values: Vec<Value>,
) -> Result<Option<EntryId>, InternalError> {
    let principal_model = manager.model().entity(fk.principal_path)?;
    let key = EntityKeyFactory::create_principal(principal_model, fk.principal_key, values);
    if key.is_null() {
        return Ok(None);
    }

    Ok(manager.lookup_identity(principal_model.path, &key))
}

// Both navigation directions set: dependent's principal reference and the
// principal's inverse.
fn link(
    manager: &mut StateManager,
    principal: EntryId,
    dependent: EntryId,
    foreign_key: usize,
) -> Result<(), InternalError> {
    set_principal_navigation(manager, dependent, foreign_key, Some(principal))?;
    add_to_inverse(manager, principal, dependent, foreign_key)?;
    record_linked(manager, dependent)
}

// Both navigation directions cleared.
fn unlink(
    manager: &mut StateManager,
    principal: EntryId,
    dependent: EntryId,
    foreign_key: usize,
) -> Result<(), InternalError> {
    set_principal_navigation_if(manager, dependent, foreign_key, principal, None)?;
    remove_from_inverse(manager, principal, dependent, foreign_key)?;
    record_unlinked(manager, dependent)
}

// Write the dependent's principal reference unconditionally.
fn set_principal_navigation(
    manager: &mut StateManager,
    dependent: EntryId,
    foreign_key: usize,
    target: Option<EntryId>,
) -> Result<(), InternalError> {
    let model = manager.entry_internal(dependent)?.model();
    let Some(nav) = model.principal_navigation(foreign_key) else {
        return Ok(());
    };

    let current = manager.entry_internal(dependent)?.navigation(nav.index);
    if current != NavigationCell::Reference(target) {
        manager.set_navigation_silent(dependent, nav.index, NavigationCell::Reference(target))?;
    }

    Ok(())
}

// Write the dependent's principal reference only if it currently names the
// expected principal.
fn set_principal_navigation_if(
    manager: &mut StateManager,
    dependent: EntryId,
    foreign_key: usize,
    expected: EntryId,
    target: Option<EntryId>,
) -> Result<(), InternalError> {
    let model = manager.entry_internal(dependent)?.model();
    let Some(nav) = model.principal_navigation(foreign_key) else {
        return Ok(());
    };

    let current = manager.entry_internal(dependent)?.navigation(nav.index);
    if current == NavigationCell::Reference(Some(expected)) {
        manager.set_navigation_silent(dependent, nav.index, NavigationCell::Reference(target))?;
    }

    Ok(())
}

fn clear_principal_navigation_if(
    manager: &mut StateManager,
    dependent: EntryId,
    foreign_key: usize,
    expected: EntryId,
) -> Result<(), InternalError> {
    set_principal_navigation_if(manager, dependent, foreign_key, expected, None)
}

// The principal-side inverse of the dependent's foreign key: the declared
// inverse of the dependent's principal reference when one exists, otherwise
// found by matching the relationship shape.
fn inverse_navigation(
    principal_model: &'static EntityModel,
    dependent_model: &'static EntityModel,
    foreign_key: usize,
) -> Option<&'static NavigationModel> {
    if let Some(nav) = dependent_model.principal_navigation(foreign_key) {
        if let Some(inverse) = nav.inverse {
            return Some(&principal_model.navigations[inverse]);
        }
    }

    principal_model.navigations.iter().find(|nav| {
        !nav.points_to_principal
            && nav.target_path == dependent_model.path
            && nav.foreign_key == foreign_key
    })
}

fn add_to_inverse(
    manager: &mut StateManager,
    principal: EntryId,
    dependent: EntryId,
    foreign_key: usize,
) -> Result<(), InternalError> {
    let principal_model = manager.entry_internal(principal)?.model();
    let dependent_model = manager.entry_internal(dependent)?.model();
    let Some(nav) = inverse_navigation(principal_model, dependent_model, foreign_key) else {
        return Ok(());
    };

    let cell = manager.entry_internal(principal)?.navigation(nav.index);
    let updated = match cell {
        NavigationCell::Collection(mut members) => {
            if members.contains(&dependent) {
                return Ok(());
            }
            members.push(dependent);
            NavigationCell::Collection(members)
        }
        NavigationCell::Reference(current) => {
            if current == Some(dependent) {
                return Ok(());
            }
            NavigationCell::Reference(Some(dependent))
        }
    };

    manager.set_navigation_silent(principal, nav.index, updated)
}

fn remove_from_inverse(
    manager: &mut StateManager,
    principal: EntryId,
    dependent: EntryId,
    foreign_key: usize,
) -> Result<(), InternalError> {
    let principal_model = manager.entry_internal(principal)?.model();
    let dependent_model = manager.entry_internal(dependent)?.model();
    let Some(nav) = inverse_navigation(principal_model, dependent_model, foreign_key) else {
        return Ok(());
    };

    let cell = manager.entry_internal(principal)?.navigation(nav.index);
    let updated = match cell {
        NavigationCell::Collection(mut members) => {
            let Some(position) = members.iter().position(|&m| m == dependent) else {
                return Ok(());
            };
            members.remove(position);
            NavigationCell::Collection(members)
        }
        NavigationCell::Reference(current) => {
            if current != Some(dependent) {
                return Ok(());
            }
            NavigationCell::Reference(None)
        }
    };

    manager.set_navigation_silent(principal, nav.index, updated)
}

// Copy the principal's key values into the dependent's foreign-key slots,
// carrying temporary flags so unresolved generated keys stay traceable.
fn set_foreign_key_from_principal(
    manager: &mut StateManager,
    dependent: EntryId,
    foreign_key: usize,
    principal: EntryId,
) -> Result<(), InternalError> {
    let dependent_model = manager.entry_internal(dependent)?.model();
    let fk = &dependent_model.foreign_keys[foreign_key];

    for (position, &dependent_property) in fk.properties.iter().enumerate() {
        let principal_property = fk.principal_key[position];
        let principal_entry = manager.entry_internal(principal)?;
        let principal_model = principal_entry.model();
        let value = principal_entry.get(principal_property);
        let temporary = principal_entry.is_temporary(principal_property);

        // An unset principal key has nothing to mirror yet; generation or a
        // later key write will propagate it.
        if principal_model.property(principal_property).is_default(&value) {
            continue;
        }

        manager.set_property(dependent, dependent_property, value)?;
        manager
            .entry_mut_internal(dependent)?
            .set_temporary(dependent_property, temporary);
    }

    Ok(())
}

// Null the dependent's foreign key, but only while it still structurally
// matches the principal being removed; a value already repointed elsewhere
// must not be clobbered.
fn clear_foreign_key_if_matches(
    manager: &mut StateManager,
    dependent: EntryId,
    foreign_key: usize,
    principal: EntryId,
) -> Result<bool, InternalError> {
    let dependent_model = manager.entry_internal(dependent)?.model();
    let fk = &dependent_model.foreign_keys[foreign_key];

    let principal_entry = manager.entry_internal(principal)?;
    let key_values: Vec<Value> = fk
        .principal_key
        .iter()
        .map(|&p| principal_entry.get(p))
        .collect();

    let current = manager.entry_internal(dependent)?.foreign_key_values(fk);
    if current != key_values {
        return Ok(false);
    }

    for &property in fk.properties {
        let cleared = dependent_model.property(property).default_value();
        manager.set_property(dependent, property, cleared)?;
        manager
            .entry_mut_internal(dependent)?
            .set_temporary(property, false);
    }

    Ok(true)
}

// For a unique relationship, detach the one competing dependent already
// claiming the principal. Known simplification: only a single competitor is
// handled; further matches are left untouched.
fn steal_if_unique(
    manager: &mut StateManager,
    principal: EntryId,
    dependent: EntryId,
    foreign_key: usize,
) -> Result<(), InternalError> {
    let dependent_model = manager.entry_internal(dependent)?.model();
    let fk = &dependent_model.foreign_keys[foreign_key];
    if !fk.unique {
        return Ok(());
    }

    let competitor = dependents_matching(manager, principal, dependent_model, fk)?
        .into_iter()
        .find(|&other| other != dependent);
    let Some(other) = competitor else {
        return Ok(());
    };

    clear_foreign_key_if_matches(manager, other, foreign_key, principal)?;
    clear_principal_navigation_if(manager, other, foreign_key, principal)?;
    remove_from_inverse(manager, principal, other, foreign_key)?;

    let entity_path = manager.entry_internal(other)?.model().path;
    manager.record(TrackEvent::UniqueSteal { entity_path });

    Ok(())
}

// Tracked dependents whose foreign-key values equal the principal's current
// key, in registry order.
pub(crate) fn dependents_matching(
    manager: &StateManager,
    principal: EntryId,
    dependent_model: &'static EntityModel,
    fk: &ForeignKeyModel,
) -> Result<Vec<EntryId>, InternalError> {
    let principal_entry = manager.entry_internal(principal)?;
    let principal_model = principal_entry.model();
    let key_values: Vec<Value> = fk
        .principal_key
        .iter()
        .map(|&p| principal_entry.get(p))
        .collect();

    if EntityKeyFactory::create_principal(principal_model, fk.principal_key, key_values.clone())
        .is_null()
    {
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    for dependent in manager.tracked_ids_of(dependent_model.path) {
        if manager.entry_internal(dependent)?.foreign_key_values(fk) == key_values {
            matches.push(dependent);
        }
    }

    Ok(matches)
}

fn record_linked(manager: &mut StateManager, dependent: EntryId) -> Result<(), InternalError> {
    let entity_path = manager.entry_internal(dependent)?.model().path;
    manager.record(TrackEvent::Linked { entity_path });

    Ok(())
}

fn record_unlinked(manager: &mut StateManager, dependent: EntryId) -> Result<(), InternalError> {
    let entity_path = manager.entry_internal(dependent)?.model().path;
    manager.record(TrackEvent::Unlinked { entity_path });

    Ok(())
}
