use crate::{
    error::InternalError,
    obs::sink::TrackEvent,
    track::{EntryId, manager::StateManager},
    value::Value,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    time::{SystemTime, UNIX_EPOCH},
};
use ulid::Ulid;

///
/// GeneratedValue
///
/// One generator result. Temporary values are placeholders the store will
/// replace during save; they must be resolved before the entry leaves the
/// added state.
///

#[derive(Clone, Debug)]
pub struct GeneratedValue {
    pub value: Value,
    pub is_temporary: bool,
}

impl GeneratedValue {
    #[must_use]
    pub const fn permanent(value: Value) -> Self {
        Self {
            value,
            is_temporary: false,
        }
    }

    #[must_use]
    pub const fn temporary(value: Value) -> Self {
        Self {
            value,
            is_temporary: true,
        }
    }
}

///
/// ValueGenerator
///
/// Synchronous generator contract. One instance per registered
/// (entity, property) slot; invoked on every transition into `Added`.
///

pub trait ValueGenerator {
    fn next(&mut self) -> GeneratedValue;
}

///
/// AsyncValueGenerator
///
/// Asynchronous generator contract for values that need a store round-trip
/// (sequences, reserved ranges). Awaiting here is the only suspension point
/// in the tracking engine; dropping the returned future is the cooperative
/// cancellation path.
///

#[async_trait]
pub trait AsyncValueGenerator: Send {
    async fn next(&mut self) -> Result<GeneratedValue, InternalError>;
}

///
/// UlidGenerator
///
/// Client-final key generator. Values are strictly monotonic within the
/// generator: millisecond timestamp plus an in-process sequence, no OS
/// entropy required.
///

pub struct UlidGenerator {
    last_millis: u64,
    sequence: u128,
}

impl UlidGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_millis: 0,
            sequence: 0,
        }
    }

    fn now_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

impl Default for UlidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueGenerator for UlidGenerator {
    fn next(&mut self) -> GeneratedValue {
        let millis = Self::now_millis();
        if millis > self.last_millis {
            self.last_millis = millis;
            self.sequence = 0;
        } else {
            self.sequence += 1;
        }

        GeneratedValue::permanent(Value::Ulid(Ulid::from_parts(self.last_millis, self.sequence)))
    }
}

///
/// TempIntGenerator
///
/// Placeholder generator for store-assigned integer identity columns.
/// Counts down from -1 so placeholders can never collide with real store
/// values, and flags every result temporary.
///

pub struct TempIntGenerator {
    next: i64,
}

impl TempIntGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self { next: -1 }
    }
}

impl Default for TempIntGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueGenerator for TempIntGenerator {
    fn next(&mut self) -> GeneratedValue {
        let value = self.next;
        self.next -= 1;

        GeneratedValue::temporary(Value::Int(value))
    }
}

///
/// GeneratorRegistry
///
/// Configured generators keyed by (entity path, property name).
///

pub(crate) enum GeneratorSlot {
    Sync(Box<dyn ValueGenerator>),
    Async(Box<dyn AsyncValueGenerator>),
}

#[derive(Default)]
pub(crate) struct GeneratorRegistry {
    slots: HashMap<(&'static str, &'static str), GeneratorSlot>,
}

impl GeneratorRegistry {
    pub(crate) fn register(
        &mut self,
        entity_path: &'static str,
        property: &'static str,
        slot: GeneratorSlot,
    ) {
        self.slots.insert((entity_path, property), slot);
    }

    pub(crate) fn slot_mut(
        &mut self,
        entity_path: &'static str,
        property: &'static str,
    ) -> Option<&mut GeneratorSlot> {
        self.slots.get_mut(&(entity_path, property))
    }
}

///
/// Generation planning
///
/// Planned against a read-only view of the registry before any write, then
/// executed while the entry is still in the pre-tracking `Unknown` phase so
/// key and read-only constraints cannot block generated assignments.
///

#[derive(Debug)]
pub(crate) enum GenerationAction {
    /// Copy a principal's key value into a dependent foreign-key slot.
    Propagate {
        property: usize,
        value: Value,
        temporary: bool,
    },
    /// Invoke the registered generator for the slot.
    Generate { property: usize },
}

pub(crate) fn plan(
    manager: &StateManager,
    id: EntryId,
) -> Result<Vec<GenerationAction>, InternalError> {
    let entry = manager.entry_internal(id)?;
    let model = entry.model();
    let mut actions = Vec::new();

    for descriptor in model.properties {
        let property = descriptor.index;
        let current = entry.get(property);
        if !descriptor.is_default(&current) {
            continue;
        }

        // Foreign keys propagate from a tracked principal when one is
        // already referenced; generation is only the fallback.
        if let Some(action) = propagation_action(manager, id, property)? {
            actions.push(action);
            continue;
        }

        if descriptor.generated.requires_generation() {
            actions.push(GenerationAction::Generate { property });
        }
    }

    Ok(actions)
}

fn propagation_action(
    manager: &StateManager,
    id: EntryId,
    property: usize,
) -> Result<Option<GenerationAction>, InternalError> {
    let entry = manager.entry_internal(id)?;
    let model = entry.model();

    for (fk_position, fk) in model.foreign_keys_containing(property) {
        let Some(nav) = model.principal_navigation(fk_position) else {
            continue;
        };
        let crate::traits::NavigationCell::Reference(Some(principal_id)) =
            entry.navigation(nav.index)
        else {
            continue;
        };
        let Ok(principal) = manager.entry_internal(principal_id) else {
            continue;
        };
        if !principal.state().is_tracked() {
            continue;
        }

        let position = fk
            .properties
            .iter()
            .position(|&p| p == property)
            .expect("foreign key listed for property must contain it");
        let principal_property = fk.principal_key[position];
        let value = principal.get(principal_property);

        let principal_model = manager.model().entity(fk.principal_path)?;
        if principal_model.property(principal_property).is_default(&value) {
            continue;
        }

        return Ok(Some(GenerationAction::Propagate {
            property,
            value,
            temporary: principal.is_temporary(principal_property),
        }));
    }

    Ok(None)
}

/// Execute a generation plan with synchronous generators only.
pub(crate) fn run_sync(
    manager: &mut StateManager,
    id: EntryId,
    actions: Vec<GenerationAction>,
) -> Result<(), InternalError> {
    for action in actions {
        match action {
            GenerationAction::Propagate {
                property,
                value,
                temporary,
            } => apply_generated(manager, id, property, value, temporary)?,
            GenerationAction::Generate { property } => {
                let generated = manager.generate_value_sync(id, property)?;
                apply_generated(manager, id, property, generated.value, generated.is_temporary)?;
            }
        }
    }

    Ok(())
}

/// Execute a generation plan, awaiting asynchronous generators.
pub(crate) async fn run_async(
    manager: &mut StateManager,
    id: EntryId,
    actions: Vec<GenerationAction>,
) -> Result<(), InternalError> {
    for action in actions {
        match action {
            GenerationAction::Propagate {
                property,
                value,
                temporary,
            } => apply_generated(manager, id, property, value, temporary)?,
            GenerationAction::Generate { property } => {
                let generated = manager.generate_value(id, property).await?;
                apply_generated(manager, id, property, generated.value, generated.is_temporary)?;
            }
        }
    }

    Ok(())
}

fn apply_generated(
    manager: &mut StateManager,
    id: EntryId,
    property: usize,
    value: Value,
    temporary: bool,
) -> Result<(), InternalError> {
    let entry = manager.entry_mut_internal(id)?;
    let entity_path = entry.model().path;

    entry.set_raw(property, value);
    entry.set_temporary(property, temporary);

    manager.record(TrackEvent::ValueGenerated {
        entity_path,
        temporary,
    });

    Ok(())
}
