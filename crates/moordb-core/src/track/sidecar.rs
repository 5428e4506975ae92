use crate::{traits::NavigationCell, value::Value};

///
/// SidecarKind
///
/// The closed set of secondary value stores an entry can carry. A fixed,
/// enum-indexed slot per kind; at most one instance of each per entry.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SidecarKind {
    /// Pre-change property values: dirty diffing and reject-changes.
    OriginalValues,
    /// Previous key/foreign-key/navigation values: change detection and
    /// fixup.
    RelationshipsSnapshot,
    /// Late store-generated placeholders captured during save; transparent,
    /// applied to the entity at accept-changes.
    StoreGeneratedValues,
}

impl SidecarKind {
    pub(crate) const COUNT: usize = 3;

    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::OriginalValues => 0,
            Self::RelationshipsSnapshot => 1,
            Self::StoreGeneratedValues => 2,
        }
    }

    /// Transparent stores shadow the real property storage: reads and
    /// writes of a held slot are redirected here.
    #[must_use]
    pub const fn transparent(self) -> bool {
        matches!(self, Self::StoreGeneratedValues)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OriginalValues => "original_values",
            Self::RelationshipsSnapshot => "relationships_snapshot",
            Self::StoreGeneratedValues => "store_generated_values",
        }
    }
}

///
/// Sidecar
///
/// A named optional slot-set over the same property index space as the
/// entity, plus (for the relationship snapshot) navigation cells. Slots are
/// `None` until recorded, so a sidecar can hold a partial snapshot.
///

#[derive(Clone, Debug)]
pub struct Sidecar {
    kind: SidecarKind,
    values: Box<[Option<Value>]>,
    navigations: Box<[Option<NavigationCell>]>,
}

impl Sidecar {
    pub(crate) fn new(kind: SidecarKind, properties: usize, navigations: usize) -> Self {
        Self {
            kind,
            values: vec![None; properties].into_boxed_slice(),
            navigations: vec![None; navigations].into_boxed_slice(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SidecarKind {
        self.kind
    }

    #[must_use]
    pub fn has_value(&self, property: usize) -> bool {
        self.values[property].is_some()
    }

    #[must_use]
    pub fn value(&self, property: usize) -> Option<&Value> {
        self.values[property].as_ref()
    }

    pub(crate) fn set_value(&mut self, property: usize, value: Value) {
        self.values[property] = Some(value);
    }

    /// Record a value only if the slot has not been recorded yet; the first
    /// snapshot of a property wins.
    pub(crate) fn record_value(&mut self, property: usize, value: Value) {
        if self.values[property].is_none() {
            self.values[property] = Some(value);
        }
    }

    #[must_use]
    pub fn navigation(&self, navigation: usize) -> Option<&NavigationCell> {
        self.navigations[navigation].as_ref()
    }

    pub(crate) fn set_navigation(&mut self, navigation: usize, cell: NavigationCell) {
        self.navigations[navigation] = Some(cell);
    }

    /// Recorded (property, value) pairs.
    pub(crate) fn recorded(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(property, value)| value.as_ref().map(|v| (property, v)))
    }

    /// Recorded (property, value) pairs, consuming the sidecar.
    pub(crate) fn into_values(self) -> impl Iterator<Item = (usize, Value)> {
        self.values
            .into_vec()
            .into_iter()
            .enumerate()
            .filter_map(|(property, value)| value.map(|v| (property, v)))
    }
}
