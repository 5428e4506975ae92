///
/// ForeignKeyModel
///
/// One relationship edge as declared on the dependent side. The principal is
/// named by path and resolved through the `Model` registry; `principal_key`
/// holds property slot indexes *on the principal type*, position-aligned
/// with `properties` on the dependent.
///

pub struct ForeignKeyModel {
    /// Relationship name for diagnostics.
    pub name: &'static str,
    /// Path of the principal (referenced) entity type.
    pub principal_path: &'static str,
    /// Referenced key property indexes on the principal type.
    pub principal_key: &'static [usize],
    /// Foreign-key property indexes on the dependent (declaring) type.
    pub properties: &'static [usize],
    /// Unique relationships pair at most one dependent per principal (1:1).
    pub unique: bool,
    /// Ownership edge; the dependent has no identity outside its principal.
    pub owned: bool,
}

impl ForeignKeyModel {
    #[must_use]
    pub fn contains(&self, property: usize) -> bool {
        self.properties.contains(&property)
    }
}
