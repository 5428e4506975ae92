///
/// NavigationModel
///
/// One side of a relationship as a navigation slot on the declaring entity.
///
/// `foreign_key` indexes into the *dependent* side's `foreign_keys` slice:
/// the declaring type's own slice when `points_to_principal`, the target
/// type's slice otherwise.
///

pub struct NavigationModel {
    /// Navigation name for diagnostics.
    pub name: &'static str,
    /// Stable navigation slot index on the declaring type.
    pub index: usize,
    /// Path of the entity type this navigation refers to.
    pub target_path: &'static str,
    /// Position of the backing foreign key on the dependent type.
    pub foreign_key: usize,
    /// Dependent-to-principal direction.
    pub points_to_principal: bool,
    /// Collection navigations hold a set of dependents; reference
    /// navigations hold at most one target.
    pub collection: bool,
    /// Navigation slot index of the inverse on the target type, if declared.
    pub inverse: Option<usize>,
}
