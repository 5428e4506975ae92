use crate::{
    key::EntityKey,
    model::{entity::EntityModel, property::PropertyModel},
    value::Value,
};

///
/// EntityKeyFactory
///
/// Builds identity values from raw property values. The representation is
/// chosen per entity type: a single-scalar key that is not structurally
/// compared gets the simple wrapper; multi-column keys and byte-sequence
/// keys get the composite wrapper.
///

pub struct EntityKeyFactory;

impl EntityKeyFactory {
    /// Whether a key over `properties` uses the simple representation.
    #[must_use]
    pub fn uses_simple(properties: &[&PropertyModel]) -> bool {
        match properties {
            [single] => !single.kind.structural(),
            _ => false,
        }
    }

    /// Build the primary key of `model` from `values`, position-aligned
    /// with the model's declared key properties.
    #[must_use]
    pub fn create(model: &EntityModel, values: Vec<Value>) -> EntityKey {
        let properties: Vec<&PropertyModel> = model
            .primary_key
            .properties
            .iter()
            .map(|&index| model.property(index))
            .collect();

        Self::create_for(&properties, values)
    }

    /// Build a key over the principal-key properties of `principal` from
    /// foreign-key `values` read off a dependent. The representation must
    /// match what [`Self::create`] produces for the principal, so identity
    /// map lookups by foreign-key value land on the principal's entry.
    #[must_use]
    pub fn create_principal(
        principal: &EntityModel,
        key_properties: &[usize],
        values: Vec<Value>,
    ) -> EntityKey {
        let properties: Vec<&PropertyModel> = key_properties
            .iter()
            .map(|&index| principal.property(index))
            .collect();

        Self::create_for(&properties, values)
    }

    fn create_for(properties: &[&PropertyModel], values: Vec<Value>) -> EntityKey {
        debug_assert_eq!(properties.len(), values.len());

        // Any unset component collapses the whole key to the sentinel.
        let unset = properties
            .iter()
            .zip(&values)
            .any(|(property, value)| value.is_null() || property.is_default(value));
        if unset {
            return EntityKey::Null;
        }

        if Self::uses_simple(properties) {
            let mut values = values;
            EntityKey::Simple(values.remove(0))
        } else {
            EntityKey::Composite(values.into_boxed_slice())
        }
    }
}
