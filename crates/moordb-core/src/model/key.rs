///
/// KeyModel
///
/// Declared primary key: an ordered list of property slot indexes.
///

pub struct KeyModel {
    pub properties: &'static [usize],
}

impl KeyModel {
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        self.properties.len() > 1
    }

    #[must_use]
    pub fn contains(&self, property: usize) -> bool {
        self.properties.contains(&property)
    }
}
