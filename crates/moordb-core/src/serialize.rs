use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    value::Value,
};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// Row
///
/// A materialized property-value buffer as handed over by the query
/// collaborator: property name to scalar value.
///

pub type Row = BTreeMap<String, Value>;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),
    #[error("deserialize error: {0}")]
    Deserialize(String),
}

impl SerializeError {
    pub(crate) const fn class() -> ErrorClass {
        ErrorClass::Internal
    }
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        Self::new(
            SerializeError::class(),
            ErrorOrigin::Serialize,
            err.to_string(),
        )
    }
}

/// Serialize a value with the runtime's row codec (CBOR).
pub fn serialize<T>(ty: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    serde_cbor::to_vec(ty).map_err(|err| SerializeError::Serialize(err.to_string()))
}

/// Deserialize a value produced by [`serialize`].
pub fn deserialize<T>(bytes: &[u8]) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    serde_cbor::from_slice(bytes).map_err(|err| SerializeError::Deserialize(err.to_string()))
}

/// Encode one row buffer.
pub fn encode_row(row: &Row) -> Result<Vec<u8>, SerializeError> {
    serialize(row)
}

/// Decode one row buffer.
pub fn decode_row(bytes: &[u8]) -> Result<Row, SerializeError> {
    deserialize(bytes)
}
