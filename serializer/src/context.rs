//! Serialization and deserialization contexts.
//!
//! [`SerializeContext`] accumulates exported fields for one entity.
//! [`DeserializeContext`] hands fields out by name while an entity is being
//! constructed, and rejects whatever is left over once construction ends.

use crate::entity::DictEntity;
use crate::error::{DeserializeError, SerializeError};
use crate::map::FieldMap;
use crate::value::{self, Value};

// ---------------------------------------------------------------------------
// SerializeContext
// ---------------------------------------------------------------------------

/// Context for serializing entity fields.
pub struct SerializeContext {
    entity: &'static str,
    fields: FieldMap,
}

impl SerializeContext {
    /// Create a new context for the entity called `entity`.
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            fields: FieldMap::new(),
        }
    }

    /// Name of the entity being serialized.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Write a pre-built Value for a field.
    pub fn write_field(&mut self, name: &str, value: Value) -> Result<(), SerializeError> {
        if self.fields.contains_key(name) {
            return Err(SerializeError::DuplicateField {
                entity: self.entity.to_owned(),
                field: name.to_owned(),
            });
        }
        self.fields.insert(name, value);
        Ok(())
    }

    /// Write a serde-serializable value as a field.
    pub fn write_serde<T: ?Sized + serde::Serialize>(
        &mut self,
        name: &str,
        val: &T,
    ) -> Result<(), SerializeError> {
        let value = value::to_value(val).map_err(|e| self.field_error(name, e))?;
        self.write_field(name, value)
    }

    /// Write a nested entity as a [`Value::Map`] built by its own `to_mapping`.
    ///
    /// The nested entity's hooks run as part of this call.
    pub fn write_entity<E: DictEntity>(
        &mut self,
        name: &str,
        entity: &E,
    ) -> Result<(), SerializeError> {
        let mapping = entity.to_mapping().map_err(|e| self.field_error(name, e))?;
        self.write_field(name, Value::Map(mapping))
    }

    /// Write an optional nested entity; `None` becomes [`Value::Null`].
    pub fn write_optional_entity<E: DictEntity>(
        &mut self,
        name: &str,
        entity: &Option<E>,
    ) -> Result<(), SerializeError> {
        match entity {
            Some(e) => self.write_entity(name, e),
            None => self.write_field(name, Value::Null),
        }
    }

    /// Write a list of nested entities.
    pub fn write_entity_list<E: DictEntity>(
        &mut self,
        name: &str,
        entities: &[E],
    ) -> Result<(), SerializeError> {
        let values = entities
            .iter()
            .map(|e| e.to_mapping().map(Value::Map))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.field_error(name, e))?;
        self.write_field(name, Value::List(values))
    }

    /// Finish serialization and return the accumulated fields.
    pub fn finish(self) -> FieldMap {
        self.fields
    }

    fn field_error(&self, name: &str, err: SerializeError) -> SerializeError {
        SerializeError::FieldError {
            entity: self.entity.to_owned(),
            field: name.to_owned(),
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// DeserializeContext
// ---------------------------------------------------------------------------

/// Context for deserializing entity fields.
///
/// Every read removes the field, so [`finish`](Self::finish) can report
/// keys the entity never asked for.
pub struct DeserializeContext {
    entity: &'static str,
    fields: FieldMap,
}

impl DeserializeContext {
    /// Create a context over `fields` for the entity called `entity`.
    pub fn new(entity: &'static str, fields: FieldMap) -> Self {
        Self { entity, fields }
    }

    /// Name of the entity being deserialized.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Returns `true` if the mapping still holds `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Read a raw Value for a field.
    pub fn read_field(&mut self, name: &str) -> Result<Value, DeserializeError> {
        self.fields
            .remove(name)
            .ok_or_else(|| DeserializeError::MissingField {
                field: name.to_owned(),
                entity: self.entity.to_owned(),
            })
    }

    /// Read a serde-deserializable value from a field.
    pub fn read_serde<T: serde::de::DeserializeOwned>(
        &mut self,
        name: &str,
    ) -> Result<T, DeserializeError> {
        let val = self.read_field(name)?;
        value::from_value(val).map_err(|e| DeserializeError::InvalidField {
            entity: self.entity.to_owned(),
            field: name.to_owned(),
            message: e.to_string(),
        })
    }

    /// Read a raw nested mapping.
    pub fn read_map(&mut self, name: &str) -> Result<FieldMap, DeserializeError> {
        match self.read_field(name)? {
            Value::Map(map) => Ok(map),
            other => Err(DeserializeError::TypeMismatch {
                entity: self.entity.to_owned(),
                field: name.to_owned(),
                expected: "map".into(),
                found: other.kind().into(),
            }),
        }
    }

    /// Read a nested entity through its own `from_mapping`.
    pub fn read_entity<E: DictEntity>(&mut self, name: &str) -> Result<E, DeserializeError> {
        let map = self.read_map(name)?;
        E::from_mapping(map).map_err(|e| nested(name, e))
    }

    /// Read an optional nested entity; [`Value::Null`] becomes `None`.
    pub fn read_optional_entity<E: DictEntity>(
        &mut self,
        name: &str,
    ) -> Result<Option<E>, DeserializeError> {
        match self.read_field(name)? {
            Value::Null => Ok(None),
            Value::Map(map) => E::from_mapping(map).map(Some).map_err(|e| nested(name, e)),
            other => Err(DeserializeError::TypeMismatch {
                entity: self.entity.to_owned(),
                field: name.to_owned(),
                expected: "map or null".into(),
                found: other.kind().into(),
            }),
        }
    }

    /// Read a list of nested entities.
    pub fn read_entity_list<E: DictEntity>(
        &mut self,
        name: &str,
    ) -> Result<Vec<E>, DeserializeError> {
        let val = self.read_field(name)?;
        match val {
            Value::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| match v {
                    Value::Map(map) => {
                        E::from_mapping(map).map_err(|e| nested(&format!("{name}[{i}]"), e))
                    }
                    other => Err(DeserializeError::TypeMismatch {
                        entity: self.entity.to_owned(),
                        field: format!("{name}[{i}]"),
                        expected: "map".into(),
                        found: other.kind().into(),
                    }),
                })
                .collect(),
            other => Err(DeserializeError::TypeMismatch {
                entity: self.entity.to_owned(),
                field: name.to_owned(),
                expected: "list of maps".into(),
                found: other.kind().into(),
            }),
        }
    }

    /// Finish deserialization, failing if any field was not consumed.
    pub fn finish(self) -> Result<(), DeserializeError> {
        match self.fields.keys().next() {
            Some(extra) => Err(DeserializeError::UnexpectedField {
                field: extra.to_owned(),
                entity: self.entity.to_owned(),
            }),
            None => Ok(()),
        }
    }
}

fn nested(field: &str, source: DeserializeError) -> DeserializeError {
    DeserializeError::Nested {
        field: field.to_owned(),
        source: Box::new(source),
    }
}
