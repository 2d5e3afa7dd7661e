//! Field-level serialization and deserialization wrappers.
//!
//! Relies on method-resolution priority: inherent methods on the wrapper
//! types for known types ([`Value`], [`FieldMap`]) take precedence over the
//! blanket fallback trait impls, which route everything else through serde.
//!
//! The `#[derive(DictEntity)]` macro generates `serialize_fields` by wrapping
//! each field in `SerializeField(&self.field).serialize_field(name, ctx)`.

use std::marker::PhantomData;

use crate::context::{DeserializeContext, SerializeContext};
use crate::error::{DeserializeError, SerializeError};
use crate::map::FieldMap;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Serialize
// ---------------------------------------------------------------------------

/// Wrapper for serializing a single entity field.
pub struct SerializeField<'a, T: ?Sized>(pub &'a T);

/// Fallback trait for serializing fields of types that implement
/// [`serde::Serialize`].
pub trait SerializeFieldFallback {
    fn serialize_field(&self, name: &str, ctx: &mut SerializeContext)
    -> Result<(), SerializeError>;
}

impl<T: ?Sized + serde::Serialize> SerializeFieldFallback for SerializeField<'_, T> {
    fn serialize_field(
        &self,
        name: &str,
        ctx: &mut SerializeContext,
    ) -> Result<(), SerializeError> {
        ctx.write_serde(name, self.0)
    }
}

// --- Raw value impls ---

impl SerializeField<'_, Value> {
    pub fn serialize_field(
        &self,
        name: &str,
        ctx: &mut SerializeContext,
    ) -> Result<(), SerializeError> {
        ctx.write_field(name, self.0.clone())
    }
}

impl SerializeField<'_, FieldMap> {
    pub fn serialize_field(
        &self,
        name: &str,
        ctx: &mut SerializeContext,
    ) -> Result<(), SerializeError> {
        ctx.write_field(name, Value::Map(self.0.clone()))
    }
}

// ---------------------------------------------------------------------------
// Deserialize
// ---------------------------------------------------------------------------

/// Wrapper for deserializing a single entity field.
pub struct DeserializeField<T>(pub PhantomData<T>);

/// Fallback trait for deserializing fields of types that implement
/// [`serde::de::DeserializeOwned`].
pub trait DeserializeFieldFallback<T> {
    fn deserialize_field(name: &str, ctx: &mut DeserializeContext) -> Result<T, DeserializeError>;
}

impl<T: serde::de::DeserializeOwned> DeserializeFieldFallback<T> for DeserializeField<T> {
    fn deserialize_field(name: &str, ctx: &mut DeserializeContext) -> Result<T, DeserializeError> {
        ctx.read_serde(name)
    }
}

// --- Raw value impls ---

impl DeserializeField<Value> {
    pub fn deserialize_field(
        name: &str,
        ctx: &mut DeserializeContext,
    ) -> Result<Value, DeserializeError> {
        ctx.read_field(name)
    }
}

impl DeserializeField<FieldMap> {
    pub fn deserialize_field(
        name: &str,
        ctx: &mut DeserializeContext,
    ) -> Result<FieldMap, DeserializeError> {
        ctx.read_map(name)
    }
}
