//! The entity traits: export to a [`FieldMap`] and rebuild from one.
//!
//! [`DictEntity`] provides [`to_mapping`](DictEntity::to_mapping) and
//! [`from_mapping`](DictEntity::from_mapping) as default methods built on two
//! per-type methods that list the entity's fields. [`DictHooks`] holds the
//! two rewrite points, both identity by default.
//!
//! Use `#[derive(DictEntity)]` to implement both traits. Add `#[dict(hooks)]`
//! to the struct to write the [`DictHooks`] impl by hand.

use crate::context::{DeserializeContext, SerializeContext};
use crate::error::{DeserializeError, SerializeError};
use crate::map::FieldMap;

/// Static description of one exported field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    /// Key used in the mapping.
    pub key: &'static str,
    /// Rust field identifier.
    pub ident: &'static str,
    /// Declared field type, as written in the struct.
    pub type_name: &'static str,
    /// Whether import fails when the key is absent.
    pub required: bool,
}

/// Rewrite points applied around export and import.
///
/// Both hooks receive the whole mapping and return the mapping to use in its
/// place. The defaults return their input unchanged.
///
/// ```ignore
/// #[derive(DictEntity)]
/// #[dict(hooks)]
/// struct Reading {
///     sensor: String,
///     celsius: f64,
/// }
///
/// impl DictHooks for Reading {
///     fn pre_serialization(&self, mut mapping: FieldMap) -> FieldMap {
///         mapping.insert("unit", "C");
///         mapping
///     }
///
///     fn pre_deserialization(mut mapping: FieldMap) -> FieldMap {
///         mapping.remove("unit");
///         mapping
///     }
/// }
/// ```
pub trait DictHooks {
    /// Called with the freshly built mapping at the end of export.
    fn pre_serialization(&self, mapping: FieldMap) -> FieldMap {
        mapping
    }

    /// Called with the input mapping before the entity is constructed.
    fn pre_deserialization(mapping: FieldMap) -> FieldMap
    where
        Self: Sized,
    {
        mapping
    }
}

/// An entity that can be exported to and rebuilt from a [`FieldMap`].
///
/// # Deriving
///
/// ```ignore
/// #[derive(DictEntity)]
/// struct Tmp {
///     param1: String,
///     param2: i32,
///     _scratch: Vec<u8>, // never exported
/// }
/// ```
///
/// # Manual implementation
///
/// Implement [`serialize_fields`](Self::serialize_fields) and
/// [`deserialize_fields`](Self::deserialize_fields) to route the mapping
/// through a constructor instead of a struct literal.
pub trait DictEntity: DictHooks + Sized {
    /// The entity name used in errors and log output.
    const NAME: &'static str;

    /// The exported fields, in export order.
    const FIELDS: &'static [FieldInfo];

    /// Write every public field into `ctx`.
    fn serialize_fields(&self, ctx: &mut SerializeContext) -> Result<(), SerializeError>;

    /// Build a new instance from the fields in `ctx`.
    ///
    /// Fields that are read are removed from the context; anything left
    /// over is rejected by [`from_mapping`](Self::from_mapping).
    fn deserialize_fields(ctx: &mut DeserializeContext) -> Result<Self, DeserializeError>;

    /// Export this instance's public fields.
    ///
    /// [`DictHooks::pre_serialization`] runs on the raw mapping. Keys that are
    /// empty or start with `_` are removed afterwards, whatever the hook did.
    fn to_mapping(&self) -> Result<FieldMap, SerializeError> {
        log::trace!("exporting {}", Self::NAME);

        let mut ctx = SerializeContext::new(Self::NAME);
        self.serialize_fields(&mut ctx)?;
        let mut mapping = self.pre_serialization(ctx.finish());

        let dropped = mapping.retain_public();
        if !dropped.is_empty() {
            log::debug!(
                "{}: dropped non-public keys from export: {:?}",
                Self::NAME,
                dropped
            );
        }
        Ok(mapping)
    }

    /// Build a new instance from `mapping`.
    ///
    /// [`DictHooks::pre_deserialization`] runs first. The resulting mapping
    /// must supply exactly the fields the entity requires.
    fn from_mapping(mapping: FieldMap) -> Result<Self, DeserializeError> {
        log::trace!("importing {}", Self::NAME);

        let mapping = Self::pre_deserialization(mapping);
        let mut ctx = DeserializeContext::new(Self::NAME, mapping);
        let entity = Self::deserialize_fields(&mut ctx)?;
        ctx.finish()?;
        Ok(entity)
    }
}

/// Export `entity` into a [`FieldMap`].
pub fn export<E: DictEntity>(entity: &E) -> Result<FieldMap, SerializeError> {
    entity.to_mapping()
}

/// Build a new `E` from `mapping`.
pub fn import<E: DictEntity>(mapping: FieldMap) -> Result<E, DeserializeError> {
    E::from_mapping(mapping)
}
