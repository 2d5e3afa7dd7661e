//! # Dict Serializer
//!
//! Export any struct's public fields into a plain key-value mapping and build
//! new instances back from such mappings, with per-type rewrite hooks.
//!
//! ## Core Types
//!
//! - [`DictEntity`] - `to_mapping` / `from_mapping`, implemented by the derive
//! - [`DictHooks`] - `pre_serialization` / `pre_deserialization`, identity by default
//! - [`FieldMap`] - ordered, string-keyed field mapping
//! - [`Value`] - format-agnostic field value
//!
//! ## Field dispatch
//!
//! - [`SerializeContext`] / [`DeserializeContext`] - per-entity field accumulation and lookup
//! - [`SerializeField`] / [`DeserializeField`] - per-field wrappers used by generated code
//!
//! ## Encoding
//!
//! - [`Format`] / [`encode`] / [`decode`] - RON or bincode (feature-gated)
//!
//! # Example
//!
//! ```ignore
//! use dict_serializer::{DictEntity, field_map};
//!
//! #[derive(DictEntity)]
//! struct Tmp {
//!     param1: String,
//!     param2: i32,
//! }
//!
//! let tmp = Tmp { param1: "test".into(), param2: 1 };
//! assert_eq!(tmp.to_mapping()?, field_map! { "param1" => "test", "param2" => 1 });
//! ```

// Lets generated `dict_serializer::` paths resolve inside this crate's own tests.
extern crate self as dict_serializer;

mod context;
mod entity;
mod error;
pub mod field;
mod format;
mod map;
pub mod value;

pub use context::{DeserializeContext, SerializeContext};
pub use entity::{DictEntity, DictHooks, FieldInfo, export, import};
pub use error::{DeserializeError, SerializeError};
pub use field::{
    DeserializeField, DeserializeFieldFallback, SerializeField, SerializeFieldFallback,
};
pub use format::{Format, decode, decode_entity, encode, encode_entity};
pub use map::{FieldMap, RESERVED_PREFIX, is_public_key};
pub use serializer_macro::DictEntity;
pub use value::{Value, from_value, to_value};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
