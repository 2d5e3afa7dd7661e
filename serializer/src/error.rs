//! Error types for entity export and import.

use thiserror::Error;

/// Errors that can occur while exporting an entity into a [`FieldMap`](crate::FieldMap).
#[derive(Debug, Error)]
pub enum SerializeError {
    /// A field could not be converted to a [`Value`](crate::Value).
    #[error("failed to serialize field '{field}' of '{entity}': {message}")]
    FieldError {
        entity: String,
        field: String,
        message: String,
    },
    /// Two fields were exported under the same key.
    #[error("duplicate field '{field}' in '{entity}'")]
    DuplicateField { entity: String, field: String },
    /// A standalone value conversion failed.
    #[error("value conversion failed: {0}")]
    Value(String),
    /// Format encoding error (RON/bincode).
    #[error("format error: {0}")]
    FormatError(String),
}

/// Errors that can occur while building an entity from a [`FieldMap`](crate::FieldMap).
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// A required field was missing from the mapping.
    #[error("missing field '{field}' in '{entity}'")]
    MissingField { field: String, entity: String },
    /// The mapping held a key the entity does not accept.
    #[error("unexpected field '{field}' in '{entity}'")]
    UnexpectedField { field: String, entity: String },
    /// A field value had an unexpected shape.
    #[error("type mismatch for field '{field}' in '{entity}': expected {expected}, found {found}")]
    TypeMismatch {
        entity: String,
        field: String,
        expected: String,
        found: String,
    },
    /// A field value could not be converted to the declared field type.
    #[error("invalid value for field '{field}' in '{entity}': {message}")]
    InvalidField {
        entity: String,
        field: String,
        message: String,
    },
    /// A nested entity failed to deserialize.
    #[error("in field '{field}': {source}")]
    Nested {
        field: String,
        #[source]
        source: Box<DeserializeError>,
    },
    /// A standalone value conversion failed.
    #[error("value conversion failed: {0}")]
    Value(String),
    /// Format decoding error.
    #[error("format error: {0}")]
    FormatError(String),
}

impl DeserializeError {
    /// Returns the innermost error, unwrapping [`Nested`](Self::Nested) layers.
    pub fn root_cause(&self) -> &DeserializeError {
        match self {
            Self::Nested { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_display_includes_path() {
        let err = DeserializeError::Nested {
            field: "owner".into(),
            source: Box::new(DeserializeError::MissingField {
                field: "name".into(),
                entity: "User".into(),
            }),
        };
        assert_eq!(
            err.to_string(),
            "in field 'owner': missing field 'name' in 'User'"
        );
        assert!(matches!(
            err.root_cause(),
            DeserializeError::MissingField { field, .. } if field == "name"
        ));
    }
}
