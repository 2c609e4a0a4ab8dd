//! Conventions for turning entities into stored documents.
//!
//! A [SerializationPolicy] is an immutable value handed to a
//! [crate::repository::RepositoryFactory]; every repository created by that
//! factory applies it. Two factories in one process may use different policies.

use crate::collection::Document;
use crate::common::{Value, FIELD_SEPARATOR};
use itertools::Itertools;

/// How declared field names map to stored keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldNaming {
    /// Store fields under their declared names.
    #[default]
    AsDeclared,
    /// Store `car_name` as `carName`.
    ///
    /// Keys of the entity's own fields are mapped back exactly. Keys of embedded
    /// documents are mapped back by splitting on capitals, so an embedded field
    /// named `x_1` (stored `x1`) reads back as `x1`.
    CamelCase,
}

/// How [Value::Uuid] values are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UuidRepresentation {
    /// Keep the backend's binary uuid form.
    #[default]
    Native,
    /// Store the hyphenated text form.
    String,
}

/// What happens to stored fields the entity does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFields {
    /// Drop them silently.
    #[default]
    Ignore,
    /// Fail the read with an object mapping error.
    Reject,
}

/// Serialization conventions applied by a repository factory.
///
/// Enum unit variants are always stored by variant name; the `Convertible`
/// derive fixes that representation.
///
/// ```rust
/// use docrepo::policy::{FieldNaming, SerializationPolicy};
///
/// let policy = SerializationPolicy::conventions();
/// assert_eq!(policy.field_naming(), FieldNaming::CamelCase);
/// assert_eq!(policy.stored_name("engine_no"), "engineNo");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerializationPolicy {
    field_naming: FieldNaming,
    uuid_representation: UuidRepresentation,
    unknown_fields: UnknownFields,
}

impl SerializationPolicy {
    /// Declared names, native uuids, unknown fields ignored.
    pub fn new() -> Self {
        SerializationPolicy::default()
    }

    /// camelCase names, uuids as strings, unknown fields ignored.
    pub fn conventions() -> Self {
        SerializationPolicy {
            field_naming: FieldNaming::CamelCase,
            uuid_representation: UuidRepresentation::String,
            unknown_fields: UnknownFields::Ignore,
        }
    }

    pub fn with_field_naming(mut self, field_naming: FieldNaming) -> Self {
        self.field_naming = field_naming;
        self
    }

    pub fn with_uuid_representation(mut self, uuid_representation: UuidRepresentation) -> Self {
        self.uuid_representation = uuid_representation;
        self
    }

    pub fn with_unknown_fields(mut self, unknown_fields: UnknownFields) -> Self {
        self.unknown_fields = unknown_fields;
        self
    }

    pub fn field_naming(&self) -> FieldNaming {
        self.field_naming
    }

    pub fn uuid_representation(&self) -> UuidRepresentation {
        self.uuid_representation
    }

    pub fn unknown_fields(&self) -> UnknownFields {
        self.unknown_fields
    }

    /// Stored key for a declared field name. Dotted paths are mapped segment by
    /// segment; keys starting with `_` are reserved and kept as they are.
    pub fn stored_name(&self, declared: &str) -> String {
        match self.field_naming {
            FieldNaming::AsDeclared => declared.to_string(),
            FieldNaming::CamelCase => declared
                .split(FIELD_SEPARATOR)
                .map(to_camel_case)
                .join(FIELD_SEPARATOR),
        }
    }

    /// Declared field name for a stored key, inverse of [Self::stored_name]
    /// for snake_case names.
    pub fn declared_name(&self, stored: &str) -> String {
        match self.field_naming {
            FieldNaming::AsDeclared => stored.to_string(),
            FieldNaming::CamelCase => stored
                .split(FIELD_SEPARATOR)
                .map(to_snake_case)
                .join(FIELD_SEPARATOR),
        }
    }

    /// Rewrites a value for storage: embedded document keys renamed, uuids
    /// rendered per [UuidRepresentation].
    pub fn encode_value(&self, value: Value) -> Value {
        match value {
            Value::Uuid(id) if self.uuid_representation == UuidRepresentation::String => {
                Value::String(id.to_string())
            }
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.encode_value(v)).collect())
            }
            Value::Document(doc) => Value::Document(self.encode_document(doc)),
            other => other,
        }
    }

    /// Renames every key of the document, recursively, and encodes its values.
    pub fn encode_document(&self, document: Document) -> Document {
        document
            .into_iter()
            .map(|(key, value)| (self.stored_name(&key), self.encode_value(value)))
            .collect()
    }

    /// Inverse of [Self::encode_document] for keys. Values are left as stored;
    /// the `Convertible` impls accept either uuid representation.
    pub fn decode_document(&self, document: Document) -> Document {
        document
            .into_iter()
            .map(|(key, value)| (self.declared_name(&key), self.decode_value(value)))
            .collect()
    }

    /// Renames embedded document keys back to their declared form.
    pub fn decode_value(&self, value: Value) -> Value {
        match value {
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.decode_value(v)).collect())
            }
            Value::Document(doc) => Value::Document(self.decode_document(doc)),
            other => other,
        }
    }
}

fn to_camel_case(name: &str) -> String {
    if name.starts_with('_') || !name.contains('_') {
        return name.to_string();
    }

    let mut result = String::with_capacity(name.len());
    for (i, part) in name.split('_').filter(|p| !p.is_empty()).enumerate() {
        if i == 0 {
            result.push_str(part);
        } else {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                result.extend(first.to_uppercase());
                result.push_str(chars.as_str());
            }
        }
    }
    result
}

fn to_snake_case(name: &str) -> String {
    if name.starts_with('_') || !name.chars().any(|c| c.is_uppercase()) {
        return name.to_string();
    }

    let mut result = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if previous_lower {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            previous_lower = false;
        } else {
            result.push(c);
            previous_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    result
}
