use crate::collection::Document;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::filter::Filter;
use crate::policy::{SerializationPolicy, UnknownFields};
use crate::repository::{entity_document, identifier_field_name, Entity};
use std::marker::PhantomData;

/// Maps entities of one type to stored documents and back, and translates
/// declared field names in filters, sorts and partial updates to stored keys.
pub(crate) struct EntityMapper<T> {
    policy: SerializationPolicy,
    id_field: Option<String>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Entity> EntityMapper<T> {
    pub(crate) fn new(policy: SerializationPolicy) -> Self {
        EntityMapper {
            policy,
            id_field: identifier_field_name::<T>(),
            _phantom: PhantomData,
        }
    }

    pub(crate) fn policy(&self) -> &SerializationPolicy {
        &self.policy
    }

    /// Stored document for an entity. The identifier field becomes `_id`,
    /// or is left out when null so the backend assigns one.
    pub(crate) fn to_document(&self, entity: &T) -> DocRepoResult<Document> {
        let mut document = entity_document(entity)?;
        let mut result = Document::new();

        if let Some(id_field) = &self.id_field {
            if let Some(id) = document.remove(id_field) {
                if !id.is_null() {
                    result.insert(DOC_ID.to_string(), self.policy.encode_value(id));
                }
            }
        }

        for (key, value) in document {
            result.insert(self.policy.stored_name(&key), self.policy.encode_value(value));
        }
        Ok(result)
    }

    pub(crate) fn to_documents(&self, entities: &[T]) -> DocRepoResult<Vec<Document>> {
        entities.iter().map(|e| self.to_document(e)).collect()
    }

    /// Entity for a stored document.
    ///
    /// # Errors
    ///
    /// [ErrorKind::ObjectMappingError] for an undeclared key under
    /// [UnknownFields::Reject], or when the document does not convert to `T`.
    pub(crate) fn to_entity(&self, document: Document) -> DocRepoResult<T> {
        let mut result = Document::new();

        for (key, value) in document {
            if key == DOC_ID {
                if let Some(id_field) = &self.id_field {
                    result.insert(id_field.clone(), value);
                }
                continue;
            }

            match self.declared_field(&key) {
                Some(field_name) => {
                    result.insert(field_name.to_string(), self.policy.decode_value(value));
                }
                None if self.policy.unknown_fields() == UnknownFields::Reject => {
                    log::error!(
                        "Stored field '{}' is not declared by type '{}'",
                        key,
                        T::entity_name()
                    );
                    return Err(DocRepoError::new(
                        &format!(
                            "Stored field '{}' is not declared by type '{}'",
                            key,
                            T::entity_name()
                        ),
                        ErrorKind::ObjectMappingError,
                    ));
                }
                None => {}
            }
        }

        T::from_value(&Value::Document(result)).map_err(|e| {
            log::error!("Failed to map document to type '{}': {}", T::entity_name(), e);
            DocRepoError::new_with_cause(
                &format!("Failed to map document to type '{}'", T::entity_name()),
                ErrorKind::ObjectMappingError,
                e,
            )
        })
    }

    /// Stored key for a declared field path. The identifier field maps to `_id`.
    pub(crate) fn stored_field(&self, field_name: &str) -> String {
        if let Some(id_field) = &self.id_field {
            if field_name == id_field {
                return DOC_ID.to_string();
            }
            if let Some(rest) = field_name
                .strip_prefix(id_field.as_str())
                .and_then(|rest| rest.strip_prefix(FIELD_SEPARATOR))
            {
                return format!("{}{}{}", DOC_ID, FIELD_SEPARATOR, self.policy.stored_name(rest));
            }
        }
        self.policy.stored_name(field_name)
    }

    /// Translates field names and values of a filter to stored form.
    pub(crate) fn stored_filter(&self, filter: &Filter) -> Filter {
        filter
            .map_field_names(&|name| self.stored_field(name))
            .map_values(&|value| self.policy.encode_value(value.clone()))
    }

    /// Translates a partial update: keys to stored form, values encoded.
    pub(crate) fn stored_update(&self, update: &Document) -> Document {
        update
            .iter()
            .map(|(key, value)| (self.stored_field(key), self.policy.encode_value(value.clone())))
            .collect()
    }

    /// Identifier value in stored form.
    pub(crate) fn stored_id(&self, id: Value) -> Value {
        self.policy.encode_value(id)
    }

    fn declared_field(&self, stored_key: &str) -> Option<&'static str> {
        T::entity_fields()
            .iter()
            .copied()
            .find(|f| self.policy.stored_name(f) == stored_key)
    }
}
