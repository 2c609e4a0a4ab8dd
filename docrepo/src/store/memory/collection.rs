use crate::collection::{Document, FindOptions, ObjectId, UpdateOptions, WriteResult};
use crate::common::{
    atomic, Atomic, ReadExecutor, SortableFields, Value, WriteExecutor, DOC_ID, FIELD_SEPARATOR,
};
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::filter::Filter;
use crate::store::{DocumentCursor, StoreCollectionProvider};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory collection keeping documents in insertion order.
///
/// Every operation holds the collection lock for its whole duration, so each
/// write is atomic with respect to concurrent readers and writers.
#[derive(Clone)]
pub struct InMemoryCollection {
    inner: Arc<InMemoryCollectionInner>,
}

impl InMemoryCollection {
    pub fn new(name: &str) -> Self {
        InMemoryCollection {
            inner: Arc::new(InMemoryCollectionInner {
                name: name.to_string(),
                documents: atomic(IndexMap::new()),
            }),
        }
    }
}

impl StoreCollectionProvider for InMemoryCollection {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn insert_one(&self, document: Document) -> DocRepoResult<WriteResult> {
        self.inner.insert_one(document)
    }

    fn insert_many(&self, documents: Vec<Document>) -> DocRepoResult<WriteResult> {
        self.inner.insert_many(documents)
    }

    fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        options: &UpdateOptions,
    ) -> DocRepoResult<WriteResult> {
        self.inner.replace_one(filter, replacement, options)
    }

    fn update_many(&self, filter: &Filter, update: Document) -> DocRepoResult<WriteResult> {
        self.inner.update_many(filter, update)
    }

    fn delete_one(&self, filter: &Filter) -> DocRepoResult<WriteResult> {
        self.inner.delete_one(filter)
    }

    fn delete_many(&self, filter: &Filter) -> DocRepoResult<WriteResult> {
        self.inner.delete_many(filter)
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> DocRepoResult<DocumentCursor> {
        self.inner.find(filter, options)
    }

    fn count(&self, filter: &Filter) -> DocRepoResult<u64> {
        self.inner.count(filter)
    }
}

/// Hashable form of an `_id` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IdKey {
    ObjectId(ObjectId),
    String(String),
    Int(i64),
    Uuid(Uuid),
    Other(String),
}

impl From<&Value> for IdKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::ObjectId(id) => IdKey::ObjectId(*id),
            Value::String(s) => IdKey::String(s.clone()),
            Value::Uuid(id) => IdKey::Uuid(*id),
            Value::I32(_) | Value::I64(_) => IdKey::Int(value.as_integer().unwrap_or_default()),
            Value::F64(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => IdKey::Int(*f as i64),
            other => IdKey::Other(other.to_debug_string()),
        }
    }
}

struct InMemoryCollectionInner {
    name: String,
    documents: Atomic<IndexMap<IdKey, Document>>,
}

impl InMemoryCollectionInner {
    fn insert_one(&self, document: Document) -> DocRepoResult<WriteResult> {
        self.documents.write_with(|documents| -> DocRepoResult<WriteResult> {
            let id = insert_document(&self.name, documents, document)?;
            Ok(WriteResult::inserted(vec![id]))
        })
    }

    fn insert_many(&self, documents: Vec<Document>) -> DocRepoResult<WriteResult> {
        self.documents.write_with(|stored| -> DocRepoResult<WriteResult> {
            let mut ids = Vec::with_capacity(documents.len());
            for document in documents {
                ids.push(insert_document(&self.name, stored, document)?);
            }
            Ok(WriteResult::inserted(ids))
        })
    }

    fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        options: &UpdateOptions,
    ) -> DocRepoResult<WriteResult> {
        self.documents.write_with(|documents| -> DocRepoResult<WriteResult> {
            let mut found = None;
            for (key, document) in documents.iter() {
                if filter.apply(document)? {
                    found = Some((key.clone(), document.clone()));
                    break;
                }
            }

            match found {
                Some((key, existing)) => {
                    let existing_id = existing.get_ref(DOC_ID).cloned().unwrap_or(Value::Null);
                    if let Some(new_id) = replacement.get_ref(DOC_ID) {
                        if *new_id != existing_id {
                            log::error!(
                                "Replacement in '{}' would change _id from {} to {}",
                                self.name,
                                existing_id,
                                new_id
                            );
                            return Err(immutable_id_error());
                        }
                    }

                    let replacement = with_id(existing_id, replacement);
                    let modified = if replacement != existing { 1 } else { 0 };
                    documents.insert(key, replacement);
                    Ok(WriteResult::updated(1, modified, None))
                }
                None if options.is_insert_if_absent() => {
                    let id = replacement
                        .get_ref(DOC_ID)
                        .cloned()
                        .or_else(|| id_from_filter(filter))
                        .unwrap_or_else(|| Value::ObjectId(ObjectId::new()));
                    let key = IdKey::from(&id);
                    if documents.contains_key(&key) {
                        return Err(duplicate_key_error(&self.name, &id));
                    }
                    documents.insert(key, with_id(id.clone(), replacement));
                    log::debug!("Upserted document {} into '{}'", id, self.name);
                    Ok(WriteResult::updated(0, 0, Some(id)))
                }
                None => Ok(WriteResult::updated(0, 0, None)),
            }
        })
    }

    fn update_many(&self, filter: &Filter, update: Document) -> DocRepoResult<WriteResult> {
        self.documents.write_with(|documents| -> DocRepoResult<WriteResult> {
            let mut matched = 0u64;
            let mut changes = Vec::new();

            for (key, document) in documents.iter() {
                if !filter.apply(document)? {
                    continue;
                }
                matched += 1;

                let mut updated = document.clone();
                for (field, value) in update.iter() {
                    if is_id_path(field) {
                        if document.get(field)? != *value {
                            return Err(immutable_id_error());
                        }
                        continue;
                    }
                    updated.put(field, value.clone())?;
                }

                if updated != *document {
                    changes.push((key.clone(), updated));
                }
            }

            let modified = changes.len() as u64;
            for (key, document) in changes {
                documents.insert(key, document);
            }
            Ok(WriteResult::updated(matched, modified, None))
        })
    }

    fn delete_one(&self, filter: &Filter) -> DocRepoResult<WriteResult> {
        self.documents.write_with(|documents| -> DocRepoResult<WriteResult> {
            let mut found = None;
            for (key, document) in documents.iter() {
                if filter.apply(document)? {
                    found = Some(key.clone());
                    break;
                }
            }

            match found {
                Some(key) => {
                    documents.shift_remove(&key);
                    Ok(WriteResult::deleted(1))
                }
                None => Ok(WriteResult::deleted(0)),
            }
        })
    }

    fn delete_many(&self, filter: &Filter) -> DocRepoResult<WriteResult> {
        self.documents.write_with(|documents| -> DocRepoResult<WriteResult> {
            let mut matched = HashSet::new();
            for (key, document) in documents.iter() {
                if filter.apply(document)? {
                    matched.insert(key.clone());
                }
            }

            documents.retain(|key, _| !matched.contains(key));
            Ok(WriteResult::deleted(matched.len() as u64))
        })
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> DocRepoResult<DocumentCursor> {
        let mut results = self.documents.read_with(|documents| -> DocRepoResult<Vec<Document>> {
            let mut results = Vec::new();
            for document in documents.values() {
                if filter.apply(document)? {
                    results.push(document.clone());
                }
            }
            Ok(results)
        })?;

        if let Some(sort_by) = options.sorted_fields() {
            if !sort_by.is_empty() {
                results.sort_by(|a, b| compare_documents(a, b, sort_by));
            }
        }

        let skip = options
            .skip_count()
            .map(|s| usize::try_from(s).unwrap_or(usize::MAX))
            .unwrap_or(0);
        let limit = match options.limit_count() {
            None | Some(0) => usize::MAX,
            Some(l) => usize::try_from(l).unwrap_or(usize::MAX),
        };

        let page: Vec<Document> = results.into_iter().skip(skip).take(limit).collect();
        Ok(DocumentCursor::new(page.into_iter().map(Ok)))
    }

    fn count(&self, filter: &Filter) -> DocRepoResult<u64> {
        self.documents.read_with(|documents| -> DocRepoResult<u64> {
            let mut count = 0u64;
            for document in documents.values() {
                if filter.apply(document)? {
                    count += 1;
                }
            }
            Ok(count)
        })
    }
}

fn insert_document(
    collection: &str,
    documents: &mut IndexMap<IdKey, Document>,
    document: Document,
) -> DocRepoResult<Value> {
    let id = match document.get_ref(DOC_ID) {
        Some(id) => id.clone(),
        None => Value::ObjectId(ObjectId::new()),
    };

    let key = IdKey::from(&id);
    if documents.contains_key(&key) {
        return Err(duplicate_key_error(collection, &id));
    }
    documents.insert(key, with_id(id.clone(), document));
    Ok(id)
}

/// Puts `_id` first, followed by the other fields in their order.
fn with_id(id: Value, document: Document) -> Document {
    let mut result = Document::new();
    result.insert(DOC_ID.to_string(), id);
    for (key, value) in document {
        if key != DOC_ID {
            result.insert(key, value);
        }
    }
    result
}

/// Extracts the `_id` an upsert should use from an equality filter on it.
fn id_from_filter(filter: &Filter) -> Option<Value> {
    match filter {
        Filter::Eq(field, value) if field == DOC_ID => Some(value.clone()),
        Filter::And(filters) => filters.iter().find_map(id_from_filter),
        _ => None,
    }
}

fn is_id_path(field: &str) -> bool {
    field == DOC_ID
        || field
            .strip_prefix(DOC_ID)
            .is_some_and(|rest| rest.starts_with(FIELD_SEPARATOR))
}

fn compare_documents(a: &Document, b: &Document, sort_by: &SortableFields) -> Ordering {
    for (field, sort_order) in sort_by.sorting_order() {
        let left = a.get(field).unwrap_or(Value::Null);
        let right = b.get(field).unwrap_or(Value::Null);
        let ordering = sort_order.apply(left.cmp(&right));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn duplicate_key_error(collection: &str, id: &Value) -> DocRepoError {
    log::error!("Duplicate _id {} in collection '{}'", id, collection);
    DocRepoError::new(
        &format!("Duplicate _id {} in collection '{}'", id, collection),
        ErrorKind::DuplicateKey,
    )
}

fn immutable_id_error() -> DocRepoError {
    DocRepoError::new(
        "Performing an update on the path '_id' would modify the immutable field '_id'",
        ErrorKind::BackendError,
    )
}
