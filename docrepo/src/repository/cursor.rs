use crate::errors::DocRepoResult;
use crate::repository::entity_mapper::EntityMapper;
use crate::repository::Entity;
use crate::store::DocumentCursor;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Forward-only sequence of entities read from a store cursor.
///
/// Iteration consumes the cursor; once it returns `None` it keeps returning
/// `None`. A document that fails to map yields an `Err` item and iteration
/// continues with the next one.
pub struct ObjectCursor<T: Entity> {
    cursor: Option<DocumentCursor>,
    mapper: Arc<EntityMapper<T>>,
}

impl<T: Entity> ObjectCursor<T> {
    pub(crate) fn new(cursor: DocumentCursor, mapper: Arc<EntityMapper<T>>) -> Self {
        ObjectCursor {
            cursor: Some(cursor),
            mapper,
        }
    }

    /// Collects the remaining entities, stopping at the first error.
    pub fn to_vec(self) -> DocRepoResult<Vec<T>> {
        self.collect()
    }
}

impl<T: Entity> Iterator for ObjectCursor<T> {
    type Item = DocRepoResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        match cursor.next() {
            Some(Ok(document)) => Some(self.mapper.to_entity(document)),
            Some(Err(e)) => Some(Err(e)),
            None => {
                self.cursor = None;
                None
            }
        }
    }
}

impl<T: Entity> std::iter::FusedIterator for ObjectCursor<T> {}

impl<T: Entity> Debug for ObjectCursor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCursor")
            .field("entity", &T::entity_name())
            .field("consumed", &self.cursor.is_none())
            .finish()
    }
}

/// One page of search results plus the total number of matches.
///
/// `count` ignores paging; `documents` holds the requested page only. They come
/// from separate backend calls and may disagree under concurrent writes.
pub struct SearchResult<T: Entity> {
    count: u64,
    documents: ObjectCursor<T>,
}

impl<T: Entity> SearchResult<T> {
    pub(crate) fn new(count: u64, documents: ObjectCursor<T>) -> Self {
        SearchResult { count, documents }
    }

    /// Total number of matching documents.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn documents(&mut self) -> &mut ObjectCursor<T> {
        &mut self.documents
    }

    pub fn into_documents(self) -> ObjectCursor<T> {
        self.documents
    }
}

impl<T: Entity> Debug for SearchResult<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchResult")
            .field("count", &self.count)
            .field("documents", &self.documents)
            .finish()
    }
}

impl<T: Entity> IntoIterator for SearchResult<T> {
    type Item = DocRepoResult<T>;
    type IntoIter = ObjectCursor<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents
    }
}
