use crate::collection::{Document, FindOptions, UpdateOptions, WriteResult};
use crate::errors::DocRepoResult;
use crate::filter::Filter;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Low-level contract for one named collection of a document store.
///
/// Filters and options arrive already in stored form: field names are the
/// stored keys and the identifier field is `_id`.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; one collection handle is shared by every
/// repository bound to it.
pub trait StoreCollectionProvider: Send + Sync {
    /// Name of the collection.
    fn name(&self) -> String;

    /// Inserts one document. A document without `_id` gets a generated
    /// [crate::collection::ObjectId].
    ///
    /// # Errors
    /// [crate::errors::ErrorKind::DuplicateKey] if a document with the same
    /// `_id` already exists.
    fn insert_one(&self, document: Document) -> DocRepoResult<WriteResult>;

    /// Inserts documents in order, stopping at the first failure. Documents
    /// before the failing one stay inserted.
    fn insert_many(&self, documents: Vec<Document>) -> DocRepoResult<WriteResult>;

    /// Replaces the first document matching `filter`. With
    /// [UpdateOptions::is_insert_if_absent] a missing document is inserted.
    fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        options: &UpdateOptions,
    ) -> DocRepoResult<WriteResult>;

    /// Sets the fields of `update` on every document matching `filter`.
    /// Dotted keys address embedded fields.
    fn update_many(&self, filter: &Filter, update: Document) -> DocRepoResult<WriteResult>;

    /// Deletes the first document matching `filter`.
    fn delete_one(&self, filter: &Filter) -> DocRepoResult<WriteResult>;

    /// Deletes every document matching `filter`.
    fn delete_many(&self, filter: &Filter) -> DocRepoResult<WriteResult>;

    /// Finds documents matching `filter`, sorted, skipped and limited per
    /// `options`.
    fn find(&self, filter: &Filter, options: &FindOptions) -> DocRepoResult<DocumentCursor>;

    /// Counts documents matching `filter`.
    fn count(&self, filter: &Filter) -> DocRepoResult<u64>;
}

/// Shared handle to a store collection.
///
/// Cloning is cheap and every clone talks to the same collection.
#[derive(Clone)]
pub struct StoreCollection {
    inner: Arc<dyn StoreCollectionProvider>,
}

impl StoreCollection {
    pub fn new<T: StoreCollectionProvider + 'static>(inner: T) -> Self {
        StoreCollection {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for StoreCollection {
    type Target = Arc<dyn StoreCollectionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for StoreCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "StoreCollection({})", self.inner.name())
    }
}

/// Lazy sequence of documents returned by [StoreCollectionProvider::find].
///
/// A backend failure part way through surfaces as an `Err` item.
pub struct DocumentCursor {
    inner: Box<dyn Iterator<Item = DocRepoResult<Document>> + Send>,
}

impl DocumentCursor {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = DocRepoResult<Document>> + Send + 'static,
    {
        DocumentCursor {
            inner: Box::new(iter),
        }
    }

    pub fn empty() -> Self {
        DocumentCursor::new(std::iter::empty())
    }
}

impl Iterator for DocumentCursor {
    type Item = DocRepoResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
