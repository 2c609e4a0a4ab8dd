use super::StoreCollection;
use crate::errors::DocRepoResult;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Low-level contract for a named database of a document store.
pub trait StoreDatabaseProvider: Send + Sync {
    fn name(&self) -> String;

    /// Opens the collection. Backends may defer creating it until the first
    /// write.
    fn collection(&self, name: &str) -> DocRepoResult<StoreCollection>;

    fn list_collection_names(&self) -> DocRepoResult<Vec<String>>;

    /// Drops the collection and all of its documents. Dropping a missing
    /// collection is not an error.
    fn drop_collection(&self, name: &str) -> DocRepoResult<()>;
}

/// Shared handle to a store database.
#[derive(Clone)]
pub struct StoreDatabase {
    inner: Arc<dyn StoreDatabaseProvider>,
}

impl StoreDatabase {
    pub fn new<T: StoreDatabaseProvider + 'static>(inner: T) -> Self {
        StoreDatabase {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for StoreDatabase {
    type Target = Arc<dyn StoreDatabaseProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for StoreDatabase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "StoreDatabase({})", self.inner.name())
    }
}
