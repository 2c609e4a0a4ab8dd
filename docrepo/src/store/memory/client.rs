use super::InMemoryCollection;
use crate::errors::DocRepoResult;
use crate::store::{StoreClientProvider, StoreCollection, StoreDatabase, StoreDatabaseProvider};
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory store client. Each instance owns an independent set of
/// databases; clones share it.
#[derive(Clone)]
pub struct InMemoryClient {
    inner: Arc<InMemoryClientInner>,
}

struct InMemoryClientInner {
    label: String,
    databases: DashMap<String, InMemoryDatabase>,
}

impl InMemoryClient {
    pub fn new(label: &str) -> Self {
        InMemoryClient {
            inner: Arc::new(InMemoryClientInner {
                label: label.to_string(),
                databases: DashMap::new(),
            }),
        }
    }

    /// Label given in the `memory://<label>` connection string.
    pub fn label(&self) -> &str {
        &self.inner.label
    }
}

impl StoreClientProvider for InMemoryClient {
    fn backend_name(&self) -> String {
        "memory".to_string()
    }

    fn database(&self, name: &str) -> DocRepoResult<StoreDatabase> {
        let database = self
            .inner
            .databases
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("Creating in-memory database '{}'", name);
                InMemoryDatabase::new(name)
            })
            .clone();
        Ok(StoreDatabase::new(database))
    }
}

/// In-memory database: a concurrent map of collection names to collections.
#[derive(Clone)]
pub struct InMemoryDatabase {
    inner: Arc<InMemoryDatabaseInner>,
}

struct InMemoryDatabaseInner {
    name: String,
    collections: DashMap<String, InMemoryCollection>,
}

impl InMemoryDatabase {
    pub fn new(name: &str) -> Self {
        InMemoryDatabase {
            inner: Arc::new(InMemoryDatabaseInner {
                name: name.to_string(),
                collections: DashMap::new(),
            }),
        }
    }
}

impl StoreDatabaseProvider for InMemoryDatabase {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn collection(&self, name: &str) -> DocRepoResult<StoreCollection> {
        let collection = self
            .inner
            .collections
            .entry(name.to_string())
            .or_insert_with(|| InMemoryCollection::new(name))
            .clone();
        Ok(StoreCollection::new(collection))
    }

    fn list_collection_names(&self) -> DocRepoResult<Vec<String>> {
        let mut names: Vec<String> = self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn drop_collection(&self, name: &str) -> DocRepoResult<()> {
        if self.inner.collections.remove(name).is_some() {
            log::debug!("Dropped in-memory collection '{}'", name);
        }
        Ok(())
    }
}
