use crate::config::Configuration;
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::policy::SerializationPolicy;
use crate::repository::{DocumentRepository, Entity, RepositoryBuilder};
use crate::store::{StoreClient, StoreDatabase};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Creates repositories sharing one client, one database and one
/// serialization policy.
///
/// The factory connects once; every repository it creates reuses that
/// connection. Cloning the factory is cheap.
///
/// ```rust
/// use docrepo::config::Configuration;
/// use docrepo::policy::SerializationPolicy;
/// use docrepo::repository::RepositoryFactory;
///
/// let factory = RepositoryFactory::new(
///     Configuration::connection_string("memory://", "garage"),
///     SerializationPolicy::conventions(),
/// ).unwrap();
/// assert_eq!(factory.database_name(), "garage");
/// ```
#[derive(Clone)]
pub struct RepositoryFactory {
    inner: Arc<RepositoryFactoryInner>,
}

impl Debug for RepositoryFactory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryFactory")
            .field("client", &self.inner.client)
            .field("database", &self.inner.database.name())
            .field("policy", &self.inner.policy)
            .finish()
    }
}

struct RepositoryFactoryInner {
    configuration: Configuration,
    policy: SerializationPolicy,
    client: StoreClient,
    database: StoreDatabase,
}

impl RepositoryFactory {
    /// Opens the configured client and database.
    ///
    /// # Errors
    ///
    /// - [ErrorKind::InvalidArgument] for a blank database name or a bad
    ///   connection string.
    /// - [ErrorKind::ConnectionError] when the backend cannot be reached.
    pub fn new(configuration: Configuration, policy: SerializationPolicy) -> DocRepoResult<Self> {
        let client = configuration.open_client()?;
        let database = client.database(configuration.database().trim())?;
        log::debug!(
            "Opened database '{}' on {} backend",
            database.name(),
            client.backend_name()
        );

        Ok(RepositoryFactory {
            inner: Arc::new(RepositoryFactoryInner {
                configuration,
                policy,
                client,
                database,
            }),
        })
    }

    pub fn builder() -> RepositoryBuilder {
        RepositoryBuilder::new()
    }

    /// Repository over the collection named after `T`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] if `T` has a blank entity name.
    pub fn repository<T: Entity>(&self) -> DocRepoResult<DocumentRepository<T>> {
        let collection_name = T::entity_name();
        if collection_name.trim().is_empty() {
            log::error!("Entity name of a repository type cannot be empty");
            return Err(DocRepoError::new(
                "Entity name of a repository type cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }

        let collection = self.inner.database.collection(collection_name.trim())?;
        Ok(DocumentRepository::new(
            self.inner.configuration.clone(),
            self.inner.client.clone(),
            self.inner.database.clone(),
            collection,
            self.inner.policy,
        ))
    }

    pub fn configuration(&self) -> &Configuration {
        &self.inner.configuration
    }

    pub fn policy(&self) -> &SerializationPolicy {
        &self.inner.policy
    }

    pub fn client(&self) -> &StoreClient {
        &self.inner.client
    }

    pub fn database(&self) -> &StoreDatabase {
        &self.inner.database
    }

    pub fn database_name(&self) -> String {
        self.inner.database.name()
    }
}
