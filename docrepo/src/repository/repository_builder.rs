use crate::config::Configuration;
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::policy::SerializationPolicy;
use crate::repository::RepositoryFactory;
use crate::store::StoreClient;

/// Fluent construction of a [RepositoryFactory].
///
/// Exactly one of [Self::connection_string] or [Self::client] must be given,
/// plus a database name. Errors found while configuring are kept and returned
/// by [Self::build].
///
/// ```rust
/// use docrepo::policy::SerializationPolicy;
/// use docrepo::repository::RepositoryFactory;
///
/// let factory = RepositoryFactory::builder()
///     .connection_string("memory://")
///     .database("garage")
///     .policy(SerializationPolicy::conventions())
///     .build()
///     .unwrap();
/// assert_eq!(factory.client().backend_name(), "memory");
/// ```
#[derive(Default)]
pub struct RepositoryBuilder {
    error: Option<DocRepoError>,
    connection_string: Option<String>,
    client: Option<StoreClient>,
    database: Option<String>,
    policy: SerializationPolicy,
}

impl RepositoryBuilder {
    pub fn new() -> Self {
        RepositoryBuilder::default()
    }

    pub fn connection_string(mut self, connection_string: &str) -> Self {
        if self.error.is_none() {
            if self.client.is_some() {
                self.error = Some(source_conflict());
            } else {
                self.connection_string = Some(connection_string.to_string());
            }
        }
        self
    }

    /// Reuses an open client instead of connecting.
    pub fn client(mut self, client: StoreClient) -> Self {
        if self.error.is_none() {
            if self.connection_string.is_some() {
                self.error = Some(source_conflict());
            } else {
                self.client = Some(client);
            }
        }
        self
    }

    pub fn database(mut self, database: &str) -> Self {
        if self.error.is_none() {
            if database.trim().is_empty() {
                log::error!("Database name cannot be empty");
                self.error = Some(DocRepoError::new(
                    "Database name cannot be empty",
                    ErrorKind::InvalidArgument,
                ));
            } else {
                self.database = Some(database.to_string());
            }
        }
        self
    }

    pub fn policy(mut self, policy: SerializationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Opens the factory.
    ///
    /// # Errors
    ///
    /// The first configuration error, else [ErrorKind::InvalidArgument] when no
    /// database or no connection source was given, else any error from
    /// [RepositoryFactory::new].
    pub fn build(self) -> DocRepoResult<RepositoryFactory> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let database = match self.database {
            Some(database) => database,
            None => {
                log::error!("No database name given");
                return Err(DocRepoError::new(
                    "No database name given",
                    ErrorKind::InvalidArgument,
                ));
            }
        };

        let configuration = match (self.connection_string, self.client) {
            (Some(connection_string), None) => {
                Configuration::connection_string(&connection_string, &database)
            }
            (None, Some(client)) => Configuration::client(client, &database),
            _ => {
                log::error!("Either a connection string or a client must be given");
                return Err(DocRepoError::new(
                    "Either a connection string or a client must be given",
                    ErrorKind::InvalidArgument,
                ));
            }
        };

        RepositoryFactory::new(configuration, self.policy)
    }
}

fn source_conflict() -> DocRepoError {
    log::error!("A connection string and a client cannot both be given");
    DocRepoError::new(
        "A connection string and a client cannot both be given",
        ErrorKind::InvalidArgument,
    )
}
