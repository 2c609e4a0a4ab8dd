//! Connection settings of a repository factory.

use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::store::StoreClient;
use std::fmt::{Debug, Formatter};

/// Where repositories find their store.
///
/// Either a connection string the factory connects with, or a client the
/// caller already holds. Both name the database to use.
///
/// ```rust
/// use docrepo::config::Configuration;
///
/// let configuration = Configuration::connection_string("memory://", "garage");
/// assert_eq!(configuration.database(), "garage");
/// ```
#[derive(Clone)]
pub enum Configuration {
    ConnectionString {
        connection_string: String,
        database: String,
    },
    Client {
        client: StoreClient,
        database: String,
    },
}

impl Configuration {
    pub fn connection_string(connection_string: &str, database: &str) -> Self {
        Configuration::ConnectionString {
            connection_string: connection_string.to_string(),
            database: database.to_string(),
        }
    }

    pub fn client(client: StoreClient, database: &str) -> Self {
        Configuration::Client {
            client,
            database: database.to_string(),
        }
    }

    pub fn database(&self) -> &str {
        match self {
            Configuration::ConnectionString { database, .. } => database,
            Configuration::Client { database, .. } => database,
        }
    }

    /// Checks the database name and returns a client for this configuration,
    /// connecting if needed.
    pub(crate) fn open_client(&self) -> DocRepoResult<StoreClient> {
        if self.database().trim().is_empty() {
            log::error!("Database name cannot be empty");
            return Err(DocRepoError::new(
                "Database name cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }

        match self {
            Configuration::ConnectionString {
                connection_string, ..
            } => StoreClient::connect(connection_string),
            Configuration::Client { client, .. } => Ok(client.clone()),
        }
    }
}

impl Debug for Configuration {
    // connection strings may carry credentials, only the scheme is printed
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Configuration::ConnectionString {
                connection_string,
                database,
            } => {
                let scheme = connection_string
                    .split_once("://")
                    .map(|(scheme, _)| scheme)
                    .unwrap_or("?");
                write!(
                    f,
                    "Configuration::ConnectionString({}://..., database: {})",
                    scheme, database
                )
            }
            Configuration::Client { client, database } => {
                write!(f, "Configuration::Client({:?}, database: {})", client, database)
            }
        }
    }
}
