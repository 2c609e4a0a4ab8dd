use super::memory::InMemoryClient;
use super::StoreDatabase;
use crate::common::{MEMORY_SCHEME, MONGODB_SCHEMES};
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Low-level contract for a connection to a document store.
///
/// A client is the expensive, shareable part of a backend. Every database and
/// collection handle obtained through it reuses its connections.
pub trait StoreClientProvider: Send + Sync {
    /// Short name of the backend, as in `memory` or `mongodb`.
    fn backend_name(&self) -> String;

    /// Opens the named database.
    fn database(&self, name: &str) -> DocRepoResult<StoreDatabase>;
}

/// Shared handle to a document store connection.
///
/// # Obtaining a client
///
/// ```rust
/// use docrepo::store::StoreClient;
///
/// let client = StoreClient::connect("memory://garage").unwrap();
/// assert_eq!(client.backend_name(), "memory");
/// let database = client.database("cars").unwrap();
/// assert_eq!(database.name(), "cars");
/// ```
///
/// Connection strings:
///
/// - `memory://` or `memory://<label>` opens a fresh in-memory store. Two calls
///   never share data; clone the client to share it.
/// - `mongodb://...` and `mongodb+srv://...` connect to MongoDB when the crate
///   is built with the `mongodb` feature.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<dyn StoreClientProvider>,
}

impl StoreClient {
    pub fn new<T: StoreClientProvider + 'static>(inner: T) -> Self {
        StoreClient {
            inner: Arc::new(inner),
        }
    }

    /// Connects to the store addressed by the connection string.
    ///
    /// # Errors
    ///
    /// - [ErrorKind::InvalidArgument] for a blank string, a string without a
    ///   scheme, or a scheme no backend serves.
    /// - [ErrorKind::ConnectionError] if the backend rejects the connection.
    pub fn connect(connection_string: &str) -> DocRepoResult<StoreClient> {
        let connection_string = connection_string.trim();
        if connection_string.is_empty() {
            log::error!("Connection string cannot be empty");
            return Err(DocRepoError::new(
                "Connection string cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }

        let (scheme, rest) = split_scheme(connection_string)?;
        if scheme == MEMORY_SCHEME {
            log::debug!("Opening in-memory store '{}'", rest);
            return Ok(StoreClient::new(InMemoryClient::new(rest)));
        }

        if MONGODB_SCHEMES.contains(&scheme.as_str()) {
            return connect_mongodb(connection_string);
        }

        log::error!("No backend serves connection scheme '{}'", scheme);
        Err(DocRepoError::new(
            &format!("No backend serves connection scheme '{}'", scheme),
            ErrorKind::InvalidArgument,
        ))
    }

    /// Opens a fresh, unlabeled in-memory store.
    pub fn in_memory() -> StoreClient {
        StoreClient::new(InMemoryClient::new(""))
    }
}

impl Deref for StoreClient {
    type Target = Arc<dyn StoreClientProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for StoreClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "StoreClient({})", self.inner.backend_name())
    }
}

fn split_scheme(connection_string: &str) -> DocRepoResult<(String, &str)> {
    match connection_string.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() => Ok((scheme.to_ascii_lowercase(), rest)),
        _ => {
            log::error!("Connection string has no scheme, expected 'scheme://...'");
            Err(DocRepoError::new(
                "Connection string has no scheme, expected 'scheme://...'",
                ErrorKind::InvalidArgument,
            ))
        }
    }
}

#[cfg(feature = "mongodb")]
fn connect_mongodb(connection_string: &str) -> DocRepoResult<StoreClient> {
    let client = super::mongo::MongoClient::connect(connection_string)?;
    Ok(StoreClient::new(client))
}

#[cfg(not(feature = "mongodb"))]
fn connect_mongodb(_connection_string: &str) -> DocRepoResult<StoreClient> {
    log::error!("MongoDB connection strings need the crate's mongodb feature");
    Err(DocRepoError::new(
        "MongoDB connection strings need the crate's mongodb feature",
        ErrorKind::InvalidArgument,
    ))
}
