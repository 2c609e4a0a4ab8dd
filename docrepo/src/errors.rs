use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for repository operations.
///
/// Each kind names one category of failure so callers can branch on it
/// without parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::errors::{DocRepoError, ErrorKind, DocRepoResult};
///
/// fn example() -> DocRepoResult<()> {
///     Err(DocRepoError::new("database name cannot be empty", ErrorKind::InvalidArgument))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A required argument is missing, blank or out of range
    InvalidArgument,
    /// The operation cannot be performed on this value or type
    InvalidOperation,
    /// An identifier could not be parsed into the backend's native form
    InvalidId,
    /// Error mapping an entity to or from a document
    ObjectMappingError,
    /// Error during filter evaluation or translation
    FilterError,
    /// A write would duplicate an existing `_id`
    DuplicateKey,
    /// The backend could not be reached or the connection string is unusable
    ConnectionError,
    /// Error reported by the storage backend
    BackendError,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::DuplicateKey => write!(f, "Duplicate key"),
            ErrorKind::ConnectionError => write!(f, "Connection error"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// The error type of every fallible operation in this crate.
///
/// Carries a message, an [ErrorKind], an optional cause and a backtrace captured
/// at construction time. The backtrace is captured unresolved and symbolized only
/// when the error is printed with `{:?}`.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::errors::{DocRepoError, ErrorKind};
///
/// let cause = DocRepoError::new("connection refused", ErrorKind::ConnectionError);
/// let err = DocRepoError::new_with_cause("failed to select database", ErrorKind::BackendError, cause);
/// assert_eq!(err.kind(), &ErrorKind::BackendError);
/// ```
#[derive(Clone)]
pub struct DocRepoError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DocRepoError>>,
    backtrace: Atomic<Backtrace>,
}

impl DocRepoError {
    /// Creates a new error with the specified message and kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DocRepoError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new_unresolved()),
        }
    }

    /// Creates a new error that wraps an underlying cause.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: DocRepoError) -> Self {
        DocRepoError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new_unresolved()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&DocRepoError> {
        self.cause.as_deref()
    }
}

impl Display for DocRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DocRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let mut backtrace = self.backtrace.write();
                backtrace.resolve();
                write!(f, "{}\n{:?}", self.message, *backtrace)
            }
        }
    }
}

impl Error for DocRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Shorthand for `Result<T, DocRepoError>`.
pub type DocRepoResult<T> = Result<T, DocRepoError>;

#[cfg(feature = "serde")]
impl serde::de::Error for DocRepoError {
    fn custom<T: Display>(msg: T) -> Self {
        DocRepoError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for DocRepoError {
    fn custom<T: Display>(msg: T) -> Self {
        DocRepoError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<regex::Error> for DocRepoError {
    fn from(err: regex::Error) -> Self {
        DocRepoError::new(&format!("Invalid regex pattern: {}", err), ErrorKind::FilterError)
    }
}

impl From<uuid::Error> for DocRepoError {
    fn from(err: uuid::Error) -> Self {
        DocRepoError::new(&format!("Invalid uuid: {}", err), ErrorKind::InvalidId)
    }
}

impl From<std::num::ParseIntError> for DocRepoError {
    fn from(err: std::num::ParseIntError) -> Self {
        DocRepoError::new(&format!("Invalid integer id: {}", err), ErrorKind::InvalidId)
    }
}

impl From<std::fmt::Error> for DocRepoError {
    fn from(err: std::fmt::Error) -> Self {
        DocRepoError::new(&format!("Formatting error: {}", err), ErrorKind::InternalError)
    }
}
