//! Storage backends and the boundary repositories talk to.
//!
//! The boundary has three levels, each a provider trait plus a cheap,
//! cloneable handle that dereferences to it:
//!
//! - [StoreClient] over [StoreClientProvider]: a connection
//! - [StoreDatabase] over [StoreDatabaseProvider]: a named database
//! - [StoreCollection] over [StoreCollectionProvider]: a named collection
//!
//! # Backends
//!
//! - **In-memory** ([memory]): `memory://` connection strings. Evaluates
//!   filters in process and supports closure predicates.
//! - **MongoDB** (`mongo`, behind the `mongodb` feature): `mongodb://` and
//!   `mongodb+srv://` connection strings, using the driver's blocking API.
//!
//! Custom backends implement the three provider traits and are wrapped with
//! [StoreClient::new].

pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;
mod store_client;
mod store_collection;
mod store_database;

pub use store_client::*;
pub use store_collection::*;
pub use store_database::*;
