#![allow(
    dead_code,
    unused_imports,
    clippy::module_inception,
)]
//! # docrepo - Typed Document Repositories
//!
//! docrepo maps plain Rust types to collections of a document database and
//! gives each type a repository with create, read, update, delete, count and
//! paged search.
//!
//! ## Key Features
//!
//! - **Typed repositories**: one [repository::DocumentRepository] per entity type
//! - **Identifier resolution**: a marked field, else a field named `id`, stored as `_id`
//! - **Backend-neutral filters**: one [filter::Filter] tree for every backend
//! - **Paged search**: sort, skip and limit in the backend, with a total count
//! - **Serialization policy**: field naming, UUID representation and unknown fields
//! - **Multiple backends**: in-memory, and MongoDB behind the `mongodb` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docrepo::filter::field;
//! use docrepo::repository::{DocumentRepository, SearchOptions};
//! use docrepo_derive::{Convertible, Entity};
//!
//! #[derive(Entity, Convertible, Default)]
//! pub struct CarModel {
//!     pub id: Option<ObjectId>,
//!     pub car_name: String,
//!     pub price: f64,
//! }
//!
//! let repository = DocumentRepository::<CarModel>::connect("memory://", "garage")?;
//! let id = repository.create(&CarModel { car_name: "Roadster".into(), price: 20.0, ..Default::default() })?;
//!
//! let car = repository.get(&id.to_string())?;
//! let cheap = repository.search(Some(field("price").lt(30.0)), &SearchOptions::new(0, 10))?;
//! ```
//!
//! ## Design Pattern
//!
//! Clients, databases, collections, repositories and factories are handles
//! over an `Arc`-shared implementation: cloning is cheap, all clones see the
//! same state, and every handle is `Send + Sync`.
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, identifiers, find and write options
//! - [`common`] - Values, conversion traits, sort orders and constants
//! - [`config`] - Connection settings
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Query filters and their in-process evaluation
//! - [`policy`] - Serialization policy applied between entities and documents
//! - [`repository`] - Typed repositories and their factory
//! - [`store`] - Storage backend abstractions and implementations

use crate::collection::ObjectIdGenerator;
use std::sync::LazyLock;

pub mod collection;
pub mod common;
pub mod config;
pub mod errors;
pub mod filter;
pub mod policy;
pub mod repository;
pub mod store;

pub(crate) static ID_GENERATOR: LazyLock<ObjectIdGenerator> =
    LazyLock::new(ObjectIdGenerator::new);

#[cfg(test)]
#[ctor::ctor]
fn init() {
    colog::init();
}
