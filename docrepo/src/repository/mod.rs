//! Typed repositories over store collections.
//!
//! A [DocumentRepository] maps one entity type to one collection, named by
//! [Entity::entity_name]. Repositories come from a [RepositoryFactory], which
//! owns the client connection and the [crate::policy::SerializationPolicy].
//!
//! # Creating Repositories
//!
//! ```rust,ignore
//! use docrepo::repository::{RepositoryFactory, SearchOptions, SortMode};
//! use docrepo::filter::field;
//! use docrepo_derive::{Convertible, Entity};
//!
//! #[derive(Entity, Convertible, Default)]
//! #[entity(id(field = "car_id"))]
//! pub struct CarModel {
//!     pub car_id: Option<ObjectId>,
//!     pub car_name: String,
//!     pub price: f64,
//! }
//!
//! let factory = RepositoryFactory::builder()
//!     .connection_string("memory://")
//!     .database("garage")
//!     .build()?;
//! let repository = factory.repository::<CarModel>()?;
//!
//! let result = repository.search(
//!     Some(field("price").gt(20.0)),
//!     &SearchOptions::new(0, 10).sort_by("price", SortMode::Desc),
//! )?;
//! ```
//!
//! # Identifiers
//!
//! The identifier field is the one marked with `#[entity(id(...))]`, else a
//! field named `id` in any case. It is stored as `_id`. Types without one can
//! still be created and queried, but not updated or upserted.

mod cursor;
mod entity;
mod entity_mapper;
mod field_inspector;
mod repository;
mod repository_builder;
mod repository_factory;
mod search_options;

pub use cursor::*;
pub use entity::*;
pub use field_inspector::*;
pub use repository::*;
pub use repository_builder::*;
pub use repository_factory::*;
pub use search_options::*;
