//! In-memory backend.
//!
//! Documents live in process memory and vanish with the client. Filters are
//! evaluated with [crate::filter::Filter::apply], so closure predicates built
//! with [crate::filter::predicate] are supported here and nowhere else.

mod client;
mod collection;

pub use client::*;
pub use collection::*;
