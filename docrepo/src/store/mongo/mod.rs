//! MongoDB backend over the driver's blocking API.
//!
//! Values and filters are translated to BSON at this boundary. Raw filters
//! must wrap a [mongodb::bson::Document]; closure predicates are rejected.

mod client;
mod convert;

pub use client::*;
pub use convert::*;
