#![recursion_limit = "128"]
//! # docrepo Derive Macros
//!
//! Procedural macros deriving the traits a type needs to live in a
//! `docrepo` repository.
//!
//! ## Macros
//!
//! ### `Convertible`
//!
//! Converts between a type and `docrepo::common::Value`. Structs become
//! documents keyed by field name. Unit enum variants are stored as their
//! name; variants with data as a document holding the name and the data.
//!
//! - **Supported for**: structs with named fields and enums
//! - **Type attribute**: `#[converter(ignored = "a, b")]` leaves fields out of
//!   the document and fills them with `Default::default()` when reading
//!
//! ### `Entity`
//!
//! Makes a struct storable by a repository: its collection name, its declared
//! fields and its identifier field.
//!
//! - **Supported for**: structs with named fields
//! - **Type attribute**: `#[entity(name = "...", id(field = "..."))]`
//!
//! Without `id(field = ...)`, a field named `id` in any case is the
//! identifier. A struct with neither can be created and queried but not
//! updated.
//!
//! # Examples
//!
//! ```rust,ignore
//! use docrepo::collection::ObjectId;
//! use docrepo_derive::{Convertible, Entity};
//!
//! #[derive(Entity, Convertible, Default)]
//! #[entity(name = "cars", id(field = "car_id"))]
//! pub struct CarModel {
//!     pub car_id: Option<ObjectId>,
//!     pub car_name: String,
//!     pub price: f64,
//! }
//! ```

extern crate proc_macro;
mod convertible;
mod entity;

use crate::convertible::{generate_convertible_for_enum, generate_convertible_for_struct};
use crate::entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives `docrepo::common::Convertible`.
///
/// Every converted field must implement `Convertible` itself.
#[proc_macro_derive(Convertible, attributes(converter))]
pub fn derive_convertible(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_convertible_for_struct(&ast, data),
        Data::Enum(ref data) => generate_convertible_for_enum(&ast, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast,
            "Cannot derive Convertible for unions",
        )),
    };

    match result {
        Ok(token_stream) => token_stream,
        Err(e) => e.to_compile_error().into(),
    }
}

/// Derives `docrepo::repository::Entity` and
/// `docrepo::repository::IdentifierAccessor`.
///
/// Must be combined with `#[derive(Convertible)]` or a hand-written
/// `Convertible` impl.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_entity_for_struct(&ast, data),
        Data::Enum(_) => Err(syn::Error::new_spanned(
            &ast,
            "Cannot derive Entity for enums, only structs with named fields are supported",
        )),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast,
            "Cannot derive Entity for unions, only structs with named fields are supported",
        )),
    };

    match result {
        Ok(token_stream) => token_stream,
        Err(e) => e.to_compile_error().into(),
    }
}
